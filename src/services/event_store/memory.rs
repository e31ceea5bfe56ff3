use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use super::EventStore;
use crate::models::event::{CalendarEvent, EventPatch, NewEvent};
use crate::services::window::TimeWindow;

/// Process-local store, used by the preview tool's `--events FILE.json` mode and tests.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: Mutex<Vec<CalendarEvent>>,
    next_id: AtomicU64,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<CalendarEvent>>> {
        self.events
            .lock()
            .map_err(|_| anyhow!("In-memory event store lock poisoned"))
    }
}

impl EventStore for InMemoryEventStore {
    fn list(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<CalendarEvent>> {
        let window = TimeWindow::new(start, end);
        let events = self.lock()?;
        Ok(events.iter().filter(|e| window.intersects(e)).cloned().collect())
    }

    fn create(&self, event: NewEvent) -> Result<CalendarEvent> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = event
            .into_event(format!("mem-{}", id))
            .context("Failed to create event")?;

        self.lock()?.push(created.clone());
        Ok(created)
    }

    fn update(&self, id: &str, patch: EventPatch) -> Result<CalendarEvent> {
        let mut events = self.lock()?;
        let event = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| anyhow!("Event not found: {}", id))?;

        event
            .apply_patch(&patch)
            .with_context(|| format!("Failed to update event {}", id))?;
        Ok(event.clone())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut events = self.lock()?;
        let before = events.len();
        events.retain(|e| e.id != id);

        if events.len() == before {
            return Err(anyhow!("Event not found: {}", id));
        }
        Ok(())
    }
}
