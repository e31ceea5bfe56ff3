// Event store module
// Boundary between the engine and whatever holds the events

mod http;
mod memory;

pub use http::HttpEventStore;
pub use memory::InMemoryEventStore;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::event::{CalendarEvent, EventPatch, NewEvent};

/// Remote or local source of calendar events.
///
/// `list` returns every event intersecting `[start, end)`; the store decides
/// ids for created events.
#[cfg_attr(test, mockall::automock)]
pub trait EventStore: Send {
    fn list(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<CalendarEvent>>;
    fn create(&self, event: NewEvent) -> Result<CalendarEvent>;
    fn update(&self, id: &str, patch: EventPatch) -> Result<CalendarEvent>;
    fn delete(&self, id: &str) -> Result<()>;
}

impl<S: EventStore + Sync + ?Sized> EventStore for std::sync::Arc<S> {
    fn list(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<CalendarEvent>> {
        (**self).list(start, end)
    }

    fn create(&self, event: NewEvent) -> Result<CalendarEvent> {
        (**self).create(event)
    }

    fn update(&self, id: &str, patch: EventPatch) -> Result<CalendarEvent> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: &str) -> Result<()> {
        (**self).delete(id)
    }
}
