//! View controller: owns the anchor and view kind, keeps fetched events in
//! step with the visible window, and applies mutations after the store
//! confirms them.
//!
//! Every fetch is tagged with the window it was issued for. A result whose
//! window is no longer the requested one is dropped, so a slow response for
//! a window the user already navigated away from can never overwrite the
//! current data. Loading state is derived from the requested and settled
//! windows rather than tracked as a separate flag.

mod worker;

pub use worker::{FetchReply, FetchWorker};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::models::event::{CalendarEvent, EventPatch, NewEvent};
use crate::models::layout::LayoutError;
use crate::models::settings::{GridMetrics, Settings};
use crate::models::view::{Navigation, ViewState};
use crate::services::compose::{compose_view, ViewLayout};
use crate::services::event_store::EventStore;
use crate::services::window::{compute_window, TimeWindow};
use crate::utils::date::CalendarFrame;

/// A list request tagged with the window it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub window: TimeWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { count: usize },
    /// The window moved on while the request was in flight.
    Stale,
    Failed,
}

#[derive(Debug, Clone)]
struct Resolved {
    state: ViewState,
    window: TimeWindow,
    events: Vec<CalendarEvent>,
}

pub struct ViewController<S: EventStore> {
    store: S,
    frame: CalendarFrame,
    metrics: GridMetrics,
    state: ViewState,
    requested: TimeWindow,
    /// Window of the last fetch that completed, successfully or not.
    settled: Option<TimeWindow>,
    resolved: Option<Resolved>,
    last_error: Option<anyhow::Error>,
}

impl<S: EventStore> ViewController<S> {
    pub fn new(store: S, settings: &Settings, now: DateTime<Utc>) -> Self {
        let frame = settings.frame();
        let state = ViewState::initial(now, settings.default_view, &frame);
        Self::with_state(store, frame, settings.metrics(), state)
    }

    pub fn with_state(store: S, frame: CalendarFrame, metrics: GridMetrics, state: ViewState) -> Self {
        Self {
            store,
            frame,
            metrics,
            requested: compute_window(state.anchor, state.kind, &frame),
            state,
            settled: None,
            resolved: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn frame(&self) -> &CalendarFrame {
        &self.frame
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn requested_window(&self) -> TimeWindow {
        self.requested
    }

    /// Window of the data currently held, if any fetch has succeeded.
    pub fn resolved_window(&self) -> Option<TimeWindow> {
        self.resolved.as_ref().map(|r| r.window)
    }

    pub fn is_loading(&self) -> bool {
        self.settled != Some(self.requested)
    }

    pub fn events(&self) -> &[CalendarEvent] {
        self.resolved.as_ref().map(|r| r.events.as_slice()).unwrap_or(&[])
    }

    pub fn last_error(&self) -> Option<&anyhow::Error> {
        self.last_error.as_ref()
    }

    /// Apply a navigation action. Returns the fetch to issue when the
    /// visible window changed.
    pub fn navigate(&mut self, action: Navigation, now: DateTime<Utc>) -> Option<FetchRequest> {
        self.state = self.state.navigate(action, &self.frame, now);
        let window = compute_window(self.state.anchor, self.state.kind, &self.frame);

        if window == self.requested {
            if let Some(resolved) = self.resolved.as_mut().filter(|r| r.window == window) {
                resolved.state = self.state;
            }
            return None;
        }

        log::debug!(
            "View moved to {} anchored at {}",
            self.state.kind,
            self.frame.local_date(self.state.anchor)
        );
        self.requested = window;
        Some(self.begin_fetch())
    }

    pub fn begin_fetch(&self) -> FetchRequest {
        FetchRequest {
            window: self.requested,
        }
    }

    /// Accept the result of a fetch issued earlier.
    ///
    /// Results for any window but the requested one are discarded without
    /// touching state, errors included.
    pub fn complete_fetch(
        &mut self,
        request: FetchRequest,
        result: Result<Vec<CalendarEvent>>,
    ) -> FetchOutcome {
        if request.window != self.requested {
            log::debug!(
                "Dropping stale fetch result for {} .. {}",
                request.window.start,
                request.window.end
            );
            return FetchOutcome::Stale;
        }

        self.settled = Some(request.window);
        match result {
            Ok(mut events) => {
                events.sort_by(|a, b| a.chronological_cmp(b));
                let count = events.len();
                self.resolved = Some(Resolved {
                    state: self.state,
                    window: request.window,
                    events,
                });
                self.last_error = None;
                FetchOutcome::Applied { count }
            }
            Err(err) => {
                log::warn!("Failed to fetch events: {:#}", err);
                self.last_error = Some(err);
                FetchOutcome::Failed
            }
        }
    }

    /// Fetch the requested window synchronously.
    pub fn refresh(&mut self) -> FetchOutcome {
        let request = self.begin_fetch();
        let result = self.store.list(request.window.start, request.window.end);
        self.complete_fetch(request, result)
    }

    pub fn create(&mut self, event: NewEvent) -> Result<CalendarEvent> {
        let created = self.store.create(event).context("Failed to create event")?;
        self.merge_local(created.clone());
        Ok(created)
    }

    pub fn update(&mut self, id: &str, patch: EventPatch) -> Result<CalendarEvent> {
        let updated = self
            .store
            .update(id, patch)
            .with_context(|| format!("Failed to update event {}", id))?;
        self.merge_local(updated.clone());
        Ok(updated)
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.store
            .delete(id)
            .with_context(|| format!("Failed to delete event {}", id))?;
        if let Some(resolved) = self.resolved.as_mut() {
            resolved.events.retain(|e| e.id != id);
        }
        Ok(())
    }

    /// Layout of the data on screen: the current view once its window has
    /// resolved, otherwise the view the held data was fetched for.
    pub fn compose(&self) -> Option<Result<ViewLayout<'_>, LayoutError>> {
        let resolved = self.resolved.as_ref()?;
        let state = if resolved.window == self.requested {
            self.state
        } else {
            resolved.state
        };
        Some(compose_view(&resolved.events, &state, &self.frame, &self.metrics))
    }

    /// Insert or replace a confirmed event in the held data, dropping it when
    /// it no longer touches the held window.
    fn merge_local(&mut self, event: CalendarEvent) {
        let Some(resolved) = self.resolved.as_mut() else {
            return;
        };

        resolved.events.retain(|e| e.id != event.id);
        if resolved.window.intersects(&event) {
            resolved.events.push(event);
            resolved.events.sort_by(|a, b| a.chronological_cmp(b));
        }
    }
}
