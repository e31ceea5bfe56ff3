// Event module
// Calendar event model as exchanged with the remote event store

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures raised when constructing or patching an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("Event title cannot be empty")]
    EmptyTitle,
    #[error("Event id cannot be empty")]
    EmptyId,
    #[error("Event end time must not be before start time")]
    EndBeforeStart,
    #[error("Event {0} is required")]
    MissingField(&'static str),
}

/// Calendar event as stored remotely.
///
/// `start` and `end` are absolute instants; `start <= end` always holds for
/// values built through [`CalendarEvent::new`] or the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "startInstant")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endInstant")]
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CalendarEvent {
    /// Create a new event with required fields
    ///
    /// # Examples
    /// ```
    /// use calendar_engine::models::event::CalendarEvent;
    /// use chrono::{Duration, Utc};
    ///
    /// let start = Utc::now();
    /// let event = CalendarEvent::new("evt-1", "Team Meeting", start, start + Duration::hours(1)).unwrap();
    /// assert!(!event.all_day);
    /// ```
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, EventError> {
        let event = Self {
            id: id.into(),
            title: title.into(),
            description: None,
            start,
            end,
            all_day: false,
            color: None,
        };
        event.validate()?;
        Ok(event)
    }

    /// Create a builder for constructing events with optional fields
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    pub fn validate(&self) -> Result<(), EventError> {
        if self.id.trim().is_empty() {
            return Err(EventError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(EventError::EmptyTitle);
        }
        if self.end < self.start {
            return Err(EventError::EndBeforeStart);
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Total order by start, then end, then id.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Apply a partial update, rejecting results that break the invariants.
    pub fn apply_patch(&mut self, patch: &EventPatch) -> Result<(), EventError> {
        let mut updated = self.clone();
        if let Some(title) = &patch.title {
            updated.title = title.clone();
        }
        if let Some(description) = &patch.description {
            updated.description = description.clone();
        }
        if let Some(start) = patch.start {
            updated.start = start;
        }
        if let Some(end) = patch.end {
            updated.end = end;
        }
        if let Some(all_day) = patch.all_day {
            updated.all_day = all_day;
        }
        if let Some(color) = &patch.color {
            updated.color = color.clone();
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

/// Payload for creating an event; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "startInstant")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endInstant")]
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NewEvent {
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: None,
            start,
            end,
            all_day: false,
            color: None,
        }
    }

    pub fn validate(&self) -> Result<(), EventError> {
        if self.title.trim().is_empty() {
            return Err(EventError::EmptyTitle);
        }
        if self.end < self.start {
            return Err(EventError::EndBeforeStart);
        }
        Ok(())
    }

    /// Attach the id assigned by the store.
    pub fn into_event(self, id: impl Into<String>) -> Result<CalendarEvent, EventError> {
        let event = CalendarEvent {
            id: id.into(),
            title: self.title,
            description: self.description,
            start: self.start,
            end: self.end,
            all_day: self.all_day,
            color: self.color,
        };
        event.validate()?;
        Ok(event)
    }
}

/// Partial update sent to the store.
///
/// `description` and `color` use a nested option so a patch can clear them:
/// `Some(None)` removes the value, `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(rename = "startInstant", default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(rename = "endInstant", default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Move the event to a new time range.
    pub fn reschedule(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }
}

/// Builder for creating events with optional fields
#[derive(Default)]
pub struct EventBuilder {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    all_day: bool,
    color: Option<String>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Set as all-day event
    pub fn all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Set the render color token
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn build(self) -> Result<CalendarEvent, EventError> {
        let id = self.id.ok_or(EventError::MissingField("id"))?;
        let title = self.title.ok_or(EventError::MissingField("title"))?;
        let start = self.start.ok_or(EventError::MissingField("start time"))?;
        let end = self.end.ok_or(EventError::MissingField("end time"))?;

        let event = CalendarEvent {
            id,
            title,
            description: self.description,
            start,
            end,
            all_day: self.all_day,
            color: self.color,
        };

        event.validate()?;
        Ok(event)
    }
}
