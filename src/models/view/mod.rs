// View module
// Which calendar view is active and the date it is anchored on

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::date::{shift_month_preserving_day, CalendarFrame};

/// Calendar view types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Day,
    Week,
    Month,
    Year,
}

impl ViewKind {
    pub const ALL: [ViewKind; 4] = [ViewKind::Day, ViewKind::Week, ViewKind::Month, ViewKind::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Day => "day",
            ViewKind::Week => "week",
            ViewKind::Month => "month",
            ViewKind::Year => "year",
        }
    }
}

impl Default for ViewKind {
    fn default() -> Self {
        ViewKind::Month
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(ViewKind::Day),
            "week" => Ok(ViewKind::Week),
            "month" => Ok(ViewKind::Month),
            "year" => Ok(ViewKind::Year),
            other => Err(format!("Unknown view kind '{}'", other)),
        }
    }
}

/// Explicit navigation actions; the only way a [`ViewState`] changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
    Today,
    JumpTo(NaiveDate),
    SwitchView(ViewKind),
}

/// Anchor date plus view kind.
///
/// Never mutated in place: every navigation produces a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub anchor: DateTime<Utc>,
    pub kind: ViewKind,
}

impl ViewState {
    pub fn new(anchor: DateTime<Utc>, kind: ViewKind) -> Self {
        Self { anchor, kind }
    }

    /// State at mount: `kind` anchored at the start of today.
    pub fn initial(now: DateTime<Utc>, kind: ViewKind, frame: &CalendarFrame) -> Self {
        Self::new(frame.day_start(frame.local_date(now)), kind)
    }

    /// Produce the state that follows `action`.
    ///
    /// The anchor is normalised to the start of its calendar day so that two
    /// states showing the same window compare equal.
    pub fn navigate(&self, action: Navigation, frame: &CalendarFrame, now: DateTime<Utc>) -> Self {
        let current = frame.local_date(self.anchor);
        let (date, kind) = match action {
            Navigation::Next => (shift_date(current, self.kind, 1), self.kind),
            Navigation::Previous => (shift_date(current, self.kind, -1), self.kind),
            Navigation::Today => (frame.local_date(now), self.kind),
            Navigation::JumpTo(date) => (date, self.kind),
            Navigation::SwitchView(kind) => (current, kind),
        };

        Self::new(frame.day_start(date), kind)
    }
}

fn shift_date(current: NaiveDate, kind: ViewKind, step: i32) -> NaiveDate {
    match kind {
        ViewKind::Day => current + Duration::days(step as i64),
        ViewKind::Week => current + Duration::weeks(step as i64),
        ViewKind::Month => shift_month_preserving_day(current, step),
        ViewKind::Year => shift_month_preserving_day(current, step * 12),
    }
}
