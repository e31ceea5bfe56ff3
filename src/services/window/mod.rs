//! Visible window for a view: the half-open instant range to fetch and draw.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::models::event::CalendarEvent;
use crate::models::view::ViewKind;
use crate::utils::date::{first_day_of_month, last_day_of_month, CalendarFrame};

/// Half-open `[start, end)` range of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window covering whole calendar days `first..=last`.
    pub fn for_dates(first: NaiveDate, last: NaiveDate, frame: &CalendarFrame) -> Self {
        Self::new(frame.day_start(first), frame.day_end(last))
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Whether the event shares at least one instant with the window.
    /// A zero-duration event counts when its instant lies inside.
    pub fn intersects(&self, event: &CalendarEvent) -> bool {
        if event.start == event.end {
            return self.contains(event.start);
        }
        event.start < self.end && self.start < event.end
    }

    /// Calendar dates covered, in order.
    pub fn dates(&self, frame: &CalendarFrame) -> Vec<NaiveDate> {
        let first = frame.local_date(self.start);
        (0..self.day_count())
            .map(|offset| first + Duration::days(offset))
            .collect()
    }

    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Compute the window a view anchored on `anchor` needs.
///
/// * day: the anchor's calendar day
/// * week: the week containing the anchor
/// * month: whole weeks from the week of the 1st through the week of the last day
/// * year: the anchor's calendar year
pub fn compute_window(anchor: DateTime<Utc>, kind: ViewKind, frame: &CalendarFrame) -> TimeWindow {
    let date = frame.local_date(anchor);
    match kind {
        ViewKind::Day => TimeWindow::for_dates(date, date, frame),
        ViewKind::Week => {
            let first = frame.week_start(date);
            TimeWindow::for_dates(first, first + Duration::days(6), frame)
        }
        ViewKind::Month => {
            let (first, last) = month_grid_bounds(date, frame);
            TimeWindow::for_dates(first, last, frame)
        }
        ViewKind::Year => {
            let first = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
            let last = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
            TimeWindow::for_dates(first, last, frame)
        }
    }
}

/// Dates of every cell in the month grid around `anchor`, whole weeks only.
pub fn month_grid_days(anchor: DateTime<Utc>, frame: &CalendarFrame) -> Vec<NaiveDate> {
    compute_window(anchor, ViewKind::Month, frame).dates(frame)
}

/// The seven dates of the week containing `anchor`.
pub fn week_days(anchor: DateTime<Utc>, frame: &CalendarFrame) -> Vec<NaiveDate> {
    compute_window(anchor, ViewKind::Week, frame).dates(frame)
}

fn month_grid_bounds(date: NaiveDate, frame: &CalendarFrame) -> (NaiveDate, NaiveDate) {
    let first_of_month = first_day_of_month(date);
    let last_of_month = first_of_month
        .with_day(last_day_of_month(date.year(), date.month()))
        .unwrap_or(first_of_month);

    let grid_start = frame.week_start(first_of_month);
    let grid_end = frame.week_start(last_of_month) + Duration::days(6);
    (grid_start, grid_end)
}
