//! Event classification for day and week columns.
//!
//! Splits the events touching a day (or week) into spanning bars, drawn in
//! the all-day row, and timed blocks, drawn in the hour grid. Spanning
//! entries always come first so bars paint above blocks and are truncated
//! last.

use chrono::{Duration, NaiveDate};

use crate::models::event::CalendarEvent;
use crate::models::layout::SpanningBar;
use crate::services::window::TimeWindow;
use crate::utils::date::CalendarFrame;

/// Events partitioned for one day or week.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification<'a> {
    pub spanning: Vec<&'a CalendarEvent>,
    pub timed: Vec<&'a CalendarEvent>,
}

impl<'a> Classification<'a> {
    /// Spanning entries followed by timed entries.
    pub fn ordered(&self) -> Vec<&'a CalendarEvent> {
        self.spanning.iter().chain(self.timed.iter()).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.spanning.len() + self.timed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spanning.is_empty() && self.timed.is_empty()
    }
}

/// An event is spanning when it is all-day or occupies more than one
/// calendar day.
pub fn is_spanning(event: &CalendarEvent, frame: &CalendarFrame) -> bool {
    event.all_day || frame.day_difference(event) >= 1
}

/// Whether `event` appears anywhere in `first..=last`.
pub fn touches_dates(
    event: &CalendarEvent,
    first: NaiveDate,
    last: NaiveDate,
    frame: &CalendarFrame,
) -> bool {
    if event.all_day {
        let (event_first, event_last) = frame.occupied_dates(event);
        return event_first <= last && first <= event_last;
    }
    TimeWindow::for_dates(first, last, frame).intersects(event)
}

/// Partition the events touching `day`.
///
/// Only all-day events are spanning here; a timed event crossing midnight is
/// kept in the hour grid and clipped to the day by the layout pass.
pub fn classify_for_day<'a>(
    events: &'a [CalendarEvent],
    day: NaiveDate,
    frame: &CalendarFrame,
) -> Classification<'a> {
    let mut result = Classification::default();
    for event in events.iter().filter(|e| touches_dates(e, day, day, frame)) {
        if event.all_day {
            result.spanning.push(event);
        } else {
            result.timed.push(event);
        }
    }
    sort_groups(&mut result);
    result
}

/// Partition the events touching the week starting at `week_start`.
///
/// Multi-day timed events are promoted into the spanning group alongside
/// all-day events.
pub fn classify_for_week<'a>(
    events: &'a [CalendarEvent],
    week_start: NaiveDate,
    frame: &CalendarFrame,
) -> Classification<'a> {
    let week_end = week_start + Duration::days(6);
    let mut result = Classification::default();
    for event in events
        .iter()
        .filter(|e| touches_dates(e, week_start, week_end, frame))
    {
        if is_spanning(event, frame) {
            result.spanning.push(event);
        } else {
            result.timed.push(event);
        }
    }
    sort_groups(&mut result);
    result
}

/// Bars for the all-day row of a view whose columns are `first_day` onwards.
pub fn spanning_bars<'a>(
    spanning: &[&'a CalendarEvent],
    first_day: NaiveDate,
    column_count: usize,
    frame: &CalendarFrame,
) -> Vec<SpanningBar<'a>> {
    if column_count == 0 {
        return Vec::new();
    }
    let last_day = first_day + Duration::days(column_count as i64 - 1);

    spanning
        .iter()
        .filter_map(|event| {
            let (event_first, event_last) = frame.occupied_dates(event);
            if event_last < first_day || event_first > last_day {
                return None;
            }
            let clipped_first = event_first.max(first_day);
            let clipped_last = event_last.min(last_day);
            Some(SpanningBar {
                event: *event,
                first_column: (clipped_first - first_day).num_days() as usize,
                span: (clipped_last - clipped_first).num_days() as usize + 1,
                starts_before_window: event_first < first_day,
                ends_after_window: event_last > last_day,
            })
        })
        .collect()
}

/// Seven-column bars for the week starting at `week_start`.
pub fn week_bars<'a>(
    spanning: &[&'a CalendarEvent],
    week_start: NaiveDate,
    frame: &CalendarFrame,
) -> Vec<SpanningBar<'a>> {
    spanning_bars(spanning, week_start, 7, frame)
}

fn sort_groups(result: &mut Classification<'_>) {
    result.spanning.sort_by(|a, b| a.chronological_cmp(b));
    result.timed.sort_by(|a, b| a.chronological_cmp(b));
}
