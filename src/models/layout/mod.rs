//! Geometry produced by one layout pass.
//!
//! Every type here borrows the events it describes; results are recomputed
//! per render and never stored.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use super::event::CalendarEvent;

/// Precondition violations that abort a layout computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("event '{id}' ends before it starts")]
    InvertedInterval { id: String },
    #[error("month grid must hold whole weeks of consecutive days, got {len} cells")]
    MalformedGrid { len: usize },
}

/// Placement of one timed event inside a day column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutEntry<'a> {
    pub event: &'a CalendarEvent,
    pub top_units: f64,
    pub height_units: f64,
    pub column: usize,
    pub total_columns: usize,
    /// Minutes from the start of the day to the (clipped) start.
    pub start_minute: f64,
    /// True clipped duration; zero for point-in-time events.
    pub duration_minutes: f64,
}

impl LayoutEntry<'_> {
    /// Horizontal extent as fractions of the column width.
    pub fn horizontal_span(&self) -> (f64, f64) {
        let total = self.total_columns.max(1) as f64;
        (self.column as f64 / total, (self.column + 1) as f64 / total)
    }
}

/// A spanning event in the all-day row of a day or week view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanningBar<'a> {
    pub event: &'a CalendarEvent,
    /// Index of the first day column covered.
    pub first_column: usize,
    /// Number of day columns covered.
    pub span: usize,
    pub starts_before_window: bool,
    pub ends_after_window: bool,
}

/// One cell covered by a month-grid bar segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BarCell {
    pub cell: usize,
    pub date: NaiveDate,
    /// False only on the cell of the event's true start day.
    pub is_continuation: bool,
}

/// The part of a spanning event's bar that falls in one grid row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSegment<'a> {
    pub event: &'a CalendarEvent,
    pub row: usize,
    pub start_cell: usize,
    pub span: usize,
    /// Vertical slot within the row; segments in one row never share a lane.
    pub lane: usize,
    pub cells: Vec<BarCell>,
    pub continues_from_previous_row: bool,
    pub continues_into_next_row: bool,
}

impl BarSegment<'_> {
    pub fn end_cell(&self) -> usize {
        self.start_cell + self.span - 1
    }

    /// Whether this segment holds the event's true start day.
    pub fn contains_event_start(&self) -> bool {
        self.cells.iter().any(|cell| !cell.is_continuation)
    }
}
