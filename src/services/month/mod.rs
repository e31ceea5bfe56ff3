//! Month grid: continuation bars and per-cell entry lists.
//!
//! A spanning event becomes one segment per grid row it crosses, because a
//! bar cannot wrap from the last column of a row to the first of the next.
//! Only the cell holding the event's true start day is a non-continuation
//! cell; every other covered cell merely carries the event through.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::event::CalendarEvent;
use crate::models::layout::{BarCell, BarSegment, LayoutError};
use crate::services::classify::{is_spanning, touches_dates};
use crate::services::layout::ensure_ordered_intervals;
use crate::utils::date::CalendarFrame;

pub const DAYS_PER_ROW: usize = 7;

/// Every entry for one grid cell, spanning first.
///
/// Nothing is truncated here; deciding how many fit and showing "N more" is
/// up to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCell<'a> {
    pub index: usize,
    pub date: NaiveDate,
    pub spanning: Vec<&'a CalendarEvent>,
    pub timed: Vec<&'a CalendarEvent>,
}

impl<'a> MonthCell<'a> {
    pub fn entries(&self) -> Vec<&'a CalendarEvent> {
        self.spanning.iter().chain(self.timed.iter()).copied().collect()
    }

    /// Entries beyond `visible` that a renderer would fold into "N more".
    pub fn hidden_count(&self, visible: usize) -> usize {
        (self.spanning.len() + self.timed.len()).saturating_sub(visible)
    }
}

/// Split spanning events into per-row bar segments over `grid_days`.
///
/// `grid_days` must be whole weeks of consecutive dates.
pub fn resolve_month_bars<'a>(
    spanning: &[&'a CalendarEvent],
    grid_days: &[NaiveDate],
    frame: &CalendarFrame,
) -> Result<Vec<BarSegment<'a>>, LayoutError> {
    validate_grid(grid_days)?;
    ensure_ordered_intervals(spanning)?;

    let grid_first = grid_days[0];
    let grid_last = grid_days[grid_days.len() - 1];
    let row_count = grid_days.len() / DAYS_PER_ROW;

    let mut ordered: Vec<(&'a CalendarEvent, NaiveDate, NaiveDate)> = spanning
        .iter()
        .map(|event| {
            let (first, last) = frame.occupied_dates(event);
            (*event, first, last)
        })
        .filter(|(_, first, last)| *first <= grid_last && *last >= grid_first)
        .collect();

    // Earlier bars first, longer before shorter so long bars keep the top lanes.
    ordered.sort_by(|(a, a_first, a_last), (b, b_first, b_last)| {
        a_first
            .cmp(b_first)
            .then_with(|| b_last.cmp(a_last))
            .then_with(|| a.chronological_cmp(b))
    });

    let mut lane_ends: Vec<Vec<usize>> = vec![Vec::new(); row_count];
    let mut segments = Vec::new();

    for (event, first, last) in ordered {
        let first_cell = cell_index(grid_first, first.max(grid_first));
        let last_cell = cell_index(grid_first, last.min(grid_last));

        for row in (first_cell / DAYS_PER_ROW)..=(last_cell / DAYS_PER_ROW) {
            let row_first = row * DAYS_PER_ROW;
            let start_cell = first_cell.max(row_first);
            let end_cell = last_cell.min(row_first + DAYS_PER_ROW - 1);

            let cells = (start_cell..=end_cell)
                .map(|cell| BarCell {
                    cell,
                    date: grid_days[cell],
                    is_continuation: grid_days[cell] != first,
                })
                .collect();

            segments.push(BarSegment {
                event,
                row,
                start_cell,
                span: end_cell - start_cell + 1,
                lane: claim_lane(&mut lane_ends[row], start_cell, end_cell),
                cells,
                continues_from_previous_row: grid_days[start_cell] > first,
                continues_into_next_row: grid_days[end_cell] < last,
            });
        }
    }

    segments.sort_by(|a, b| {
        a.row
            .cmp(&b.row)
            .then_with(|| a.lane.cmp(&b.lane))
            .then_with(|| a.start_cell.cmp(&b.start_cell))
    });

    log::debug!(
        "Resolved {} bar segment(s) across {} grid row(s)",
        segments.len(),
        row_count
    );

    Ok(segments)
}

/// Per-cell entry lists for the month grid.
///
/// Uses the week convention: multi-day timed events count as spanning.
pub fn month_cells<'a>(
    events: &'a [CalendarEvent],
    grid_days: &[NaiveDate],
    frame: &CalendarFrame,
) -> Vec<MonthCell<'a>> {
    grid_days
        .iter()
        .enumerate()
        .map(|(index, date)| {
            let mut cell = MonthCell {
                index,
                date: *date,
                spanning: Vec::new(),
                timed: Vec::new(),
            };
            for event in events.iter().filter(|e| touches_dates(e, *date, *date, frame)) {
                if is_spanning(event, frame) {
                    cell.spanning.push(event);
                } else {
                    cell.timed.push(event);
                }
            }
            cell.spanning.sort_by(|a, b| a.chronological_cmp(b));
            cell.timed.sort_by(|a, b| a.chronological_cmp(b));
            cell
        })
        .collect()
}

fn validate_grid(grid_days: &[NaiveDate]) -> Result<(), LayoutError> {
    let whole_weeks = !grid_days.is_empty() && grid_days.len() % DAYS_PER_ROW == 0;
    let consecutive = grid_days
        .windows(2)
        .all(|pair| pair[1] - pair[0] == Duration::days(1));

    if whole_weeks && consecutive {
        Ok(())
    } else {
        Err(LayoutError::MalformedGrid {
            len: grid_days.len(),
        })
    }
}

fn cell_index(grid_first: NaiveDate, date: NaiveDate) -> usize {
    (date - grid_first).num_days() as usize
}

/// Lowest lane whose last occupied cell lies before `start_cell`.
fn claim_lane(lane_ends: &mut Vec<usize>, start_cell: usize, end_cell: usize) -> usize {
    match lane_ends.iter().position(|last| *last < start_cell) {
        Some(lane) => {
            lane_ends[lane] = end_cell;
            lane
        }
        None => {
            lane_ends.push(end_cell);
            lane_ends.len() - 1
        }
    }
}
