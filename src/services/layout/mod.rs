//! Overlap layout for timed events in one day column.
//!
//! Two passes over the same sorted list:
//! 1. greedy column packing: each block takes the lowest column whose
//!    occupant has already ended, opening a new column otherwise;
//! 2. an interval sweep grouping blocks into connected overlap clusters, so
//!    every block in a cluster reports the same `total_columns`.
//!
//! Keeping the passes separate matters: packing alone under-counts the width
//! of a cluster when a late block only overlaps part of it.
//!
//! Both passes compare true clipped times, so back-to-back blocks share a
//! column even when the height floor makes the first one taller than its
//! duration. `GridMetrics::pack_by_visual_extent` switches them to the drawn
//! extent instead.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::event::CalendarEvent;
use crate::models::layout::{LayoutEntry, LayoutError};
use crate::models::settings::GridMetrics;
use crate::utils::date::CalendarFrame;

/// The part of an event that falls inside the rendered day.
#[derive(Debug, Clone, Copy)]
struct Segment<'a> {
    event: &'a CalendarEvent,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    /// End compared by packing and clustering: the true end, or the drawn
    /// end when visual packing is enabled.
    packing_end: DateTime<Utc>,
}

/// Lay out the timed events of `day`.
///
/// Events crossing midnight are clipped to the day; events not touching the
/// day are ignored. Fails on the first event whose end precedes its start.
/// Identical input always yields identical columns, whatever its order.
pub fn layout_day<'a>(
    timed: &[&'a CalendarEvent],
    day: NaiveDate,
    frame: &CalendarFrame,
    metrics: &GridMetrics,
) -> Result<Vec<LayoutEntry<'a>>, LayoutError> {
    ensure_ordered_intervals(timed)?;

    let day_start = frame.day_start(day);
    let day_end = frame.day_end(day);
    let min_visual = metrics
        .pack_by_visual_extent
        .then(|| visual_floor(metrics));

    let mut segments: Vec<Segment<'a>> = timed
        .iter()
        .filter_map(|event| clip_to_day(event, day_start, day_end, min_visual))
        .collect();

    if segments.len() < timed.len() {
        log::debug!(
            "Skipped {} event(s) outside {} during layout",
            timed.len() - segments.len(),
            day
        );
    }

    segments.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.end.cmp(&b.end))
            .then_with(|| a.event.chronological_cmp(b.event))
    });

    let columns = assign_columns(&segments);
    let widths = cluster_widths(&segments, &columns);

    let entries = segments
        .iter()
        .zip(columns.iter().zip(widths.iter()))
        .map(|(segment, (&column, &total_columns))| {
            let start_minute = frame.minutes_into_day(day, segment.start);
            let duration_minutes = (segment.end - segment.start).num_seconds() as f64 / 60.0;
            let natural_height = duration_minutes / 60.0 * metrics.row_height_units;

            LayoutEntry {
                event: segment.event,
                top_units: start_minute / 60.0 * metrics.row_height_units,
                height_units: natural_height.max(metrics.min_height_units),
                column,
                total_columns,
                start_minute,
                duration_minutes,
            }
        })
        .collect();

    Ok(entries)
}

/// Fail fast on malformed intervals instead of clamping them.
pub fn ensure_ordered_intervals(events: &[&CalendarEvent]) -> Result<(), LayoutError> {
    match events.iter().find(|event| event.start > event.end) {
        Some(event) => {
            log::error!("Refusing to lay out event '{}': end precedes start", event.id);
            Err(LayoutError::InvertedInterval {
                id: event.id.clone(),
            })
        }
        None => Ok(()),
    }
}

/// Duration drawn by a block of minimum height, capped at one day.
fn visual_floor(metrics: &GridMetrics) -> Duration {
    let minutes = metrics.min_visual_minutes().clamp(0.0, 24.0 * 60.0);
    Duration::milliseconds((minutes * 60_000.0).round() as i64)
}

fn clip_to_day<'a>(
    event: &'a CalendarEvent,
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
    min_visual: Option<Duration>,
) -> Option<Segment<'a>> {
    let touches = if event.start == event.end {
        day_start <= event.start && event.start < day_end
    } else {
        event.start < day_end && day_start < event.end
    };
    if !touches {
        return None;
    }

    let start = event.start.max(day_start);
    let end = event.end.min(day_end);
    let packing_end = match min_visual {
        Some(floor) => start
            .checked_add_signed(floor)
            .map_or(day_end, |visual_end| visual_end.min(day_end))
            .max(end),
        None => end,
    };

    Some(Segment {
        event,
        start,
        end,
        packing_end,
    })
}

/// Greedy packing over segments sorted by start.
fn assign_columns(segments: &[Segment<'_>]) -> Vec<usize> {
    let mut column_ends: Vec<DateTime<Utc>> = Vec::new();
    let mut assigned = Vec::with_capacity(segments.len());

    for segment in segments {
        let free = column_ends
            .iter()
            .position(|occupant_end| *occupant_end <= segment.start);
        let column = match free {
            Some(index) => {
                column_ends[index] = segment.packing_end;
                index
            }
            None => {
                column_ends.push(segment.packing_end);
                column_ends.len() - 1
            }
        };
        assigned.push(column);
    }

    assigned
}

/// Sweep for connected overlap clusters and report each segment's cluster width.
fn cluster_widths(segments: &[Segment<'_>], columns: &[usize]) -> Vec<usize> {
    let mut widths = vec![0; segments.len()];
    let mut cluster_first = 0;
    let mut cluster_end: Option<DateTime<Utc>> = None;
    let mut cluster_max_column = 0;

    for (index, segment) in segments.iter().enumerate() {
        let joins_cluster = cluster_end.is_some_and(|end| segment.start < end);
        if !joins_cluster {
            close_cluster(&mut widths[cluster_first..index], cluster_max_column);
            cluster_first = index;
            cluster_max_column = 0;
            cluster_end = None;
        }

        cluster_max_column = cluster_max_column.max(columns[index]);
        cluster_end = Some(cluster_end.map_or(segment.packing_end, |end| end.max(segment.packing_end)));
    }
    close_cluster(&mut widths[cluster_first..], cluster_max_column);

    widths
}

fn close_cluster(widths: &mut [usize], max_column: usize) {
    for width in widths {
        *width = max_column + 1;
    }
}
