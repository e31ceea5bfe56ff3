// Property-based tests for the layout engine
// Random event sets must always satisfy the geometry invariants

use calendar_engine::models::event::CalendarEvent;
use calendar_engine::models::layout::LayoutEntry;
use calendar_engine::models::settings::GridMetrics;
use calendar_engine::models::view::ViewKind;
use calendar_engine::services::classify::{classify_for_day, classify_for_week, touches_dates};
use calendar_engine::services::layout::layout_day;
use calendar_engine::services::month::resolve_month_bars;
use calendar_engine::services::window::{compute_window, month_grid_days};
use calendar_engine::utils::date::CalendarFrame;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc, Weekday};
use proptest::prelude::*;

fn day_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap()
}

fn frame() -> CalendarFrame {
    CalendarFrame::utc(Weekday::Sun)
}

fn metrics() -> GridMetrics {
    GridMetrics {
        row_height_units: 60.0,
        min_height_units: 15.0,
        ..GridMetrics::default()
    }
}

/// (start minute, duration minutes) pairs inside one day
fn day_events() -> impl Strategy<Value = Vec<CalendarEvent>> {
    prop::collection::vec((0i64..1380, 0i64..240), 0..24).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (start, len))| {
                let start = day_start() + Duration::minutes(start);
                let end = (start + Duration::minutes(len)).min(day_start() + Duration::days(1));
                CalendarEvent::new(format!("e{:02}", i), "event", start, end).unwrap()
            })
            .collect()
    })
}

/// Timed and all-day events scattered across several weeks
fn mixed_events() -> impl Strategy<Value = Vec<CalendarEvent>> {
    prop::collection::vec((-20i64..50, 0i64..24 * 60, 0i64..4 * 24 * 60, any::<bool>()), 0..30).prop_map(
        |specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (day, minute, len, all_day))| {
                    let start = day_start() + Duration::days(day) + Duration::minutes(minute);
                    CalendarEvent::builder()
                        .id(format!("m{:02}", i))
                        .title("event")
                        .start(start)
                        .end(start + Duration::minutes(len))
                        .all_day(all_day)
                        .build()
                        .unwrap()
                })
                .collect()
        },
    )
}

/// True time span of a block, in minutes into the day
fn time_span(entry: &LayoutEntry<'_>) -> (f64, f64) {
    (entry.start_minute, entry.start_minute + entry.duration_minutes)
}

/// Drawn span of a block, in layout units
fn drawn_span(entry: &LayoutEntry<'_>) -> (f64, f64) {
    (entry.top_units, entry.top_units + entry.height_units)
}

/// Interval overlap, ignoring float noise where spans merely touch
fn overlaps(a: (f64, f64), b: (f64, f64)) -> bool {
    const EPSILON: f64 = 1e-6;
    a.0 + EPSILON < b.1 && b.0 + EPSILON < a.1
}

proptest! {
    /// Property: no two events in the same column overlap in time
    #[test]
    fn prop_columns_never_overlap(events in day_events()) {
        let refs: Vec<&CalendarEvent> = events.iter().collect();
        let day = day_start().date_naive();
        let entries = layout_day(&refs, day, &frame(), &metrics()).unwrap();

        prop_assert_eq!(entries.len(), events.len());
        for (i, a) in entries.iter().enumerate() {
            for b in entries.iter().skip(i + 1) {
                if a.column == b.column {
                    prop_assert!(!overlaps(time_span(a), time_span(b)), "{} and {} collide", a.event.id, b.event.id);
                }
            }
        }
    }

    /// Property: with visual packing, drawn blocks in one column never overlap
    #[test]
    fn prop_visual_packing_keeps_blocks_apart(events in day_events()) {
        let refs: Vec<&CalendarEvent> = events.iter().collect();
        let visual = GridMetrics { pack_by_visual_extent: true, ..metrics() };
        let entries = layout_day(&refs, day_start().date_naive(), &frame(), &visual).unwrap();

        for (i, a) in entries.iter().enumerate() {
            for b in entries.iter().skip(i + 1) {
                if a.column == b.column {
                    prop_assert!(!overlaps(drawn_span(a), drawn_span(b)), "{} and {} collide", a.event.id, b.event.id);
                }
            }
        }
    }

    /// Property: overlapping blocks report the same width and fit inside it
    #[test]
    fn prop_overlapping_blocks_share_width(events in day_events()) {
        let refs: Vec<&CalendarEvent> = events.iter().collect();
        let entries = layout_day(&refs, day_start().date_naive(), &frame(), &metrics()).unwrap();

        for a in &entries {
            prop_assert!(a.column < a.total_columns);
            for b in &entries {
                if overlaps(time_span(a), time_span(b)) {
                    prop_assert_eq!(a.total_columns, b.total_columns);
                }
            }
        }
    }

    /// Property: input order never changes the layout
    #[test]
    fn prop_layout_is_deterministic(events in day_events()) {
        let refs: Vec<&CalendarEvent> = events.iter().collect();
        let mut reversed = refs.clone();
        reversed.reverse();
        let day = day_start().date_naive();

        let forward = layout_day(&refs, day, &frame(), &metrics()).unwrap();
        let backward = layout_day(&reversed, day, &frame(), &metrics()).unwrap();

        let key = |e: &LayoutEntry<'_>| (e.event.id.clone(), e.column, e.total_columns);
        prop_assert_eq!(
            forward.iter().map(key).collect::<Vec<_>>(),
            backward.iter().map(key).collect::<Vec<_>>()
        );
    }

    /// Property: the window contains every instant of the anchor's view period
    #[test]
    fn prop_window_contains_anchor(offset_minutes in 0i64..(3 * 365 * 24 * 60), week_start in 0u8..7) {
        let frame = CalendarFrame::utc(calendar_engine::utils::date::weekday_from_index(week_start));
        let anchor = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(offset_minutes);

        for kind in ViewKind::ALL {
            let window = compute_window(anchor, kind, &frame);
            prop_assert!(window.contains(anchor));
            prop_assert!(window.start < window.end);
        }

        let month = compute_window(anchor, ViewKind::Month, &frame);
        prop_assert_eq!(month.day_count() % 7, 0);
        prop_assert!((28..=42).contains(&month.day_count()));
    }

    /// Property: each touching event lands in exactly one group, once, and nothing else does
    #[test]
    fn prop_classification_partitions(events in mixed_events(), day_offset in 0i64..14) {
        let frame = frame();
        let date = day_start().date_naive() + Duration::days(day_offset);
        let week = frame.week_start(date);

        let cases = [
            (classify_for_day(&events, date, &frame), date, date),
            (classify_for_week(&events, week, &frame), week, week + Duration::days(6)),
        ];
        for (classification, first, last) in cases {
            let ordered = classification.ordered();
            let mut ids: Vec<&str> = ordered.iter().map(|e| e.id.as_str()).collect();
            let total = ids.len();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), total);
            prop_assert!(classification.timed.iter().all(|e| !e.all_day));

            let mut expected: Vec<&str> = events
                .iter()
                .filter(|e| touches_dates(e, first, last, &frame))
                .map(|e| e.id.as_str())
                .collect();
            expected.sort_unstable();
            prop_assert_eq!(ids, expected);
        }
    }

    /// Property: bar cells cover each event's visible days once, with one start cell at most
    #[test]
    fn prop_month_bars_cover_events(events in mixed_events()) {
        let frame = frame();
        let grid = month_grid_days(day_start(), &frame);
        let refs: Vec<&CalendarEvent> = events.iter().collect();
        let segments = resolve_month_bars(&refs, &grid, &frame).unwrap();

        for event in &events {
            let (first, last) = frame.occupied_dates(event);
            let cells: Vec<NaiveDate> = segments
                .iter()
                .filter(|s| s.event.id == event.id)
                .flat_map(|s| s.cells.iter().map(|c| c.date))
                .collect();
            let visible = grid.iter().filter(|d| **d >= first && **d <= last).count();
            prop_assert_eq!(cells.len(), visible);

            let starts = segments
                .iter()
                .filter(|s| s.event.id == event.id)
                .flat_map(|s| s.cells.iter())
                .filter(|c| !c.is_continuation)
                .count();
            prop_assert_eq!(starts, usize::from(grid.contains(&first)));
        }

        for (i, a) in segments.iter().enumerate() {
            prop_assert!(a.span <= 7);
            for b in segments.iter().skip(i + 1) {
                if a.row == b.row && a.lane == b.lane {
                    prop_assert!(a.end_cell() < b.start_cell || b.end_cell() < a.start_cell);
                }
            }
        }
    }
}
