//! Per-view composition: runs the window, classifier and solvers for one
//! render and packages the result for the drawing layer.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::models::event::CalendarEvent;
use crate::models::layout::{BarSegment, LayoutEntry, LayoutError, SpanningBar};
use crate::models::settings::GridMetrics;
use crate::models::view::{ViewKind, ViewState};
use crate::services::classify::{classify_for_day, classify_for_week, spanning_bars, touches_dates, week_bars};
use crate::services::layout::{ensure_ordered_intervals, layout_day};
use crate::services::month::{month_cells, resolve_month_bars, MonthCell};
use crate::services::window::{compute_window, month_grid_days, TimeWindow};
use crate::utils::date::{last_day_of_month, CalendarFrame};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayColumn<'a> {
    pub date: NaiveDate,
    pub entries: Vec<LayoutEntry<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayLayout<'a> {
    pub window: TimeWindow,
    pub all_day: Vec<SpanningBar<'a>>,
    pub column: DayColumn<'a>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekLayout<'a> {
    pub window: TimeWindow,
    pub all_day: Vec<SpanningBar<'a>>,
    pub columns: Vec<DayColumn<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthLayout<'a> {
    pub window: TimeWindow,
    pub year: i32,
    pub month: u32,
    pub bars: Vec<BarSegment<'a>>,
    pub cells: Vec<MonthCell<'a>>,
}

impl MonthLayout<'_> {
    /// Leading and trailing cells belong to the neighbouring months.
    pub fn in_current_month(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn row_count(&self) -> usize {
        self.cells.len() / 7
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub month: u32,
    pub days: Vec<DayCount>,
}

impl MonthSummary {
    pub fn total(&self) -> usize {
        self.days.iter().map(|d| d.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearLayout {
    pub window: TimeWindow,
    pub year: i32,
    pub months: Vec<MonthSummary>,
}

/// Everything one view needs to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum ViewLayout<'a> {
    Day(DayLayout<'a>),
    Week(WeekLayout<'a>),
    Month(MonthLayout<'a>),
    Year(YearLayout),
}

impl ViewLayout<'_> {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewLayout::Day(_) => ViewKind::Day,
            ViewLayout::Week(_) => ViewKind::Week,
            ViewLayout::Month(_) => ViewKind::Month,
            ViewLayout::Year(_) => ViewKind::Year,
        }
    }

    pub fn window(&self) -> TimeWindow {
        match self {
            ViewLayout::Day(layout) => layout.window,
            ViewLayout::Week(layout) => layout.window,
            ViewLayout::Month(layout) => layout.window,
            ViewLayout::Year(layout) => layout.window,
        }
    }
}

/// Compose the layout for `state` from the events fetched for its window.
///
/// Any inverted event aborts the whole composition.
pub fn compose_view<'a>(
    events: &'a [CalendarEvent],
    state: &ViewState,
    frame: &CalendarFrame,
    metrics: &GridMetrics,
) -> Result<ViewLayout<'a>, LayoutError> {
    let all: Vec<&CalendarEvent> = events.iter().collect();
    ensure_ordered_intervals(&all)?;

    let date = frame.local_date(state.anchor);
    let layout = match state.kind {
        ViewKind::Day => ViewLayout::Day(layout_single_day(events, date, frame, metrics)?),
        ViewKind::Week => ViewLayout::Week(layout_week(events, frame.week_start(date), frame, metrics)?),
        ViewKind::Month => ViewLayout::Month(layout_month(events, state.anchor, frame)?),
        ViewKind::Year => ViewLayout::Year(summarize_year(events, date.year(), frame)),
    };
    Ok(layout)
}

pub fn layout_single_day<'a>(
    events: &'a [CalendarEvent],
    date: NaiveDate,
    frame: &CalendarFrame,
    metrics: &GridMetrics,
) -> Result<DayLayout<'a>, LayoutError> {
    let classification = classify_for_day(events, date, frame);
    let entries = layout_day(&classification.timed, date, frame, metrics)?;

    Ok(DayLayout {
        window: TimeWindow::for_dates(date, date, frame),
        all_day: spanning_bars(&classification.spanning, date, 1, frame),
        column: DayColumn { date, entries },
    })
}

/// Seven day columns plus the all-day bar row.
pub fn layout_week<'a>(
    events: &'a [CalendarEvent],
    week_start: NaiveDate,
    frame: &CalendarFrame,
    metrics: &GridMetrics,
) -> Result<WeekLayout<'a>, LayoutError> {
    let classification = classify_for_week(events, week_start, frame);
    let mut columns = Vec::with_capacity(7);

    for offset in 0..7 {
        let date = week_start + Duration::days(offset);
        let timed: Vec<&CalendarEvent> = classification
            .timed
            .iter()
            .copied()
            .filter(|event| touches_dates(event, date, date, frame))
            .collect();
        columns.push(DayColumn {
            date,
            entries: layout_day(&timed, date, frame, metrics)?,
        });
    }

    Ok(WeekLayout {
        window: TimeWindow::for_dates(week_start, week_start + Duration::days(6), frame),
        all_day: week_bars(&classification.spanning, week_start, frame),
        columns,
    })
}

pub fn layout_month<'a>(
    events: &'a [CalendarEvent],
    anchor: DateTime<Utc>,
    frame: &CalendarFrame,
) -> Result<MonthLayout<'a>, LayoutError> {
    let date = frame.local_date(anchor);
    let grid = month_grid_days(anchor, frame);
    let cells = month_cells(events, &grid, frame);

    let mut spanning: Vec<&CalendarEvent> = Vec::new();
    for cell in &cells {
        for event in cell.spanning.iter().copied() {
            if !spanning.iter().any(|seen| seen.id == event.id) {
                spanning.push(event);
            }
        }
    }

    Ok(MonthLayout {
        window: compute_window(anchor, ViewKind::Month, frame),
        year: date.year(),
        month: date.month(),
        bars: resolve_month_bars(&spanning, &grid, frame)?,
        cells,
    })
}

/// Per-day event counts for each month of `year`.
pub fn summarize_year(events: &[CalendarEvent], year: i32, frame: &CalendarFrame) -> YearLayout {
    let months = (1..=12)
        .map(|month| {
            let days = (1..=last_day_of_month(year, month))
                .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
                .map(|date| DayCount {
                    date,
                    count: events
                        .iter()
                        .filter(|event| touches_dates(event, date, date, frame))
                        .count(),
                })
                .collect();
            MonthSummary { month, days }
        })
        .collect();

    let first = NaiveDate::from_ymd_opt(year, 1, 1);
    let last = NaiveDate::from_ymd_opt(year, 12, 31);
    let window = match (first, last) {
        (Some(first), Some(last)) => TimeWindow::for_dates(first, last, frame),
        _ => TimeWindow::new(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MIN_UTC),
    };

    YearLayout { window, year, months }
}
