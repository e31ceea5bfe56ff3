// Test fixtures - reusable test data
// Provides consistent events and frames across the integration tests

#![allow(dead_code)]

use calendar_engine::models::event::CalendarEvent;
use calendar_engine::utils::date::CalendarFrame;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc, Weekday};

/// Sample instants for testing
pub mod dates {
    use super::*;

    /// Instant in 2025 at the given UTC wall-clock time
    pub fn at(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, hour, minute, 0).unwrap()
    }

    pub fn ymd(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    /// Wednesday 11 June 2025, mid-morning
    pub fn mid_june() -> DateTime<Utc> {
        at(6, 11, 10, 0)
    }
}

/// Sample events for testing
pub mod events {
    use super::*;

    pub fn timed(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent::new(id, id, start, end).unwrap()
    }

    /// All-day event covering `first..=last`
    pub fn all_day(id: &str, first: NaiveDate, last: NaiveDate) -> CalendarEvent {
        let start = Utc.from_utc_datetime(&first.and_hms_opt(0, 0, 0).unwrap());
        let end = Utc.from_utc_datetime(&last.and_hms_opt(0, 0, 0).unwrap()) + Duration::days(1);
        CalendarEvent::builder()
            .id(id)
            .title(id)
            .start(start)
            .end(end)
            .all_day(true)
            .build()
            .unwrap()
    }

    /// Three overlapping meetings from the day-layout walkthrough
    pub fn morning_overlap() -> Vec<CalendarEvent> {
        vec![
            timed("a", dates::at(6, 11, 9, 0), dates::at(6, 11, 10, 0)),
            timed("b", dates::at(6, 11, 9, 30), dates::at(6, 11, 10, 30)),
            timed("c", dates::at(6, 11, 9, 45), dates::at(6, 11, 11, 0)),
        ]
    }

    /// A chain where the first and last never overlap
    pub fn chained_meetings() -> Vec<CalendarEvent> {
        vec![
            timed("first", dates::at(6, 11, 9, 0), dates::at(6, 11, 10, 0)),
            timed("middle", dates::at(6, 11, 9, 30), dates::at(6, 11, 11, 0)),
            timed("third", dates::at(6, 11, 10, 30), dates::at(6, 11, 11, 30)),
        ]
    }
}

pub mod frames {
    use super::*;

    pub fn sunday_utc() -> CalendarFrame {
        CalendarFrame::utc(Weekday::Sun)
    }

    pub fn monday_utc() -> CalendarFrame {
        CalendarFrame::utc(Weekday::Mon)
    }
}
