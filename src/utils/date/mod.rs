// Date utility functions
// Calendar-day arithmetic shared by the window, classifier and layout passes

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc, Weekday};

use crate::models::event::CalendarEvent;

/// How instants map onto calendar days for one rendered calendar.
///
/// Days are computed in a fixed display offset rather than a timezone
/// database; every instant reaching the engine is already absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFrame {
    offset: FixedOffset,
    week_start: Weekday,
}

impl CalendarFrame {
    pub fn new(offset: FixedOffset, week_start: Weekday) -> Self {
        Self { offset, week_start }
    }

    /// UTC days with the given first weekday.
    pub fn utc(week_start: Weekday) -> Self {
        Self::new(Utc.fix(), week_start)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn week_start_day(&self) -> Weekday {
        self.week_start
    }

    /// Calendar date containing `instant`.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// First instant of `date`.
    pub fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(NaiveTime::MIN);
        // A fixed offset has exactly one mapping for every local time.
        (local - self.offset_duration()).and_utc()
    }

    /// Exclusive end of `date` (the start of the following day).
    pub fn day_end(&self, date: NaiveDate) -> DateTime<Utc> {
        self.day_start(date) + Duration::days(1)
    }

    /// First day of the week containing `date`.
    pub fn week_start(&self, date: NaiveDate) -> NaiveDate {
        get_week_start(date, self.week_start.num_days_from_sunday() as u8)
    }

    /// Minutes elapsed between the start of `date` and `instant`.
    pub fn minutes_into_day(&self, date: NaiveDate, instant: DateTime<Utc>) -> f64 {
        (instant - self.day_start(date)).num_seconds() as f64 / 60.0
    }

    /// First and last calendar day the event occupies.
    ///
    /// An event ending exactly at midnight does not occupy the day that
    /// midnight opens; a zero-duration event occupies the day of its start.
    pub fn occupied_dates(&self, event: &CalendarEvent) -> (NaiveDate, NaiveDate) {
        let first = self.local_date(event.start);
        if event.end <= event.start {
            return (first, first);
        }

        let end_date = self.local_date(event.end);
        let last = if self.day_start(end_date) == event.end {
            end_date.pred_opt().unwrap_or(end_date)
        } else {
            end_date
        };

        (first, last.max(first))
    }

    /// Number of calendar-day boundaries the event crosses.
    pub fn day_difference(&self, event: &CalendarEvent) -> i64 {
        let (first, last) = self.occupied_dates(event);
        (last - first).num_days()
    }

    fn offset_duration(&self) -> Duration {
        Duration::seconds(i64::from(self.offset.local_minus_utc()))
    }
}

impl Default for CalendarFrame {
    fn default() -> Self {
        Self::utc(Weekday::Sun)
    }
}

/// Calculate the start of the week containing the given date.
///
/// # Arguments
/// * `date` - The date to find the week start for
/// * `first_day_of_week` - 0 = Sunday, 1 = Monday, etc.
pub fn get_week_start(date: NaiveDate, first_day_of_week: u8) -> NaiveDate {
    let weekday = date.weekday().num_days_from_sunday() as i64;
    let offset = (weekday - first_day_of_week as i64 + 7) % 7;
    date - Duration::days(offset)
}

/// Map a 0-based Sunday-first index onto a weekday.
pub fn weekday_from_index(first_day_of_week: u8) -> Weekday {
    match first_day_of_week % 7 {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Shift by whole months, keeping the day-of-month where the target month allows.
pub fn shift_month_preserving_day(current: NaiveDate, delta_months: i32) -> NaiveDate {
    let total_months = (current.year() * 12) + (current.month() as i32 - 1) + delta_months;
    let new_year = total_months.div_euclid(12);
    let new_month = total_months.rem_euclid(12) as u32 + 1;
    clamp_day(new_year, new_month, current.day()).unwrap_or(current)
}

fn clamp_day(year: i32, month: u32, desired_day: u32) -> Option<NaiveDate> {
    let max_day = last_day_of_month(year, month);
    NaiveDate::from_ymd_opt(year, month, desired_day.min(max_day))
}
