// Unit tests for ViewKind and view navigation
// Table-driven checks of parsing and step sizes

use calendar_engine::models::view::{Navigation, ViewKind, ViewState};
use calendar_engine::utils::date::CalendarFrame;
use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};
use test_case::test_case;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

#[test_case("day", ViewKind::Day)]
#[test_case("Week", ViewKind::Week)]
#[test_case(" MONTH ", ViewKind::Month)]
#[test_case("year", ViewKind::Year)]
fn test_view_kind_parses(input: &str, expected: ViewKind) {
    assert_eq!(input.parse::<ViewKind>(), Ok(expected));
}

#[test_case(""; "empty")]
#[test_case("fortnight"; "unknown")]
fn test_view_kind_rejects(input: &str) {
    assert!(input.parse::<ViewKind>().is_err());
}

#[test]
fn test_view_kind_display_round_trips() {
    for kind in ViewKind::ALL {
        assert_eq!(kind.to_string().parse::<ViewKind>(), Ok(kind));
    }
}

#[test]
fn test_view_kind_serde_is_lowercase() {
    assert_eq!(serde_json::to_string(&ViewKind::Month).unwrap(), "\"month\"");
    assert_eq!(serde_json::from_str::<ViewKind>("\"week\"").unwrap(), ViewKind::Week);
}

#[test_case(ViewKind::Day, at(2025, 6, 12); "day steps one day")]
#[test_case(ViewKind::Week, at(2025, 6, 18); "week steps seven days")]
#[test_case(ViewKind::Month, at(2025, 7, 11); "month keeps day of month")]
#[test_case(ViewKind::Year, at(2026, 6, 11); "year keeps date")]
fn test_next_step(kind: ViewKind, expected: DateTime<Utc>) {
    let frame = CalendarFrame::utc(Weekday::Sun);
    let state = ViewState::new(at(2025, 6, 11), kind);
    assert_eq!(state.navigate(Navigation::Next, &frame, at(2025, 1, 1)).anchor, expected);
}

#[test_case(at(2025, 3, 31), ViewKind::Month, at(2025, 2, 28); "month back clamps to shorter month")]
#[test_case(at(2024, 2, 29), ViewKind::Year, at(2023, 2, 28); "year back from leap day")]
fn test_previous_clamps(anchor: DateTime<Utc>, kind: ViewKind, expected: DateTime<Utc>) {
    let frame = CalendarFrame::utc(Weekday::Sun);
    let state = ViewState::new(anchor, kind);
    assert_eq!(state.navigate(Navigation::Previous, &frame, at(2025, 1, 1)).anchor, expected);
}

#[test]
fn test_today_and_jump_keep_kind() {
    let frame = CalendarFrame::utc(Weekday::Mon);
    let state = ViewState::new(at(2025, 6, 11), ViewKind::Week);

    let today = state.navigate(Navigation::Today, &frame, Utc.with_ymd_and_hms(2025, 9, 3, 17, 45, 0).unwrap());
    assert_eq!(today, ViewState::new(at(2025, 9, 3), ViewKind::Week));

    let jumped = state.navigate(Navigation::JumpTo(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()), &frame, at(2025, 1, 1));
    assert_eq!(jumped, ViewState::new(at(2024, 12, 25), ViewKind::Week));
}
