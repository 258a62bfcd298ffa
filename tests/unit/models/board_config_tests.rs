// Unit tests for board configuration
// Settings map onto the tagged board config; raw times land in the right cell

use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;
use test_case::test_case;

use clinic_schedule_board::models::board::{BoardKind, CapacityPolicy, Granularity};
use clinic_schedule_board::models::booking::ScheduledAt;
use clinic_schedule_board::models::cell::Cell;
use clinic_schedule_board::models::settings::Settings;

fn d() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test_case(BoardKind::Appointments, "appointments" ; "appointments resource")]
#[test_case(BoardKind::Tests, "test-orders" ; "tests resource")]
fn test_board_resource(kind: BoardKind, expected: &str) {
    assert_eq!(kind.resource(), expected);
}

#[test_case(t(9, 0), t(9, 0) ; "on the slot")]
#[test_case(t(9, 47), t(9, 30) ; "floored to half hour")]
#[test_case(t(16, 59), t(16, 30) ; "last slot")]
fn test_times_floor_onto_slots(raw: NaiveTime, slot: NaiveTime) {
    let granularity = Granularity::half_hour(9, 17);

    assert_eq!(granularity.cell_for(&ScheduledAt::at(d(), raw)), Cell::slot(d(), slot));
}

#[test]
fn test_day_board_ignores_time() {
    assert_eq!(
        Granularity::Day.cell_for(&ScheduledAt::at(d(), t(14, 15))),
        Cell::day(d())
    );
}

#[test]
fn test_tests_board_from_settings() {
    let settings = Settings {
        board: BoardKind::Tests,
        first_day_of_week: 1,
        ..Settings::default()
    };

    let config = settings.board_config();

    assert_eq!(config.kind, BoardKind::Tests);
    assert_eq!(config.granularity, Granularity::Day);
    assert_eq!(config.capacity, CapacityPolicy::Unbounded);
    assert_eq!(config.first_day_of_week, 1);
}

#[test]
fn test_appointments_board_from_settings() {
    let settings = Settings {
        slot_minutes: 15,
        day_start_hour: 8,
        day_end_hour: 12,
        max_per_slot: Some(2),
        ..Settings::default()
    };

    let config = settings.board_config();

    assert_eq!(
        config.granularity,
        Granularity::Slots {
            step_minutes: 15,
            start_hour: 8,
            end_hour: 12
        }
    );
    assert_eq!(config.capacity.limit(), Some(2));
    assert_eq!(config.granularity.slot_times().len(), 16);
}
