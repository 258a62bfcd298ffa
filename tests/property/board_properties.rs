// Property-based tests for the grid, the index and the move rules
// Exercise the pure parts of the board with random inputs

use chrono::{Duration, NaiveDate, NaiveTime};
use proptest::prelude::*;

use clinic_schedule_board::models::board::{CapacityPolicy, Granularity};
use clinic_schedule_board::models::booking::{Booking, BookingId, ScheduledAt};
use clinic_schedule_board::models::cell::Cell;
use clinic_schedule_board::models::movement::MoveRequest;
use clinic_schedule_board::services::grid::{build_grid, TimeGrid, WeekWindow};
use clinic_schedule_board::services::index::BookingIndex;
use clinic_schedule_board::services::store::BoardStore;
use clinic_schedule_board::services::validation::{MoveValidator, Rejection};

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
}

fn granularity() -> impl Strategy<Value = Granularity> {
    prop_oneof![
        Just(Granularity::Day),
        (6u32..10, 2u32..8, prop_oneof![Just(15u32), Just(30), Just(60)]).prop_map(
            |(start, span, step)| Granularity::Slots {
                step_minutes: step,
                start_hour: start,
                end_hour: start + span,
            }
        ),
    ]
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (0i64..730).prop_map(|offset| base() + Duration::days(offset))
}

fn time() -> impl Strategy<Value = NaiveTime> {
    (8u32..18, 0u32..60).prop_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

/// Bookings spread over one week, some sharing cells.
fn week_bookings() -> impl Strategy<Value = Vec<Booking>> {
    prop::collection::vec((0i64..7, 9u32..12, prop_oneof![Just(0u32), Just(30)]), 1..24).prop_map(
        |slots| {
            slots
                .into_iter()
                .enumerate()
                .map(|(i, (day, hour, minute))| {
                    Booking::new(
                        i as u64,
                        format!("Patient {}", i),
                        ScheduledAt::at(
                            today() + Duration::days(day),
                            NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
                        ),
                    )
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn grid_is_deterministic(reference in date(), granularity in granularity(), first_day in 0u8..7) {
        let first = build_grid(reference, granularity, first_day);
        let second = build_grid(reference, granularity, first_day);

        prop_assert_eq!(&first, &second);

        let grid = TimeGrid::new(reference, granularity, first_day);
        prop_assert_eq!(first.len(), 7 * grid.rows().len());
        prop_assert!(grid.window.contains(reference));
        prop_assert!(first.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert!(first.iter().all(|cell| granularity.accepts(cell)));
    }

    #[test]
    fn yesterday_is_always_locked(
        booking_day in date(),
        slot in time(),
        granularity in granularity(),
        limit in prop::option::of(1usize..5),
        occupancy in 0usize..5,
    ) {
        let capacity = limit.map(CapacityPolicy::PerCell).unwrap_or_default();
        let validator = MoveValidator::new(granularity, capacity);
        let booking = Booking::new(1u64, "Ada", ScheduledAt::at(booking_day, slot));
        let from = granularity.cell_for(&booking.scheduled_at);
        let yesterday = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let to = Cell { day: yesterday, slot: from.slot };
        prop_assume!(to != from);

        prop_assert_eq!(
            validator.validate(&booking, &from, &to, today(), occupancy),
            Err(Rejection::PastDate { day: yesterday })
        );
    }

    #[test]
    fn index_keeps_input_order_per_cell(bookings in week_bookings()) {
        let granularity = Granularity::half_hour(9, 12);
        let index = BookingIndex::build(bookings.clone(), granularity);

        prop_assert_eq!(index.len(), bookings.len());
        for (key, ids) in index.layout() {
            let expected: Vec<BookingId> = bookings
                .iter()
                .filter(|booking| granularity.cell_for(&booking.scheduled_at).key() == key)
                .map(|booking| booking.id.clone())
                .collect();
            prop_assert_eq!(ids, expected);
        }
        prop_assert_eq!(BookingIndex::build(bookings, granularity), index);
    }

    #[test]
    fn revert_restores_the_window_exactly(
        bookings in week_bookings(),
        pick in any::<prop::sample::Index>(),
        day in 0i64..7,
        row in 0usize..6,
    ) {
        let granularity = Granularity::half_hour(9, 12);
        let store = BoardStore::new(granularity, 2);
        let window = WeekWindow::containing(today(), 2);
        store.replace_window(window, bookings.clone());
        let before = store.snapshot(window).unwrap();

        let moved = &bookings[pick.index(bookings.len())];
        let from = store.find_cell(&moved.id).unwrap();
        let to = Cell::slot(window.start + Duration::days(day), granularity.slot_times()[row]);
        prop_assume!(to != from);

        let applied = store
            .apply_move(&MoveRequest::new(moved.id.clone(), from, to))
            .unwrap();
        prop_assert_eq!(store.find_cell(&moved.id), Some(to));

        store.revert(&applied);
        prop_assert_eq!(store.snapshot(window).unwrap(), before);
    }

    #[test]
    fn interleaved_reverts_restore_the_window_exactly(
        bookings in week_bookings(),
        picks in (any::<prop::sample::Index>(), any::<prop::sample::Index>()),
        targets in ((0i64..7, 0usize..6), (0i64..7, 0usize..6)),
        oldest_first in any::<bool>(),
    ) {
        let granularity = Granularity::half_hour(9, 12);
        let store = BoardStore::new(granularity, 2);
        let window = WeekWindow::containing(today(), 2);
        store.replace_window(window, bookings.clone());
        let before = store.snapshot(window).unwrap();

        let first = &bookings[picks.0.index(bookings.len())];
        let second = &bookings[picks.1.index(bookings.len())];
        prop_assume!(first.id != second.id);
        let slots = granularity.slot_times();
        let cell = |(day, row): (i64, usize)| Cell::slot(window.start + Duration::days(day), slots[row]);

        let first_from = store.find_cell(&first.id).unwrap();
        let first_to = cell(targets.0);
        prop_assume!(first_to != first_from);
        let first_applied = store
            .apply_move(&MoveRequest::new(first.id.clone(), first_from, first_to))
            .unwrap();

        let second_from = store.find_cell(&second.id).unwrap();
        let second_to = cell(targets.1);
        prop_assume!(second_to != second_from);
        let second_applied = store
            .apply_move(&MoveRequest::new(second.id.clone(), second_from, second_to))
            .unwrap();

        if oldest_first {
            store.revert(&first_applied);
            store.revert(&second_applied);
        } else {
            store.revert(&second_applied);
            store.revert(&first_applied);
        }
        prop_assert_eq!(store.snapshot(window).unwrap(), before);
    }
}
