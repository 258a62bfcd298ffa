// Board module
// Tagged configuration shared by appointment boards and test-order boards

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::booking::ScheduledAt;
use crate::models::cell::Cell;

/// How a day is subdivided on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Fixed-step slots from `start_hour` (inclusive) to `end_hour` (exclusive).
    Slots {
        step_minutes: u32,
        start_hour: u32,
        end_hour: u32,
    },
    /// One cell per day.
    Day,
}

impl Granularity {
    pub fn half_hour(start_hour: u32, end_hour: u32) -> Self {
        Granularity::Slots {
            step_minutes: 30,
            start_hour,
            end_hour,
        }
    }

    pub fn is_slotted(&self) -> bool {
        matches!(self, Granularity::Slots { .. })
    }

    /// Slot start times of one day, in order. Empty for day granularity.
    pub fn slot_times(&self) -> Vec<NaiveTime> {
        let Granularity::Slots {
            step_minutes,
            start_hour,
            end_hour,
        } = *self
        else {
            return Vec::new();
        };

        if step_minutes == 0 {
            return Vec::new();
        }

        let step = i64::from(step_minutes);
        let first = i64::from(start_hour) * 60;
        let last = i64::from(end_hour.min(24)) * 60;

        (0..)
            .map(|n| first + n * step)
            .take_while(|minute| *minute < last)
            .filter_map(|minute| {
                NaiveTime::from_hms_opt(0, 0, 0)
                    .map(|midnight| midnight + Duration::minutes(minute))
            })
            .collect()
    }

    /// Cell a raw schedule falls into.
    ///
    /// Times are floored onto the slot step so `09:47` lands in `09:30` on a
    /// half-hour board. A slotted booking with no time goes to the first slot
    /// of its day.
    pub fn cell_for(&self, scheduled_at: &ScheduledAt) -> Cell {
        match *self {
            Granularity::Day => Cell::day(scheduled_at.date),
            Granularity::Slots {
                step_minutes,
                start_hour,
                ..
            } => {
                let minute_of_day = scheduled_at
                    .time
                    .map(|time| time.hour() * 60 + time.minute())
                    .unwrap_or(start_hour * 60);
                let step = step_minutes.max(1);
                let floored = minute_of_day - minute_of_day % step;
                let slot = NaiveTime::from_hms_opt(floored / 60, floored % 60, 0)
                    .unwrap_or(NaiveTime::MIN);
                Cell::slot(scheduled_at.date, slot)
            }
        }
    }

    /// Whether `cell` has the shape this granularity produces.
    pub fn accepts(&self, cell: &Cell) -> bool {
        match cell.slot {
            None => !self.is_slotted(),
            Some(slot) => self.slot_times().contains(&slot),
        }
    }
}

/// Optional bookings-per-cell limit checked before a move leaves the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapacityPolicy {
    #[default]
    Unbounded,
    PerCell(usize),
}

impl CapacityPolicy {
    pub fn limit(&self) -> Option<usize> {
        match self {
            CapacityPolicy::Unbounded => None,
            CapacityPolicy::PerCell(limit) => Some(*limit),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoardKind {
    #[default]
    Appointments,
    Tests,
}

impl BoardKind {
    /// Backend collection name for this kind of booking.
    pub fn resource(&self) -> &'static str {
        match self {
            BoardKind::Appointments => "appointments",
            BoardKind::Tests => "test-orders",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BoardKind::Appointments => "Appointments",
            BoardKind::Tests => "Tests",
        }
    }
}

/// Everything that differs between the two board flavours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub kind: BoardKind,
    pub granularity: Granularity,
    pub capacity: CapacityPolicy,
    /// 0 = Sunday, 1 = Monday, ...
    pub first_day_of_week: u8,
}

impl BoardConfig {
    pub fn appointments() -> Self {
        Self {
            kind: BoardKind::Appointments,
            granularity: Granularity::half_hour(9, 17),
            capacity: CapacityPolicy::Unbounded,
            first_day_of_week: 0,
        }
    }

    pub fn tests() -> Self {
        Self {
            kind: BoardKind::Tests,
            granularity: Granularity::Day,
            capacity: CapacityPolicy::Unbounded,
            first_day_of_week: 0,
        }
    }

    pub fn with_capacity(mut self, capacity: CapacityPolicy) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_first_day_of_week(mut self, first_day_of_week: u8) -> Self {
        self.first_day_of_week = first_day_of_week;
        self
    }
}
