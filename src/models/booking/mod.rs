// Booking module
// Schedulable entity (appointment or test order) as delivered by the backend

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::cell::Cell;

/// Opaque booking identifier, unique within a branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BookingId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for BookingId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle status. Read-only to the board; only the backend changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Consulted,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Consulted => "consulted",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Unknown => "unknown",
        }
    }
}

/// When a booking takes place. Day-granular boards leave `time` empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAt {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
}

impl ScheduledAt {
    pub fn on(date: NaiveDate) -> Self {
        Self { date, time: None }
    }

    pub fn at(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date,
            time: Some(time),
        }
    }

    pub fn naive(&self) -> Option<NaiveDateTime> {
        self.time.map(|time| self.date.and_time(time))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub subject_name: String,
    pub scheduled_at: ScheduledAt,
    pub status: BookingStatus,
}

impl Booking {
    pub fn new(
        id: impl Into<BookingId>,
        subject_name: impl Into<String>,
        scheduled_at: ScheduledAt,
    ) -> Self {
        Self {
            id: id.into(),
            subject_name: subject_name.into(),
            scheduled_at,
            status: BookingStatus::Pending,
        }
    }

    pub fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = status;
        self
    }

    /// Copy of this booking relocated onto `cell`.
    ///
    /// Slot cells overwrite the time of day. Day cells keep whatever time the
    /// booking already carried, only the date changes.
    pub fn relocated_to(&self, cell: &Cell) -> Self {
        let mut moved = self.clone();
        moved.scheduled_at.date = cell.day;
        if let Some(slot) = cell.slot {
            moved.scheduled_at.time = Some(slot);
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_relocate_to_slot_cell_overwrites_time() {
        let booking = Booking::new(1u64, "Ada", ScheduledAt::at(date(2025, 6, 9), time(9, 0)));
        let moved = booking.relocated_to(&Cell::slot(date(2025, 6, 11), time(14, 30)));

        assert_eq!(moved.scheduled_at, ScheduledAt::at(date(2025, 6, 11), time(14, 30)));
        assert_eq!(moved.id, booking.id);
    }

    #[test]
    fn test_relocate_to_day_cell_keeps_time() {
        let booking = Booking::new(2u64, "Bo", ScheduledAt::at(date(2025, 6, 9), time(7, 15)));
        let moved = booking.relocated_to(&Cell::day(date(2025, 6, 12)));

        assert_eq!(moved.scheduled_at, ScheduledAt::at(date(2025, 6, 12), time(7, 15)));
    }

    #[test]
    fn test_deserialize_backend_payload() {
        let json = r#"{
            "id": "42",
            "subjectName": "Grace Hopper",
            "scheduledAt": { "date": "2025-06-09", "time": "10:30:00" },
            "status": "consulted"
        }"#;

        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.id, BookingId::from(42u64));
        assert_eq!(booking.status, BookingStatus::Consulted);
        assert_eq!(booking.scheduled_at.time, Some(time(10, 30)));
    }

    #[test]
    fn test_unrecognised_status_maps_to_unknown() {
        let json = r#"{
            "id": "t-9",
            "subjectName": "Lab",
            "scheduledAt": { "date": "2025-06-09" },
            "status": "sample_collected"
        }"#;

        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.status, BookingStatus::Unknown);
        assert_eq!(booking.scheduled_at.time, None);
    }
}
