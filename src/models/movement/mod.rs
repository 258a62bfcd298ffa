// Movement module
// Move intents and the wire shapes exchanged with the backend

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::booking::{Booking, BookingId};
use crate::models::cell::Cell;

/// A relocation of one booking from one cell to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub booking_id: BookingId,
    pub from: Cell,
    pub to: Cell,
}

impl MoveRequest {
    pub fn new(booking_id: impl Into<BookingId>, from: Cell, to: Cell) -> Self {
        Self {
            booking_id: booking_id.into(),
            from,
            to,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    pub fn confirmation(&self) -> MoveConfirmation {
        MoveConfirmation {
            booking_id: self.booking_id.clone(),
            new_date: self.to.day,
            new_slot: self.to.slot,
        }
    }
}

/// Body sent to the backend. A missing `newSlot` means a day-granular move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveConfirmation {
    pub booking_id: BookingId,
    pub new_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_slot: Option<NaiveTime>,
}

/// Backend answer to a move confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub booking: Option<Booking>,
}

/// How a committed move ended, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub accepted: bool,
    pub reason: Option<String>,
    pub booking: Option<Booking>,
}

impl MoveResult {
    pub fn accepted(booking: Booking) -> Self {
        Self {
            accepted: true,
            reason: None,
            booking: Some(booking),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: Some(reason.into()),
            booking: None,
        }
    }
}

/// One row of the slot picker in the reschedule dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub slot: NaiveTime,
    pub label: String,
    pub is_booked: bool,
}
