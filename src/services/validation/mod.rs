//! Client-side move rules.
//!
//! Only the rules the client can decide on its own live here: no-op moves,
//! moves into the past, cell shape and the optional per-cell capacity.
//! Everything else is the backend's call.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::board::{BoardConfig, CapacityPolicy, Granularity};
use crate::models::booking::{Booking, BookingId};
use crate::models::cell::Cell;

/// Why a move was refused before reaching the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("booking is already in that cell")]
    NoOp,
    #[error("cannot move into a past date ({day})")]
    PastDate { day: NaiveDate },
    #[error("{cell} is full ({limit} per slot)")]
    CapacityReached { cell: Cell, limit: usize },
    #[error("{cell} is not a cell on this board")]
    CellMismatch { cell: Cell },
    #[error("booking {0} is still being confirmed")]
    AlreadyConfirming(BookingId),
    #[error("booking {0} is not on the board")]
    UnknownBooking(BookingId),
}

impl Rejection {
    /// Silent rejections leave the UI untouched, no notice is shown.
    pub fn is_silent(&self) -> bool {
        matches!(self, Rejection::NoOp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveValidator {
    granularity: Granularity,
    capacity: CapacityPolicy,
}

impl MoveValidator {
    pub fn new(granularity: Granularity, capacity: CapacityPolicy) -> Self {
        Self {
            granularity,
            capacity,
        }
    }

    pub fn for_board(config: &BoardConfig) -> Self {
        Self::new(config.granularity, config.capacity)
    }

    /// Check a move against the local rules.
    ///
    /// `target_occupancy` counts the bookings currently rendered in `to`.
    pub fn validate(
        &self,
        booking: &Booking,
        from: &Cell,
        to: &Cell,
        today: NaiveDate,
        target_occupancy: usize,
    ) -> Result<(), Rejection> {
        if from == to {
            return Err(Rejection::NoOp);
        }

        if to.day < today {
            return Err(Rejection::PastDate { day: to.day });
        }

        if !self.granularity.accepts(to) {
            return Err(Rejection::CellMismatch { cell: *to });
        }

        if let Some(limit) = self.capacity.limit() {
            if target_occupancy >= limit {
                log::debug!(
                    "Booking {} refused by capacity: {} already in {}",
                    booking.id,
                    target_occupancy,
                    to
                );
                return Err(Rejection::CapacityReached { cell: *to, limit });
            }
        }

        Ok(())
    }
}
