// Remote scheduler
// The backend is the only source of truth for booking state

pub mod http;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::booking::Booking;
use crate::models::movement::{MoveConfirmation, MoveResponse, SlotAvailability};

pub use http::HttpScheduler;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The backend understood the request and declined it.
    #[error("{message}")]
    Rejected { message: String },
    /// Timeout, connection loss, 5xx.
    #[error("network failure: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    pub fn rejected(message: impl Into<String>) -> Self {
        RemoteError::Rejected {
            message: message.into(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, RemoteError::Network(_))
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteScheduler: Send + Sync {
    /// Full booking list for the 7-day window starting at `week_start`.
    async fn fetch_window(
        &self,
        branch_id: &str,
        week_start: NaiveDate,
    ) -> Result<Vec<Booking>, RemoteError>;

    /// Ask the backend to relocate a booking.
    async fn confirm_move(
        &self,
        branch_id: &str,
        confirmation: &MoveConfirmation,
    ) -> Result<MoveResponse, RemoteError>;

    /// Ordered slot list for the manual reschedule picker.
    async fn slot_availability(
        &self,
        branch_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<SlotAvailability>, RemoteError>;
}
