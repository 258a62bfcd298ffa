// Move pipeline
// Single entry point for moves from any input: validate locally, then commit

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::models::booking::BookingId;
use crate::models::cell::Cell;
use crate::models::movement::MoveRequest;
use crate::services::notification::{Notice, Notifier};
use crate::services::store::BoardStore;
use crate::services::sync::{MoveTicket, OptimisticSync};
use crate::services::validation::{MoveValidator, Rejection};

/// Source of "today" for the past-date rule.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date.
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Clone)]
pub struct MovePipeline {
    validator: MoveValidator,
    sync: OptimisticSync,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl MovePipeline {
    pub fn new(
        validator: MoveValidator,
        sync: OptimisticSync,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            validator,
            sync,
            notifier,
            clock,
        }
    }

    pub fn store(&self) -> &BoardStore {
        self.sync.store()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn locate(&self, id: &BookingId) -> Option<Cell> {
        self.store().find_cell(id)
    }

    pub fn is_in_flight(&self, id: &BookingId) -> bool {
        self.sync.is_in_flight(id)
    }

    /// Run the local rules without side effects.
    pub fn check(&self, request: &MoveRequest) -> Result<(), Rejection> {
        let store = self.store();
        let booking = store
            .booking(&request.booking_id)
            .ok_or_else(|| Rejection::UnknownBooking(request.booking_id.clone()))?;

        self.validator.validate(
            &booking,
            &request.from,
            &request.to,
            self.clock.today(),
            store.occupancy(&request.to),
        )
    }

    /// Validate and, if accepted, commit optimistically.
    ///
    /// Rejections other than no-ops are surfaced as a warning notice.
    pub fn submit(&self, request: MoveRequest) -> Result<MoveTicket, Rejection> {
        match self.check(&request) {
            Ok(()) => Ok(self.sync.commit_move(request)),
            Err(rejection) => {
                log::debug!("Move of booking {} refused locally: {}", request.booking_id, rejection);
                if !rejection.is_silent() {
                    self.notifier.notify(Notice::warning(rejection.to_string()));
                }
                Err(rejection)
            }
        }
    }
}
