// Reschedule dialog
// Pick-from-list alternative to dragging; ends up in the same move pipeline

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::models::board::Granularity;
use crate::models::booking::BookingId;
use crate::models::cell::Cell;
use crate::models::movement::{MoveRequest, SlotAvailability};
use crate::services::remote::{RemoteError, RemoteScheduler};
use crate::services::sync::MoveTicket;
use crate::services::validation::Rejection;

use super::ScheduleBoard;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogError {
    #[error("the {0} slot is already booked")]
    SlotBooked(String),
    #[error("no {0} slot on this date")]
    UnknownSlot(NaiveTime),
    #[error("pick a time slot first")]
    NothingSelected,
    #[error(transparent)]
    Refused(#[from] Rejection),
}

#[derive(Debug, Clone)]
pub struct RescheduleDialog {
    pub booking_id: BookingId,
    pub origin: Cell,
    date: NaiveDate,
    slots: Vec<SlotAvailability>,
    selected: Option<NaiveTime>,
}

impl RescheduleDialog {
    pub fn open(booking_id: BookingId, origin: Cell) -> Self {
        Self {
            booking_id,
            origin,
            date: origin.day,
            slots: Vec::new(),
            selected: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn slots(&self) -> &[SlotAvailability] {
        &self.slots
    }

    pub fn selected(&self) -> Option<NaiveTime> {
        self.selected
    }

    /// Switch to `date` and load its availability. Clears the selection.
    pub async fn load(
        &mut self,
        remote: &dyn RemoteScheduler,
        branch_id: &str,
        date: NaiveDate,
    ) -> Result<(), RemoteError> {
        self.date = date;
        self.selected = None;
        self.slots = remote.slot_availability(branch_id, date).await?;
        Ok(())
    }

    pub fn select(&mut self, slot: NaiveTime) -> Result<(), DialogError> {
        let entry = self
            .slots
            .iter()
            .find(|entry| entry.slot == slot)
            .ok_or(DialogError::UnknownSlot(slot))?;

        if entry.is_booked {
            return Err(DialogError::SlotBooked(entry.label.clone()));
        }

        self.selected = Some(slot);
        Ok(())
    }

    /// Cell the booking would land in. Day boards ignore the slot.
    pub fn target(&self, granularity: &Granularity) -> Result<Cell, DialogError> {
        if !granularity.is_slotted() {
            return Ok(Cell::day(self.date));
        }
        self.selected
            .map(|slot| Cell::slot(self.date, slot))
            .ok_or(DialogError::NothingSelected)
    }

    pub fn request(&self, granularity: &Granularity) -> Result<MoveRequest, DialogError> {
        let target = self.target(granularity)?;
        Ok(MoveRequest::new(self.booking_id.clone(), self.origin, target))
    }
}

impl ScheduleBoard {
    pub fn open_reschedule(&self, booking_id: &BookingId) -> Result<RescheduleDialog, Rejection> {
        let origin = self
            .pipeline()
            .locate(booking_id)
            .ok_or_else(|| Rejection::UnknownBooking(booking_id.clone()))?;
        Ok(RescheduleDialog::open(booking_id.clone(), origin))
    }

    pub async fn slot_availability(&self, date: NaiveDate) -> Result<Vec<SlotAvailability>, RemoteError> {
        self.remote
            .slot_availability(&self.branch_id, date)
            .await
            .map_err(|err| {
                log::error!("Failed to load slots for {}: {}", date, err);
                err
            })
    }

    pub async fn load_slots(
        &self,
        dialog: &mut RescheduleDialog,
        date: NaiveDate,
    ) -> Result<(), RemoteError> {
        if let Err(err) = dialog.load(self.remote.as_ref(), &self.branch_id, date).await {
            log::error!("Failed to load slots for {}: {}", date, err);
            return Err(err);
        }
        Ok(())
    }

    /// Submit the dialog's choice. Queues behind a move still in flight.
    pub fn confirm_reschedule(&self, dialog: &RescheduleDialog) -> Result<MoveTicket, DialogError> {
        let request = dialog.request(&self.config.granularity)?;
        Ok(self.submit_move(request)?)
    }
}
