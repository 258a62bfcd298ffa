//! Drag-to-reschedule state machine.
//!
//! [`DragController`] owns at most one drag session and talks to the rest of
//! the board only through [`DragHost`]. Input adapters (pointer, keyboard)
//! drive it through the [`DragCapability`] interface, so it never sees a
//! real pointer or widget.

pub mod keyboard;
pub mod pointer;

use thiserror::Error;

use crate::models::booking::BookingId;
use crate::models::cell::Cell;
use crate::models::movement::MoveRequest;
use crate::services::pipeline::MovePipeline;
use crate::services::sync::MoveTicket;
use crate::services::validation::Rejection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
    Confirming,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragSession {
    pub booking_id: BookingId,
    pub origin: Cell,
    pub hovered: Option<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DragError {
    #[error("booking {0} is already being dragged")]
    AlreadyDragging(BookingId),
    #[error(transparent)]
    Refused(#[from] Rejection),
}

/// Result of releasing a dragged booking.
#[derive(Debug)]
pub enum DropOutcome<T> {
    Committed(T),
    Rejected(Rejection),
    Cancelled,
}

impl<T> DropOutcome<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, DropOutcome::Committed(_))
    }

    pub fn into_ticket(self) -> Option<T> {
        match self {
            DropOutcome::Committed(ticket) => Some(ticket),
            _ => None,
        }
    }
}

/// What the controller needs from the board.
pub trait DragHost {
    type Ticket;

    fn locate(&self, id: &BookingId) -> Option<Cell>;
    fn is_confirming(&self, id: &BookingId) -> bool;
    fn submit(&self, request: MoveRequest) -> Result<Self::Ticket, Rejection>;
}

impl DragHost for MovePipeline {
    type Ticket = MoveTicket;

    fn locate(&self, id: &BookingId) -> Option<Cell> {
        MovePipeline::locate(self, id)
    }

    fn is_confirming(&self, id: &BookingId) -> bool {
        self.is_in_flight(id)
    }

    fn submit(&self, request: MoveRequest) -> Result<MoveTicket, Rejection> {
        MovePipeline::submit(self, request)
    }
}

/// Minimal interface any drag source can drive.
pub trait DragCapability {
    type Ticket;

    fn on_pick_up(&mut self, booking_id: &BookingId) -> Result<Cell, DragError>;
    fn on_hover_cell(&mut self, cell: Option<Cell>);
    fn on_drop(&mut self, cell: Option<Cell>) -> DropOutcome<Self::Ticket>;
    fn on_cancel(&mut self);
}

pub struct DragController<H: DragHost> {
    host: H,
    session: Option<DragSession>,
    /// Last booking handed to the host, confirming until the host says otherwise.
    dropped: Option<BookingId>,
}

impl<H: DragHost> DragController<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            session: None,
            dropped: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> DragPhase {
        if self.session.is_some() {
            DragPhase::Dragging
        } else if self
            .dropped
            .as_ref()
            .is_some_and(|id| self.host.is_confirming(id))
        {
            DragPhase::Confirming
        } else {
            DragPhase::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }
}

impl<H: DragHost> DragCapability for DragController<H> {
    type Ticket = H::Ticket;

    fn on_pick_up(&mut self, booking_id: &BookingId) -> Result<Cell, DragError> {
        if let Some(session) = &self.session {
            return Err(DragError::AlreadyDragging(session.booking_id.clone()));
        }

        if self.host.is_confirming(booking_id) {
            return Err(Rejection::AlreadyConfirming(booking_id.clone()).into());
        }

        let origin = self
            .host
            .locate(booking_id)
            .ok_or_else(|| Rejection::UnknownBooking(booking_id.clone()))?;

        log::debug!("Drag started for booking {} from {}", booking_id, origin);
        self.session = Some(DragSession {
            booking_id: booking_id.clone(),
            origin,
            hovered: Some(origin),
        });
        Ok(origin)
    }

    fn on_hover_cell(&mut self, cell: Option<Cell>) {
        if let Some(session) = self.session.as_mut() {
            session.hovered = cell;
        }
    }

    fn on_drop(&mut self, cell: Option<Cell>) -> DropOutcome<H::Ticket> {
        let Some(session) = self.session.take() else {
            return DropOutcome::Cancelled;
        };

        let Some(target) = cell else {
            log::debug!("Drag of booking {} released outside the grid", session.booking_id);
            return DropOutcome::Cancelled;
        };

        let request = MoveRequest::new(session.booking_id.clone(), session.origin, target);
        match self.host.submit(request) {
            Ok(ticket) => {
                self.dropped = Some(session.booking_id.clone());
                log::debug!(
                    "Booking {} dropped on {}, handed off for confirmation",
                    session.booking_id,
                    target
                );
                DropOutcome::Committed(ticket)
            }
            Err(rejection) => DropOutcome::Rejected(rejection),
        }
    }

    fn on_cancel(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("Drag of booking {} cancelled", session.booking_id);
        }
    }
}
