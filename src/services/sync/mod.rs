//! Optimistic move orchestration.
//!
//! An accepted move is applied to the cache straight away, then confirmed
//! with the backend in a background task. Success keeps the backend's copy
//! of the booking; rejection or a network failure puts the booking back
//! exactly where it was.
//!
//! Moves for the same booking run one after another, in submission order,
//! through a per-booking lane. Each move in a lane waits for the one
//! submitted just before it. Moves for different bookings never wait on
//! each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::models::booking::{Booking, BookingId};
use crate::models::movement::{MoveRequest, MoveResult};
use crate::services::grid::WeekWindow;
use crate::services::notification::{Notice, Notifier};
use crate::services::remote::{RemoteError, RemoteScheduler};
use crate::services::store::{AppliedMove, ApplySkip, BoardStore, RevertOutcome};

/// How a committed move ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The backend accepted; the cache holds its copy of the booking.
    Confirmed(Booking),
    /// The backend declined; the move was rolled back.
    Rejected(String),
    /// The backend could not be reached; the move was rolled back.
    Failed(String),
    /// A queued move found nothing to do when its turn came.
    Skipped,
}

impl MoveOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, MoveOutcome::Confirmed(_))
    }

    pub fn into_result(self) -> MoveResult {
        match self {
            MoveOutcome::Confirmed(booking) => MoveResult::accepted(booking),
            MoveOutcome::Rejected(reason) | MoveOutcome::Failed(reason) => {
                MoveResult::rejected(reason)
            }
            MoveOutcome::Skipped => MoveResult::rejected("nothing to move"),
        }
    }
}

/// Handle to a move that is being confirmed in the background.
#[derive(Debug)]
pub struct MoveTicket {
    pub booking_id: BookingId,
    handle: JoinHandle<MoveOutcome>,
}

impl MoveTicket {
    /// Wait for the confirmation to settle.
    pub async fn outcome(self) -> MoveOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("Move task for booking {} ended abnormally: {}", self.booking_id, err);
                MoveOutcome::Failed("move was interrupted".to_string())
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Completion signal of the last move submitted for a booking.
type LaneTail = oneshot::Receiver<()>;

#[derive(Clone)]
pub struct OptimisticSync {
    store: BoardStore,
    remote: Arc<dyn RemoteScheduler>,
    notifier: Arc<dyn Notifier>,
    branch_id: Arc<str>,
    lanes: Arc<Mutex<HashMap<BookingId, LaneTail>>>,
}

impl OptimisticSync {
    pub fn new(
        store: BoardStore,
        remote: Arc<dyn RemoteScheduler>,
        notifier: Arc<dyn Notifier>,
        branch_id: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            store,
            remote,
            notifier,
            branch_id: branch_id.into(),
            lanes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn is_in_flight(&self, id: &BookingId) -> bool {
        self.store.is_in_flight(id)
    }

    /// Apply `request` locally and confirm it with the backend.
    ///
    /// When the booking has no move in flight the cache changes before this
    /// returns. Otherwise the move waits its turn and is applied once the
    /// earlier one has settled. Must be called from within a Tokio runtime.
    pub fn commit_move(&self, request: MoveRequest) -> MoveTicket {
        let booking_id = request.booking_id.clone();
        let (done, tail) = oneshot::channel();
        let previous = self.enter_lane(&booking_id, tail);
        let sync = self.clone();

        let handle = match previous {
            None => {
                let applied = self.store.apply_move(&request);
                tokio::spawn(async move { sync.run(request, applied, done).await })
            }
            Some(previous) => {
                log::debug!("Queueing move for booking {} behind one in flight", booking_id);
                tokio::spawn(async move {
                    // Dropped senders resolve too, so a lost task cannot stall the lane.
                    let _ = previous.await;
                    let applied = sync.store.apply_move(&request);
                    sync.run(request, applied, done).await
                })
            }
        };

        MoveTicket { booking_id, handle }
    }

    /// Make `tail` the last move of the booking's lane, returning the
    /// previous tail while that move is still running.
    fn enter_lane(&self, id: &BookingId, tail: LaneTail) -> Option<LaneTail> {
        let mut lanes = self.lanes.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.store.begin(id);
        let mut previous = lanes.insert(id.clone(), tail)?;
        match previous.try_recv() {
            Err(oneshot::error::TryRecvError::Empty) => Some(previous),
            _ => None,
        }
    }

    fn leave_lane(&self, id: &BookingId) {
        let mut lanes = self.lanes.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.store.finish(id) == 0 {
            lanes.remove(id);
        }
    }

    async fn run(
        &self,
        request: MoveRequest,
        applied: Result<AppliedMove, ApplySkip>,
        done: oneshot::Sender<()>,
    ) -> MoveOutcome {
        let outcome = match applied {
            Ok(applied) => self.confirm(&request, applied).await,
            Err(ApplySkip::AlreadyThere) => {
                log::debug!("Booking {} already in {}, nothing to confirm", request.booking_id, request.to);
                MoveOutcome::Skipped
            }
            Err(ApplySkip::Missing) => {
                log::warn!("Booking {} left the board before its move ran", request.booking_id);
                self.notifier.notify(Notice::warning(format!(
                    "Booking {} is no longer on the board",
                    request.booking_id
                )));
                MoveOutcome::Skipped
            }
        };

        self.leave_lane(&request.booking_id);
        let _ = done.send(());
        outcome
    }

    async fn confirm(&self, request: &MoveRequest, applied: AppliedMove) -> MoveOutcome {
        let confirmation = request.confirmation();
        let response = self
            .remote
            .confirm_move(&self.branch_id, &confirmation)
            .await;

        match response {
            Ok(response) if response.success => {
                let booking = match response.booking {
                    Some(booking) if booking.id == request.booking_id => booking,
                    Some(other) => {
                        log::warn!(
                            "Backend confirmed booking {} with a payload for {}, keeping local copy",
                            request.booking_id,
                            other.id
                        );
                        applied.moved.clone()
                    }
                    None => applied.moved.clone(),
                };

                let cell = self.store.settle(booking.clone());
                if cell != request.to {
                    log::info!(
                        "Backend placed booking {} in {} instead of {}",
                        request.booking_id,
                        cell,
                        request.to
                    );
                }
                log::info!("Move of booking {} to {} confirmed", request.booking_id, cell);
                self.notifier.notify(Notice::success(format!(
                    "{} moved to {}",
                    booking.subject_name, cell
                )));
                MoveOutcome::Confirmed(booking)
            }
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| "the move was declined".to_string());
                self.reject(request, &applied, message).await
            }
            Err(RemoteError::Rejected { message }) => self.reject(request, &applied, message).await,
            Err(err) => {
                log::error!(
                    "Network failure confirming move of booking {}: {}",
                    request.booking_id,
                    err
                );
                self.roll_back(&applied).await;
                self.notifier.notify(Notice::error(
                    "Could not reach the server, the move was undone. Please try again later.",
                ));
                MoveOutcome::Failed(err.to_string())
            }
        }
    }

    async fn reject(&self, request: &MoveRequest, applied: &AppliedMove, message: String) -> MoveOutcome {
        log::warn!("Backend rejected move of booking {}: {}", request.booking_id, message);
        self.roll_back(applied).await;
        self.notifier
            .notify(Notice::error(format!("Move not saved: {}", message)));
        MoveOutcome::Rejected(message)
    }

    async fn roll_back(&self, applied: &AppliedMove) {
        let id = &applied.moved.id;
        if self.store.is_superseded(id) {
            log::info!("Booking {} was refreshed while in flight, keeping fetched state", id);
            return;
        }

        if self.store.revert(applied) == RevertOutcome::Missing {
            let origin = applied.origin_window(self.store.first_day_of_week());
            let target = self.store.window_of(applied.to.day);
            log::warn!(
                "Booking {} vanished before rollback, refetching weeks {} and {}",
                id,
                origin.start,
                target.start
            );
            self.resync(origin).await;
            if target != origin {
                self.resync(target).await;
            }
        }
    }

    /// Refetch one window if it is cached.
    pub async fn resync(&self, window: WeekWindow) {
        if !self.store.is_cached(window) {
            return;
        }

        match self.remote.fetch_window(&self.branch_id, window.start).await {
            Ok(bookings) => self.store.replace_window(window, bookings),
            Err(err) => log::error!("Failed to refetch week {}: {}", window.start, err),
        }
    }
}
