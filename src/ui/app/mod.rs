//! The scheduling board: one branch, one board kind, one active week.
//!
//! `ScheduleBoard` wires the grid, the cached indexes, the drag controller and
//! the move pipeline together. It holds no rendering state of its own; call
//! [`ScheduleBoard::view`] to get a snapshot of what should be on screen.

mod navigation;
pub mod reschedule;
pub mod toast;

use std::sync::Arc;

use crate::models::board::BoardConfig;
use crate::models::booking::BookingId;
use crate::models::cell::Cell;
use crate::models::movement::MoveRequest;
use crate::models::settings::Settings;
use crate::services::grid::{TimeGrid, WeekWindow};
use crate::services::notification::{Notice, Notifier};
use crate::services::pipeline::{Clock, MovePipeline, SystemClock};
use crate::services::remote::RemoteScheduler;
use crate::services::store::BoardStore;
use crate::services::sync::{MoveTicket, OptimisticSync};
use crate::services::validation::{MoveValidator, Rejection};
use crate::ui::drag::keyboard::{Key, KeyResult, KeyboardMover};
use crate::ui::drag::pointer::{Point, PointerGesture, PointerRelease};
use crate::ui::drag::{DragCapability, DragController, DragError, DragPhase};
use crate::ui::views::week_view::WeekView;

const DEFAULT_DRAG_THRESHOLD: f32 = 4.0;

pub struct ScheduleBoard {
    config: BoardConfig,
    branch_id: String,
    remote: Arc<dyn RemoteScheduler>,
    notifier: Arc<dyn Notifier>,
    drag: DragController<MovePipeline>,
    pointer: PointerGesture,
    keyboard: KeyboardMover,
    window: WeekWindow,
}

impl ScheduleBoard {
    pub fn new(
        config: BoardConfig,
        branch_id: impl Into<String>,
        remote: Arc<dyn RemoteScheduler>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let branch_id = branch_id.into();
        let store = BoardStore::new(config.granularity, config.first_day_of_week);
        let sync = OptimisticSync::new(store, remote.clone(), notifier.clone(), branch_id.as_str());
        let pipeline = MovePipeline::new(
            MoveValidator::for_board(&config),
            sync,
            notifier.clone(),
            clock.clone(),
        );
        let window = WeekWindow::containing(clock.today(), config.first_day_of_week);

        Self {
            config,
            branch_id,
            remote,
            notifier,
            drag: DragController::new(pipeline),
            pointer: PointerGesture::new(DEFAULT_DRAG_THRESHOLD),
            keyboard: KeyboardMover::new(),
            window,
        }
    }

    pub fn from_settings(
        settings: &Settings,
        remote: Arc<dyn RemoteScheduler>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::new(
            settings.board_config(),
            settings.branch_id.clone(),
            remote,
            notifier,
            Arc::new(SystemClock),
        )
        .with_drag_threshold(settings.drag_threshold_px)
    }

    pub fn with_drag_threshold(mut self, threshold: f32) -> Self {
        self.pointer = PointerGesture::new(threshold);
        self
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn branch_id(&self) -> &str {
        &self.branch_id
    }

    pub fn window(&self) -> WeekWindow {
        self.window
    }

    pub fn grid(&self) -> TimeGrid {
        TimeGrid::new(self.window.start, self.config.granularity, self.config.first_day_of_week)
    }

    pub fn pipeline(&self) -> &MovePipeline {
        self.drag.host()
    }

    pub fn store(&self) -> &BoardStore {
        self.pipeline().store()
    }

    pub fn drag_phase(&self) -> DragPhase {
        self.drag.phase()
    }

    pub fn is_in_flight(&self, id: &BookingId) -> bool {
        self.pipeline().is_in_flight(id)
    }

    pub fn view(&self) -> WeekView {
        let pipeline = self.pipeline();
        let index = self.store().snapshot(self.window);
        WeekView::build(
            &self.grid(),
            index.as_ref(),
            pipeline.today(),
            self.drag.session(),
            |id| pipeline.is_in_flight(id),
        )
    }

    /// Move a booking without a drag gesture. A move for a booking that is
    /// still confirming is queued behind it.
    pub fn submit_move(&self, request: MoveRequest) -> Result<MoveTicket, Rejection> {
        self.pipeline().submit(request)
    }

    pub fn move_booking(&self, id: &BookingId, to: Cell) -> Result<MoveTicket, Rejection> {
        let Some(from) = self.pipeline().locate(id) else {
            let rejection = Rejection::UnknownBooking(id.clone());
            self.notifier.notify(Notice::warning(rejection.to_string()));
            return Err(rejection);
        };
        self.submit_move(MoveRequest::new(id.clone(), from, to))
    }

    pub fn pointer_down(&mut self, id: BookingId, at: Point) {
        self.pointer.pointer_down(id, at);
    }

    /// `cell` is the grid cell under the pointer, `None` outside the grid.
    pub fn pointer_move(&mut self, at: Point, cell: Option<Cell>) -> Result<(), DragError> {
        let result = self.pointer.pointer_move(&mut self.drag, at, cell);
        if let Err(err) = &result {
            self.refuse(err);
        }
        result
    }

    pub fn pointer_up(&mut self, cell: Option<Cell>) -> PointerRelease<MoveTicket> {
        self.pointer.pointer_up(&mut self.drag, cell)
    }

    pub fn pick_up_with_keyboard(&mut self, id: &BookingId) -> Result<Cell, DragError> {
        self.pointer.cancel(&mut self.drag);
        let result = self.keyboard.pick_up(&mut self.drag, id);
        if let Err(err) = &result {
            self.refuse(err);
        }
        result
    }

    pub fn press_key(&mut self, key: Key) -> KeyResult<MoveTicket> {
        let grid = self.grid();
        self.keyboard.press(&mut self.drag, &grid, key)
    }

    pub fn keyboard_cursor(&self) -> Option<Cell> {
        self.keyboard.cursor()
    }

    /// Abandon whatever gesture is in progress. Nothing is moved.
    pub fn cancel_drag(&mut self) {
        self.pointer.cancel(&mut self.drag);
        self.keyboard.reset();
        self.drag.on_cancel();
    }

    fn refuse(&self, err: &DragError) {
        match err {
            DragError::Refused(rejection) if rejection.is_silent() => {}
            DragError::Refused(Rejection::AlreadyConfirming(_)) => {
                self.notifier
                    .notify(Notice::warning("This booking is still being saved, try again in a moment"));
            }
            other => self.notifier.notify(Notice::warning(other.to_string())),
        }
    }
}
