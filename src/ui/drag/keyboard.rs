// Keyboard drag adapter
// Arrow keys walk the pick-up target across the grid, Enter drops, Escape cancels

use crate::models::booking::BookingId;
use crate::models::cell::Cell;
use crate::services::grid::TimeGrid;

use super::{DragCapability, DragError, DropOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug)]
pub enum KeyResult<T> {
    Moved(Cell),
    Dropped(DropOutcome<T>),
    Cancelled,
    Ignored,
}

#[derive(Debug, Default)]
pub struct KeyboardMover {
    cursor: Option<Cell>,
}

impl KeyboardMover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Option<Cell> {
        self.cursor
    }

    pub fn is_active(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn pick_up<C: DragCapability>(
        &mut self,
        drag: &mut C,
        booking_id: &BookingId,
    ) -> Result<Cell, DragError> {
        let origin = drag.on_pick_up(booking_id)?;
        self.cursor = Some(origin);
        Ok(origin)
    }

    pub fn press<C: DragCapability>(
        &mut self,
        drag: &mut C,
        grid: &TimeGrid,
        key: Key,
    ) -> KeyResult<C::Ticket> {
        let Some(cursor) = self.cursor else {
            return KeyResult::Ignored;
        };

        let (days, slots) = match key {
            Key::Left => (-1, 0),
            Key::Right => (1, 0),
            Key::Up => (0, -1),
            Key::Down => (0, 1),
            Key::Enter => {
                self.cursor = None;
                return KeyResult::Dropped(drag.on_drop(Some(cursor)));
            }
            Key::Escape => {
                self.cursor = None;
                drag.on_cancel();
                return KeyResult::Cancelled;
            }
        };

        // A cursor left over from another week snaps back onto this grid.
        let next = grid.step(&cursor, days, slots);
        self.cursor = Some(next);
        drag.on_hover_cell(Some(next));
        KeyResult::Moved(next)
    }

    /// Forget the cursor without touching the controller.
    pub fn reset(&mut self) {
        self.cursor = None;
    }
}
