use crate::models::booking::BookingId;
use crate::models::cell::Cell;

use super::{DragCapability, DragError, DropOutcome};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Clone, Debug)]
struct Press {
    booking_id: BookingId,
    at: Point,
    dragging: bool,
}

/// What releasing the pointer amounted to.
#[derive(Debug)]
pub enum PointerRelease<T> {
    /// Pressed and released without moving past the threshold.
    Click(BookingId),
    Drop(DropOutcome<T>),
    None,
}

/// Turns raw pointer events into drag calls.
///
/// A press only becomes a drag once the pointer travels further than
/// `threshold` pixels, so a plain click on a card stays a click.
#[derive(Debug)]
pub struct PointerGesture {
    threshold: f32,
    pressed: Option<Press>,
}

impl PointerGesture {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.max(0.0),
            pressed: None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.pressed.as_ref().is_some_and(|press| press.dragging)
    }

    pub fn pointer_down(&mut self, booking_id: BookingId, at: Point) {
        self.pressed = Some(Press {
            booking_id,
            at,
            dragging: false,
        });
    }

    /// Track the pointer over `cell` (`None` when outside the grid).
    ///
    /// Returns an error if crossing the threshold started a drag the
    /// controller refused; the press is dropped in that case.
    pub fn pointer_move<C: DragCapability>(
        &mut self,
        drag: &mut C,
        at: Point,
        cell: Option<Cell>,
    ) -> Result<(), DragError> {
        let Some(press) = self.pressed.as_mut() else {
            return Ok(());
        };

        if !press.dragging {
            if press.at.distance(at) <= self.threshold {
                return Ok(());
            }
            if let Err(err) = drag.on_pick_up(&press.booking_id) {
                self.pressed = None;
                return Err(err);
            }
            press.dragging = true;
        }

        drag.on_hover_cell(cell);
        Ok(())
    }

    pub fn pointer_up<C: DragCapability>(
        &mut self,
        drag: &mut C,
        cell: Option<Cell>,
    ) -> PointerRelease<C::Ticket> {
        match self.pressed.take() {
            Some(press) if press.dragging => PointerRelease::Drop(drag.on_drop(cell)),
            Some(press) => PointerRelease::Click(press.booking_id),
            None => PointerRelease::None,
        }
    }

    pub fn cancel<C: DragCapability>(&mut self, drag: &mut C) {
        if let Some(press) = self.pressed.take() {
            if press.dragging {
                drag.on_cancel();
            }
        }
    }
}
