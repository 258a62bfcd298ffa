//! Per-window booking cache shared by the board and the sync layer.
//!
//! Every fetched week gets its own [`BookingIndex`], keyed by the window's
//! start date. Only two kinds of writer touch it: wholesale window
//! replacement after a fetch, and optimistic apply / settle / revert from
//! the sync layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::models::board::Granularity;
use crate::models::booking::{Booking, BookingId};
use crate::models::cell::Cell;
use crate::models::movement::MoveRequest;
use crate::services::grid::WeekWindow;
use crate::services::index::{BookingIndex, Placement};

/// Where a booking was before an optimistic move took it away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Window { window: WeekWindow, placement: Placement },
    /// The booking lived in a week that is not cached.
    Detached(Booking),
}

/// Record of one optimistic apply, enough to undo it exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub origin: Origin,
    pub moved: Booking,
    pub to: Cell,
}

impl AppliedMove {
    pub fn origin_window(&self, first_day_of_week: u8) -> WeekWindow {
        match &self.origin {
            Origin::Window { window, .. } => *window,
            Origin::Detached(booking) => {
                WeekWindow::containing(booking.scheduled_at.date, first_day_of_week)
            }
        }
    }
}

/// Why an optimistic apply did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplySkip {
    /// The booking already renders in the target cell.
    AlreadyThere,
    /// The booking is not in any cached window.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertOutcome {
    Restored,
    /// The moved booking could not be found any more.
    Missing,
}

#[derive(Debug, Default)]
struct InFlight {
    pending: usize,
    superseded: bool,
}

#[derive(Debug)]
struct StoreInner {
    granularity: Granularity,
    first_day_of_week: u8,
    windows: HashMap<NaiveDate, BookingIndex>,
    detached: HashMap<BookingId, Booking>,
    in_flight: HashMap<BookingId, InFlight>,
}

impl StoreInner {
    fn window_of(&self, date: NaiveDate) -> WeekWindow {
        WeekWindow::containing(date, self.first_day_of_week)
    }

    fn locate(&self, id: &BookingId) -> Option<(WeekWindow, Cell)> {
        self.windows.iter().find_map(|(start, index)| {
            index
                .find_cell(id)
                .map(|cell| (WeekWindow { start: *start }, cell))
        })
    }

    fn take(&mut self, id: &BookingId) -> Option<Origin> {
        if let Some((window, _)) = self.locate(id) {
            let placement = self.windows.get_mut(&window.start)?.remove(id)?;
            return Some(Origin::Window { window, placement });
        }
        self.detached.remove(id).map(Origin::Detached)
    }

    fn purge(&mut self, id: &BookingId) -> bool {
        let mut found = self.detached.remove(id).is_some();
        for index in self.windows.values_mut() {
            found |= index.remove(id).is_some();
        }
        found
    }

    fn put(&mut self, booking: Booking, cell: Cell) {
        let window = self.window_of(cell.day);
        match self.windows.get_mut(&window.start) {
            Some(index) => index.append(cell, booking),
            None => {
                self.detached.insert(booking.id.clone(), booking);
            }
        }
    }
}

/// Cloneable handle to the shared cache.
#[derive(Debug, Clone)]
pub struct BoardStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl BoardStore {
    pub fn new(granularity: Granularity, first_day_of_week: u8) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                granularity,
                first_day_of_week,
                windows: HashMap::new(),
                detached: HashMap::new(),
                in_flight: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // A poisoned lock still holds a usable cache.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn granularity(&self) -> Granularity {
        self.lock().granularity
    }

    pub fn first_day_of_week(&self) -> u8 {
        self.lock().first_day_of_week
    }

    pub fn window_of(&self, date: NaiveDate) -> WeekWindow {
        self.lock().window_of(date)
    }

    pub fn is_cached(&self, window: WeekWindow) -> bool {
        self.lock().windows.contains_key(&window.start)
    }

    pub fn cached_windows(&self) -> Vec<WeekWindow> {
        let mut windows: Vec<WeekWindow> = self
            .lock()
            .windows
            .keys()
            .map(|start| WeekWindow { start: *start })
            .collect();
        windows.sort();
        windows
    }

    /// Copy of one window's index for rendering or inspection.
    pub fn snapshot(&self, window: WeekWindow) -> Option<BookingIndex> {
        self.lock().windows.get(&window.start).cloned()
    }

    /// Replace a window wholesale with a fresh payload from the backend.
    ///
    /// The payload wins for every booking it contains: stale copies in other
    /// windows are dropped and in-flight moves for those bookings are marked
    /// superseded, so their eventual failure does not roll anything back.
    pub fn replace_window(&self, window: WeekWindow, bookings: Vec<Booking>) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let index = BookingIndex::build(bookings, inner.granularity);

        for id in index.ids() {
            inner.detached.remove(id);
            for (start, other) in inner.windows.iter_mut() {
                if *start != window.start {
                    other.remove(id);
                }
            }
            if let Some(flight) = inner.in_flight.get_mut(id) {
                flight.superseded = true;
            }
        }

        log::info!("Window {} now holds {} bookings", window.start, index.len());
        inner.windows.insert(window.start, index);
    }

    pub fn locate(&self, id: &BookingId) -> Option<(WeekWindow, Cell)> {
        self.lock().locate(id)
    }

    pub fn find_cell(&self, id: &BookingId) -> Option<Cell> {
        self.locate(id).map(|(_, cell)| cell)
    }

    pub fn booking(&self, id: &BookingId) -> Option<Booking> {
        let inner = self.lock();
        if let Some((window, _)) = inner.locate(id) {
            return inner.windows.get(&window.start)?.get(id).cloned();
        }
        inner.detached.get(id).cloned()
    }

    pub fn occupancy(&self, cell: &Cell) -> usize {
        let inner = self.lock();
        let window = inner.window_of(cell.day);
        inner
            .windows
            .get(&window.start)
            .map(|index| index.occupancy(cell))
            .unwrap_or(0)
    }

    /// Register one more pending move for `id`.
    pub fn begin(&self, id: &BookingId) {
        self.lock().in_flight.entry(id.clone()).or_default().pending += 1;
    }

    /// Drop one pending move for `id`, returning how many remain.
    pub fn finish(&self, id: &BookingId) -> usize {
        let mut inner = self.lock();
        let remaining = match inner.in_flight.get_mut(id) {
            Some(flight) => {
                flight.pending = flight.pending.saturating_sub(1);
                flight.pending
            }
            None => 0,
        };
        if remaining == 0 {
            inner.in_flight.remove(id);
        }
        remaining
    }

    pub fn is_in_flight(&self, id: &BookingId) -> bool {
        self.lock()
            .in_flight
            .get(id)
            .is_some_and(|flight| flight.pending > 0)
    }

    pub fn is_superseded(&self, id: &BookingId) -> bool {
        self.lock()
            .in_flight
            .get(id)
            .is_some_and(|flight| flight.superseded)
    }

    /// Optimistically move a booking to `request.to`.
    ///
    /// The booking is taken from wherever it currently renders, which may
    /// differ from `request.from` when the move waited behind another one.
    pub fn apply_move(&self, request: &MoveRequest) -> Result<AppliedMove, ApplySkip> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if let Some(flight) = inner.in_flight.get_mut(&request.booking_id) {
            flight.superseded = false;
        }

        if let Some((_, current)) = inner.locate(&request.booking_id) {
            if current == request.to {
                return Err(ApplySkip::AlreadyThere);
            }
        }

        let origin = inner.take(&request.booking_id).ok_or(ApplySkip::Missing)?;
        let original = match &origin {
            Origin::Window { placement, .. } => &placement.booking,
            Origin::Detached(booking) => booking,
        };
        let moved = original.relocated_to(&request.to);
        inner.put(moved.clone(), request.to);

        log::debug!("Optimistically moved booking {} to {}", request.booking_id, request.to);
        Ok(AppliedMove {
            origin,
            moved,
            to: request.to,
        })
    }

    /// Accept the backend's copy of a booking as final.
    ///
    /// Stays in place when it lands in the cell it already occupies.
    pub fn settle(&self, booking: Booking) -> Cell {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let cell = inner.granularity.cell_for(&booking.scheduled_at);
        let target = inner.window_of(cell.day);

        if let Some((window, current)) = inner.locate(&booking.id) {
            if window == target && current == cell {
                if let Some(index) = inner.windows.get_mut(&window.start) {
                    index.replace(booking);
                    return cell;
                }
            }
        }

        inner.purge(&booking.id);
        inner.put(booking, cell);
        cell
    }

    /// Undo an optimistic move exactly: same cell, same neighbours.
    pub fn revert(&self, applied: &AppliedMove) -> RevertOutcome {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let id = &applied.moved.id;
        if !inner.purge(id) {
            return RevertOutcome::Missing;
        }

        match applied.origin.clone() {
            Origin::Window { window, placement } => match inner.windows.get_mut(&window.start) {
                Some(index) => index.restore(placement),
                None => {
                    inner.detached.insert(id.clone(), placement.booking);
                }
            },
            Origin::Detached(booking) => {
                inner.detached.insert(id.clone(), booking);
            }
        }
        RevertOutcome::Restored
    }
}
