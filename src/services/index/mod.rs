//! In-memory index of where each visible booking renders.
//!
//! A cell holds a sequence of bookings in input order. The index is the
//! only mutable picture of the board; callers rebuild it from a fresh
//! booking list or mutate it one booking at a time when a move is applied
//! or reverted.
//!
//! Each booking carries a rank: its place in the fetched payload, or a
//! fresh rank past every other one when it is appended later. A cell's
//! sequence is always sorted by rank, so a booking restored with its old
//! rank lands back between the same neighbours whatever else left or
//! returned to the cell in the meantime.

use std::collections::{BTreeMap, HashMap};

use crate::models::board::Granularity;
use crate::models::booking::{Booking, BookingId};
use crate::models::cell::{Cell, CellKey};

/// Where a booking sat before it was taken out of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub cell: Cell,
    pub rank: u64,
    pub booking: Booking,
}

#[derive(Debug, Clone)]
pub struct BookingIndex {
    granularity: Granularity,
    cells: HashMap<CellKey, Vec<Booking>>,
    locations: HashMap<BookingId, Cell>,
    ranks: HashMap<BookingId, u64>,
    next_rank: u64,
}

// Ranks are bookkeeping: two indexes are equal when they render the same.
impl PartialEq for BookingIndex {
    fn eq(&self, other: &Self) -> bool {
        self.granularity == other.granularity
            && self.cells == other.cells
            && self.locations == other.locations
    }
}

impl Eq for BookingIndex {}

impl BookingIndex {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            cells: HashMap::new(),
            locations: HashMap::new(),
            ranks: HashMap::new(),
            next_rank: 0,
        }
    }

    /// Index `bookings` in one pass, keeping their relative order per cell.
    pub fn build(bookings: impl IntoIterator<Item = Booking>, granularity: Granularity) -> Self {
        let mut index = Self::new(granularity);
        for booking in bookings {
            if index.contains(&booking.id) {
                log::warn!("Ignoring duplicate booking {} in window payload", booking.id);
                continue;
            }
            index.insert(booking);
        }
        index
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn contains(&self, id: &BookingId) -> bool {
        self.locations.contains_key(id)
    }

    pub fn find_cell(&self, id: &BookingId) -> Option<Cell> {
        self.locations.get(id).copied()
    }

    pub fn get(&self, id: &BookingId) -> Option<&Booking> {
        let cell = self.locations.get(id)?;
        self.bookings_at(cell).iter().find(|booking| &booking.id == id)
    }

    pub fn bookings_at(&self, cell: &Cell) -> &[Booking] {
        self.cells
            .get(&cell.key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn occupancy(&self, cell: &Cell) -> usize {
        self.bookings_at(cell).len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &BookingId> {
        self.locations.keys()
    }

    /// Append `booking` to the cell its schedule falls into.
    pub fn insert(&mut self, booking: Booking) -> Cell {
        let cell = self.granularity.cell_for(&booking.scheduled_at);
        self.append(cell, booking);
        cell
    }

    /// Append `booking` to the end of `cell`.
    pub fn append(&mut self, cell: Cell, booking: Booking) {
        let rank = self.next_rank;
        self.insert_ranked(cell, rank, booking);
    }

    fn insert_ranked(&mut self, cell: Cell, rank: u64, booking: Booking) {
        if self.contains(&booking.id) {
            self.remove(&booking.id);
        }

        self.next_rank = self.next_rank.max(rank.saturating_add(1));
        self.locations.insert(booking.id.clone(), cell);
        self.ranks.insert(booking.id.clone(), rank);
        let ranks = &self.ranks;
        let sequence = self.cells.entry(cell.key()).or_default();
        let position =
            sequence.partition_point(|other| ranks.get(&other.id).is_some_and(|r| *r < rank));
        sequence.insert(position, booking);
    }

    pub fn remove(&mut self, id: &BookingId) -> Option<Placement> {
        let cell = self.locations.remove(id)?;
        let key = cell.key();
        let sequence = self.cells.get_mut(&key)?;
        let position = sequence.iter().position(|booking| &booking.id == id)?;
        let booking = sequence.remove(position);
        let rank = self.ranks.remove(id).unwrap_or(self.next_rank);

        if sequence.is_empty() {
            self.cells.remove(&key);
        }

        Some(Placement {
            cell,
            rank,
            booking,
        })
    }

    /// Put a removed booking back between the neighbours it had.
    pub fn restore(&mut self, placement: Placement) {
        self.insert_ranked(placement.cell, placement.rank, placement.booking);
    }

    /// Swap in a newer copy of a booking.
    ///
    /// Keeps the booking's position when it still belongs to the same cell,
    /// otherwise moves it to the end of its new cell.
    pub fn replace(&mut self, booking: Booking) -> Cell {
        let target = self.granularity.cell_for(&booking.scheduled_at);
        match self.remove(&booking.id) {
            Some(previous) if previous.cell == target => {
                self.insert_ranked(target, previous.rank, booking);
                target
            }
            _ => self.insert(booking),
        }
    }

    /// Every booking, in cell-key order and per-cell order.
    pub fn bookings(&self) -> Vec<Booking> {
        let mut keys: Vec<&CellKey> = self.cells.keys().collect();
        keys.sort();
        keys.into_iter()
            .flat_map(|key| self.cells[key].iter().cloned())
            .collect()
    }

    /// Cell key to ordered booking ids. Handy for structural comparisons.
    pub fn layout(&self) -> BTreeMap<CellKey, Vec<BookingId>> {
        self.cells
            .iter()
            .map(|(key, bookings)| {
                (
                    key.clone(),
                    bookings.iter().map(|booking| booking.id.clone()).collect(),
                )
            })
            .collect()
    }
}
