//! Weekly time grid.
//!
//! Turns a reference date and a granularity into the ordered list of
//! droppable cells for one 7-day window. Everything here is pure: the same
//! inputs always produce the same cells, and nothing reads the clock.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::models::board::Granularity;
use crate::models::cell::Cell;
use crate::utils::date::{get_week_start, week_dates};

/// A 7-day span keyed by its first date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekWindow {
    pub start: NaiveDate,
}

impl WeekWindow {
    pub fn containing(date: NaiveDate, first_day_of_week: u8) -> Self {
        Self {
            start: get_week_start(date, first_day_of_week),
        }
    }

    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(6)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        week_dates(self.start)
    }

    pub fn next(&self) -> Self {
        Self {
            start: self.start + Duration::days(7),
        }
    }

    pub fn previous(&self) -> Self {
        Self {
            start: self.start - Duration::days(7),
        }
    }
}

/// Cells of one window, day-major: every slot of the first day, then the
/// second day, and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeGrid {
    pub window: WeekWindow,
    pub granularity: Granularity,
    cells: Vec<Cell>,
}

impl TimeGrid {
    pub fn new(reference: NaiveDate, granularity: Granularity, first_day_of_week: u8) -> Self {
        let window = WeekWindow::containing(reference, first_day_of_week);
        let slots = granularity.slot_times();

        let cells = window
            .dates()
            .into_iter()
            .flat_map(|day| cells_for_day(day, &granularity, &slots))
            .collect();

        Self {
            window,
            granularity,
            cells,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        self.window.dates()
    }

    /// Row labels: slot start times, or a single `None` row for day boards.
    pub fn rows(&self) -> Vec<Option<NaiveTime>> {
        if self.granularity.is_slotted() {
            self.granularity.slot_times().into_iter().map(Some).collect()
        } else {
            vec![None]
        }
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        self.window.contains(cell.day) && self.granularity.accepts(cell)
    }

    /// Neighbouring cell, clamped to the grid edges.
    ///
    /// `day_delta` moves across columns, `slot_delta` moves across rows.
    pub fn step(&self, from: &Cell, day_delta: i64, slot_delta: i64) -> Cell {
        let first = self.window.start;
        let day_offset = (from.day - first).num_days();
        let target_day = first + Duration::days((day_offset + day_delta).clamp(0, 6));

        let rows = self.rows();
        let current_row = rows.iter().position(|row| *row == from.slot).unwrap_or(0) as i64;
        let last_row = rows.len().saturating_sub(1) as i64;
        let target_row = (current_row + slot_delta).clamp(0, last_row) as usize;

        Cell {
            day: target_day,
            slot: rows.get(target_row).copied().flatten(),
        }
    }
}

fn cells_for_day(day: NaiveDate, granularity: &Granularity, slots: &[NaiveTime]) -> Vec<Cell> {
    match granularity {
        Granularity::Day => vec![Cell::day(day)],
        Granularity::Slots { .. } => slots.iter().map(|slot| Cell::slot(day, *slot)).collect(),
    }
}

/// Ordered cells of the 7-day window containing `reference`.
pub fn build_grid(reference: NaiveDate, granularity: Granularity, first_day_of_week: u8) -> Vec<Cell> {
    TimeGrid::new(reference, granularity, first_day_of_week).into_cells()
}
