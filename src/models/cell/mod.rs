// Cell module
// One droppable (day, slot) region of the weekly grid

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Addressable region of the grid. Day boards leave `slot` empty.
///
/// Days are calendar dates, never instants, so two cells compare equal
/// exactly when they name the same date and the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub day: NaiveDate,
    pub slot: Option<NaiveTime>,
}

impl Cell {
    pub fn day(day: NaiveDate) -> Self {
        Self { day, slot: None }
    }

    pub fn slot(day: NaiveDate, slot: NaiveTime) -> Self {
        Self {
            day,
            slot: Some(slot),
        }
    }

    pub fn key(&self) -> CellKey {
        CellKey::from(self)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            Some(slot) => write!(f, "{} {}", self.day.format("%a %Y-%m-%d"), slot.format("%H:%M")),
            None => write!(f, "{}", self.day.format("%a %Y-%m-%d")),
        }
    }
}

/// Canonical string form of a cell: `2025-06-10` or `2025-06-10T09:30`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey(String);

impl CellKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Cell> for CellKey {
    fn from(cell: &Cell) -> Self {
        let key = match cell.slot {
            Some(slot) => format!("{}T{}", cell.day.format("%Y-%m-%d"), slot.format("%H:%M")),
            None => cell.day.format("%Y-%m-%d").to_string(),
        };
        CellKey(key)
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
