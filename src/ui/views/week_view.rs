//! Week view model: the grid, the bookings in each cell and the drag
//! highlights, flattened into plain data a renderer can walk.

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveTime};

use crate::models::booking::{Booking, BookingId, BookingStatus};
use crate::models::cell::Cell;
use crate::services::grid::{TimeGrid, WeekWindow};
use crate::services::index::BookingIndex;
use crate::ui::drag::DragSession;
use crate::utils::date::format_day_header;

const COLUMN_WIDTH: usize = 18;
const LABEL_WIDTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingCard {
    pub id: BookingId,
    pub subject_name: String,
    pub status: BookingStatus,
    pub scheduled: NaiveDate,
    pub time: Option<NaiveTime>,
    /// Waiting for the backend to confirm a move.
    pub confirming: bool,
    /// Picked up by the active drag session.
    pub dragging: bool,
}

impl BookingCard {
    fn new(booking: &Booking, confirming: bool, dragging: bool) -> Self {
        Self {
            id: booking.id.clone(),
            subject_name: booking.subject_name.clone(),
            status: booking.status,
            scheduled: booking.scheduled_at.date,
            time: booking.scheduled_at.time,
            confirming,
            dragging,
        }
    }

    fn label(&self) -> String {
        let mut label = self.subject_name.clone();
        if self.confirming {
            label.push('…');
        }
        if self.dragging {
            label.insert(0, '>');
        }
        label
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub cell: Cell,
    pub is_past: bool,
    pub hovered: bool,
    pub cards: Vec<BookingCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekView {
    pub window: WeekWindow,
    pub days: Vec<NaiveDate>,
    pub rows: Vec<Option<NaiveTime>>,
    /// Day-major, matching the grid's cell order.
    pub cells: Vec<CellView>,
    /// Bookings of this week that fall outside the grid's hours.
    pub overflow: Vec<BookingCard>,
    /// No data for this week has been fetched yet.
    pub loading: bool,
}

impl WeekView {
    pub fn build(
        grid: &TimeGrid,
        index: Option<&BookingIndex>,
        today: NaiveDate,
        drag: Option<&DragSession>,
        is_confirming: impl Fn(&BookingId) -> bool,
    ) -> Self {
        let hovered = drag.and_then(|session| session.hovered);
        let dragged = drag.map(|session| &session.booking_id);

        let card = |booking: &Booking| {
            BookingCard::new(
                booking,
                is_confirming(&booking.id),
                dragged == Some(&booking.id),
            )
        };

        let cells = grid
            .cells()
            .iter()
            .map(|cell| CellView {
                cell: *cell,
                is_past: cell.day < today,
                hovered: hovered == Some(*cell),
                cards: index
                    .map(|index| index.bookings_at(cell).iter().map(&card).collect())
                    .unwrap_or_default(),
            })
            .collect();

        let overflow = index
            .map(|index| {
                index
                    .bookings()
                    .iter()
                    .filter(|booking| {
                        index
                            .find_cell(&booking.id)
                            .is_some_and(|cell| !grid.contains(&cell))
                    })
                    .map(&card)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            window: grid.window,
            days: grid.days(),
            rows: grid.rows(),
            cells,
            overflow,
            loading: index.is_none(),
        }
    }

    pub fn cell(&self, cell: &Cell) -> Option<&CellView> {
        self.cells.iter().find(|view| view.cell == *cell)
    }

    pub fn card(&self, id: &BookingId) -> Option<&BookingCard> {
        self.cells
            .iter()
            .flat_map(|view| view.cards.iter())
            .chain(self.overflow.iter())
            .find(|card| card.id == *id)
    }

    pub fn booking_count(&self) -> usize {
        self.cells.iter().map(|view| view.cards.len()).sum::<usize>() + self.overflow.len()
    }

    fn at(&self, day: usize, row: usize) -> Option<&CellView> {
        self.cells.get(day * self.rows.len() + row)
    }

    /// Plain-text table of the week, one line per booking row.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Week of {} to {}",
            self.window.start.format("%Y-%m-%d"),
            self.window.end().format("%Y-%m-%d")
        );

        if self.loading {
            out.push_str("(loading)\n");
            return out;
        }

        let _ = write!(out, "{:<w$}", "", w = LABEL_WIDTH);
        for day in &self.days {
            let _ = write!(out, "| {:<w$}", format_day_header(*day), w = COLUMN_WIDTH - 2);
        }
        out.push('\n');

        for (row_index, row) in self.rows.iter().enumerate() {
            let label = row.map(|time| time.format("%H:%M").to_string()).unwrap_or_default();
            let depth = (0..self.days.len())
                .filter_map(|day| self.at(day, row_index))
                .map(|view| view.cards.len())
                .max()
                .unwrap_or(0)
                .max(1);

            for line in 0..depth {
                let lead = if line == 0 { label.as_str() } else { "" };
                let _ = write!(out, "{:<w$}", lead, w = LABEL_WIDTH);
                for day in 0..self.days.len() {
                    let text = self
                        .at(day, row_index)
                        .map(|view| cell_line(view, line))
                        .unwrap_or_default();
                    let _ = write!(out, "| {:<w$}", truncate(&text, COLUMN_WIDTH - 2), w = COLUMN_WIDTH - 2);
                }
                out.push('\n');
            }
        }

        if !self.overflow.is_empty() {
            out.push_str("Outside board hours:\n");
            for card in &self.overflow {
                let time = card.time.map(|t| t.format(" %H:%M").to_string()).unwrap_or_default();
                let _ = writeln!(out, "  {}{} {}", card.scheduled.format("%Y-%m-%d"), time, card.label());
            }
        }

        out
    }
}

fn cell_line(view: &CellView, line: usize) -> String {
    match view.cards.get(line) {
        Some(card) => card.label(),
        None if line == 0 && view.hovered => "[drop here]".to_string(),
        None if line == 0 && view.is_past => "·".to_string(),
        None => String::new(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}
