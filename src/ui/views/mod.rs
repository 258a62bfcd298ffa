pub mod week_view;

pub use week_view::{BookingCard, CellView, WeekView};
