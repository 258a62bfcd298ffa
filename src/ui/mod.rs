// UI module
// Board state, drag handling and view models; no widget toolkit

pub mod app;
pub mod drag;
pub mod views;

pub use app::ScheduleBoard;
