// Module exports for models

pub mod board;
pub mod booking;
pub mod cell;
pub mod movement;
pub mod settings;
