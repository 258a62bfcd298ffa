// Service module exports

pub mod grid;
pub mod index;
pub mod notification;
pub mod pipeline;
pub mod remote;
pub mod settings;
pub mod store;
pub mod sync;
pub mod validation;
