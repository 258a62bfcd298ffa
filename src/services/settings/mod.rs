// Settings service module

pub mod service;

pub use service::SettingsService;
