//! egui views. They render core models and forward user events to `RideApp`.

pub mod app_shell;
pub mod auth;
pub mod booking_panel;
pub mod constants;
pub mod flags_panel;
pub mod home;
pub mod loading;
pub mod location_selector;
pub mod map_view;
pub mod profile_header;
pub mod utils;
