pub mod booking_flow;
pub mod config;
pub mod error;
pub mod flags;
pub mod geo;
pub mod location;
pub mod location_provider;
pub mod map;
pub mod pending;
pub mod ride;
pub mod search;
pub mod session;
pub mod shell;
