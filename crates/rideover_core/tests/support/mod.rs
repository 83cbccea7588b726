pub mod fixtures;
pub mod identity;
pub mod platform;
