//! Error types shared across the client core.
//!
//! Location errors never escape the location provider; they are logged and
//! degraded there. Auth errors travel back to the screen that started the
//! operation. Config errors abort startup.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission was not granted")]
    PermissionDenied,
    #[error("current position is unavailable: {0}")]
    PositionUnavailable(String),
    #[error("reverse geocoding failed: {0}")]
    Geocoder(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Rejected(String),
    #[error("identity service unreachable: {0}")]
    Network(String),
    #[error("session storage failed: {0}")]
    Storage(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file '{path}': {message}")]
    InvalidFormat { path: PathBuf, message: String },
    #[error("unsupported config file version {found} in '{path}'")]
    UnsupportedVersion { path: PathBuf, found: u32 },
    #[error("remote identity requires {0} to be set")]
    MissingIdentitySetting(&'static str),
    #[error("remote identity support is not compiled into this build")]
    RemoteIdentityUnavailable,
    #[error("failed to set up the identity client: {0}")]
    IdentityClient(String),
}
