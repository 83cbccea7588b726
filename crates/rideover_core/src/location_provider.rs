//! Device location: permission, current position, reverse geocoding, and
//! position watching.
//!
//! Platform calls run on worker threads and report back over a channel that
//! the UI drains with [`LocationProvider::poll`]. Failures never propagate:
//! a denied permission or missing fix leaves the position empty, and a
//! geocoder failure becomes a fixed placeholder string.

mod simulated;
mod watch;

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LocationError;
use crate::geo::Coordinates;
use crate::pending::Pending;

pub use simulated::SimulatedPlatform;
pub use watch::{PositionWatch, WatchOptions};

pub const ADDRESS_NOT_FOUND: &str = "Address not found";
pub const ADDRESS_UNAVAILABLE: &str = "Address unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Restricted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Accuracy {
    Lowest,
    Low,
    Balanced,
    #[default]
    High,
    Highest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
}

impl Address {
    /// `"<street> <city>"` with missing parts left out.
    pub fn display_line(&self) -> String {
        format!(
            "{} {}",
            self.street.as_deref().unwrap_or(""),
            self.city.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// Operations the host platform's location service offers.
pub trait PlatformLocation: Send + Sync {
    fn request_permission(&self) -> Result<PermissionStatus, LocationError>;
    fn current_position(&self, accuracy: Accuracy) -> Result<Coordinates, LocationError>;
    fn reverse_geocode(&self, at: Coordinates) -> Result<Option<Address>, LocationError>;
}

#[derive(Debug)]
enum ProviderUpdate {
    Permission {
        seq: u64,
        status: PermissionStatus,
    },
    Position {
        seq: u64,
        position: Option<Coordinates>,
    },
}

pub struct LocationProvider {
    platform: Arc<dyn PlatformLocation>,
    current: Option<Coordinates>,
    permission: Option<PermissionStatus>,
    loading: bool,
    latest_seq: u64,
    permission_seq: u64,
    sender: Sender<ProviderUpdate>,
    receiver: Receiver<ProviderUpdate>,
}

impl LocationProvider {
    /// Creates the provider and immediately asks for permission; when
    /// granted, the current position is fetched right after.
    pub fn start(platform: Arc<dyn PlatformLocation>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let mut provider = Self {
            platform,
            current: None,
            permission: None,
            loading: true,
            latest_seq: 0,
            permission_seq: 0,
            sender,
            receiver,
        };
        provider.request_permission();
        provider
    }

    pub fn current_position(&self) -> Option<Coordinates> {
        self.current
    }

    pub fn permission_status(&self) -> Option<PermissionStatus> {
        self.permission
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Asks for permission again. Nothing retries on its own after a denial.
    pub fn request_permission(&mut self) {
        self.loading = true;
        let seq = self.next_seq();
        self.permission_seq = seq;
        let platform = Arc::clone(&self.platform);
        let sender = self.sender.clone();
        std::thread::spawn(move || {
            let status = match platform.request_permission() {
                Ok(status) => status,
                Err(error) => {
                    warn!(%error, "location permission request failed");
                    PermissionStatus::Denied
                }
            };
            if sender
                .send(ProviderUpdate::Permission { seq, status })
                .is_err()
            {
                return;
            }
            let position = if status == PermissionStatus::Granted {
                fetch_position(platform.as_ref())
            } else {
                None
            };
            let _ = sender.send(ProviderUpdate::Position { seq, position });
        });
    }

    /// Fetches a fresh fix without asking for permission again.
    pub fn refresh_position(&mut self) {
        self.loading = true;
        let seq = self.next_seq();
        let platform = Arc::clone(&self.platform);
        let sender = self.sender.clone();
        std::thread::spawn(move || {
            let position = fetch_position(platform.as_ref());
            let _ = sender.send(ProviderUpdate::Position { seq, position });
        });
    }

    /// Applies updates from workers. Returns true when anything changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(update) = self.receiver.try_recv() {
            changed |= self.apply(update);
        }
        changed
    }

    /// Blocks until outstanding requests settle or `timeout` passes.
    pub fn wait_until_settled(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.poll();
        while self.loading {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(update) => {
                    self.apply(update);
                }
                Err(_) => break,
            }
        }
        !self.loading
    }

    /// Best-effort address line for `at`, resolved in the background.
    pub fn reverse_geocode(&self, at: Coordinates) -> Pending<String> {
        let platform = Arc::clone(&self.platform);
        Pending::spawn(move || resolve_address(platform.as_ref(), at))
    }

    /// Subscribes to position changes; dropping the handle unsubscribes.
    pub fn watch(&self, options: WatchOptions) -> PositionWatch {
        PositionWatch::spawn(Arc::clone(&self.platform), options)
    }

    /// Position reported by a watch; only accepted once permission is granted.
    pub fn observe_position(&mut self, position: Coordinates) {
        if self.permission == Some(PermissionStatus::Granted) {
            self.current = Some(position);
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.latest_seq += 1;
        self.latest_seq
    }

    fn apply(&mut self, update: ProviderUpdate) -> bool {
        match update {
            ProviderUpdate::Permission { seq, status } => {
                if seq != self.permission_seq {
                    debug!(seq, latest = self.permission_seq, "discarding stale permission");
                    return false;
                }
                debug!(?status, "location permission resolved");
                self.permission = Some(status);
                if status != PermissionStatus::Granted {
                    self.current = None;
                }
                true
            }
            ProviderUpdate::Position { seq, position } => {
                if seq != self.latest_seq {
                    debug!(seq, latest = self.latest_seq, "discarding stale position");
                    return false;
                }
                self.loading = false;
                if position.is_some() {
                    self.current = position;
                }
                true
            }
        }
    }
}

fn fetch_position(platform: &dyn PlatformLocation) -> Option<Coordinates> {
    match platform.current_position(Accuracy::High) {
        Ok(position) => Some(position),
        Err(error) => {
            warn!(%error, "failed to get current position");
            None
        }
    }
}

/// Reverse geocodes `at`, degrading to a placeholder on any failure.
pub fn resolve_address(platform: &dyn PlatformLocation, at: Coordinates) -> String {
    match platform.reverse_geocode(at) {
        Ok(Some(address)) => address.display_line(),
        Ok(None) => ADDRESS_NOT_FOUND.to_string(),
        Err(error) => {
            warn!(%error, "reverse geocoding failed");
            ADDRESS_UNAVAILABLE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenGeocoder;

    impl PlatformLocation for BrokenGeocoder {
        fn request_permission(&self) -> Result<PermissionStatus, LocationError> {
            Err(LocationError::PermissionDenied)
        }

        fn current_position(&self, _: Accuracy) -> Result<Coordinates, LocationError> {
            Err(LocationError::PositionUnavailable("no fix".to_string()))
        }

        fn reverse_geocode(&self, _: Coordinates) -> Result<Option<Address>, LocationError> {
            Err(LocationError::Geocoder("offline".to_string()))
        }
    }

    #[test]
    fn address_line_skips_missing_parts() {
        let full = Address {
            street: Some("Oxford St".to_string()),
            city: Some("Accra".to_string()),
        };
        assert_eq!(full.display_line(), "Oxford St Accra");
        let city_only = Address {
            street: None,
            city: Some("Accra".to_string()),
        };
        assert_eq!(city_only.display_line(), "Accra");
    }

    #[test]
    fn geocoder_failure_degrades_to_placeholder() {
        let at = Coordinates::new(0.0, 0.0);
        assert_eq!(resolve_address(&BrokenGeocoder, at), ADDRESS_UNAVAILABLE);
    }

    #[test]
    fn failed_permission_request_counts_as_denied() {
        let mut provider = LocationProvider::start(Arc::new(BrokenGeocoder));
        assert!(provider.is_loading());
        assert!(provider.wait_until_settled(Duration::from_secs(5)));
        assert_eq!(provider.permission_status(), Some(PermissionStatus::Denied));
        assert!(provider.current_position().is_none());
    }

    #[test]
    fn stale_position_is_discarded() {
        let mut provider = LocationProvider::start(Arc::new(BrokenGeocoder));
        provider.wait_until_settled(Duration::from_secs(5));
        provider.latest_seq = 7;
        provider.loading = true;
        let stale = ProviderUpdate::Position {
            seq: 6,
            position: Some(Coordinates::new(1.0, 1.0)),
        };
        assert!(!provider.apply(stale));
        assert!(provider.is_loading());
        assert!(provider.current_position().is_none());
    }

    #[test]
    fn stale_permission_answer_does_not_overwrite_newer_one() {
        let mut provider = LocationProvider::start(Arc::new(BrokenGeocoder));
        provider.wait_until_settled(Duration::from_secs(5));
        provider.permission = Some(PermissionStatus::Granted);
        provider.current = Some(Coordinates::new(5.6, -0.18));
        provider.permission_seq = 4;
        let stale = ProviderUpdate::Permission {
            seq: 3,
            status: PermissionStatus::Denied,
        };
        assert!(!provider.apply(stale));
        assert_eq!(provider.permission_status(), Some(PermissionStatus::Granted));
        assert!(provider.current_position().is_some());

        let fresh = ProviderUpdate::Permission {
            seq: 4,
            status: PermissionStatus::Restricted,
        };
        assert!(provider.apply(fresh));
        assert!(provider.current_position().is_none());
    }
}
