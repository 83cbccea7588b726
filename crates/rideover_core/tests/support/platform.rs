#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use rideover_core::error::LocationError;
use rideover_core::geo::Coordinates;
use rideover_core::location_provider::{Accuracy, Address, PermissionStatus, PlatformLocation};

/// Location service that answers from a script of fixes, each with its own
/// latency, so tests can make an older request finish after a newer one.
pub struct ScriptedPlatform {
    /// Answers to successive permission requests; the last one repeats.
    permissions: Vec<Result<PermissionStatus, LocationError>>,
    permission_calls: AtomicUsize,
    fixes: Vec<(Duration, Coordinates)>,
    calls: AtomicUsize,
    geocode: Mutex<Result<Option<Address>, LocationError>>,
}

impl ScriptedPlatform {
    pub fn new(permission: Result<PermissionStatus, LocationError>) -> Self {
        Self {
            permissions: vec![permission],
            permission_calls: AtomicUsize::new(0),
            fixes: Vec::new(),
            calls: AtomicUsize::new(0),
            geocode: Mutex::new(Ok(None)),
        }
    }

    pub fn then_permission(mut self, permission: Result<PermissionStatus, LocationError>) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn with_fix(mut self, latency: Duration, at: Coordinates) -> Self {
        self.fixes.push((latency, at));
        self
    }

    pub fn with_geocode(self, result: Result<Option<Address>, LocationError>) -> Self {
        if let Ok(mut slot) = self.geocode.lock() {
            *slot = result;
        }
        self
    }

    pub fn position_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PlatformLocation for ScriptedPlatform {
    fn request_permission(&self) -> Result<PermissionStatus, LocationError> {
        let call = self.permission_calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.permissions.len() - 1);
        self.permissions[index].clone()
    }

    fn current_position(&self, _accuracy: Accuracy) -> Result<Coordinates, LocationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let Some((latency, at)) = self.fixes.get(call).copied() else {
            return Err(LocationError::PositionUnavailable("script exhausted".to_string()));
        };
        std::thread::sleep(latency);
        Ok(at)
    }

    fn reverse_geocode(&self, _at: Coordinates) -> Result<Option<Address>, LocationError> {
        self.geocode
            .lock()
            .map_err(|_| LocationError::Geocoder("poisoned".to_string()))?
            .clone()
    }
}
