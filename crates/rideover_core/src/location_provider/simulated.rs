use std::sync::{Arc, Mutex};

use super::{Accuracy, Address, PermissionStatus, PlatformLocation};
use crate::error::LocationError;
use crate::geo::{distance_km, Coordinates};
use crate::location::LocationCatalog;

/// Places within this radius of a catalog entry geocode to that entry.
const GEOCODE_RADIUS_KM: f64 = 1.5;

/// Stand-in location service for hosts without GPS. The device sits at a
/// configured position that can be moved at runtime, and reverse geocoding
/// answers from the nearest catalog entry.
pub struct SimulatedPlatform {
    permission: PermissionStatus,
    position: Mutex<Option<Coordinates>>,
    gazetteer: Arc<LocationCatalog>,
}

impl SimulatedPlatform {
    pub fn new(
        permission: PermissionStatus,
        position: Option<Coordinates>,
        gazetteer: Arc<LocationCatalog>,
    ) -> Self {
        Self {
            permission,
            position: Mutex::new(position),
            gazetteer,
        }
    }

    pub fn move_to(&self, position: Option<Coordinates>) {
        if let Ok(mut slot) = self.position.lock() {
            *slot = position;
        }
    }
}

impl PlatformLocation for SimulatedPlatform {
    fn request_permission(&self) -> Result<PermissionStatus, LocationError> {
        Ok(self.permission)
    }

    fn current_position(&self, _accuracy: Accuracy) -> Result<Coordinates, LocationError> {
        if self.permission != PermissionStatus::Granted {
            return Err(LocationError::PermissionDenied);
        }
        let position = self
            .position
            .lock()
            .map_err(|_| LocationError::PositionUnavailable("position lock poisoned".to_string()))?;
        position.ok_or_else(|| LocationError::PositionUnavailable("no fix".to_string()))
    }

    fn reverse_geocode(&self, at: Coordinates) -> Result<Option<Address>, LocationError> {
        let nearest = self
            .gazetteer
            .entries()
            .iter()
            .map(|location| (distance_km(location.coordinates, at), location))
            .filter(|(distance, _)| *distance <= GEOCODE_RADIUS_KM)
            .min_by(|left, right| left.0.total_cmp(&right.0));
        Ok(nearest.map(|(_, location)| Address {
            street: Some(location.name.clone()),
            city: location
                .address
                .rsplit(',')
                .next()
                .map(|city| city.trim().to_string()),
        }))
    }
}
