//! Coordinate helpers: haversine distance and trip time estimates.

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Average door-to-door speed used for trip time estimates in city traffic.
pub const AVERAGE_URBAN_SPEED_KMH: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Great-circle distance between two points in kilometers.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lon1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lon2) = (b.latitude.to_radians(), b.longitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn distance_m(a: Coordinates, b: Coordinates) -> f64 {
    distance_km(a, b) * 1000.0
}

/// Driving minutes for `distance_km` at [`AVERAGE_URBAN_SPEED_KMH`].
pub fn estimated_trip_minutes(distance_km: f64) -> f64 {
    if distance_km <= 0.0 {
        return 0.0;
    }
    distance_km / AVERAGE_URBAN_SPEED_KMH * 60.0
}
