//! Map surface model: the visible region, markers, and tap events.

use crate::booking_flow::BookingFlow;
use crate::geo::Coordinates;

pub const DEFAULT_CENTER: Coordinates = Coordinates::new(5.6037, -0.1870);
pub const DEFAULT_LATITUDE_DELTA: f64 = 0.0922;
pub const DEFAULT_LONGITUDE_DELTA: f64 = 0.0421;

/// Center plus the full latitude/longitude span shown on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRegion {
    pub center: Coordinates,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    pub fn new(center: Coordinates, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            center,
            latitude_delta,
            longitude_delta,
        }
    }

    /// Centers on `current` when known, otherwise on `fallback`.
    pub fn centered_on(
        current: Option<Coordinates>,
        fallback: Coordinates,
        latitude_delta: f64,
        longitude_delta: f64,
    ) -> Self {
        Self::new(current.unwrap_or(fallback), latitude_delta, longitude_delta)
    }

    pub fn lat_min(&self) -> f64 {
        self.center.latitude - self.latitude_delta * 0.5
    }

    pub fn lat_max(&self) -> f64 {
        self.center.latitude + self.latitude_delta * 0.5
    }

    pub fn lng_min(&self) -> f64 {
        self.center.longitude - self.longitude_delta * 0.5
    }

    pub fn lng_max(&self) -> f64 {
        self.center.longitude + self.longitude_delta * 0.5
    }

    /// Position inside the region as `(x, y)` in `0..=1`, y growing southwards.
    /// `None` for points outside the region or a degenerate region.
    pub fn normalize(&self, point: Coordinates) -> Option<(f64, f64)> {
        if self.latitude_delta <= 0.0 || self.longitude_delta <= 0.0 {
            return None;
        }
        let x = (point.longitude - self.lng_min()) / self.longitude_delta;
        let y = (self.lat_max() - point.latitude) / self.latitude_delta;
        if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
            return None;
        }
        Some((x, y))
    }

    /// Inverse of [`MapRegion::normalize`], used to turn a tap into coordinates.
    pub fn denormalize(&self, x: f64, y: f64) -> Coordinates {
        Coordinates::new(
            self.lat_max() - y * self.latitude_delta,
            self.lng_min() + x * self.longitude_delta,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    CurrentPosition,
    Pickup,
    Dropoff,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub coordinates: Coordinates,
    pub title: String,
    pub description: String,
    pub kind: MarkerKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    Tapped(Coordinates),
    StartBooking,
}

/// Markers for the home map: the device position plus whatever the booking
/// flow has captured so far.
pub fn home_markers(current: Option<Coordinates>, flow: &BookingFlow) -> Vec<MapMarker> {
    let mut markers = Vec::new();
    if let Some(coordinates) = current {
        markers.push(MapMarker {
            coordinates,
            title: "Your Location".to_string(),
            description: "Current position".to_string(),
            kind: MarkerKind::CurrentPosition,
        });
    }
    if let Some(pickup) = flow.pickup() {
        markers.push(MapMarker {
            coordinates: pickup.coordinates,
            title: pickup.name.clone(),
            description: "Pickup".to_string(),
            kind: MarkerKind::Pickup,
        });
    }
    if let Some(dropoff) = flow.dropoff() {
        markers.push(MapMarker {
            coordinates: dropoff.coordinates,
            title: dropoff.name.clone(),
            description: "Destination".to_string(),
            kind: MarkerKind::Dropoff,
        });
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking_flow::DropoffCancelPolicy;
    use crate::location::LocationCatalog;

    #[test]
    fn region_falls_back_to_default_center() {
        let region = MapRegion::centered_on(
            None,
            DEFAULT_CENTER,
            DEFAULT_LATITUDE_DELTA,
            DEFAULT_LONGITUDE_DELTA,
        );
        assert_eq!(region.center, DEFAULT_CENTER);
        let here = Coordinates::new(5.61, -0.19);
        let region = MapRegion::centered_on(
            Some(here),
            DEFAULT_CENTER,
            DEFAULT_LATITUDE_DELTA,
            DEFAULT_LONGITUDE_DELTA,
        );
        assert_eq!(region.center, here);
    }

    #[test]
    fn center_normalizes_to_middle_and_back() {
        let region = MapRegion::new(DEFAULT_CENTER, 0.1, 0.04);
        let (x, y) = region.normalize(DEFAULT_CENTER).expect("center is inside");
        assert!((x - 0.5).abs() < 1e-9 && (y - 0.5).abs() < 1e-9);
        let north_west = region.denormalize(0.0, 0.0);
        assert!((north_west.latitude - region.lat_max()).abs() < 1e-12);
        assert!((north_west.longitude - region.lng_min()).abs() < 1e-12);
    }

    #[test]
    fn outside_points_do_not_project() {
        let region = MapRegion::new(DEFAULT_CENTER, 0.1, 0.04);
        assert!(region
            .normalize(Coordinates::new(DEFAULT_CENTER.latitude + 1.0, DEFAULT_CENTER.longitude))
            .is_none());
        let flat = MapRegion::new(DEFAULT_CENTER, 0.0, 0.04);
        assert!(flat.normalize(DEFAULT_CENTER).is_none());
    }

    #[test]
    fn markers_follow_booking_progress() {
        let catalog = LocationCatalog::popular();
        let mut flow = BookingFlow::new(DropoffCancelPolicy::ClearPickup, true);
        assert_eq!(home_markers(None, &flow).len(), 0);

        flow.start_booking();
        flow.location_selected(catalog.entries()[0].clone());
        let markers = home_markers(Some(DEFAULT_CENTER), &flow);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].kind, MarkerKind::CurrentPosition);
        assert_eq!(markers[1].kind, MarkerKind::Pickup);
        assert_eq!(markers[1].title, "Accra Mall");
    }
}
