//! Map projection helpers between geographic coordinates and screen space.

use eframe::egui::{self, Color32};
use rideover_core::geo::Coordinates;
use rideover_core::map::{MapRegion, MarkerKind};

use crate::ui::constants::{CURRENT_POSITION, DROPOFF_MARKER, PICKUP_MARKER};

/// Screen position of `point` inside `rect`, or `None` when it is off the map.
pub fn project(region: &MapRegion, rect: egui::Rect, point: Coordinates) -> Option<egui::Pos2> {
    let (x, y) = region.normalize(point)?;
    Some(egui::pos2(
        rect.left() + rect.width() * x as f32,
        rect.top() + rect.height() * y as f32,
    ))
}

/// Coordinates under the screen position `pos`.
pub fn unproject(region: &MapRegion, rect: egui::Rect, pos: egui::Pos2) -> Option<Coordinates> {
    if rect.width() <= 0.0 || rect.height() <= 0.0 || !rect.contains(pos) {
        return None;
    }
    let x = ((pos.x - rect.left()) / rect.width()) as f64;
    let y = ((pos.y - rect.top()) / rect.height()) as f64;
    Some(region.denormalize(x, y))
}

pub fn marker_color(kind: MarkerKind) -> Color32 {
    match kind {
        MarkerKind::CurrentPosition => CURRENT_POSITION,
        MarkerKind::Pickup => PICKUP_MARKER,
        MarkerKind::Dropoff => DROPOFF_MARKER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rideover_core::map::{DEFAULT_CENTER, DEFAULT_LATITUDE_DELTA, DEFAULT_LONGITUDE_DELTA};

    fn region() -> MapRegion {
        MapRegion::new(DEFAULT_CENTER, DEFAULT_LATITUDE_DELTA, DEFAULT_LONGITUDE_DELTA)
    }

    fn rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(200.0, 400.0))
    }

    #[test]
    fn center_projects_to_rect_center() {
        let pos = project(&region(), rect(), DEFAULT_CENTER).expect("on map");
        assert!((pos.x - 110.0).abs() < 1e-3);
        assert!((pos.y - 220.0).abs() < 1e-3);
    }

    #[test]
    fn tap_round_trips_to_nearby_coordinates() {
        let tapped = egui::pos2(60.0, 320.0);
        let at = unproject(&region(), rect(), tapped).expect("inside map");
        let back = project(&region(), rect(), at).expect("on map");
        assert!((back.x - tapped.x).abs() < 1e-2);
        assert!((back.y - tapped.y).abs() < 1e-2);
        assert!(at.latitude < DEFAULT_CENTER.latitude);
        assert!(at.longitude < DEFAULT_CENTER.longitude);
    }

    #[test]
    fn far_points_and_outside_taps_are_dropped() {
        assert!(project(&region(), rect(), Coordinates::new(6.7, -1.6)).is_none());
        assert!(unproject(&region(), rect(), egui::pos2(0.0, 0.0)).is_none());
    }
}
