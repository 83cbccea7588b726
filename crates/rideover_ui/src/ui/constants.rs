//! Colors and sizes shared by the views.

use std::time::Duration;

use eframe::egui::Color32;

pub const WINDOW_TITLE: &str = "RideOver";
pub const WINDOW_SIZE: [f32; 2] = [420.0, 820.0];
pub const WINDOW_MIN_SIZE: [f32; 2] = [360.0, 640.0];

/// Repaint cadence while background work is in flight.
pub const BUSY_REPAINT: Duration = Duration::from_millis(50);
/// Repaint cadence while only the position watch is running.
pub const WATCH_REPAINT: Duration = Duration::from_millis(500);

pub const BRAND: Color32 = Color32::from_rgb(0, 122, 255);
pub const ERROR_TEXT: Color32 = Color32::from_rgb(220, 53, 69);
pub const SUCCESS_TEXT: Color32 = Color32::from_rgb(40, 167, 69);
pub const DESTRUCTIVE: Color32 = Color32::from_rgb(255, 59, 48);

pub const MAP_BACKGROUND: Color32 = Color32::from_rgb(232, 236, 228);
pub const MAP_GRID: Color32 = Color32::from_rgb(210, 214, 206);
pub const CURRENT_POSITION: Color32 = BRAND;
pub const PICKUP_MARKER: Color32 = Color32::from_rgb(52, 199, 89);
pub const DROPOFF_MARKER: Color32 = Color32::from_rgb(255, 59, 48);
pub const DROPPED_PIN: Color32 = Color32::from_rgb(255, 149, 0);

pub const MARKER_RADIUS: f32 = 7.0;
pub const SHEET_WIDTH: f32 = 380.0;
pub const FORM_WIDTH: f32 = 300.0;
