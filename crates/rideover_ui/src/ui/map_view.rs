//! Home map: a flat projection of the visible region with the device
//! position, booking markers, and a tap-to-inspect pin.

use eframe::egui::{self, Align2, Color32, FontId, RichText, Stroke, StrokeKind};
use rideover_core::location_provider::PermissionStatus;
use rideover_core::map::{home_markers, MapEvent, MapMarker, MapRegion};

use crate::app::{DroppedPin, RideApp};
use crate::ui::constants::{
    BRAND, DROPPED_PIN, MAP_BACKGROUND, MAP_GRID, MARKER_RADIUS, SUCCESS_TEXT,
};
use crate::ui::utils::{marker_color, project, unproject};

const GRID_LINES: usize = 8;
const BOOK_BUTTON_HEIGHT: f32 = 44.0;

pub fn render_map_view(ui: &mut egui::Ui, app: &mut RideApp) {
    if app.location.is_loading() && app.location.current_position().is_none() {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.4);
            ui.spinner();
            ui.label("Loading map...");
        });
        return;
    }

    render_title(ui, app);

    let mut events = Vec::new();
    let region = app.map_region();
    let markers = home_markers(app.location.current_position(), &app.booking);

    let map_height = (ui.available_height() - BOOK_BUTTON_HEIGHT - 24.0).max(120.0);
    let (response, painter) = ui.allocate_painter(
        egui::vec2(ui.available_width(), map_height),
        egui::Sense::click(),
    );
    let rect = response.rect;
    painter.rect_filled(rect, 8.0, MAP_BACKGROUND);
    draw_grid(&painter, rect);
    for marker in &markers {
        draw_marker(&painter, &region, rect, marker);
    }
    if let Some(pin) = &app.dropped_pin {
        draw_dropped_pin(&painter, &region, rect, pin);
    }
    painter.rect_stroke(
        rect,
        8.0,
        Stroke::new(1.0, Color32::from_gray(160)),
        StrokeKind::Middle,
    );

    if response.clicked() {
        if let Some(at) = response
            .interact_pointer_pos()
            .and_then(|pos| unproject(&region, rect, pos))
        {
            events.push(MapEvent::Tapped(at));
        }
    }

    ui.add_space(8.0);
    if let Some(draft) = &app.last_booking {
        ui.colored_label(
            SUCCESS_TEXT,
            format!(
                "Ride requested: {} · {} · {}",
                draft.ride_type.option().name,
                draft.ride_type.option().price_label(),
                draft.estimated_time
            ),
        );
    }
    ui.vertical_centered(|ui| {
        let button = egui::Button::new(RichText::new("Book a Ride").strong().size(16.0))
            .fill(BRAND)
            .min_size(egui::vec2(ui.available_width() * 0.8, BOOK_BUTTON_HEIGHT));
        if ui.add_enabled(app.booking.can_start(), button).clicked() {
            events.push(MapEvent::StartBooking);
        }
    });

    for event in events {
        app.handle_map_event(event);
    }
}

fn render_title(ui: &mut egui::Ui, app: &mut RideApp) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("🚗").size(24.0));
        ui.vertical(|ui| {
            ui.label(RichText::new("RideOver").strong().size(20.0).color(BRAND));
            ui.weak("Your ride, your way");
        });
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let style = if app.flags.enable_mapbox {
                "Mapbox streets"
            } else {
                "Standard map"
            };
            ui.weak(style);
        });
    });

    if app.location.permission_status() == Some(PermissionStatus::Denied)
        || app.location.permission_status() == Some(PermissionStatus::Restricted)
    {
        ui.horizontal(|ui| {
            ui.weak("Location permission denied.");
            if ui.small_button("Try again").clicked() {
                app.location.request_permission();
            }
        });
    }
    ui.add_space(6.0);
}

fn draw_grid(painter: &egui::Painter, rect: egui::Rect) {
    let stroke = Stroke::new(1.0, MAP_GRID);
    for step in 1..GRID_LINES {
        let t = step as f32 / GRID_LINES as f32;
        let x = rect.left() + rect.width() * t;
        let y = rect.top() + rect.height() * t;
        painter.line_segment([egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())], stroke);
        painter.line_segment([egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)], stroke);
    }
}

fn draw_marker(
    painter: &egui::Painter,
    region: &MapRegion,
    rect: egui::Rect,
    marker: &MapMarker,
) {
    let Some(pos) = project(region, rect, marker.coordinates) else {
        return;
    };
    let color = marker_color(marker.kind);
    painter.circle_filled(pos, MARKER_RADIUS, color);
    painter.circle_stroke(pos, MARKER_RADIUS, Stroke::new(2.0, Color32::WHITE));
    painter.text(
        pos - egui::vec2(0.0, MARKER_RADIUS + 2.0),
        Align2::CENTER_BOTTOM,
        &marker.title,
        FontId::proportional(12.0),
        Color32::from_gray(30),
    );
}

fn draw_dropped_pin(
    painter: &egui::Painter,
    region: &MapRegion,
    rect: egui::Rect,
    pin: &DroppedPin,
) {
    let Some(pos) = project(region, rect, pin.coordinates) else {
        return;
    };
    painter.circle_filled(pos, MARKER_RADIUS * 0.7, DROPPED_PIN);
    let label = pin.address.as_deref().unwrap_or("Looking up address...");
    painter.text(
        pos + egui::vec2(0.0, MARKER_RADIUS + 2.0),
        Align2::CENTER_TOP,
        label,
        FontId::proportional(11.0),
        Color32::from_gray(50),
    );
}
