//! "Select Location" sheet used for both pickup and destination.

use eframe::egui::{self, Align2, RichText};
use rideover_core::booking_flow::BookingStep;
use rideover_core::location::Location;

use crate::app::RideApp;
use crate::ui::constants::SHEET_WIDTH;

const RESULTS_HEIGHT: f32 = 320.0;

pub fn render_location_selector(ctx: &egui::Context, app: &mut RideApp) {
    let step_label = match app.booking.step() {
        BookingStep::SelectingPickup => "Pickup",
        _ => "Destination",
    };
    let current = app.location.current_position();

    let mut back = false;
    let mut use_current = false;
    let mut picked: Option<Location> = None;

    egui::Window::new("Select Location")
        .id(egui::Id::new("location_selector"))
        .collapsible(false)
        .resizable(false)
        .default_width(SHEET_WIDTH)
        .anchor(Align2::CENTER_BOTTOM, [0.0, -12.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("← Back").clicked() {
                    back = true;
                }
                ui.label(RichText::new(step_label).strong());
            });
            ui.add_space(6.0);

            let mut query = app.search.query().to_string();
            let search = ui.add(
                egui::TextEdit::singleline(&mut query)
                    .hint_text("Search for a location...")
                    .desired_width(f32::INFINITY),
            );
            if search.changed() {
                app.search.set_query(query);
            }

            ui.add_space(6.0);
            if ui
                .add_enabled(current.is_some(), egui::Button::new("📍 Use Current Location"))
                .clicked()
            {
                use_current = true;
            }

            ui.separator();
            ui.label(RichText::new("Popular Locations").strong());
            if app.search.is_loading() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Searching...");
                });
            } else if app.search.results().is_empty() {
                ui.weak("No locations found");
            } else {
                egui::ScrollArea::vertical()
                    .max_height(RESULTS_HEIGHT)
                    .show(ui, |ui| {
                        for location in app.search.results() {
                            if location_row(ui, location).clicked() {
                                picked = Some(location.clone());
                            }
                        }
                    });
            }
        });

    if back {
        app.selector_back();
    } else if use_current {
        app.use_current_location();
    } else if let Some(location) = picked {
        app.select_location(location);
    }
}

fn location_row(ui: &mut egui::Ui, location: &Location) -> egui::Response {
    let text = format!("{}\n{}", location.name, location.address);
    ui.add_sized(
        [ui.available_width(), 44.0],
        egui::Button::new(text).frame(false),
    )
}
