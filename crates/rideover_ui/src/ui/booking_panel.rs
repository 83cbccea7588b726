//! "Confirm Ride" sheet: trip details, tier choice, and the trip summary.

use eframe::egui::{self, Align2, RichText};
use rideover_core::ride::{ride_options, RideOption, RideTier};

use crate::app::RideApp;
use crate::ui::constants::{BRAND, SHEET_WIDTH};

pub fn render_booking_panel(ctx: &egui::Context, app: &mut RideApp) {
    let Some(panel) = app.booking.panel() else {
        return;
    };
    let pickup = panel.pickup().name.clone();
    let dropoff = panel.dropoff().name.clone();
    let summary = *panel.summary();
    let selected = panel.selected();
    let show_payment = app.flags.enable_payment;

    let mut back = false;
    let mut chosen: Option<RideTier> = None;
    let mut confirm = false;

    egui::Window::new("Confirm Ride")
        .id(egui::Id::new("booking_panel"))
        .collapsible(false)
        .resizable(false)
        .default_width(SHEET_WIDTH)
        .anchor(Align2::CENTER_BOTTOM, [0.0, -12.0])
        .show(ctx, |ui| {
            if ui.button("← Back").clicked() {
                back = true;
            }

            section_title(ui, "Trip Details");
            egui::Grid::new("trip_details")
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    ui.weak("Pickup");
                    ui.label(&pickup);
                    ui.end_row();
                    ui.weak("Destination");
                    ui.label(&dropoff);
                    ui.end_row();
                });

            section_title(ui, "Choose your ride");
            for option in ride_options() {
                if ride_option_row(ui, option, selected == Some(option.tier)).clicked() {
                    chosen = Some(option.tier);
                }
            }

            section_title(ui, "Trip Summary");
            egui::Grid::new("trip_summary")
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    ui.weak("Distance");
                    ui.label(summary.distance_label());
                    ui.end_row();
                    ui.weak("Estimated time");
                    ui.label(summary.duration_label());
                    ui.end_row();
                    if show_payment {
                        ui.weak("Payment method");
                        ui.label("Cash");
                        ui.end_row();
                    }
                });

            ui.add_space(12.0);
            let label = if selected.is_some() {
                "Confirm Ride"
            } else {
                "Select a ride type"
            };
            let button = egui::Button::new(RichText::new(label).strong())
                .fill(BRAND)
                .min_size(egui::vec2(ui.available_width(), 40.0));
            if ui.add_enabled(selected.is_some(), button).clicked() {
                confirm = true;
            }
        });

    if back {
        app.panel_back();
    } else if let Some(tier) = chosen {
        app.select_ride(tier);
    } else if confirm {
        app.confirm_ride();
    }
}

fn section_title(ui: &mut egui::Ui, title: &str) {
    ui.add_space(10.0);
    ui.label(RichText::new(title).strong().size(15.0));
    ui.add_space(4.0);
}

fn ride_option_row(ui: &mut egui::Ui, option: &RideOption, selected: bool) -> egui::Response {
    let text = format!(
        "{}  ·  {}\n{}  ·  {}",
        option.name,
        option.price_label(),
        option.description,
        option.estimated_time()
    );
    ui.add_sized(
        [ui.available_width(), 48.0],
        egui::Button::selectable(selected, text),
    )
}
