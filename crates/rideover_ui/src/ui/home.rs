use eframe::egui;

use crate::app::RideApp;
use crate::ui::booking_panel::render_booking_panel;
use crate::ui::flags_panel::render_flags_panel;
use crate::ui::location_selector::render_location_selector;
use crate::ui::map_view::render_map_view;
use crate::ui::profile_header::{render_profile_header, render_sign_out_dialog};

/// Map with the profile header on top and the booking sheets over it.
pub fn render_home(ctx: &egui::Context, app: &mut RideApp) {
    egui::TopBottomPanel::top("profile_header").show(ctx, |ui| {
        render_profile_header(ui, app);
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        render_map_view(ui, app);
    });

    if app.booking.is_selector_open() {
        render_location_selector(ctx, app);
    }
    if app.booking.panel().is_some() {
        render_booking_panel(ctx, app);
    }
    if app.show_flags {
        render_flags_panel(ctx, app);
    }
    render_sign_out_dialog(ctx, app);
}
