use eframe::egui::{self, RichText};
use rideover_core::flags::update_flag;

use crate::app::RideApp;

/// Read-only view of the resolved feature flags. Change requests are only
/// logged; flags are fixed for the lifetime of the app.
pub fn render_flags_panel(ctx: &egui::Context, app: &mut RideApp) {
    let mut open = app.show_flags;
    egui::Window::new("Feature flags")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            egui::Grid::new("feature_flags")
                .num_columns(3)
                .striped(true)
                .show(ui, |ui| {
                    for (flag, enabled) in app.flags.iter() {
                        ui.monospace(flag.key());
                        ui.label(if enabled {
                            RichText::new("on").strong()
                        } else {
                            RichText::new("off").weak()
                        });
                        if ui.small_button("Request toggle").clicked() {
                            update_flag(flag, !enabled);
                        }
                        ui.end_row();
                    }
                });
        });
    app.show_flags = open;
}
