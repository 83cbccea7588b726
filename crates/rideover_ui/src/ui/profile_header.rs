use eframe::egui::{self, Align, Align2, Layout, RichText};
use rideover_core::session::SessionView;

use crate::app::RideApp;
use crate::ui::constants::{DESTRUCTIVE, ERROR_TEXT};

pub fn render_profile_header(ui: &mut egui::Ui, app: &mut RideApp) {
    let (name, email) = match app.session.user() {
        Some(user) => (user.display_name().to_string(), user.email.clone()),
        None => ("User".to_string(), String::new()),
    };

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(RichText::new(format!("Hello, {name}")).strong().size(16.0));
            ui.weak(email);
        });
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            let signing_out = app.is_signing_out();
            let label = if signing_out { "Signing out..." } else { "Sign Out" };
            let sign_out = egui::Button::new(RichText::new(label).color(DESTRUCTIVE));
            if ui.add_enabled(!signing_out, sign_out).clicked() {
                app.request_sign_out();
            }
            if ui
                .selectable_label(app.show_flags, "⚙")
                .on_hover_text("Feature flags")
                .clicked()
            {
                app.show_flags = !app.show_flags;
            }
        });
    });
    if let Some(error) = &app.sign_out_error {
        ui.colored_label(ERROR_TEXT, error);
    }
    ui.add_space(6.0);
}

/// "Are you sure?" confirmation before signing out.
pub fn render_sign_out_dialog(ctx: &egui::Context, app: &mut RideApp) {
    if !app.confirm_sign_out {
        return;
    }
    let mut cancel = false;
    let mut confirm = false;
    egui::Window::new("Sign Out")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label("Are you sure you want to sign out?");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    cancel = true;
                }
                if ui
                    .button(RichText::new("Sign Out").color(DESTRUCTIVE))
                    .clicked()
                {
                    confirm = true;
                }
            });
        });

    if confirm {
        app.sign_out();
    } else if cancel {
        app.cancel_sign_out();
    }
}
