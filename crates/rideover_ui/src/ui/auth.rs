//! Login and registration screens. Provider errors are shown inline on the
//! screen that started the request.

use eframe::egui::{self, RichText};

use crate::app::RideApp;
use crate::ui::constants::{BRAND, ERROR_TEXT, FORM_WIDTH, SUCCESS_TEXT};

pub fn render_login(ctx: &egui::Context, app: &mut RideApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(64.0);
            brand_header(ui, "Sign in to continue");

            if let Some(notice) = &app.login.notice {
                ui.colored_label(SUCCESS_TEXT, notice);
                ui.add_space(8.0);
            }

            let busy = app.login.is_busy();
            ui.add_enabled_ui(!busy, |ui| {
                text_field(ui, &mut app.login.email, "Email", false);
                let password = text_field(ui, &mut app.login.password, "Password", true);
                if password.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter)) {
                    app.submit_login();
                }
            });

            if let Some(error) = &app.login.error {
                ui.colored_label(ERROR_TEXT, error);
            }

            ui.add_space(12.0);
            let label = if busy { "Signing in..." } else { "Sign In" };
            if ui
                .add_enabled(!busy, egui::Button::new(label).min_size(button_size()))
                .clicked()
            {
                app.submit_login();
            }

            ui.add_space(16.0);
            if ui.link("Don't have an account? Sign Up").clicked() {
                app.show_register();
            }
        });
    });
}

pub fn render_register(ctx: &egui::Context, app: &mut RideApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            brand_header(ui, "Create your account");

            let busy = app.register.is_busy();
            let fields = &mut app.register.fields;
            ui.add_enabled_ui(!busy, |ui| {
                text_field(ui, &mut fields.full_name, "Full Name", false);
                text_field(ui, &mut fields.email, "Email", false);
                text_field(ui, &mut fields.phone, "Phone Number", false);
                text_field(ui, &mut fields.password, "Password", true);
                text_field(ui, &mut fields.confirm_password, "Confirm Password", true);
            });

            if let Some(error) = &app.register.error {
                ui.colored_label(ERROR_TEXT, error);
            }

            ui.add_space(12.0);
            let label = if busy { "Creating account..." } else { "Sign Up" };
            if ui
                .add_enabled(!busy, egui::Button::new(label).min_size(button_size()))
                .clicked()
            {
                app.submit_registration();
            }

            ui.add_space(16.0);
            if ui.link("Already have an account? Sign In").clicked() {
                app.show_login();
            }
        });
    });
}

fn brand_header(ui: &mut egui::Ui, subtitle: &str) {
    ui.label(RichText::new("🚗").size(40.0));
    ui.label(RichText::new("RideOver").size(28.0).strong().color(BRAND));
    ui.label(subtitle);
    ui.add_space(24.0);
}

fn text_field(ui: &mut egui::Ui, value: &mut String, hint: &str, secret: bool) -> egui::Response {
    let response = ui.add(
        egui::TextEdit::singleline(value)
            .hint_text(hint)
            .password(secret)
            .desired_width(FORM_WIDTH),
    );
    ui.add_space(6.0);
    response
}

fn button_size() -> egui::Vec2 {
    egui::vec2(FORM_WIDTH, 36.0)
}
