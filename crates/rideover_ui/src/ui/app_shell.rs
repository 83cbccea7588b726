use eframe::egui;
use rideover_core::shell::ShellRoute;

use crate::app::RideApp;
use crate::ui::auth::{render_login, render_register};
use crate::ui::constants::{
    BUSY_REPAINT, WATCH_REPAINT, WINDOW_MIN_SIZE, WINDOW_SIZE, WINDOW_TITLE,
};
use crate::ui::home::render_home;
use crate::ui::loading::render_loading;

pub fn run(app: RideApp) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(WINDOW_SIZE)
            .with_min_inner_size(WINDOW_MIN_SIZE),
        ..Default::default()
    };
    eframe::run_native(WINDOW_TITLE, options, Box::new(|_cc| Ok(Box::new(app))))
}

impl eframe::App for RideApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let busy = self.tick();

        match self.route() {
            ShellRoute::Loading => render_loading(ctx, "Loading..."),
            ShellRoute::Login => render_login(ctx, self),
            ShellRoute::Register => render_register(ctx, self),
            ShellRoute::Home => render_home(ctx, self),
        }

        if busy {
            ctx.request_repaint_after(BUSY_REPAINT);
        } else if self.is_watching() {
            ctx.request_repaint_after(WATCH_REPAINT);
        }
    }
}
