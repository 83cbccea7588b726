//! Top-level session gate: loading, then login/register, then home.
//!
//! Navigation lives only in memory and starts over on every launch.

use crate::session::SessionView;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthScreen {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellRoute {
    Loading,
    Login,
    Register,
    Home,
}

#[derive(Debug, Default)]
pub struct AppShell {
    auth_screen: AuthScreen,
}

impl AppShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auth_screen(&self) -> AuthScreen {
        self.auth_screen
    }

    /// Picks the screen for the current session state. A signed-in user
    /// resets the auth screen so the next sign-out lands on login.
    pub fn route(&mut self, session: &dyn SessionView) -> ShellRoute {
        if session.is_loading() {
            return ShellRoute::Loading;
        }
        if session.user().is_some() {
            self.auth_screen = AuthScreen::Login;
            return ShellRoute::Home;
        }
        match self.auth_screen {
            AuthScreen::Login => ShellRoute::Login,
            AuthScreen::Register => ShellRoute::Register,
        }
    }

    pub fn show_register(&mut self) {
        self.auth_screen = AuthScreen::Register;
    }

    pub fn show_login(&mut self) {
        self.auth_screen = AuthScreen::Login;
    }

    /// A finished registration sends the user to log in.
    pub fn registration_succeeded(&mut self) {
        self.auth_screen = AuthScreen::Login;
    }
}
