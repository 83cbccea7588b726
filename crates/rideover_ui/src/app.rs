//! Application state shared by the views and the per-frame update logic.

mod forms;

use std::sync::Arc;

use rideover_core::booking_flow::{BookingFlow, BookingStep, LoggingBookingSink};
use rideover_core::config::{
    AppConfig, BookingSettings, IdentityMode, IdentitySettings, MapSettings,
};
use rideover_core::error::{AuthError, ConfigError};
use rideover_core::flags::FeatureFlags;
use rideover_core::geo::Coordinates;
use rideover_core::location::{Location, LocationCatalog};
use rideover_core::location_provider::{
    LocationProvider, PlatformLocation, PositionWatch, SimulatedPlatform, WatchOptions,
};
use rideover_core::map::{MapEvent, MapRegion};
use rideover_core::pending::{Pending, PendingPoll};
use rideover_core::ride::{BookingDraft, RideTier};
use rideover_core::search::LocationSearch;
use rideover_core::session::{IdentityProvider, LocalIdentityProvider, SessionContext, SessionView};
use rideover_core::shell::{AppShell, ShellRoute};
use tracing::{info, warn};

pub use forms::{LoginForm, RegisterForm};

/// A point the user tapped on the map, with its address once resolved.
pub struct DroppedPin {
    pub coordinates: Coordinates,
    pub address: Option<String>,
    pending: Option<Pending<String>>,
}

/// Main application state for the rider UI.
pub struct RideApp {
    pub flags: FeatureFlags,
    pub session: SessionContext,
    pub shell: AppShell,
    pub location: LocationProvider,
    pub booking: BookingFlow,
    pub search: LocationSearch,
    pub login: LoginForm,
    pub register: RegisterForm,
    pub confirm_sign_out: bool,
    pub sign_out_error: Option<String>,
    pub dropped_pin: Option<DroppedPin>,
    pub last_booking: Option<BookingDraft>,
    pub show_flags: bool,
    map_settings: MapSettings,
    booking_settings: BookingSettings,
    watch: Option<PositionWatch>,
    sign_out: Option<Pending<Result<(), AuthError>>>,
    sink: LoggingBookingSink,
}

impl RideApp {
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        let flags = config.feature_flags();
        let provider = build_identity_provider(&config.identity)?;
        let catalog = Arc::new(LocationCatalog::popular());
        let platform: Arc<dyn PlatformLocation> = Arc::new(SimulatedPlatform::new(
            config.location.permission,
            config.location.device_position,
            Arc::clone(&catalog),
        ));

        info!(
            identity = ?config.identity.mode,
            location_selector = flags.enable_location_selector,
            "starting rider app"
        );

        Ok(Self {
            flags,
            session: SessionContext::start(provider),
            shell: AppShell::new(),
            location: LocationProvider::start(platform),
            booking: BookingFlow::from_settings(&config.booking, &flags),
            search: LocationSearch::new(catalog, config.search.delay()),
            login: LoginForm::default(),
            register: RegisterForm::default(),
            confirm_sign_out: false,
            sign_out_error: None,
            dropped_pin: None,
            last_booking: None,
            show_flags: false,
            map_settings: config.map,
            booking_settings: config.booking,
            watch: None,
            sign_out: None,
            sink: LoggingBookingSink,
        })
    }

    /// Drains every background result. Returns true while something is
    /// still in flight and the UI should keep repainting.
    pub fn tick(&mut self) -> bool {
        self.session.poll();
        self.login.poll();
        if let Some(user) = self.register.poll() {
            self.shell.registration_succeeded();
            self.login.email = user.email;
            self.login.notice = Some("Account created. Please sign in.".to_string());
        }
        self.poll_sign_out();

        self.location.poll();
        if let Some(position) = self.watch.as_ref().and_then(PositionWatch::latest) {
            self.location.observe_position(position);
        }
        self.search.poll();
        self.poll_dropped_pin();

        self.is_busy()
    }

    /// Picks the screen for this frame. Leaving home drops the position
    /// watch and any booking in progress.
    pub fn route(&mut self) -> ShellRoute {
        let route = self.shell.route(&self.session);
        if route == ShellRoute::Home {
            if self.watch.is_none() {
                self.watch = Some(self.location.watch(WatchOptions::default()));
            }
        } else if self.watch.is_some() {
            self.leave_home();
        }
        route
    }

    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    pub fn is_signing_out(&self) -> bool {
        self.sign_out.is_some()
    }

    pub fn map_region(&self) -> MapRegion {
        MapRegion::centered_on(
            self.location.current_position(),
            self.map_settings.default_center,
            self.map_settings.latitude_delta,
            self.map_settings.longitude_delta,
        )
    }

    pub fn submit_login(&mut self) {
        self.login.submit(&self.session);
    }

    pub fn submit_registration(&mut self) {
        self.register.submit(&self.session);
    }

    pub fn show_register(&mut self) {
        self.login.error = None;
        self.shell.show_register();
    }

    pub fn show_login(&mut self) {
        self.register.error = None;
        self.shell.show_login();
    }

    pub fn request_sign_out(&mut self) {
        self.confirm_sign_out = true;
    }

    pub fn cancel_sign_out(&mut self) {
        self.confirm_sign_out = false;
    }

    pub fn sign_out(&mut self) {
        self.confirm_sign_out = false;
        if self.sign_out.is_none() {
            self.sign_out_error = None;
            self.sign_out = Some(self.session.sign_out());
        }
    }

    pub fn handle_map_event(&mut self, event: MapEvent) {
        match event {
            MapEvent::Tapped(coordinates) => {
                self.dropped_pin = Some(DroppedPin {
                    coordinates,
                    address: None,
                    pending: Some(self.location.reverse_geocode(coordinates)),
                });
            }
            MapEvent::StartBooking => {
                if self.booking.start_booking() {
                    self.last_booking = None;
                    self.search.set_query("");
                }
            }
        }
    }

    pub fn select_location(&mut self, location: Location) {
        self.booking.location_selected(location);
        if self.booking.step() == BookingStep::SelectingDropoff {
            self.search.set_query("");
        }
    }

    /// "Use Current Location"; ignored until a position is known.
    pub fn use_current_location(&mut self) {
        if let Some(position) = self.location.current_position() {
            self.select_location(Location::current_position(position));
        }
    }

    pub fn selector_back(&mut self) {
        self.booking.selector_back();
    }

    pub fn select_ride(&mut self, tier: RideTier) {
        self.booking.select_ride(tier);
    }

    pub fn panel_back(&mut self) {
        self.booking.panel_back();
        self.search.set_query("");
    }

    pub fn confirm_ride(&mut self) {
        if let Some(draft) = self.booking.confirm(&self.sink) {
            self.last_booking = Some(draft);
        }
    }

    fn is_busy(&self) -> bool {
        self.session.is_loading()
            || self.login.is_busy()
            || self.register.is_busy()
            || self.sign_out.is_some()
            || self.location.is_loading()
            || self.search.is_loading()
            || self
                .dropped_pin
                .as_ref()
                .is_some_and(|pin| pin.pending.is_some())
    }

    fn leave_home(&mut self) {
        self.watch = None;
        self.booking = BookingFlow::from_settings(&self.booking_settings, &self.flags);
        self.search.set_query("");
        self.dropped_pin = None;
        self.last_booking = None;
        self.confirm_sign_out = false;
        self.show_flags = false;
    }

    fn poll_sign_out(&mut self) {
        let Some(pending) = self.sign_out.as_ref() else {
            return;
        };
        let outcome = match pending.poll() {
            PendingPoll::Waiting => return,
            PendingPoll::Ready(outcome) => outcome,
            PendingPoll::Lost => Err(AuthError::Network("sign out was interrupted".to_string())),
        };
        self.sign_out = None;
        match outcome {
            Ok(()) => self.login.reset(),
            Err(error) => {
                warn!(%error, "sign out failed");
                self.sign_out_error = Some(error.to_string());
            }
        }
    }

    fn poll_dropped_pin(&mut self) {
        let Some(pin) = self.dropped_pin.as_mut() else {
            return;
        };
        let Some(pending) = pin.pending.as_ref() else {
            return;
        };
        match pending.poll() {
            PendingPoll::Waiting => {}
            PendingPoll::Ready(address) => {
                pin.address = Some(address);
                pin.pending = None;
            }
            PendingPoll::Lost => pin.pending = None,
        }
    }
}

fn build_identity_provider(
    settings: &IdentitySettings,
) -> Result<Arc<dyn IdentityProvider>, ConfigError> {
    match settings.mode {
        IdentityMode::Local => Ok(Arc::new(LocalIdentityProvider::new())),
        IdentityMode::Remote => remote_identity_provider(settings),
    }
}

#[cfg(feature = "remote-identity")]
fn remote_identity_provider(
    settings: &IdentitySettings,
) -> Result<Arc<dyn IdentityProvider>, ConfigError> {
    use rideover_core::session::{RemoteIdentityProvider, SessionStore};

    let (url, anon_key) = settings.remote_endpoint()?;
    let store = SessionStore::new(settings.session_file_path());
    let provider = RemoteIdentityProvider::new(&url, &anon_key, store)
        .map_err(|error| ConfigError::IdentityClient(error.to_string()))?;
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "remote-identity"))]
fn remote_identity_provider(
    _settings: &IdentitySettings,
) -> Result<Arc<dyn IdentityProvider>, ConfigError> {
    Err(ConfigError::RemoteIdentityUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use rideover_core::location_provider::PermissionStatus;
    use rideover_core::session::{Registration, SessionView};

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.search.delay_ms = 0;
        config
    }

    fn tick_until(app: &mut RideApp, mut done: impl FnMut(&RideApp) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            app.tick();
            if done(app) {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("condition not reached before deadline");
    }

    fn registration() -> Registration {
        Registration {
            full_name: "Akosua Darko".to_string(),
            email: "akosua@example.com".to_string(),
            phone: "+233209999999".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    fn signed_in_app() -> RideApp {
        let mut app = RideApp::new(test_config()).expect("app starts");
        app.register.fields = registration();
        app.submit_registration();
        tick_until(&mut app, |app| app.login.notice.is_some());
        app.login.password = "secret1".to_string();
        app.submit_login();
        tick_until(&mut app, |app| app.session.user().is_some());
        app
    }

    #[cfg(feature = "remote-identity")]
    #[test]
    fn remote_mode_without_endpoint_fails_to_start() {
        let mut config = test_config();
        config.identity.mode = IdentityMode::Remote;
        assert!(matches!(
            RideApp::new(config),
            Err(ConfigError::MissingIdentitySetting(_))
        ));
    }

    #[test]
    fn registration_lands_on_login_with_email_prefilled() {
        let mut app = RideApp::new(test_config()).expect("app starts");
        tick_until(&mut app, |app| !app.session.is_loading());
        assert_eq!(app.route(), ShellRoute::Login);
        app.show_register();
        assert_eq!(app.route(), ShellRoute::Register);

        app.register.fields = registration();
        app.submit_registration();
        tick_until(&mut app, |app| app.login.notice.is_some());
        assert_eq!(app.route(), ShellRoute::Login);
        assert_eq!(app.login.email, "akosua@example.com");
    }

    #[test]
    fn home_books_a_ride_from_current_location() {
        let mut app = signed_in_app();
        assert_eq!(app.route(), ShellRoute::Home);
        assert!(app.is_watching());
        tick_until(&mut app, |app| app.location.current_position().is_some());

        app.handle_map_event(MapEvent::StartBooking);
        assert_eq!(app.booking.step(), BookingStep::SelectingPickup);
        app.use_current_location();
        assert_eq!(app.booking.step(), BookingStep::SelectingDropoff);

        app.search.set_query("airport");
        tick_until(&mut app, |app| !app.search.is_loading());
        let airport = app.search.results()[0].clone();
        app.select_location(airport);
        assert_eq!(app.booking.step(), BookingStep::Confirming);

        app.confirm_ride();
        assert!(app.last_booking.is_none());
        app.select_ride(RideTier::Economy);
        app.confirm_ride();
        let draft = app.last_booking.clone().expect("booked");
        assert!(draft.pickup.is_current_position());
        assert_eq!(draft.price, 15);
        assert_eq!(app.booking.step(), BookingStep::Idle);
    }

    #[test]
    fn sign_out_returns_to_login_and_resets_home() {
        let mut app = signed_in_app();
        app.route();
        app.handle_map_event(MapEvent::StartBooking);
        app.request_sign_out();
        app.sign_out();
        tick_until(&mut app, |app| app.session.user().is_none());
        assert_eq!(app.route(), ShellRoute::Login);
        assert!(!app.is_watching());
        assert_eq!(app.booking.step(), BookingStep::Idle);
    }

    #[test]
    fn tapping_the_map_resolves_an_address() {
        let mut app = RideApp::new(test_config()).expect("app starts");
        let near_airport = Coordinates::new(5.6050, -0.1670);
        app.handle_map_event(MapEvent::Tapped(near_airport));
        tick_until(&mut app, |app| {
            app.dropped_pin
                .as_ref()
                .is_some_and(|pin| pin.address.is_some())
        });
        let pin = app.dropped_pin.as_ref().expect("pin");
        assert_eq!(
            pin.address.as_deref(),
            Some("Kotoka International Airport Accra")
        );
    }

    #[test]
    fn denied_permission_disables_current_location() {
        let mut config = test_config();
        config.location.permission = PermissionStatus::Denied;
        let mut app = RideApp::new(config).expect("app starts");
        tick_until(&mut app, |app| !app.location.is_loading());
        assert!(app.location.current_position().is_none());

        app.handle_map_event(MapEvent::StartBooking);
        app.use_current_location();
        assert_eq!(app.booking.step(), BookingStep::SelectingPickup);
    }
}
