//! Authentication session: the identity provider seam and the session
//! holder that mirrors the provider's state for the UI.
//!
//! The holder is created once at the app root and passed down explicitly.
//! Session changes reach it through the provider's change channel, which
//! covers token refreshes and sign-outs the UI did not start.

mod local;
#[cfg(feature = "remote-identity")]
mod remote;
mod store;

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::pending::{Pending, PendingPoll};

pub use local::LocalIdentityProvider;
#[cfg(feature = "remote-identity")]
pub use remote::RemoteIdentityProvider;
pub use store::SessionStore;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Rider,
    Driver,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("User")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    pub expires_at: u64,
    pub user: User,
}

impl Session {
    pub fn is_expired(&self, now_secs: u64) -> bool {
        now_secs >= self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpProfile {
    pub full_name: String,
    pub phone: String,
}

/// Registration form contents before they are handed to the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    /// Checks the form locally so obvious mistakes never reach the provider.
    pub fn validate(&self) -> Result<(Credentials, SignUpProfile), AuthError> {
        let fields = [
            &self.full_name,
            &self.email,
            &self.phone,
            &self.password,
            &self.confirm_password,
        ];
        if fields.iter().any(|field| field.trim().is_empty()) {
            return Err(AuthError::Rejected("Please fill in all fields".to_string()));
        }
        if self.password != self.confirm_password {
            return Err(AuthError::Rejected("Passwords do not match".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Rejected(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        Ok((
            Credentials::new(self.email.trim(), self.password.clone()),
            SignUpProfile {
                full_name: self.full_name.trim().to_string(),
                phone: self.phone.trim().to_string(),
            },
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
}

/// External identity service. Session storage is entirely its concern.
pub trait IdentityProvider: Send + Sync {
    fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError>;
    fn sign_up(&self, credentials: &Credentials, profile: &SignUpProfile)
        -> Result<User, AuthError>;
    fn sign_out(&self) -> Result<(), AuthError>;
    /// Restores the persisted session, refreshing it if it has expired.
    fn current_session(&self) -> Result<Option<Session>, AuthError>;
    fn subscribe(&self) -> Receiver<SessionEvent>;
}

/// Fan-out of session events to every live subscriber.
#[derive(Debug, Default)]
pub struct SessionBroadcast {
    subscribers: Mutex<Vec<Sender<SessionEvent>>>,
}

impl SessionBroadcast {
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        let (sender, receiver) = mpsc::channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(sender);
        }
        receiver
    }

    pub fn publish(&self, event: SessionEvent) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|subscriber| subscriber.send(event.clone()).is_ok());
        }
    }
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

/// Read side of the session used to route the app.
pub trait SessionView {
    fn is_loading(&self) -> bool;
    fn user(&self) -> Option<&User>;
}

/// Mirrors the provider's session for the UI.
pub struct SessionContext {
    provider: Arc<dyn IdentityProvider>,
    events: Receiver<SessionEvent>,
    restore: Option<Pending<Result<Option<Session>, AuthError>>>,
    session: Option<Session>,
    loading: bool,
    /// Set once any event has been applied; a restore finishing later is older.
    events_seen: bool,
}

impl SessionContext {
    /// Subscribes to the provider and starts restoring any saved session.
    pub fn start(provider: Arc<dyn IdentityProvider>) -> Self {
        let events = provider.subscribe();
        let restorer = Arc::clone(&provider);
        let restore = Pending::spawn(move || restorer.current_session());
        Self {
            provider,
            events,
            restore: Some(restore),
            session: None,
            loading: true,
            events_seen: false,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Applies the restore result and any session events. Returns true when
    /// the exposed state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = self.poll_restore();
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
            changed = true;
        }
        changed
    }

    /// Blocks until the initial restore finishes or `timeout` passes.
    pub fn wait_until_restored(&mut self, timeout: Duration) -> bool {
        let restored = self
            .restore
            .as_ref()
            .and_then(|restore| restore.wait(timeout));
        if let Some(result) = restored {
            self.restore = None;
            self.finish_restore(result);
        }
        self.poll();
        !self.loading
    }

    pub fn sign_in(&self, credentials: Credentials) -> Pending<Result<(), AuthError>> {
        let provider = Arc::clone(&self.provider);
        Pending::spawn(move || {
            let session = provider.sign_in(&credentials)?;
            info!(user = %session.user.email, "signed in");
            Ok(())
        })
    }

    pub fn sign_up(&self, registration: &Registration) -> Pending<Result<User, AuthError>> {
        let (credentials, profile) = match registration.validate() {
            Ok(valid) => valid,
            Err(error) => return Pending::ready(Err(error)),
        };
        let provider = Arc::clone(&self.provider);
        Pending::spawn(move || {
            let user = provider.sign_up(&credentials, &profile)?;
            info!(user = %user.email, "account registered");
            Ok(user)
        })
    }

    pub fn sign_out(&self) -> Pending<Result<(), AuthError>> {
        let provider = Arc::clone(&self.provider);
        Pending::spawn(move || {
            provider.sign_out()?;
            info!("signed out");
            Ok(())
        })
    }

    fn poll_restore(&mut self) -> bool {
        let Some(restore) = self.restore.as_ref() else {
            return false;
        };
        match restore.poll() {
            PendingPoll::Waiting => false,
            PendingPoll::Ready(result) => {
                self.restore = None;
                self.finish_restore(result);
                true
            }
            PendingPoll::Lost => {
                self.restore = None;
                self.finish_restore(Ok(None));
                true
            }
        }
    }

    fn finish_restore(&mut self, result: Result<Option<Session>, AuthError>) {
        self.loading = false;
        match result {
            Ok(_) if self.events_seen => {
                debug!("session restore superseded by an earlier event");
            }
            Ok(session) => {
                debug!(restored = session.is_some(), "session restore finished");
                self.session = session;
            }
            Err(error) => warn!(%error, "session restore failed"),
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        self.events_seen = true;
        match event {
            SessionEvent::SignedIn(session) | SessionEvent::TokenRefreshed(session) => {
                self.session = Some(session);
            }
            SessionEvent::SignedOut => self.session = None,
        }
    }
}

impl SessionView for SessionContext {
    fn is_loading(&self) -> bool {
        self.loading
    }

    fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|session| &session.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            full_name: "Ama Mensah".to_string(),
            email: " ama@example.com ".to_string(),
            phone: "+233200000000".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    #[test]
    fn registration_rejects_blank_fields() {
        let mut form = registration();
        form.phone = "  ".to_string();
        assert_eq!(
            form.validate(),
            Err(AuthError::Rejected("Please fill in all fields".to_string()))
        );
    }

    #[test]
    fn registration_rejects_mismatch_and_short_password() {
        let mut form = registration();
        form.confirm_password = "secret2".to_string();
        assert!(matches!(form.validate(), Err(AuthError::Rejected(m)) if m.contains("match")));

        let mut form = registration();
        form.password = "abc".to_string();
        form.confirm_password = "abc".to_string();
        assert!(matches!(form.validate(), Err(AuthError::Rejected(m)) if m.contains("6")));
    }

    #[test]
    fn registration_trims_identity_fields() {
        let (credentials, profile) = registration().validate().expect("valid form");
        assert_eq!(credentials.email, "ama@example.com");
        assert_eq!(profile.full_name, "Ama Mensah");
    }

    #[test]
    fn display_name_falls_back_to_user() {
        let mut user = User {
            id: "1".to_string(),
            email: "a@b.c".to_string(),
            full_name: None,
            phone: None,
            role: UserRole::Rider,
        };
        assert_eq!(user.display_name(), "User");
        user.full_name = Some("Kofi".to_string());
        assert_eq!(user.display_name(), "Kofi");
    }

    #[test]
    fn broadcast_drops_closed_subscribers() {
        let broadcast = SessionBroadcast::default();
        let kept = broadcast.subscribe();
        drop(broadcast.subscribe());
        broadcast.publish(SessionEvent::SignedOut);
        assert_eq!(kept.try_recv(), Ok(SessionEvent::SignedOut));
        assert_eq!(
            broadcast.subscribers.lock().map(|s| s.len()).unwrap_or(0),
            1
        );
    }

    #[test]
    fn session_expiry_is_inclusive() {
        let session = Session {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: 100,
            user: User {
                id: "1".to_string(),
                email: "a@b.c".to_string(),
                full_name: None,
                phone: None,
                role: UserRole::Rider,
            },
        };
        assert!(!session.is_expired(99));
        assert!(session.is_expired(100));
    }
}
