#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Mutex;
use std::time::Duration;

use rideover_core::error::AuthError;
use rideover_core::session::{
    Credentials, IdentityProvider, Session, SessionBroadcast, SessionEvent, SignUpProfile, User,
};

use super::fixtures::{live_session, rider};

pub const GOOD_PASSWORD: &str = "correct-horse";

/// Identity provider with a canned restore result and a fixed password.
pub struct ScriptedIdentity {
    restore: Mutex<Option<Result<Option<Session>, AuthError>>>,
    restore_delay: Duration,
    broadcast: SessionBroadcast,
    sign_up_calls: AtomicUsize,
}

impl Default for ScriptedIdentity {
    fn default() -> Self {
        Self::restoring(Ok(None))
    }
}

impl ScriptedIdentity {
    pub fn restoring(result: Result<Option<Session>, AuthError>) -> Self {
        Self {
            restore: Mutex::new(Some(result)),
            restore_delay: Duration::ZERO,
            broadcast: SessionBroadcast::default(),
            sign_up_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_restore_delay(mut self, delay: Duration) -> Self {
        self.restore_delay = delay;
        self
    }

    /// Pushes an event as if the service had changed the session on its own.
    pub fn emit(&self, event: SessionEvent) {
        self.broadcast.publish(event);
    }

    pub fn sign_up_calls(&self) -> usize {
        self.sign_up_calls.load(Ordering::SeqCst)
    }
}

impl IdentityProvider for ScriptedIdentity {
    fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        if credentials.password != GOOD_PASSWORD {
            return Err(AuthError::InvalidCredentials);
        }
        let session = live_session(rider(&credentials.email));
        self.broadcast.publish(SessionEvent::SignedIn(session.clone()));
        Ok(session)
    }

    fn sign_up(
        &self,
        credentials: &Credentials,
        profile: &SignUpProfile,
    ) -> Result<User, AuthError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        let mut user = rider(&credentials.email);
        user.full_name = Some(profile.full_name.clone());
        Ok(user)
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        self.broadcast.publish(SessionEvent::SignedOut);
        Ok(())
    }

    fn current_session(&self) -> Result<Option<Session>, AuthError> {
        if !self.restore_delay.is_zero() {
            std::thread::sleep(self.restore_delay);
        }
        self.restore
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .unwrap_or(Ok(None))
    }

    fn subscribe(&self) -> Receiver<SessionEvent> {
        self.broadcast.subscribe()
    }
}
