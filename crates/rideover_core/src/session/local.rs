use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use super::{
    now_secs, Credentials, IdentityProvider, Session, SessionBroadcast, SessionEvent,
    SignUpProfile, User, UserRole, MIN_PASSWORD_LEN,
};
use crate::error::AuthError;

const SESSION_TTL_SECS: u64 = 3600;

struct LocalAccount {
    user: User,
    password_digest: String,
}

#[derive(Default)]
struct LocalState {
    accounts: HashMap<String, LocalAccount>,
    session: Option<Session>,
    issued: u64,
}

/// In-process identity provider for running without a remote service.
/// Accounts live in memory only; passwords are kept as salted digests.
pub struct LocalIdentityProvider {
    state: Mutex<LocalState>,
    broadcast: SessionBroadcast,
    ttl_secs: u64,
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        Self::with_ttl(SESSION_TTL_SECS)
    }

    pub fn with_ttl(ttl_secs: u64) -> Self {
        Self {
            state: Mutex::new(LocalState::default()),
            broadcast: SessionBroadcast::default(),
            ttl_secs,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LocalState>, AuthError> {
        self.state
            .lock()
            .map_err(|_| AuthError::Storage("account store lock poisoned".to_string()))
    }

    fn issue_session(&self, state: &mut LocalState, user: User) -> Session {
        state.issued += 1;
        let seed = format!("{}:{}:{}", user.id, state.issued, now_nanos());
        Session {
            access_token: hex_digest(&format!("access:{seed}")),
            refresh_token: hex_digest(&format!("refresh:{seed}")),
            expires_at: now_secs() + self.ttl_secs,
            user,
        }
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let session = {
            let mut state = self.lock()?;
            let key = account_key(&credentials.email);
            let user = match state.accounts.get(&key) {
                Some(account)
                    if account.password_digest
                        == password_digest(&account.user.id, &credentials.password) =>
                {
                    account.user.clone()
                }
                _ => return Err(AuthError::InvalidCredentials),
            };
            let session = self.issue_session(&mut state, user);
            state.session = Some(session.clone());
            session
        };
        self.broadcast.publish(SessionEvent::SignedIn(session.clone()));
        Ok(session)
    }

    fn sign_up(
        &self,
        credentials: &Credentials,
        profile: &SignUpProfile,
    ) -> Result<User, AuthError> {
        let email = credentials.email.trim();
        if !email.contains('@') {
            return Err(AuthError::Rejected(
                "Unable to validate email address: invalid format".to_string(),
            ));
        }
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Rejected(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let mut state = self.lock()?;
        let key = account_key(email);
        if state.accounts.contains_key(&key) {
            return Err(AuthError::Rejected("User already registered".to_string()));
        }
        let id = format!("local-{}", state.accounts.len() + 1);
        let user = User {
            id: id.clone(),
            email: email.to_string(),
            full_name: Some(profile.full_name.clone()).filter(|name| !name.is_empty()),
            phone: Some(profile.phone.clone()).filter(|phone| !phone.is_empty()),
            role: UserRole::Rider,
        };
        state.accounts.insert(
            key,
            LocalAccount {
                password_digest: password_digest(&id, &credentials.password),
                user: user.clone(),
            },
        );
        Ok(user)
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        let had_session = self.lock()?.session.take().is_some();
        if had_session {
            self.broadcast.publish(SessionEvent::SignedOut);
        }
        Ok(())
    }

    fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let refreshed = {
            let mut state = self.lock()?;
            let Some(session) = state.session.clone() else {
                return Ok(None);
            };
            if !session.is_expired(now_secs()) {
                return Ok(Some(session));
            }
            let refreshed = self.issue_session(&mut state, session.user);
            state.session = Some(refreshed.clone());
            refreshed
        };
        self.broadcast
            .publish(SessionEvent::TokenRefreshed(refreshed.clone()));
        Ok(Some(refreshed))
    }

    fn subscribe(&self) -> Receiver<SessionEvent> {
        self.broadcast.subscribe()
    }
}

fn account_key(email: &str) -> String {
    email.trim().to_lowercase()
}

fn password_digest(salt: &str, password: &str) -> String {
    hex_digest(&format!("{salt}:{password}"))
}

fn hex_digest(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn now_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or(0)
}
