use std::sync::mpsc::Receiver;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::{
    now_secs, Credentials, IdentityProvider, Session, SessionBroadcast, SessionEvent,
    SessionStore, SignUpProfile, User, UserRole,
};
use crate::error::AuthError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Refresh this many seconds before the access token actually expires.
const EXPIRY_MARGIN_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: Option<u64>,
    expires_at: Option<u64>,
    user: RemoteUser,
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct UserMetadata {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    role: Option<UserRole>,
}

/// Sign-up answers with a full session when email confirmation is off and
/// with the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(RemoteUser),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl ErrorResponse {
    fn message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

impl From<RemoteUser> for User {
    fn from(remote: RemoteUser) -> Self {
        let metadata = remote.user_metadata;
        User {
            id: remote.id,
            email: remote.email.unwrap_or_default(),
            full_name: metadata.full_name,
            phone: remote.phone.filter(|phone| !phone.is_empty()).or(metadata.phone),
            role: metadata.role.unwrap_or_default(),
        }
    }
}

impl TokenResponse {
    fn into_session(self, now: u64) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|expires_in| now + expires_in))
            .unwrap_or(now);
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user.into(),
        }
    }
}

/// Client for a Supabase-compatible auth REST API. The session is persisted
/// with a [`SessionStore`] and refreshed when it is about to expire.
pub struct RemoteIdentityProvider {
    client: Client,
    base_url: String,
    anon_key: String,
    store: SessionStore,
    session: Mutex<Option<Session>>,
    broadcast: SessionBroadcast,
}

impl RemoteIdentityProvider {
    pub fn new(base_url: &str, anon_key: &str, store: SessionStore) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| AuthError::Network(error.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            store,
            session: Mutex::new(None),
            broadcast: SessionBroadcast::default(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(self.endpoint(path))
            .header("apikey", self.anon_key.as_str())
    }

    fn remember(&self, session: Option<Session>) -> Result<(), AuthError> {
        match &session {
            Some(session) => self.store.save(session)?,
            None => self.store.clear()?,
        }
        if let Ok(mut slot) = self.session.lock() {
            *slot = session;
        }
        Ok(())
    }

    fn cached(&self) -> Option<Session> {
        self.session.lock().ok().and_then(|slot| slot.clone())
    }

    fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let response = self
            .post("token?grant_type=refresh_token")
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .map_err(network_error)?;
        let token: TokenResponse = parse_success(response)?;
        Ok(token.into_session(now_secs()))
    }
}

impl IdentityProvider for RemoteIdentityProvider {
    fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let response = self
            .post("token?grant_type=password")
            .json(&json!({
                "email": credentials.email.trim(),
                "password": credentials.password,
            }))
            .send()
            .map_err(network_error)?;
        let token: TokenResponse = parse_success(response).map_err(|error| match error {
            AuthError::Rejected(message) if message.contains("Invalid login credentials") => {
                AuthError::InvalidCredentials
            }
            other => other,
        })?;
        let session = token.into_session(now_secs());
        self.remember(Some(session.clone()))?;
        self.broadcast.publish(SessionEvent::SignedIn(session.clone()));
        Ok(session)
    }

    fn sign_up(
        &self,
        credentials: &Credentials,
        profile: &SignUpProfile,
    ) -> Result<User, AuthError> {
        let metadata = UserMetadata {
            full_name: Some(profile.full_name.clone()),
            phone: Some(profile.phone.clone()),
            role: Some(UserRole::Rider),
        };
        let response = self
            .post("signup")
            .json(&json!({
                "email": credentials.email.trim(),
                "password": credentials.password,
                "data": metadata,
            }))
            .send()
            .map_err(network_error)?;
        match parse_success::<SignUpResponse>(response)? {
            SignUpResponse::Session(token) => {
                let session = token.into_session(now_secs());
                let user = session.user.clone();
                self.remember(Some(session.clone()))?;
                self.broadcast.publish(SessionEvent::SignedIn(session));
                Ok(user)
            }
            SignUpResponse::User(user) => Ok(user.into()),
        }
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        let session = match self.cached() {
            Some(session) => Some(session),
            None => self.store.load()?,
        };
        if let Some(session) = &session {
            // The local session is dropped even if the server call fails.
            let outcome = self
                .post("logout")
                .bearer_auth(&session.access_token)
                .send();
            if let Err(error) = outcome {
                warn!(%error, "remote logout failed; clearing local session anyway");
            }
        }
        self.remember(None)?;
        if session.is_some() {
            self.broadcast.publish(SessionEvent::SignedOut);
        }
        Ok(())
    }

    fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let session = match self.cached() {
            Some(session) => session,
            None => match self.store.load()? {
                Some(session) => session,
                None => return Ok(None),
            },
        };

        if !session.is_expired(now_secs() + EXPIRY_MARGIN_SECS) {
            if let Ok(mut slot) = self.session.lock() {
                *slot = Some(session.clone());
            }
            return Ok(Some(session));
        }

        debug!("stored session expired; refreshing");
        match self.refresh(&session.refresh_token) {
            Ok(refreshed) => {
                self.remember(Some(refreshed.clone()))?;
                self.broadcast
                    .publish(SessionEvent::TokenRefreshed(refreshed.clone()));
                Ok(Some(refreshed))
            }
            Err(error) => {
                warn!(%error, "session refresh failed; signing out locally");
                self.remember(None)?;
                self.broadcast.publish(SessionEvent::SignedOut);
                Ok(None)
            }
        }
    }

    fn subscribe(&self) -> Receiver<SessionEvent> {
        self.broadcast.subscribe()
    }
}

fn network_error(error: reqwest::Error) -> AuthError {
    AuthError::Network(error.to_string())
}

fn parse_success<T>(response: Response) -> Result<T, AuthError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    let body = response.text().map_err(network_error)?;
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(ErrorResponse::message)
            .unwrap_or_else(|| format!("identity service returned status {status}"));
        return Err(AuthError::Rejected(message));
    }
    serde_json::from_str(&body).map_err(|error| {
        AuthError::Rejected(format!("unexpected identity service response: {error}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_becomes_session() {
        let body = r#"{
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "rt",
            "user": {
                "id": "u-42",
                "email": "abena@example.com",
                "phone": "",
                "user_metadata": { "full_name": "Abena", "phone": "+233" }
            }
        }"#;
        let token: TokenResponse = serde_json::from_str(body).expect("token json");
        let session = token.into_session(1_000);
        assert_eq!(session.expires_at, 4_600);
        assert_eq!(session.user.display_name(), "Abena");
        assert_eq!(session.user.phone.as_deref(), Some("+233"));
        assert_eq!(session.user.role, UserRole::Rider);
    }

    #[test]
    fn sign_up_response_may_be_user_only() {
        let body = r#"{ "id": "u-7", "email": "kwame@example.com", "user_metadata": {} }"#;
        match serde_json::from_str::<SignUpResponse>(body).expect("sign up json") {
            SignUpResponse::User(user) => assert_eq!(User::from(user).email, "kwame@example.com"),
            SignUpResponse::Session(_) => panic!("expected a bare user"),
        }
    }

    #[test]
    fn error_body_prefers_description() {
        let body =
            r#"{ "error": "invalid_grant", "error_description": "Invalid login credentials" }"#;
        let parsed: ErrorResponse = serde_json::from_str(body).expect("error json");
        assert_eq!(parsed.message().as_deref(), Some("Invalid login credentials"));
        let bare: ErrorResponse = serde_json::from_str(r#"{ "msg": "User already registered" }"#)
            .expect("error json");
        assert_eq!(bare.message().as_deref(), Some("User already registered"));
    }

    #[test]
    fn unreachable_service_restores_from_store_without_network() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStore::new(dir.path().join("session.json"));
        let session = Session {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_at: now_secs() + 3_600,
            user: User {
                id: "u-1".to_string(),
                email: "a@b.co".to_string(),
                full_name: None,
                phone: None,
                role: UserRole::Rider,
            },
        };
        store.save(&session).expect("seed store");
        let provider = RemoteIdentityProvider::new("http://127.0.0.1:9", "anon", store)
            .expect("client builds");
        assert_eq!(provider.current_session(), Ok(Some(session)));
    }
}
