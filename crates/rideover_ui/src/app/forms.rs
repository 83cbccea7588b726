//! Login and registration form state, including the in-flight request.

use rideover_core::error::AuthError;
use rideover_core::pending::{Pending, PendingPoll};
use rideover_core::session::{Credentials, Registration, SessionContext, User};

const FILL_ALL_FIELDS: &str = "Please fill in all fields";
const INTERRUPTED: &str = "The request was interrupted. Please try again.";

#[derive(Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    /// Shown above the form after a successful registration.
    pub notice: Option<String>,
    pending: Option<Pending<Result<(), AuthError>>>,
}

impl LoginForm {
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn submit(&mut self, session: &SessionContext) {
        if self.is_busy() {
            return;
        }
        if self.email.trim().is_empty() || self.password.is_empty() {
            self.error = Some(FILL_ALL_FIELDS.to_string());
            return;
        }
        self.error = None;
        self.notice = None;
        let credentials = Credentials::new(self.email.trim(), self.password.clone());
        self.pending = Some(session.sign_in(credentials));
    }

    /// True once the sign-in went through.
    pub fn poll(&mut self) -> bool {
        let Some(pending) = self.pending.as_ref() else {
            return false;
        };
        match pending.poll() {
            PendingPoll::Waiting => false,
            PendingPoll::Ready(Ok(())) => {
                self.pending = None;
                self.password.clear();
                true
            }
            PendingPoll::Ready(Err(error)) => {
                self.pending = None;
                self.error = Some(error.to_string());
                false
            }
            PendingPoll::Lost => {
                self.pending = None;
                self.error = Some(INTERRUPTED.to_string());
                false
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Default)]
pub struct RegisterForm {
    pub fields: Registration,
    pub error: Option<String>,
    pending: Option<Pending<Result<User, AuthError>>>,
}

impl RegisterForm {
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn submit(&mut self, session: &SessionContext) {
        if self.is_busy() {
            return;
        }
        self.error = None;
        self.pending = Some(session.sign_up(&self.fields));
    }

    /// The new account once registration went through.
    pub fn poll(&mut self) -> Option<User> {
        let pending = self.pending.as_ref()?;
        match pending.poll() {
            PendingPoll::Waiting => None,
            PendingPoll::Ready(Ok(user)) => {
                self.pending = None;
                self.fields = Registration::default();
                Some(user)
            }
            PendingPoll::Ready(Err(error)) => {
                self.pending = None;
                self.error = Some(error.to_string());
                None
            }
            PendingPoll::Lost => {
                self.pending = None;
                self.error = Some(INTERRUPTED.to_string());
                None
            }
        }
    }
}
