//! Test utilities shared by the unit tests of this crate
//!
//! Provides a scriptable [`AuthService`] and a [`Navigator`] that records
//! every navigation, so session and gate behavior can be exercised without
//! an API server or a browser.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::redirect::Navigator;
use crate::service::{AuthService, AuthServiceError, Credentials};
use crate::session::{Role, UserIdentity};

pub(crate) fn user() -> UserIdentity {
    UserIdentity::new("user-1", "kari@example.no", Role::User)
        .expect("valid test identity")
        .with_name("Kari Nordmann")
}

pub(crate) fn admin() -> UserIdentity {
    UserIdentity::new("admin-1", "admin@reiseklar.no", Role::Admin)
        .expect("valid test identity")
}

#[derive(Debug, Clone)]
enum Validation {
    Accept(UserIdentity),
    Reject,
    Unreachable,
    Panic,
}

/// Scriptable auth service
///
/// `held()` makes every validation wait until [`MockAuthService::release`]
/// is called, which lets tests observe the `Checking` state.
pub(crate) struct MockAuthService {
    validation: Validation,
    sign_in_as: Option<UserIdentity>,
    sign_out_fails: bool,
    gate: watch::Sender<bool>,
    validate_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl MockAuthService {
    fn with_validation(validation: Validation) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            validation,
            sign_in_as: None,
            sign_out_fails: false,
            gate,
            validate_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn accepting(user: UserIdentity) -> Self {
        Self::with_validation(Validation::Accept(user))
    }

    pub(crate) fn rejecting() -> Self {
        Self::with_validation(Validation::Reject)
    }

    pub(crate) fn unreachable() -> Self {
        Self::with_validation(Validation::Unreachable)
    }

    pub(crate) fn panicking() -> Self {
        Self::with_validation(Validation::Panic)
    }

    pub(crate) fn held(self) -> Self {
        self.gate.send_replace(false);
        self
    }

    pub(crate) fn signing_in_as(mut self, user: UserIdentity) -> Self {
        self.sign_in_as = Some(user);
        self
    }

    pub(crate) fn failing_sign_out(mut self) -> Self {
        self.sign_out_fails = true;
        self
    }

    pub(crate) fn release(&self) {
        self.gate.send_replace(true);
    }

    pub(crate) fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn validate_session(&self) -> Result<UserIdentity, AuthServiceError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|released| *released).await;

        match &self.validation {
            Validation::Accept(user) => Ok(user.clone()),
            Validation::Reject => Err(AuthServiceError::Rejected("401 Unauthorized".to_string())),
            Validation::Unreachable => Err(AuthServiceError::NetworkFailure(
                "connection refused".to_string(),
            )),
            Validation::Panic => panic!("auth service exploded"),
        }
    }

    async fn sign_in(&self, _credentials: &Credentials) -> Result<UserIdentity, AuthServiceError> {
        self.sign_in_as
            .clone()
            .ok_or_else(|| AuthServiceError::Rejected("invalid credentials".to_string()))
    }

    async fn sign_out(&self) -> Result<(), AuthServiceError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.sign_out_fails {
            return Err(AuthServiceError::NetworkFailure("connection reset".to_string()));
        }
        Ok(())
    }
}

/// Navigator recording every path it is asked to navigate to
#[derive(Debug, Default)]
pub(crate) struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub(crate) fn visits(&self) -> Vec<String> {
        self.visits.lock().expect("navigator lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits
            .lock()
            .expect("navigator lock")
            .push(path.to_string());
    }
}
