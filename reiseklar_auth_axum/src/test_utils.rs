//! Test utilities for the gate middleware and extractors

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{body::Body, response::Response};

use reiseklar_auth::{AuthServiceError, Role, RouteConfig, SessionValidator, UserIdentity};

use crate::config::REISEKLAR_SESSION_COOKIE_NAME;
use crate::state::GateState;

pub(crate) fn session_cookie(value: &str) -> String {
    format!("{}={}", REISEKLAR_SESSION_COOKIE_NAME.as_str(), value)
}

/// Validator answering by session cookie value:
/// `user-token` and `admin-token` are valid, `down` simulates an unreachable
/// API server, anything else is rejected
#[derive(Default)]
pub(crate) struct MockValidator {
    calls: AtomicUsize,
    last_cookie_header: Mutex<Option<String>>,
}

impl MockValidator {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_cookie_header(&self) -> Option<String> {
        self.last_cookie_header.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionValidator for MockValidator {
    async fn validate_cookie(
        &self,
        cookie_header: &str,
    ) -> Result<UserIdentity, AuthServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_cookie_header.lock().unwrap() = Some(cookie_header.to_string());

        let prefix = format!("{}=", REISEKLAR_SESSION_COOKIE_NAME.as_str());
        let token = cookie_header
            .split(';')
            .map(str::trim)
            .find_map(|pair| pair.strip_prefix(prefix.as_str()))
            .unwrap_or_default();

        match token {
            "user-token" => Ok(UserIdentity::new("user-1", "kari@example.no", Role::User)
                .unwrap()
                .with_name("Kari Nordmann")),
            "admin-token" => {
                Ok(UserIdentity::new("admin-1", "admin@reiseklar.no", Role::Admin).unwrap())
            }
            "down" => Err(AuthServiceError::NetworkFailure(
                "connection refused".to_string(),
            )),
            _ => Err(AuthServiceError::Rejected("401 Unauthorized".to_string())),
        }
    }
}

pub(crate) fn state_with(validator: MockValidator) -> (Arc<MockValidator>, GateState) {
    let validator = Arc::new(validator);
    let state = GateState::with_config(validator.clone(), RouteConfig::default());
    (validator, state)
}

pub(crate) async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
