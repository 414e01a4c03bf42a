use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use http::header::COOKIE;
use url::Url;

use super::errors::AuthServiceError;
use super::types::Credentials;
use super::{AuthService, SessionValidator};
use crate::config::{REISEKLAR_API_URL, REISEKLAR_AUTH_ROUTE_PREFIX, REISEKLAR_SESSION_CHECK_TIMEOUT};
use crate::session::UserIdentity;

const SESSION_PATH: &str = "/me";
const SIGN_IN_PATH: &str = "/sign-in";
const SIGN_OUT_PATH: &str = "/sign-out";

/// Auth endpoints of one API server
#[derive(Debug, Clone)]
struct Endpoints {
    session: Url,
    sign_in: Url,
    sign_out: Url,
}

impl Endpoints {
    fn new(base_url: &str, route_prefix: &str) -> Result<Self, AuthServiceError> {
        let base = base_url.trim_end_matches('/');
        let prefix = route_prefix.trim_end_matches('/');
        let endpoint = |path: &str| {
            Url::parse(&format!("{base}{prefix}{path}")).map_err(|e| {
                AuthServiceError::NetworkFailure(format!("Invalid API URL {base_url:?}: {e}"))
            })
        };
        Ok(Self {
            session: endpoint(SESSION_PATH)?,
            sign_in: endpoint(SIGN_IN_PATH)?,
            sign_out: endpoint(SIGN_OUT_PATH)?,
        })
    }
}

/// Creates the HTTP client for API server calls.
///
/// - `timeout`: bounds every request, so a hung API server surfaces as a
///   `NetworkFailure` instead of leaving a session check in flight.
/// - `cookie_store`: keeps the session credential cookie between calls, the
///   way a browser does for the front-end. Disabled for forwarding clients,
///   which must never mix cookies of different browser requests.
fn build_client(timeout: Duration, cookie_store: bool) -> Result<reqwest::Client, AuthServiceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .cookie_store(cookie_store)
        .build()
        .map_err(|e| AuthServiceError::NetworkFailure(format!("Failed to build HTTP client: {e}")))
}

fn map_transport_error(err: reqwest::Error) -> AuthServiceError {
    if err.is_timeout() {
        AuthServiceError::NetworkFailure(format!("Request timed out: {err}"))
    } else {
        AuthServiceError::NetworkFailure(err.to_string())
    }
}

/// Map a response status to the error taxonomy; `Ok` for success statuses
fn classify_status(status: StatusCode) -> Result<(), AuthServiceError> {
    if status.is_success() {
        Ok(())
    } else if status.is_server_error() {
        Err(AuthServiceError::NetworkFailure(format!(
            "API server error: {status}"
        )))
    } else {
        Err(AuthServiceError::Rejected(format!("API server answered {status}")))
    }
}

async fn read_identity(response: reqwest::Response) -> Result<UserIdentity, AuthServiceError> {
    classify_status(response.status())?;
    let body = response.bytes().await.map_err(map_transport_error)?;
    // Partial or malformed identities fail closed
    serde_json::from_slice::<UserIdentity>(&body).map_err(|e| {
        tracing::warn!("Malformed identity payload from API server: {}", e);
        AuthServiceError::Rejected(format!("Malformed identity payload: {e}"))
    })
}

/// [`AuthService`] backed by the Reiseklar API server
///
/// The session credential is a cookie set by the API server on sign-in and
/// kept in the client's cookie store.
#[derive(Debug, Clone)]
pub struct HttpAuthService {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpAuthService {
    pub fn new(base_url: &str) -> Result<Self, AuthServiceError> {
        Self::with_timeout(
            base_url,
            Duration::from_secs(*REISEKLAR_SESSION_CHECK_TIMEOUT),
        )
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, AuthServiceError> {
        Ok(Self {
            client: build_client(timeout, true)?,
            endpoints: Endpoints::new(base_url, REISEKLAR_AUTH_ROUTE_PREFIX.as_str())?,
        })
    }

    /// Service for the API server named by `REISEKLAR_API_URL`
    pub fn from_env() -> Result<Self, AuthServiceError> {
        Self::new(REISEKLAR_API_URL.as_str())
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn validate_session(&self) -> Result<UserIdentity, AuthServiceError> {
        tracing::debug!("Validating session at {}", self.endpoints.session);
        let response = self
            .client
            .get(self.endpoints.session.clone())
            .send()
            .await
            .map_err(map_transport_error)?;
        read_identity(response).await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<UserIdentity, AuthServiceError> {
        tracing::debug!("Signing in {}", credentials.email);
        let response = self
            .client
            .post(self.endpoints.sign_in.clone())
            .json(credentials)
            .send()
            .await
            .map_err(map_transport_error)?;
        read_identity(response).await
    }

    async fn sign_out(&self) -> Result<(), AuthServiceError> {
        let response = self
            .client
            .post(self.endpoints.sign_out.clone())
            .send()
            .await
            .map_err(map_transport_error)?;
        classify_status(response.status())
    }
}

/// [`SessionValidator`] forwarding browser cookies to the Reiseklar API server
#[derive(Debug, Clone)]
pub struct HttpSessionValidator {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpSessionValidator {
    pub fn new(base_url: &str) -> Result<Self, AuthServiceError> {
        Ok(Self {
            client: build_client(
                Duration::from_secs(*REISEKLAR_SESSION_CHECK_TIMEOUT),
                false,
            )?,
            endpoints: Endpoints::new(base_url, REISEKLAR_AUTH_ROUTE_PREFIX.as_str())?,
        })
    }

    pub fn from_env() -> Result<Self, AuthServiceError> {
        Self::new(REISEKLAR_API_URL.as_str())
    }
}

#[async_trait]
impl SessionValidator for HttpSessionValidator {
    async fn validate_cookie(
        &self,
        cookie_header: &str,
    ) -> Result<UserIdentity, AuthServiceError> {
        let response = self
            .client
            .get(self.endpoints.session.clone())
            .header(COOKIE, cookie_header)
            .send()
            .await
            .map_err(map_transport_error)?;
        read_identity(response).await
    }
}
