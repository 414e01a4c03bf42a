//! Auth service collaborator
//!
//! The session store depends only on the result shapes of these operations,
//! never on transport details. [`HttpAuthService`] talks to the Reiseklar API
//! server; tests substitute their own implementations.

mod errors;
mod http;
mod types;

use async_trait::async_trait;

use crate::session::UserIdentity;

pub use errors::AuthServiceError;
pub use http::{HttpAuthService, HttpSessionValidator};
pub use types::Credentials;

#[async_trait]
pub trait AuthService: Send + Sync + 'static {
    /// Validate the current session credential and return its identity
    async fn validate_session(&self) -> Result<UserIdentity, AuthServiceError>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<UserIdentity, AuthServiceError>;

    async fn sign_out(&self) -> Result<(), AuthServiceError>;
}

/// Server-side session validation on behalf of a browser request
///
/// The browser's `Cookie` header is forwarded as-is to the API server.
#[async_trait]
pub trait SessionValidator: Send + Sync + 'static {
    async fn validate_cookie(&self, cookie_header: &str)
    -> Result<UserIdentity, AuthServiceError>;
}
