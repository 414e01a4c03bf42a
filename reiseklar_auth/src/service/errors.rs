use thiserror::Error;

/// Failures of the auth service collaborator
///
/// Both variants fold into `Unauthenticated` for gating purposes; only
/// logging tells them apart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthServiceError {
    /// The API server could not be reached, timed out, or failed internally
    #[error("Auth service unreachable: {0}")]
    NetworkFailure(String),

    /// The API server answered and refused the session or credentials,
    /// or answered with a payload that is not a complete identity
    #[error("Session rejected: {0}")]
    Rejected(String),
}

impl AuthServiceError {
    pub fn is_network_failure(&self) -> bool {
        matches!(self, AuthServiceError::NetworkFailure(_))
    }
}
