use thiserror::Error;

use crate::service::AuthServiceError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Missing identity field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Explicit transitions are refused until the initial check has started
    #[error("Session store has not been bootstrapped")]
    NotBootstrapped,

    /// Error from the auth service collaborator
    #[error("Auth service error: {0}")]
    Service(#[from] AuthServiceError),
}

impl SessionError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::NotBootstrapped => tracing::error!("Session store has not been bootstrapped"),
            Self::Service(err) if err.is_network_failure() => {
                tracing::error!("Auth service error: {}", err)
            }
            Self::Service(err) => tracing::debug!("Auth service error: {}", err),
        }
        self
    }
}
