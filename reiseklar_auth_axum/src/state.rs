use std::sync::Arc;

use reiseklar_auth::{HttpSessionValidator, RouteConfig, SessionValidator};

/// Shared state of the gate middleware
#[derive(Clone)]
pub struct GateState {
    pub(crate) validator: Arc<dyn SessionValidator>,
    pub(crate) config: Arc<RouteConfig>,
}

impl std::fmt::Debug for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GateState {
    /// Gate state with routes taken from the environment
    pub fn new(validator: Arc<dyn SessionValidator>) -> Self {
        Self::with_config(validator, RouteConfig::from_env())
    }

    pub fn with_config(validator: Arc<dyn SessionValidator>, config: RouteConfig) -> Self {
        Self {
            validator,
            config: Arc::new(config),
        }
    }

    /// Gate state validating sessions against `REISEKLAR_API_URL`
    pub fn from_env() -> Result<Self, reiseklar_auth::AuthServiceError> {
        Ok(Self::new(Arc::new(HttpSessionValidator::from_env()?)))
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }
}
