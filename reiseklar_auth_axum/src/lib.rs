mod config;
mod middleware;
mod session;
mod state;

#[cfg(test)]
mod test_utils;

pub use config::REISEKLAR_SESSION_COOKIE_NAME;
pub use middleware::{guest_only, require_admin, require_user};
pub use session::{AuthRedirect, AuthUser, resolve_session};
pub use state::GateState;

// Re-export what routers need to configure the gates
pub use reiseklar_auth::{
    GatePolicy, GateRequirement, HttpSessionValidator, Role, RouteConfig, SessionValidator,
};
