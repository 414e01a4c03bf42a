//! reiseklar_auth - Authentication gating for the Reiseklar web front-end
//!
//! This crate holds the one piece of the front-end with real state and
//! ordering guarantees: deciding, for every protected surface, whether to
//! render it or send the visitor elsewhere.
//!
//! - [`SessionStore`]: the single process-wide authentication state
//! - [`BootstrapInitializer`]: the initial session check, run once
//! - [`AuthGate`]: per-surface render/redirect guard
//! - [`RedirectDispatcher`]: cancellable navigation side effects
//! - [`AuthService`]: the API server collaborator, with an HTTP implementation

mod bootstrap;
mod config;
mod gate;
mod redirect;
mod service;
mod session;

#[cfg(test)]
mod test_utils;

pub use bootstrap::{BootstrapInitializer, BootstrapView};

pub use config::{
    REISEKLAR_API_URL, REISEKLAR_AUTH_ROUTE_PREFIX, REISEKLAR_DEFAULT_LOCALE, REISEKLAR_LOCALES,
    REISEKLAR_REDIRECT_DELAY_MS, REISEKLAR_SESSION_CHECK_TIMEOUT, RouteConfig,
};

pub use gate::{
    AuthGate, DenyReason, GateDecision, GatePhase, GatePolicy, GateRequirement, GateView, decide,
};

pub use redirect::{
    CALLBACK_PARAM, CancelToken, Location, Navigator, RedirectDispatcher, dashboard_target,
    guest_redirect_target, home_target, safe_callback, sign_in_target,
};

pub use service::{
    AuthService, AuthServiceError, Credentials, HttpAuthService, HttpSessionValidator,
    SessionValidator,
};

pub use session::{
    CheckHandle, IdentityError, Role, SessionError, SessionSnapshot, SessionState, SessionStore,
    SessionSubscription, Theme, UserIdentity,
};
