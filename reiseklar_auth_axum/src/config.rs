//! Central configuration for the reiseklar_auth_axum crate

use std::sync::LazyLock;

/// Name of the session cookie set by the Reiseklar API server
/// Default: "reiseklar.session"
pub static REISEKLAR_SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("REISEKLAR_SESSION_COOKIE_NAME")
        .unwrap_or_else(|_| "reiseklar.session".to_string())
});
