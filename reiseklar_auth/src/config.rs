//! Central configuration for the reiseklar_auth crate

use std::sync::LazyLock;

/// Base URL of the Reiseklar API server
/// Default: "http://localhost:4000"
pub static REISEKLAR_API_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("REISEKLAR_API_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
});

/// Route prefix of the auth endpoints on the API server
/// Default: "/auth"
pub static REISEKLAR_AUTH_ROUTE_PREFIX: LazyLock<String> = LazyLock::new(|| {
    std::env::var("REISEKLAR_AUTH_ROUTE_PREFIX").unwrap_or_else(|_| "/auth".to_string())
});

pub static REISEKLAR_DEFAULT_LOCALE: LazyLock<String> = LazyLock::new(|| {
    std::env::var("REISEKLAR_DEFAULT_LOCALE").unwrap_or_else(|_| DEFAULT_LOCALE.to_string())
});

/// Comma separated list of locale segments the front-end serves
/// Default: "nb,en"
pub static REISEKLAR_LOCALES: LazyLock<Vec<String>> = LazyLock::new(|| {
    parse_locales(
        std::env::var("REISEKLAR_LOCALES").ok().as_deref(),
        REISEKLAR_DEFAULT_LOCALE.as_str(),
    )
});

pub static REISEKLAR_SIGN_IN_SEGMENT: LazyLock<String> = LazyLock::new(|| {
    std::env::var("REISEKLAR_SIGN_IN_SEGMENT").unwrap_or_else(|_| "signIn".to_string())
});

pub static REISEKLAR_SIGN_UP_SEGMENT: LazyLock<String> = LazyLock::new(|| {
    std::env::var("REISEKLAR_SIGN_UP_SEGMENT").unwrap_or_else(|_| "signUp".to_string())
});

pub static REISEKLAR_USER_HOME_SEGMENT: LazyLock<String> = LazyLock::new(|| {
    std::env::var("REISEKLAR_USER_HOME_SEGMENT").unwrap_or_else(|_| "user".to_string())
});

pub static REISEKLAR_ADMIN_HOME_SEGMENT: LazyLock<String> = LazyLock::new(|| {
    std::env::var("REISEKLAR_ADMIN_HOME_SEGMENT").unwrap_or_else(|_| "admin".to_string())
});

/// Upper bound for a single session validation call, in seconds
/// Default: 30
pub static REISEKLAR_SESSION_CHECK_TIMEOUT: LazyLock<u64> = LazyLock::new(|| {
    std::env::var("REISEKLAR_SESSION_CHECK_TIMEOUT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30)
});

/// Delay between a gate being denied and its redirect firing, in milliseconds
/// Default: 0 (next scheduler turn)
pub static REISEKLAR_REDIRECT_DELAY_MS: LazyLock<u64> = LazyLock::new(|| {
    std::env::var("REISEKLAR_REDIRECT_DELAY_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
});

const DEFAULT_LOCALE: &str = "nb";

fn parse_locales(value: Option<&str>, default_locale: &str) -> Vec<String> {
    let mut locales: Vec<String> = value
        .unwrap_or("nb,en")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    // The default locale is always servable, even if the list omits it
    if !locales.iter().any(|l| l == default_locale) {
        locales.insert(0, default_locale.to_string());
    }
    locales
}

/// Route layout of the front-end, used by redirect target resolution
///
/// Built from the `REISEKLAR_*` environment variables by [`RouteConfig::from_env`];
/// tests and embedders can construct it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    /// Locale used when the current path carries none, or an unsupported one
    pub default_locale: String,
    /// All locale segments the front-end serves
    pub locales: Vec<String>,
    pub sign_in_segment: String,
    pub sign_up_segment: String,
    pub user_home_segment: String,
    pub admin_home_segment: String,
}

impl RouteConfig {
    pub fn from_env() -> Self {
        Self {
            default_locale: REISEKLAR_DEFAULT_LOCALE.clone(),
            locales: REISEKLAR_LOCALES.clone(),
            sign_in_segment: REISEKLAR_SIGN_IN_SEGMENT.clone(),
            sign_up_segment: REISEKLAR_SIGN_UP_SEGMENT.clone(),
            user_home_segment: REISEKLAR_USER_HOME_SEGMENT.clone(),
            admin_home_segment: REISEKLAR_ADMIN_HOME_SEGMENT.clone(),
        }
    }

    pub fn is_supported_locale(&self, segment: &str) -> bool {
        self.locales.iter().any(|l| l == segment)
    }

    /// Whether `segment` names a guest-only surface (sign-in or sign-up)
    pub fn is_guest_segment(&self, segment: &str) -> bool {
        segment == self.sign_in_segment || segment == self.sign_up_segment
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            locales: parse_locales(None, DEFAULT_LOCALE),
            sign_in_segment: "signIn".to_string(),
            sign_up_segment: "signUp".to_string(),
            user_home_segment: "user".to_string(),
            admin_home_segment: "admin".to_string(),
        }
    }
}
