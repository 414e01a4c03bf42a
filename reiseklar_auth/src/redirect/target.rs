//! Redirect target resolution
//!
//! Pure functions mapping a gate denial to the path the browser should go
//! to. Resolution never fails: unsupported locales and unsafe or missing
//! callbacks fall back to defaults.

use url::{Url, form_urlencoded};

use crate::config::RouteConfig;
use crate::session::{Role, UserIdentity};

/// Name of the query parameter carrying the originally requested path
pub const CALLBACK_PARAM: &str = "callback";

// Stand-in origin for same-origin checks on relative callback paths
const ORIGIN_PROBE: &str = "http://reiseklar.invalid/";

/// A front-end location split into locale segment, path and query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    locale: Option<String>,
    path: String,
    query: Option<String>,
}

impl Location {
    /// Parse a path (optionally with query) or an absolute URL.
    ///
    /// The first path segment is taken as the locale when it is one of the
    /// supported locales; otherwise it stays part of the path.
    pub fn parse(raw: &str, config: &RouteConfig) -> Self {
        let (full_path, query) = match Url::parse(ORIGIN_PROBE).and_then(|base| base.join(raw)) {
            Ok(url) => (url.path().to_string(), url.query().map(str::to_string)),
            Err(e) => {
                tracing::debug!("Unparseable location {:?}: {}", raw, e);
                ("/".to_string(), None)
            }
        };

        let trimmed = full_path.trim_start_matches('/');
        let (first, rest) = match trimmed.split_once('/') {
            Some((first, rest)) => (first, Some(rest)),
            None => (trimmed, None),
        };

        if config.is_supported_locale(first) {
            let path = match rest {
                Some(rest) if !rest.is_empty() => format!("/{rest}"),
                _ => "/".to_string(),
            };
            Self {
                locale: Some(first.to_string()),
                path,
                query: query.filter(|q| !q.is_empty()),
            }
        } else {
            Self {
                locale: None,
                path: full_path,
                query: query.filter(|q| !q.is_empty()),
            }
        }
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Path without the locale segment
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Locale of this location, or the configured default
    pub fn resolved_locale<'a>(&'a self, config: &'a RouteConfig) -> &'a str {
        self.locale
            .as_deref()
            .unwrap_or(config.default_locale.as_str())
    }

    pub fn first_segment(&self) -> Option<&str> {
        self.path
            .trim_start_matches('/')
            .split('/')
            .next()
            .filter(|s| !s.is_empty())
    }

    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Whether this location is a sign-in or sign-up surface
    pub fn is_guest_surface(&self, config: &RouteConfig) -> bool {
        self.first_segment()
            .is_some_and(|segment| config.is_guest_segment(segment))
    }
}

// Slashes stay readable in the query value; everything else is escaped
fn encode_callback(path: &str) -> String {
    urlencoding::encode(path).replace("%2F", "/")
}

/// Sign-in page for an unauthenticated visitor of `location`
///
/// Keeps the current locale and passes the requested path as `callback`.
/// The home page needs no callback.
pub fn sign_in_target(location: &Location, config: &RouteConfig) -> String {
    let locale = location.resolved_locale(config);
    let mut target = format!("/{locale}/{}", config.sign_in_segment);
    if location.path() != "/" {
        target.push('?');
        target.push_str(CALLBACK_PARAM);
        target.push('=');
        target.push_str(&encode_callback(&location.path_and_query()));
    }
    target
}

/// Application home, for authenticated visitors lacking the required role
pub fn home_target() -> String {
    "/".to_string()
}

/// Role-appropriate dashboard home
pub fn dashboard_target(role: Role, locale: &str, config: &RouteConfig) -> String {
    match role {
        Role::Admin => format!("/{locale}/{}", config.admin_home_segment),
        Role::User => format!("/{locale}/{}", config.user_home_segment),
    }
}

/// Where an already authenticated visitor of a sign-in/sign-up surface goes
///
/// A same-origin-safe `callback` wins; otherwise the dashboard of the user's role.
pub fn guest_redirect_target(
    user: &UserIdentity,
    location: &Location,
    config: &RouteConfig,
) -> String {
    let locale = location.resolved_locale(config);
    location
        .query_param(CALLBACK_PARAM)
        .and_then(|callback| safe_callback(&callback, config))
        .map(|callback| localize(&callback, locale, config))
        .unwrap_or_else(|| dashboard_target(user.role(), locale, config))
}

/// Validate a callback path, returning its normalized form when it is safe.
///
/// Safe means: a single leading `/`, no scheme or authority, no backslashes
/// or control characters, same origin once resolved, and not a guest
/// surface (which would bounce the visitor straight back).
pub fn safe_callback(raw: &str, config: &RouteConfig) -> Option<String> {
    if !raw.starts_with('/') || raw.starts_with("//") {
        return None;
    }
    if raw.chars().any(|c| c.is_control() || c == '\\') {
        return None;
    }

    let base = Url::parse(ORIGIN_PROBE).ok()?;
    let resolved = base.join(raw).ok()?;
    if resolved.origin() != base.origin() {
        tracing::warn!("Ignoring cross-origin callback {:?}", raw);
        return None;
    }

    // Dot segments can collapse into a protocol-relative path ("/.//host")
    if resolved.path().starts_with("//") {
        return None;
    }

    let mut normalized = resolved.path().to_string();
    if let Some(query) = resolved.query() {
        normalized.push('?');
        normalized.push_str(query);
    }

    if Location::parse(&normalized, config).is_guest_surface(config) {
        tracing::debug!("Ignoring callback onto a guest surface {:?}", raw);
        return None;
    }
    Some(normalized)
}

// Prefix the locale unless the path already carries a supported one
fn localize(path: &str, locale: &str, config: &RouteConfig) -> String {
    if Location::parse(path, config).locale().is_some() {
        path.to_string()
    } else if path == "/" {
        format!("/{locale}")
    } else {
        format!("/{locale}{path}")
    }
}
