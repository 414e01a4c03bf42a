use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::headers::{Cookie, HeaderMapExt};
use http::{HeaderMap, Method, StatusCode, header::COOKIE, request::Parts};
use serde::Serialize;

use reiseklar_auth::{AuthServiceError, Location, Role, SessionState, UserIdentity, sign_in_target};

use super::config::REISEKLAR_SESSION_COOKIE_NAME;
use super::middleware::is_navigation;
use super::state::GateState;

/// Resolve the session of a browser request.
///
/// Requests without the session cookie are unauthenticated without asking
/// the API server. Validation failures of any kind resolve to
/// `Unauthenticated`.
pub async fn resolve_session(headers: &HeaderMap, state: &GateState) -> SessionState {
    let has_session_cookie = headers
        .typed_get::<Cookie>()
        .is_some_and(|cookies| cookies.get(REISEKLAR_SESSION_COOKIE_NAME.as_str()).is_some());
    if !has_session_cookie {
        tracing::trace!("No session cookie present");
        return SessionState::Unauthenticated;
    }

    let cookie_header = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    match state.validator.validate_cookie(&cookie_header).await {
        Ok(user) => SessionState::Authenticated { user },
        Err(err @ AuthServiceError::NetworkFailure(_)) => {
            tracing::error!("Session validation failed: {}", err);
            SessionState::Unauthenticated
        }
        Err(err) => {
            tracing::debug!("Session rejected: {}", err);
            SessionState::Unauthenticated
        }
    }
}

/// Rejection of the [`AuthUser`] extractor
#[derive(Debug)]
pub struct AuthRedirect {
    method: Method,
    target: String,
}

impl AuthRedirect {
    fn new(method: Method, target: String) -> Self {
        Self { method, target }
    }
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        if is_navigation(&self.method) {
            tracing::debug!("Redirecting to {}", self.target);
            Redirect::temporary(&self.target).into_response()
        } else {
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}

/// Authenticated visitor, available as an Axum extractor
///
/// Behind one of the gate middlewares the identity resolved by the gate is
/// reused. Elsewhere the session cookie is validated on extraction, and
/// unauthenticated requests are sent to the sign-in page.
///
/// ```no_run
/// use axum::{routing::get, Router};
/// use reiseklar_auth_axum::{AuthUser, GateState};
///
/// async fn trips(user: AuthUser) -> String {
///     format!("Trips of {}", user.email)
/// }
///
/// fn app(state: GateState) -> Router {
///     Router::new().route("/nb/user/trips", get(trips)).with_state(state)
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<UserIdentity> for AuthUser {
    fn from(user: UserIdentity) -> Self {
        AuthUser {
            id: user.id().to_string(),
            email: user.email().to_string(),
            name: user.name().map(str::to_string),
            role: user.role(),
            language: user.language().map(str::to_string),
        }
    }
}

async fn extract_user<S>(parts: &Parts, state: &S) -> Option<AuthUser>
where
    GateState: FromRef<S>,
{
    if let Some(user) = parts.extensions.get::<AuthUser>() {
        return Some(user.clone());
    }
    let state = GateState::from_ref(state);
    match resolve_session(&parts.headers, &state).await {
        SessionState::Authenticated { user } => Some(AuthUser::from(user)),
        _ => None,
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    GateState: FromRef<S>,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = extract_user(parts, state).await {
            return Ok(user);
        }
        let config = GateState::from_ref(state).config;
        let raw = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let target = sign_in_target(&Location::parse(raw, &config), &config);
        Err(AuthRedirect::new(parts.method.clone(), target))
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    GateState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(extract_user(parts, state).await)
    }
}
