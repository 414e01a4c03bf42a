use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use http::Method;

use reiseklar_auth::{DenyReason, GateDecision, GatePolicy, Location, SessionState, decide};

use super::session::{AuthUser, resolve_session};
use super::state::GateState;

// Browsers following a redirect only make sense for navigations
pub(crate) fn is_navigation(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

fn deny(method: &Method, target: &str, reason: DenyReason) -> Response {
    if is_navigation(method) {
        return Redirect::temporary(target).into_response();
    }
    match reason {
        DenyReason::Unauthenticated => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
        DenyReason::InsufficientRole { .. } => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
        // A form post from the sign-in page by a signed-in visitor
        DenyReason::AlreadyAuthenticated => Redirect::to(target).into_response(),
    }
}

async fn gate(policy: GatePolicy, state: &GateState, mut req: Request, next: Next) -> Response {
    let session = resolve_session(req.headers(), state).await;
    let raw = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let location = Location::parse(raw, &state.config);

    match decide(policy, &session, &location, &state.config) {
        GateDecision::Granted => {
            if let SessionState::Authenticated { user } = session {
                req.extensions_mut().insert(AuthUser::from(user));
            }
            next.run(req).await
        }
        GateDecision::Denied { target, reason } => {
            tracing::debug!(
                "{} {} denied ({:?}), sending to {}",
                req.method(),
                location.path(),
                reason,
                target
            );
            deny(req.method(), &target, reason)
        }
        GateDecision::Pending => {
            // resolve_session always returns a resolved state
            tracing::error!("Gate undecided for {}", location.path());
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Admit any authenticated visitor
pub async fn require_user(State(state): State<GateState>, req: Request, next: Next) -> Response {
    gate(GatePolicy::user_area(), &state, req, next).await
}

/// Admit only authenticated admins
pub async fn require_admin(State(state): State<GateState>, req: Request, next: Next) -> Response {
    gate(GatePolicy::admin_area(), &state, req, next).await
}

/// Admit only visitors without a session; signed-in visitors are sent to
/// their callback or dashboard
pub async fn guest_only(State(state): State<GateState>, req: Request, next: Next) -> Response {
    gate(GatePolicy::GuestOnly, &state, req, next).await
}
