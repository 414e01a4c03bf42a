use axum::{
    Json, Router,
    extract::Path,
    middleware::from_fn_with_state,
    response::{Html, IntoResponse},
    routing::get,
};

use reiseklar_auth_axum::{AuthUser, GateState, guest_only, require_admin, require_user};

pub(super) fn router(state: GateState) -> Router {
    let user_area = Router::new()
        .route("/{locale}/user", get(user_home))
        .route_layer(from_fn_with_state(state.clone(), require_user));

    let admin_area = Router::new()
        .route("/{locale}/admin", get(admin_home))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    let guest_area = Router::new()
        .route("/{locale}/signIn", get(sign_in))
        .route("/{locale}/signUp", get(sign_up))
        .route_layer(from_fn_with_state(state.clone(), guest_only));

    Router::new()
        .route("/", get(index))
        .route("/me", get(me))
        .merge(user_area)
        .merge(admin_area)
        .merge(guest_area)
        .with_state(state)
}

async fn index(user: Option<AuthUser>) -> Html<String> {
    let greeting = match user {
        Some(user) => format!("Welcome back, {}", user.name.as_deref().unwrap_or(&user.email)),
        None => "Welcome to Reiseklar".to_string(),
    };
    Html(format!(
        "<h1>{greeting}</h1><ul><li><a href=\"/nb/user\">Trips</a></li>\
         <li><a href=\"/nb/admin\">Admin</a></li><li><a href=\"/nb/signIn\">Sign in</a></li></ul>"
    ))
}

async fn me(user: AuthUser) -> impl IntoResponse {
    Json(user)
}

async fn user_home(Path(locale): Path<String>, user: AuthUser) -> Html<String> {
    Html(format!(
        "<h1>Trips</h1><p>Signed in as {} ({locale})</p>",
        user.email
    ))
}

async fn admin_home(Path(locale): Path<String>, user: AuthUser) -> Html<String> {
    Html(format!(
        "<h1>Administration</h1><p>{} ({}, {locale})</p>",
        user.email, user.role
    ))
}

async fn sign_in(Path(locale): Path<String>) -> Html<String> {
    Html(format!(
        "<h1>Sign in</h1><p>Sign-in form ({locale}) posts to the Reiseklar API</p>"
    ))
}

async fn sign_up(Path(locale): Path<String>) -> Html<String> {
    Html(format!("<h1>Sign up</h1><p>Registration ({locale})</p>"))
}
