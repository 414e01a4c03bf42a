//! Redirect dispatching and target resolution

mod dispatcher;
mod target;

pub use dispatcher::{CancelToken, Navigator, RedirectDispatcher};
pub use target::{
    CALLBACK_PARAM, Location, dashboard_target, guest_redirect_target, home_target,
    safe_callback, sign_in_target,
};
