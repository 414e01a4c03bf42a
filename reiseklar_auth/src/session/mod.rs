mod errors;
mod store;
mod types;

pub use errors::{IdentityError, SessionError};
pub use store::{CheckHandle, SessionSnapshot, SessionStore, SessionSubscription};
pub use types::{Role, SessionState, Theme, UserIdentity};
