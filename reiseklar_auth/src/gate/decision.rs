use crate::config::RouteConfig;
use crate::gate::requirement::GatePolicy;
use crate::redirect::{Location, guest_redirect_target, home_target, sign_in_target};
use crate::session::{Role, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    InsufficientRole { required: Role, actual: Role },
    /// Authenticated visitor on a sign-in/sign-up surface
    AlreadyAuthenticated,
}

/// Outcome of evaluating a gate against a session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// State not resolved yet; no redirect may be issued
    Pending,
    Granted,
    Denied { target: String, reason: DenyReason },
}

impl GateDecision {
    pub fn is_pending(&self) -> bool {
        matches!(self, GateDecision::Pending)
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            GateDecision::Denied { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// Decide whether a visitor in `state` may enter the surface at `location`
pub fn decide(
    policy: GatePolicy,
    state: &SessionState,
    location: &Location,
    config: &RouteConfig,
) -> GateDecision {
    match (policy, state) {
        (_, SessionState::Unknown | SessionState::Checking) => GateDecision::Pending,

        (GatePolicy::Protected(_), SessionState::Unauthenticated) => GateDecision::Denied {
            target: sign_in_target(location, config),
            reason: DenyReason::Unauthenticated,
        },
        (GatePolicy::Protected(requirement), SessionState::Authenticated { user }) => {
            if requirement.is_satisfied_by(user) {
                GateDecision::Granted
            } else {
                GateDecision::Denied {
                    target: home_target(),
                    reason: DenyReason::InsufficientRole {
                        required: requirement.required_role.unwrap_or(Role::User),
                        actual: user.role(),
                    },
                }
            }
        }

        (GatePolicy::GuestOnly, SessionState::Unauthenticated) => GateDecision::Granted,
        (GatePolicy::GuestOnly, SessionState::Authenticated { user }) => GateDecision::Denied {
            target: guest_redirect_target(user, location, config),
            reason: DenyReason::AlreadyAuthenticated,
        },
    }
}
