use crate::session::{Role, UserIdentity};

/// Declarative role constraint attached to a protected surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateRequirement {
    /// `None` admits any authenticated user
    pub required_role: Option<Role>,
}

impl GateRequirement {
    pub const fn any_user() -> Self {
        Self {
            required_role: None,
        }
    }

    pub const fn role(role: Role) -> Self {
        Self {
            required_role: Some(role),
        }
    }

    pub fn is_satisfied_by(&self, user: &UserIdentity) -> bool {
        self.required_role
            .is_none_or(|required| user.role().satisfies(required))
    }
}

/// What a gate guards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePolicy {
    /// User or admin area; only authenticated visitors meeting the requirement enter
    Protected(GateRequirement),
    /// Sign-in and sign-up surfaces; authenticated visitors are sent onwards
    GuestOnly,
}

impl GatePolicy {
    pub const fn user_area() -> Self {
        GatePolicy::Protected(GateRequirement::any_user())
    }

    pub const fn admin_area() -> Self {
        GatePolicy::Protected(GateRequirement::role(Role::Admin))
    }
}

impl From<GateRequirement> for GatePolicy {
    fn from(requirement: GateRequirement) -> Self {
        GatePolicy::Protected(requirement)
    }
}
