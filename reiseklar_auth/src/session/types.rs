use serde::{Deserialize, Serialize};

use crate::session::errors::IdentityError;

/// Role of a Reiseklar account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Whether an account with this role may enter a surface requiring `required`.
    /// Admins can enter every user surface.
    pub fn satisfies(self, required: Role) -> bool {
        match required {
            Role::User => true,
            Role::Admin => self == Role::Admin,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Theme {
    Light,
    Dark,
    System,
}

/// Identity payload as it arrives on the wire, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IdentityPayload {
    id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    role: Option<Role>,
    #[serde(default, deserialize_with = "lenient_theme")]
    theme: Option<Theme>,
    language: Option<String>,
}

// Theme is a display preference: a value this client does not know is
// dropped instead of failing the whole identity
fn lenient_theme<'de, D>(deserializer: D) -> Result<Option<Theme>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match Theme::deserialize(&value) {
        Ok(theme) => Some(theme),
        Err(_) => {
            tracing::debug!("Ignoring unrecognised theme {}", value);
            None
        }
    }))
}

/// Validated snapshot of the signed-in user
///
/// A `UserIdentity` is always complete: id, email and role are present and
/// non-empty. Deserialization of a partial payload fails, so a malformed
/// response from the API server can never produce an authenticated session.
/// The snapshot is immutable; a re-check replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "IdentityPayload")]
pub struct UserIdentity {
    id: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

impl UserIdentity {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Result<Self, IdentityError> {
        let id = id.into();
        let email = email.into();
        if id.trim().is_empty() {
            return Err(IdentityError::MissingField("id"));
        }
        if email.trim().is_empty() {
            return Err(IdentityError::MissingField("email"));
        }
        Ok(Self {
            id,
            email,
            name: None,
            role,
            theme: None,
            language: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn theme(&self) -> Option<Theme> {
        self.theme
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl TryFrom<IdentityPayload> for UserIdentity {
    type Error = IdentityError;

    fn try_from(payload: IdentityPayload) -> Result<Self, Self::Error> {
        let role = payload.role.ok_or(IdentityError::MissingField("role"))?;
        let mut identity = UserIdentity::new(
            payload.id.ok_or(IdentityError::MissingField("id"))?,
            payload.email.ok_or(IdentityError::MissingField("email"))?,
            role,
        )?;
        identity.name = payload.name.filter(|n| !n.is_empty());
        identity.theme = payload.theme;
        identity.language = payload.language.filter(|l| !l.is_empty());
        Ok(identity)
    }
}

/// Process-wide authentication state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No check performed yet
    #[default]
    Unknown,
    /// A session validation request is in flight
    Checking,
    Authenticated { user: UserIdentity },
    /// No valid session, whether absent, rejected, or unreachable
    Unauthenticated,
}

impl SessionState {
    /// `Unknown` and `Checking` are unresolved; gates must not redirect on them
    pub fn is_resolved(&self) -> bool {
        matches!(
            self,
            SessionState::Authenticated { .. } | SessionState::Unauthenticated
        )
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            SessionState::Authenticated { user } => Some(user),
            _ => None,
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            SessionState::Unknown => "Unknown",
            SessionState::Checking => "Checking",
            SessionState::Authenticated { .. } => "Authenticated",
            SessionState::Unauthenticated => "Unauthenticated",
        }
    }
}
