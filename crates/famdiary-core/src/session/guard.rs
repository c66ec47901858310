use super::SessionSnapshot;

/// What a screen or action requires of the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequirement {
    pub admin_only: bool,
    pub required_permission: Option<String>,
}

impl AccessRequirement {
    /// Any signed-in user
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn admin() -> Self {
        Self {
            admin_only: true,
            required_permission: None,
        }
    }

    pub fn permission(permission: impl Into<String>) -> Self {
        Self {
            admin_only: false,
            required_permission: Some(permission.into()),
        }
    }

    /// Decide whether `session` satisfies this requirement.
    pub fn evaluate(&self, session: &SessionSnapshot) -> AccessDecision {
        if session.loading {
            return AccessDecision::Pending;
        }
        if !session.is_authenticated() {
            return AccessDecision::RedirectToLogin;
        }
        if self.admin_only && !session.is_admin() {
            return AccessDecision::Forbidden;
        }
        if let Some(ref permission) = self.required_permission {
            if !session.has_permission(permission) {
                return AccessDecision::Forbidden;
            }
        }
        AccessDecision::Granted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Session check still running; show a placeholder
    Pending,
    RedirectToLogin,
    Forbidden,
    Granted,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }
}
