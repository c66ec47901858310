use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role carried by a credential or reported for a signed-in user.
///
/// Tokens carry `admin` or `member`; `user` is what the session endpoint
/// reports when the token has no role at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
            Role::User => "user",
        }
    }
}

/// Decoded claims of a verified credential.
///
/// Timestamps are seconds since the Unix epoch, as embedded in the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "sub")]
    pub subject_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_id: Option<String>,
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl Identity {
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            role: None,
            family_id: None,
            issued_at: None,
            expires_at: None,
        }
    }

    /// Role to report to clients, defaulting to `user` when the token has none
    pub fn effective_role(&self) -> Role {
        self.role.unwrap_or_default()
    }

    pub fn issued_at_utc(&self) -> Option<DateTime<Utc>> {
        self.issued_at.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}
