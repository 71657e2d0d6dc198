//! Users and authentication payloads.

use serde::{Deserialize, Serialize};

/// Role a user signs in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A trainee working through techniques and live sessions.
    Candidate,
    /// Academy staff reviewing candidates.
    Admin,
}

/// An academy user as known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Sign-in email.
    pub email: String,
    /// Role the account holds.
    pub role: Role,
}

/// Credentials for login, registration and password reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Email or username.
    pub identifier: String,
    /// Password, or the new password for a reset.
    pub secret: String,
    /// Role the user is acting as.
    pub role: Role,
}

/// Result of an authentication call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOutcome {
    /// Whether the backend accepted the request.
    pub success: bool,
    /// The signed-in user, when the call yields one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Human-readable message, typically the rejection reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthOutcome {
    /// A successful outcome carrying `user`.
    #[must_use]
    pub fn accepted(user: Option<User>) -> Self {
        Self {
            success: true,
            user,
            message: None,
        }
    }

    /// A rejected outcome with a reason.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            user: None,
            message: Some(message.into()),
        }
    }
}
