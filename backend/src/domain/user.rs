//! User identity.
//!
//! Users are created on first successful authentication: the token verifier
//! hands over a stable external subject plus profile claims, and a row is
//! registered for subjects seen for the first time. The subject is immutable
//! once set.

use chrono::{DateTime, Utc};

use super::ids::UserId;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Internal numeric identifier.
    pub id: UserId,
    /// Stable subject assigned by the external identity provider.
    pub subject: String,
    /// E-mail address, used to address invites.
    pub email: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Derive a display name from verifier claims.
///
/// Falls back to the local part of the e-mail address when the verifier did
/// not supply a usable name.
#[must_use]
pub fn derive_display_name(claim: Option<&str>, email: &str) -> String {
    match claim {
        Some(name) if !name.trim().is_empty() => name.trim().to_owned(),
        _ => email.split('@').next().unwrap_or(email).to_owned(),
    }
}
