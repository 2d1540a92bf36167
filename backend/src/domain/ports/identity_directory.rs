//! Driving port for caller identity resolution.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::ids::UserId;
use crate::domain::user::User;

/// Use-cases around user identity.
///
/// `resolve_bearer` is the entry point of every authenticated request: it
/// verifies the credential with the external collaborator and maps the
/// subject onto an internal user row, registering one on first sight.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Resolve a bearer token into the calling user, auto-registering
    /// first-time subjects.
    async fn resolve_bearer(&self, token: &str) -> Result<User, Error>;

    /// Look up a user by internal id.
    async fn user(&self, id: UserId) -> Result<User, Error>;
}
