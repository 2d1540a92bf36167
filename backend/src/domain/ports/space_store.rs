//! Driven port for space and membership persistence.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::ids::{InviteId, SpaceId, UserId};
use crate::domain::membership::InviteReply;
use crate::domain::space::{PendingInvite, SpaceMember, SpaceSummary};

/// Fields of a new space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSpace {
    /// Display name. Non-blank; validated at the boundary.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
}

/// Errors raised by space store adapters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpaceStoreError {
    /// A domain rule rejected the operation; propagated unmodified.
    #[error(transparent)]
    Rule(#[from] Error),
    /// Store connection could not be established.
    #[error("space store connection failed: {message}")]
    Connection {
        /// Driver-level description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("space store query failed: {message}")]
    Query {
        /// Driver-level description.
        message: String,
    },
}

impl SpaceStoreError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for spaces, memberships, and invites.
///
/// Mutating methods are atomic units of work; the invite and leave rules are
/// evaluated against state read inside the applying transaction.
#[async_trait]
pub trait SpaceStore: Send + Sync {
    /// Create a space and the owner's approved membership together.
    async fn create_space(
        &self,
        owner: UserId,
        space: NewSpace,
    ) -> Result<SpaceSummary, SpaceStoreError>;

    /// Invite a platform user to a space by e-mail.
    async fn invite_by_email(
        &self,
        inviter: UserId,
        space: SpaceId,
        email: &str,
    ) -> Result<(), SpaceStoreError>;

    /// The caller's pending invites.
    async fn pending_invites(
        &self,
        user: UserId,
    ) -> Result<Vec<PendingInvite>, SpaceStoreError>;

    /// Accept or decline a pending invite owned by the caller.
    async fn respond_to_invite(
        &self,
        user: UserId,
        invite: InviteId,
        reply: InviteReply,
    ) -> Result<(), SpaceStoreError>;

    /// Spaces where the user is an approved member.
    async fn spaces_for(&self, user: UserId) -> Result<Vec<SpaceSummary>, SpaceStoreError>;

    /// One space with its aggregate counts.
    async fn fetch_space(&self, id: SpaceId) -> Result<SpaceSummary, SpaceStoreError>;

    /// Approved members of a space, optionally filtered by a
    /// case-insensitive substring over name and e-mail.
    async fn members(
        &self,
        caller: UserId,
        space: SpaceId,
        filter: Option<&str>,
    ) -> Result<Vec<SpaceMember>, SpaceStoreError>;

    /// Remove the caller's membership, subject to the leave rules.
    async fn leave(&self, user: UserId, space: SpaceId) -> Result<(), SpaceStoreError>;
}
