//! Driving port for spaces, memberships, and invites.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::ids::{InviteId, SpaceId, UserId};
use crate::domain::space::{PendingInvite, SpaceMember, SpaceSummary};

use super::space_store::NewSpace;

/// Use-cases around spaces and the invite lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpaceDirectory: Send + Sync {
    /// Create a space owned by the caller.
    async fn create_space(&self, caller: UserId, space: NewSpace)
    -> Result<SpaceSummary, Error>;

    /// Invite a platform user by e-mail.
    async fn invite(&self, caller: UserId, space: SpaceId, email: &str) -> Result<(), Error>;

    /// The caller's pending invites.
    async fn pending_invites(&self, caller: UserId) -> Result<Vec<PendingInvite>, Error>;

    /// Accept a pending invite.
    async fn accept_invite(&self, caller: UserId, invite: InviteId) -> Result<(), Error>;

    /// Decline a pending invite.
    async fn reject_invite(&self, caller: UserId, invite: InviteId) -> Result<(), Error>;

    /// Spaces where the caller is an approved member.
    async fn spaces_for(&self, caller: UserId) -> Result<Vec<SpaceSummary>, Error>;

    /// One space by id.
    async fn space(&self, id: SpaceId) -> Result<SpaceSummary, Error>;

    /// Approved members of a space the caller belongs to.
    async fn members(&self, caller: UserId, space: SpaceId) -> Result<Vec<SpaceMember>, Error>;

    /// Approved members filtered by a case-insensitive substring.
    async fn search_members(
        &self,
        caller: UserId,
        space: SpaceId,
        query: Option<String>,
    ) -> Result<Vec<SpaceMember>, Error>;

    /// Leave a space, subject to the owner and open-review rules.
    async fn leave(&self, caller: UserId, space: SpaceId) -> Result<(), Error>;
}
