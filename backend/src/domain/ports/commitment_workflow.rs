//! Driving port for the commitment workflow engine.

use async_trait::async_trait;

use crate::domain::commitment::{CommitmentRecord, HistoryEntry};
use crate::domain::error::Error;
use crate::domain::ids::{CommitmentId, SpaceId, UserId};

use super::commitment_store::{CommitmentDraft, CommitmentPatch};

/// Use-cases of the commitment approval workflow.
///
/// All operations take the caller identity resolved by the inbound adapter;
/// nothing here reads ambient state. Errors are the three rule categories
/// (not-found, invalid-state, forbidden) plus infrastructure failures, all
/// propagated unmodified to the boundary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitmentWorkflow: Send + Sync {
    /// Create a draft commitment in a space.
    async fn create_commitment(
        &self,
        caller: UserId,
        space: SpaceId,
        draft: CommitmentDraft,
    ) -> Result<CommitmentRecord, Error>;

    /// Partially update a draft commitment.
    async fn update_commitment(
        &self,
        caller: UserId,
        id: CommitmentId,
        patch: CommitmentPatch,
    ) -> Result<CommitmentRecord, Error>;

    /// Move a draft into review.
    async fn send_for_review(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<CommitmentRecord, Error>;

    /// Approve a commitment under review as one of its approvers.
    async fn approve(&self, caller: UserId, id: CommitmentId)
    -> Result<CommitmentRecord, Error>;

    /// Reject a commitment under review, restarting the approval round.
    async fn reject(&self, caller: UserId, id: CommitmentId)
    -> Result<CommitmentRecord, Error>;

    /// All commitments of a space the caller belongs to.
    async fn space_commitments(
        &self,
        caller: UserId,
        space: SpaceId,
    ) -> Result<Vec<CommitmentRecord>, Error>;

    /// One commitment, membership permitting.
    async fn commitment(&self, caller: UserId, id: CommitmentId)
    -> Result<CommitmentRecord, Error>;

    /// The commitment's audit history, oldest first.
    async fn history(&self, caller: UserId, id: CommitmentId)
    -> Result<Vec<HistoryEntry>, Error>;
}
