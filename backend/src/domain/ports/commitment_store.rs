//! Driven port for commitment persistence.
//!
//! Every mutating method is a single atomic unit of work: the adapter reads
//! a consistent snapshot under a row-level lock on the commitment, evaluates
//! the pure state machine against it, and applies the resulting writes plus
//! the audit event in the same transaction. Rule violations surface as
//! [`CommitmentStoreError::Rule`] carrying the domain error raised at the
//! point of violation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::commitment::{CommitmentRecord, HistoryEntry};
use crate::domain::error::Error;
use crate::domain::ids::{CommitmentId, SpaceId, UserId};
use crate::domain::workflow::ReviewDecision;

/// Fields of a new commitment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentDraft {
    /// Short title. Non-blank; validated at the boundary.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional deadline, already normalised to midnight UTC.
    pub deadline: Option<DateTime<Utc>>,
    /// Requested approvers. The creator joins the set regardless.
    pub approver_ids: Vec<UserId>,
}

/// Partial update of a draft commitment.
///
/// Field presence decides what changes: a `None` leaves the stored value
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitmentPatch {
    /// Replacement title, if supplied.
    pub title: Option<String>,
    /// Replacement description, if supplied.
    pub description: Option<String>,
    /// Replacement deadline, if supplied.
    pub deadline: Option<DateTime<Utc>>,
}

impl CommitmentPatch {
    /// Whether the patch changes anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.deadline.is_none()
    }
}

/// Errors raised by commitment store adapters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommitmentStoreError {
    /// A domain rule rejected the operation; propagated unmodified.
    #[error(transparent)]
    Rule(#[from] Error),
    /// Store connection could not be established.
    #[error("commitment store connection failed: {message}")]
    Connection {
        /// Driver-level description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("commitment store query failed: {message}")]
    Query {
        /// Driver-level description.
        message: String,
    },
}

impl CommitmentStoreError {
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

/// Port for commitment state, approver rows, and the audit trail.
#[async_trait]
pub trait CommitmentStore: Send + Sync {
    /// Create a draft commitment with its approver rows and `CREATED` event.
    async fn create(
        &self,
        caller: UserId,
        space: SpaceId,
        draft: CommitmentDraft,
    ) -> Result<CommitmentRecord, CommitmentStoreError>;

    /// Apply a partial update to a draft and append an `EDITED` event.
    async fn update(
        &self,
        caller: UserId,
        id: CommitmentId,
        patch: CommitmentPatch,
    ) -> Result<CommitmentRecord, CommitmentStoreError>;

    /// Move a draft into review.
    async fn send_for_review(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<CommitmentRecord, CommitmentStoreError>;

    /// Record the caller's verdict, locking or restarting the round as the
    /// state machine dictates.
    async fn decide(
        &self,
        caller: UserId,
        id: CommitmentId,
        decision: ReviewDecision,
    ) -> Result<CommitmentRecord, CommitmentStoreError>;

    /// All commitments of a space, oldest first.
    async fn list_for_space(
        &self,
        caller: UserId,
        space: SpaceId,
    ) -> Result<Vec<CommitmentRecord>, CommitmentStoreError>;

    /// One commitment with its approvers.
    async fn fetch(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<CommitmentRecord, CommitmentStoreError>;

    /// The audit trail, ascending by creation time.
    async fn history(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<Vec<HistoryEntry>, CommitmentStoreError>;
}
