//! Commitments, approvers, and the audit trail.
//!
//! A commitment is a proposed undertaking that becomes binding only once a
//! designated set of approvers (always including its creator) has approved
//! it. Commitments carry an append-only list of audit events describing each
//! state transition.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::ids::{CommitmentId, EventId, SpaceId, UserId};
use super::space::UnknownStatus;

/// Commitment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitmentStatus {
    /// Editable; the approval round has not started.
    Draft,
    /// Under review; approvers are acting.
    Review,
    /// Every approver approved. Terminal.
    Locked,
}

impl CommitmentStatus {
    /// Stable uppercase tag used in storage and projections.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Review => "REVIEW",
            Self::Locked => "LOCKED",
        }
    }
}

impl FromStr for CommitmentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "REVIEW" => Ok(Self::Review),
            "LOCKED" => Ok(Self::Locked),
            other => Err(UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

impl std::fmt::Display for CommitmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-approver decision status within the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApproverStatus {
    /// Has not acted in this round.
    Pending,
    /// Approved in this round.
    Approved,
    /// Rejected; only ever observable transiently, since a rejection
    /// immediately restarts the round.
    Rejected,
}

impl ApproverStatus {
    /// Stable uppercase tag used in storage and projections.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl FromStr for ApproverStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

impl std::fmt::Display for ApproverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A commitment record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commitment {
    /// Internal numeric identifier.
    pub id: CommitmentId,
    /// The space the commitment belongs to.
    pub space_id: SpaceId,
    /// Short title.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: CommitmentStatus,
    /// The creator, always an approver.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional deadline, stored as midnight UTC of the supplied date.
    pub deadline: Option<DateTime<Utc>>,
}

/// One required approver's state for one commitment.
///
/// The set of approver rows is fixed once review begins; only the per-row
/// status changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approver {
    /// The approving user.
    pub user_id: UserId,
    /// Decision status within the current round.
    pub status: ApproverStatus,
    /// When the approver acted; cleared when a rejection restarts the round.
    pub acted_at: Option<DateTime<Utc>>,
}

/// Approver projection joined with the user's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproverView {
    /// The approving user.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Decision status within the current round.
    pub status: ApproverStatus,
    /// When the approver acted, if they have.
    pub acted_at: Option<DateTime<Utc>>,
}

/// Commitment projection returned by every workflow operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentRecord {
    /// The commitment itself.
    pub commitment: Commitment,
    /// Its approvers, in row order.
    pub approvers: Vec<ApproverView>,
}

/// Audit event kinds emitted by the workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Commitment created as a draft.
    Created,
    /// Draft fields edited.
    Edited,
    /// Draft sent for review.
    SentForReview,
    /// An approver approved.
    Approved,
    /// An approver rejected, restarting the round.
    Rejected,
    /// Every approver approved; the commitment locked.
    Locked,
}

impl EventKind {
    /// The string tag stored in the audit trail.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Edited => "EDITED",
            Self::SentForReview => "SENT_FOR_REVIEW",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Locked => "LOCKED",
        }
    }
}

/// The actor recorded on an audit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventActor {
    /// The acting user.
    pub user_id: UserId,
    /// Display name at read time.
    pub name: String,
}

/// One entry of a commitment's audit history.
///
/// Events are immutable and ordered by creation time; the payload is an
/// opaque blob stored and returned verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Event identifier.
    pub id: EventId,
    /// String tag of the transition, e.g. `SENT_FOR_REVIEW`.
    pub action: String,
    /// Who performed the transition.
    pub performed_by: EventActor,
    /// When the transition happened.
    pub at: DateTime<Utc>,
    /// Opaque payload, if any was attached.
    pub details: Option<Value>,
}
