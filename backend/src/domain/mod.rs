//! Domain primitives, the approval state machine, and services.
//!
//! The module splits into three layers:
//!
//! - entities and identifiers ([`user`], [`space`], [`commitment`], [`ids`]);
//! - pure decision logic ([`workflow`] for the approval state machine,
//!   [`membership`] for the invite lifecycle), evaluated by stores inside
//!   the transactions that apply the resulting writes;
//! - [`ports`] and the services implementing the driving ones
//!   ([`WorkflowService`], [`SpaceService`], [`IdentityService`]).

pub mod commitment;
pub mod error;
pub mod ids;
pub mod identity_service;
pub mod membership;
pub mod ports;
pub mod space;
pub mod space_service;
pub mod user;
pub mod workflow;
pub mod workflow_service;

pub use self::commitment::{
    Approver, ApproverStatus, ApproverView, Commitment, CommitmentRecord, CommitmentStatus,
    EventActor, EventKind, HistoryEntry,
};
pub use self::error::{Error, ErrorCode};
pub use self::identity_service::IdentityService;
pub use self::ids::{CommitmentId, EventId, InviteId, SpaceId, UserId};
pub use self::membership::{InvitePlan, InviteReply};
pub use self::space::{
    Membership, MembershipStatus, MemberRole, PendingInvite, Space, SpaceMember, SpaceSummary,
};
pub use self::space_service::SpaceService;
pub use self::user::User;
pub use self::workflow::{ReviewDecision, ReviewTransition};
pub use self::workflow_service::WorkflowService;

/// Convenient result alias for domain operations.
pub type ApiResult<T> = Result<T, Error>;
