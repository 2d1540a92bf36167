//! Spaces and memberships.
//!
//! A space is a named group of users sharing commitments. Membership is a
//! per-user, per-space row whose status tracks the invite lifecycle; the
//! row id doubles as the invite handle shown to the invitee.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{InviteId, SpaceId, UserId};

/// A named group of users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Space {
    /// Internal numeric identifier.
    pub id: SpaceId,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Owner. Permanent: spaces are never transferred or deleted.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Membership lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipStatus {
    /// Invited, awaiting the invitee's decision.
    Pending,
    /// Full member.
    Approved,
    /// Invite declined; a re-invite re-arms the same row.
    Rejected,
}

impl MembershipStatus {
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

impl FromStr for MembershipStatus {
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

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored status tag does not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status tag: {value}")]
pub struct UnknownStatus {
    /// The unrecognised tag.
    pub value: String,
}

/// One user's membership of one space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    /// Row identifier, also the invite handle.
    pub id: InviteId,
    /// The member or invitee.
    pub user_id: UserId,
    /// The space joined or invited to.
    pub space_id: SpaceId,
    /// Lifecycle status.
    pub status: MembershipStatus,
    /// Invite or join timestamp; refreshed when an invite is re-armed or
    /// accepted.
    pub joined_at: DateTime<Utc>,
}

/// Space projection including aggregate counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceSummary {
    /// The space itself.
    pub space: Space,
    /// Number of approved members.
    pub member_count: i64,
    /// Number of commitments in the space, regardless of status.
    pub commitment_count: i64,
}

/// Role of a member within a space, as shown in member listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// The space owner.
    Creator,
    /// Any other approved member.
    Member,
}

/// Member listing projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceMember {
    /// The member.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// E-mail address.
    pub email: String,
    /// Creator or plain member.
    pub role: MemberRole,
    /// When the member joined.
    pub joined_at: DateTime<Utc>,
}

/// Pending invite projection, shown to the invitee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInvite {
    /// Invite handle (the membership row id).
    pub id: InviteId,
    /// Target space.
    pub space_id: SpaceId,
    /// Target space name.
    pub space_name: String,
    /// Always [`MembershipStatus::Pending`] in listings.
    pub status: MembershipStatus,
    /// When the invite was issued or last re-armed.
    pub invited_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tags_round_trip() {
        for status in [
            MembershipStatus::Pending,
            MembershipStatus::Approved,
            MembershipStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<MembershipStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "BANNED".parse::<MembershipStatus>().expect_err("unknown");
        assert_eq!(err.value, "BANNED");
    }
}
