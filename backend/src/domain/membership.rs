//! Membership lifecycle rules.
//!
//! Pure decision functions for the invite lifecycle and for leaving a space,
//! evaluated by the space store inside the transaction that applies them.
//! A membership row is created pending, flips to approved or rejected by the
//! invitee, and a rejected row is re-armed in place by a re-invite rather
//! than duplicated.

use super::error::Error;
use super::ids::UserId;
use super::space::MembershipStatus;

/// How an invite should be recorded, given any existing membership row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitePlan {
    /// No row exists: create one, pending.
    Create,
    /// A rejected row exists: flip the same row back to pending.
    Rearm,
}

/// The invitee's answer to a pending invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteReply {
    /// Join the space.
    Accept,
    /// Decline; the row stays rejected until a re-invite.
    Decline,
}

/// Plan an invite against the invitee's existing membership, if any.
///
/// # Errors
///
/// [`Error::invalid_state`] when the invitee is already a member or already
/// holds a pending invite.
pub fn plan_invite(existing: Option<MembershipStatus>) -> Result<InvitePlan, Error> {
    match existing {
        None => Ok(InvitePlan::Create),
        Some(MembershipStatus::Approved) => Err(Error::invalid_state("user is already a member")),
        Some(MembershipStatus::Pending) => Err(Error::invalid_state("invite already pending")),
        Some(MembershipStatus::Rejected) => Ok(InvitePlan::Rearm),
    }
}

/// Resolve the invitee's reply into the resulting membership status.
///
/// # Errors
///
/// [`Error::invalid_state`] unless the invite is still pending.
pub fn respond_to_invite(
    current: MembershipStatus,
    reply: InviteReply,
) -> Result<MembershipStatus, Error> {
    if current != MembershipStatus::Pending {
        return Err(Error::invalid_state("invite is not pending"));
    }
    Ok(match reply {
        InviteReply::Accept => MembershipStatus::Approved,
        InviteReply::Decline => MembershipStatus::Rejected,
    })
}

/// Check whether a member may leave a space.
///
/// The owner can never leave, and a member with an approval round open on
/// one of their commitments must see it through (or back to draft) first.
///
/// # Errors
///
/// - [`Error::not_found`] unless the caller holds an approved membership.
/// - [`Error::invalid_state`] when the caller owns the space or has a
///   commitment under review in it.
pub fn ensure_can_leave(
    owner: UserId,
    caller: UserId,
    membership: Option<MembershipStatus>,
    has_commitment_in_review: bool,
) -> Result<(), Error> {
    if membership != Some(MembershipStatus::Approved) {
        return Err(Error::not_found("not a member of this space"));
    }
    if caller == owner {
        return Err(Error::invalid_state("the space owner cannot leave"));
    }
    if has_commitment_in_review {
        return Err(Error::invalid_state(
            "cannot leave a space while your commitments are in review",
        ));
    }
    Ok(())
}
