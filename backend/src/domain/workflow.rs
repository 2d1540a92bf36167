//! The commitment approval state machine.
//!
//! Everything here is pure: functions take a snapshot of the commitment, its
//! approver rows, and the caller's standing, and return either a transition
//! describing the writes to perform or a domain error. Stores evaluate these
//! functions against a snapshot read inside the same transaction that applies
//! the writes, so a decision can never be based on state another caller has
//! since changed.
//!
//! The machine itself:
//!
//! ```text
//! DRAFT --send for review--> REVIEW
//! REVIEW --last approver approves--> LOCKED   (terminal)
//! REVIEW --any approver rejects--> DRAFT      (round restarted)
//! ```
//!
//! DRAFT is the sole editable state. A rejection resets every approver row
//! to pending, not just the rejecter's: the round restarts in full.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::commitment::{Approver, ApproverStatus, Commitment, CommitmentStatus, EventKind};
use super::error::Error;
use super::ids::UserId;
use super::space::MembershipStatus;

/// An approver's verdict on a commitment under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Approve the commitment.
    Approve,
    /// Reject it, restarting the approval round.
    Reject,
}

/// The writes a review decision requires, applied atomically by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewTransition {
    /// New status for the caller's approver row.
    pub caller_status: ApproverStatus,
    /// Acted-at timestamp for the caller's row.
    pub caller_acted_at: Option<DateTime<Utc>>,
    /// Resulting commitment status.
    pub commitment_status: CommitmentStatus,
    /// Whether every approver row resets to pending with acted-at cleared.
    pub reset_round: bool,
    /// Audit events to append, in order.
    pub events: Vec<EventKind>,
}

/// Require an approved space membership.
///
/// # Errors
///
/// [`Error::forbidden`] unless the status is [`MembershipStatus::Approved`].
pub fn ensure_approved_member(status: Option<MembershipStatus>) -> Result<(), Error> {
    match status {
        Some(MembershipStatus::Approved) => Ok(()),
        _ => Err(Error::forbidden("not an approved member of this space")),
    }
}

/// Assemble the final approver set for a new commitment.
///
/// The creator is always an approver, whether or not the request listed
/// them; duplicates collapse. The result is sorted for deterministic row
/// creation order.
#[must_use]
pub fn assemble_approver_set(creator: UserId, requested: &[UserId]) -> Vec<UserId> {
    let mut set: BTreeSet<UserId> = requested.iter().copied().collect();
    set.insert(creator);
    set.into_iter().collect()
}

/// Require every member of the approver set to be an approved space member.
///
/// `approved` holds the ids from the set that hold an approved membership,
/// as resolved by the store inside the creating transaction.
///
/// # Errors
///
/// [`Error::invalid_state`] naming the first approver that is not an
/// approved member.
pub fn ensure_approvers_are_members(
    set: &[UserId],
    approved: &BTreeSet<UserId>,
) -> Result<(), Error> {
    match set.iter().find(|id| !approved.contains(id)) {
        None => Ok(()),
        Some(missing) => Err(Error::invalid_state(format!(
            "approver {missing} is not an approved member of the space"
        ))),
    }
}

/// Require the commitment to still be editable.
///
/// # Errors
///
/// [`Error::invalid_state`] unless the commitment is a draft.
pub fn ensure_editable(commitment: &Commitment) -> Result<(), Error> {
    if commitment.status == CommitmentStatus::Draft {
        Ok(())
    } else {
        Err(Error::invalid_state("can only edit draft commitments"))
    }
}

/// Move a draft into review.
///
/// # Errors
///
/// [`Error::invalid_state`] unless the commitment is a draft.
pub fn start_review(commitment: &Commitment) -> Result<EventKind, Error> {
    if commitment.status == CommitmentStatus::Draft {
        Ok(EventKind::SentForReview)
    } else {
        Err(Error::invalid_state("can only send drafts for review"))
    }
}

/// Resolve an approver's verdict into the transition to apply.
///
/// Preconditions, checked in order: the commitment is under review; the
/// caller holds an approver row; that row is still pending. An approval by
/// the last pending approver locks the commitment in the same transition; a
/// rejection returns it to draft and restarts the round for everyone.
///
/// # Errors
///
/// - [`Error::invalid_state`] when the commitment is not under review.
/// - [`Error::forbidden`] when the caller is not a listed approver.
/// - [`Error::invalid_state`] when the caller already acted this round.
pub fn decide_review(
    commitment: &Commitment,
    approvers: &[Approver],
    caller: UserId,
    decision: ReviewDecision,
    now: DateTime<Utc>,
) -> Result<ReviewTransition, Error> {
    if commitment.status != CommitmentStatus::Review {
        return Err(Error::invalid_state(
            "can only approve or reject commitments in review",
        ));
    }

    let own_row = approvers
        .iter()
        .find(|row| row.user_id == caller)
        .ok_or_else(|| Error::forbidden("not an approver of this commitment"))?;

    if own_row.status != ApproverStatus::Pending {
        return Err(Error::invalid_state("already acted on this commitment"));
    }

    match decision {
        ReviewDecision::Approve => {
            let all_approved = approvers
                .iter()
                .filter(|row| row.user_id != caller)
                .all(|row| row.status == ApproverStatus::Approved);

            let (commitment_status, events) = if all_approved {
                (
                    CommitmentStatus::Locked,
                    vec![EventKind::Approved, EventKind::Locked],
                )
            } else {
                (CommitmentStatus::Review, vec![EventKind::Approved])
            };

            Ok(ReviewTransition {
                caller_status: ApproverStatus::Approved,
                caller_acted_at: Some(now),
                commitment_status,
                reset_round: false,
                events,
            })
        }
        ReviewDecision::Reject => Ok(ReviewTransition {
            caller_status: ApproverStatus::Rejected,
            caller_acted_at: Some(now),
            commitment_status: CommitmentStatus::Draft,
            reset_round: true,
            events: vec![EventKind::Rejected],
        }),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::domain::ids::{CommitmentId, SpaceId};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 10, 12, 0, 0).single().expect("valid timestamp")
    }

    fn commitment(status: CommitmentStatus) -> Commitment {
        Commitment {
            id: CommitmentId::new(1),
            space_id: SpaceId::new(1),
            title: "ship the release".to_owned(),
            description: None,
            status,
            created_by: UserId::new(1),
            created_at: now(),
            deadline: None,
        }
    }

    fn pending(user: i64) -> Approver {
        Approver {
            user_id: UserId::new(user),
            status: ApproverStatus::Pending,
            acted_at: None,
        }
    }

    fn approved(user: i64) -> Approver {
        Approver {
            user_id: UserId::new(user),
            status: ApproverStatus::Approved,
            acted_at: Some(now()),
        }
    }

    #[test]
    fn creator_is_always_an_approver() {
        let set = assemble_approver_set(UserId::new(1), &[UserId::new(2), UserId::new(3)]);
        assert_eq!(
            set,
            vec![UserId::new(1), UserId::new(2), UserId::new(3)]
        );
    }

    #[test]
    fn approver_set_deduplicates() {
        let set = assemble_approver_set(
            UserId::new(1),
            &[UserId::new(2), UserId::new(1), UserId::new(2)],
        );
        assert_eq!(set, vec![UserId::new(1), UserId::new(2)]);
    }

    #[test]
    fn non_member_approver_is_rejected_by_name() {
        let set = vec![UserId::new(1), UserId::new(2)];
        let approved: BTreeSet<UserId> = [UserId::new(1)].into_iter().collect();
        let err = ensure_approvers_are_members(&set, &approved).expect_err("2 is not a member");
        assert!(err.message().contains("approver 2"));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(MembershipStatus::Pending))]
    #[case(Some(MembershipStatus::Rejected))]
    fn membership_gate_requires_approved(#[case] status: Option<MembershipStatus>) {
        assert!(ensure_approved_member(status).is_err());
        assert!(ensure_approved_member(Some(MembershipStatus::Approved)).is_ok());
    }

    #[rstest]
    #[case(CommitmentStatus::Review)]
    #[case(CommitmentStatus::Locked)]
    fn only_drafts_are_editable(#[case] status: CommitmentStatus) {
        assert!(ensure_editable(&commitment(CommitmentStatus::Draft)).is_ok());
        assert!(ensure_editable(&commitment(status)).is_err());
    }

    #[rstest]
    #[case(CommitmentStatus::Review)]
    #[case(CommitmentStatus::Locked)]
    fn only_drafts_enter_review(#[case] status: CommitmentStatus) {
        assert_eq!(
            start_review(&commitment(CommitmentStatus::Draft)),
            Ok(EventKind::SentForReview)
        );
        assert!(start_review(&commitment(status)).is_err());
    }

    #[rstest]
    #[case(CommitmentStatus::Draft)]
    #[case(CommitmentStatus::Locked)]
    fn decisions_require_review_status(#[case] status: CommitmentStatus) {
        let err = decide_review(
            &commitment(status),
            &[pending(1)],
            UserId::new(1),
            ReviewDecision::Approve,
            now(),
        )
        .expect_err("not in review");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidState);
    }

    #[test]
    fn strangers_cannot_act() {
        let err = decide_review(
            &commitment(CommitmentStatus::Review),
            &[pending(1), pending(2)],
            UserId::new(9),
            ReviewDecision::Approve,
            now(),
        )
        .expect_err("not an approver");
        assert_eq!(err.code(), crate::domain::ErrorCode::Forbidden);
    }

    #[rstest]
    #[case(ReviewDecision::Approve)]
    #[case(ReviewDecision::Reject)]
    fn acting_twice_in_one_round_fails(#[case] decision: ReviewDecision) {
        let err = decide_review(
            &commitment(CommitmentStatus::Review),
            &[approved(1), pending(2)],
            UserId::new(1),
            decision,
            now(),
        )
        .expect_err("already acted");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidState);
        assert!(err.message().contains("already acted"));
    }

    #[test]
    fn approval_with_peers_pending_stays_in_review() {
        let transition = decide_review(
            &commitment(CommitmentStatus::Review),
            &[pending(1), pending(2), pending(3)],
            UserId::new(2),
            ReviewDecision::Approve,
            now(),
        )
        .expect("valid approval");

        assert_eq!(transition.caller_status, ApproverStatus::Approved);
        assert_eq!(transition.caller_acted_at, Some(now()));
        assert_eq!(transition.commitment_status, CommitmentStatus::Review);
        assert!(!transition.reset_round);
        assert_eq!(transition.events, vec![EventKind::Approved]);
    }

    #[test]
    fn final_approval_locks_in_the_same_transition() {
        let transition = decide_review(
            &commitment(CommitmentStatus::Review),
            &[approved(1), approved(2), pending(3)],
            UserId::new(3),
            ReviewDecision::Approve,
            now(),
        )
        .expect("valid approval");

        assert_eq!(transition.commitment_status, CommitmentStatus::Locked);
        assert_eq!(
            transition.events,
            vec![EventKind::Approved, EventKind::Locked]
        );
    }

    #[test]
    fn sole_approver_locks_immediately() {
        let transition = decide_review(
            &commitment(CommitmentStatus::Review),
            &[pending(1)],
            UserId::new(1),
            ReviewDecision::Approve,
            now(),
        )
        .expect("valid approval");
        assert_eq!(transition.commitment_status, CommitmentStatus::Locked);
    }

    #[test]
    fn rejection_restarts_the_round_for_everyone() {
        let transition = decide_review(
            &commitment(CommitmentStatus::Review),
            &[approved(1), approved(2), pending(3)],
            UserId::new(3),
            ReviewDecision::Reject,
            now(),
        )
        .expect("valid rejection");

        assert_eq!(transition.caller_status, ApproverStatus::Rejected);
        assert_eq!(transition.commitment_status, CommitmentStatus::Draft);
        assert!(transition.reset_round);
        assert_eq!(transition.events, vec![EventKind::Rejected]);
    }
}
