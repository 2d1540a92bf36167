//! Shared test support: an in-memory backend implementing the store ports.
//!
//! The in-memory stores evaluate the same pure decision functions the Diesel
//! adapters do, over a single mutex-guarded world, so the end-to-end tests
//! exercise handlers, services, and the state machine together without a
//! database.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use backend::domain::ports::{
    CommitmentDraft, CommitmentPatch, CommitmentStore, CommitmentStoreError, NewSpace, NewUser,
    SpaceStore, SpaceStoreError, StaticTokenVerifier, UserStore, UserStoreError,
};
use backend::domain::{
    Approver, ApproverStatus, ApproverView, Commitment, CommitmentId, CommitmentRecord,
    CommitmentStatus, Error, EventActor, EventId, EventKind, HistoryEntry, IdentityService,
    InviteId, InvitePlan, InviteReply, MemberRole, Membership, MembershipStatus, PendingInvite,
    ReviewDecision, Space, SpaceId, SpaceMember, SpaceService, SpaceSummary, User, UserId,
    WorkflowService, membership, workflow,
};
use backend::inbound::http::HttpState;

#[derive(Debug, Clone)]
struct EventRec {
    id: i64,
    commitment_id: i64,
    actor: UserId,
    tag: String,
    at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct World {
    users: Vec<User>,
    spaces: Vec<Space>,
    memberships: Vec<Membership>,
    commitments: Vec<Commitment>,
    approvers: Vec<(i64, Approver)>,
    events: Vec<EventRec>,
    next_id: i64,
}

impl World {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn membership_status(&self, user: UserId, space: SpaceId) -> Option<MembershipStatus> {
        self.memberships
            .iter()
            .find(|m| m.user_id == user && m.space_id == space)
            .map(|m| m.status)
    }

    fn require_user(&self, id: UserId) -> Result<&User, Error> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::not_found("user not found"))
    }

    fn require_space(&self, id: SpaceId) -> Result<&Space, Error> {
        self.spaces
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::not_found("space not found"))
    }

    fn require_commitment(&self, id: CommitmentId) -> Result<Commitment, Error> {
        self.commitments
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| Error::not_found("commitment not found"))
    }

    fn approvers_of(&self, id: CommitmentId) -> Vec<Approver> {
        self.approvers
            .iter()
            .filter(|(c, _)| *c == id.get())
            .map(|(_, a)| *a)
            .collect()
    }

    fn display_name(&self, id: UserId) -> String {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.display_name.clone())
            .unwrap_or_default()
    }

    fn record(&self, commitment: Commitment) -> CommitmentRecord {
        let approvers = self
            .approvers
            .iter()
            .filter(|(c, _)| *c == commitment.id.get())
            .map(|(_, a)| ApproverView {
                user_id: a.user_id,
                name: self.display_name(a.user_id),
                status: a.status,
                acted_at: a.acted_at,
            })
            .collect();
        CommitmentRecord {
            commitment,
            approvers,
        }
    }

    fn append_event(&mut self, commitment: CommitmentId, actor: UserId, kind: EventKind) {
        let id = self.next_id();
        self.events.push(EventRec {
            id,
            commitment_id: commitment.get(),
            actor,
            tag: kind.tag().to_owned(),
            at: Utc::now(),
        });
    }

    fn summary(&self, space: &Space) -> SpaceSummary {
        let member_count = self
            .memberships
            .iter()
            .filter(|m| m.space_id == space.id && m.status == MembershipStatus::Approved)
            .count() as i64;
        let commitment_count = self
            .commitments
            .iter()
            .filter(|c| c.space_id == space.id)
            .count() as i64;
        SpaceSummary {
            space: space.clone(),
            member_count,
            commitment_count,
        }
    }
}

/// In-memory backend implementing all three store ports.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<World>,
}

impl InMemoryBackend {
    fn world(&self) -> MutexGuard<'_, World> {
        self.state.lock().expect("world lock")
    }
}

#[async_trait]
impl UserStore for InMemoryBackend {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError> {
        Ok(self.world().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_subject(&self, subject: &str) -> Result<Option<User>, UserStoreError> {
        Ok(self
            .world()
            .users
            .iter()
            .find(|u| u.subject == subject)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, UserStoreError> {
        let mut world = self.world();
        if world.users.iter().any(|u| u.subject == user.subject) {
            return Err(UserStoreError::subject_taken(user.subject));
        }
        let id = world.next_id();
        let created = User {
            id: UserId::new(id),
            subject: user.subject,
            email: user.email,
            display_name: user.display_name,
            created_at: Utc::now(),
        };
        world.users.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl CommitmentStore for InMemoryBackend {
    async fn create(
        &self,
        caller: UserId,
        space: SpaceId,
        draft: CommitmentDraft,
    ) -> Result<CommitmentRecord, CommitmentStoreError> {
        let mut world = self.world();
        world.require_user(caller)?;
        world.require_space(space)?;
        workflow::ensure_approved_member(world.membership_status(caller, space))?;

        let set = workflow::assemble_approver_set(caller, &draft.approver_ids);
        if set.iter().any(|id| world.users.iter().all(|u| u.id != *id)) {
            return Err(Error::not_found("one or more approvers not found").into());
        }
        let approved = set
            .iter()
            .copied()
            .filter(|id| {
                world.membership_status(*id, space) == Some(MembershipStatus::Approved)
            })
            .collect();
        workflow::ensure_approvers_are_members(&set, &approved)?;

        let id = CommitmentId::new(world.next_id());
        let commitment = Commitment {
            id,
            space_id: space,
            title: draft.title,
            description: draft.description,
            status: CommitmentStatus::Draft,
            created_by: caller,
            created_at: Utc::now(),
            deadline: draft.deadline,
        };
        world.commitments.push(commitment.clone());
        for user in set {
            world.approvers.push((
                id.get(),
                Approver {
                    user_id: user,
                    status: ApproverStatus::Pending,
                    acted_at: None,
                },
            ));
        }
        world.append_event(id, caller, EventKind::Created);
        Ok(world.record(commitment))
    }

    async fn update(
        &self,
        caller: UserId,
        id: CommitmentId,
        patch: CommitmentPatch,
    ) -> Result<CommitmentRecord, CommitmentStoreError> {
        let mut world = self.world();
        let commitment = world.require_commitment(id)?;
        world.require_user(caller)?;
        workflow::ensure_editable(&commitment)?;

        let updated = {
            let stored = world
                .commitments
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| CommitmentStoreError::query("commitment vanished"))?;
            if let Some(title) = patch.title {
                stored.title = title;
            }
            if let Some(description) = patch.description {
                stored.description = Some(description);
            }
            if let Some(deadline) = patch.deadline {
                stored.deadline = Some(deadline);
            }
            stored.clone()
        };
        world.append_event(id, caller, EventKind::Edited);
        Ok(world.record(updated))
    }

    async fn send_for_review(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<CommitmentRecord, CommitmentStoreError> {
        let mut world = self.world();
        let commitment = world.require_commitment(id)?;
        world.require_user(caller)?;
        let kind = workflow::start_review(&commitment)?;

        let updated = {
            let stored = world
                .commitments
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| CommitmentStoreError::query("commitment vanished"))?;
            stored.status = CommitmentStatus::Review;
            stored.clone()
        };
        world.append_event(id, caller, kind);
        Ok(world.record(updated))
    }

    async fn decide(
        &self,
        caller: UserId,
        id: CommitmentId,
        decision: ReviewDecision,
    ) -> Result<CommitmentRecord, CommitmentStoreError> {
        let now = Utc::now();
        let mut world = self.world();
        let commitment = world.require_commitment(id)?;
        world.require_user(caller)?;
        let approvers = world.approvers_of(id);

        let transition = workflow::decide_review(&commitment, &approvers, caller, decision, now)?;

        for (c, approver) in &mut world.approvers {
            if *c != id.get() {
                continue;
            }
            if approver.user_id == caller {
                approver.status = transition.caller_status;
                approver.acted_at = transition.caller_acted_at;
            }
            if transition.reset_round {
                approver.status = ApproverStatus::Pending;
                approver.acted_at = None;
            }
        }
        let updated = {
            let stored = world
                .commitments
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| CommitmentStoreError::query("commitment vanished"))?;
            stored.status = transition.commitment_status;
            stored.clone()
        };
        for kind in &transition.events {
            world.append_event(id, caller, *kind);
        }
        Ok(world.record(updated))
    }

    async fn list_for_space(
        &self,
        caller: UserId,
        space: SpaceId,
    ) -> Result<Vec<CommitmentRecord>, CommitmentStoreError> {
        let world = self.world();
        world.require_user(caller)?;
        world.require_space(space)?;
        workflow::ensure_approved_member(world.membership_status(caller, space))?;
        Ok(world
            .commitments
            .iter()
            .filter(|c| c.space_id == space)
            .map(|c| world.record(c.clone()))
            .collect())
    }

    async fn fetch(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<CommitmentRecord, CommitmentStoreError> {
        let world = self.world();
        let commitment = world.require_commitment(id)?;
        workflow::ensure_approved_member(world.membership_status(caller, commitment.space_id))?;
        Ok(world.record(commitment))
    }

    async fn history(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<Vec<HistoryEntry>, CommitmentStoreError> {
        let world = self.world();
        let commitment = world.require_commitment(id)?;
        workflow::ensure_approved_member(world.membership_status(caller, commitment.space_id))?;
        Ok(world
            .events
            .iter()
            .filter(|e| e.commitment_id == id.get())
            .map(|e| HistoryEntry {
                id: EventId::new(e.id),
                action: e.tag.clone(),
                performed_by: EventActor {
                    user_id: e.actor,
                    name: world.display_name(e.actor),
                },
                at: e.at,
                details: None,
            })
            .collect())
    }
}

#[async_trait]
impl SpaceStore for InMemoryBackend {
    async fn create_space(
        &self,
        owner: UserId,
        space: NewSpace,
    ) -> Result<SpaceSummary, SpaceStoreError> {
        let mut world = self.world();
        world.require_user(owner)?;
        let id = SpaceId::new(world.next_id());
        let created = Space {
            id,
            name: space.name,
            description: space.description,
            created_by: owner,
            created_at: Utc::now(),
        };
        world.spaces.push(created.clone());
        let membership_id = world.next_id();
        world.memberships.push(Membership {
            id: InviteId::new(membership_id),
            user_id: owner,
            space_id: id,
            status: MembershipStatus::Approved,
            joined_at: Utc::now(),
        });
        Ok(world.summary(&created))
    }

    async fn invite_by_email(
        &self,
        inviter: UserId,
        space: SpaceId,
        email: &str,
    ) -> Result<(), SpaceStoreError> {
        let mut world = self.world();
        world.require_space(space)?;
        workflow::ensure_approved_member(world.membership_status(inviter, space))?;
        let invitee = world
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.id)
            .ok_or_else(|| {
                SpaceStoreError::Rule(Error::not_found(
                    "user not found; ask them to join the platform first",
                ))
            })?;

        let existing = world.membership_status(invitee, space);
        match membership::plan_invite(existing)? {
            InvitePlan::Create => {
                let id = world.next_id();
                world.memberships.push(Membership {
                    id: InviteId::new(id),
                    user_id: invitee,
                    space_id: space,
                    status: MembershipStatus::Pending,
                    joined_at: Utc::now(),
                });
            }
            InvitePlan::Rearm => {
                let row = world
                    .memberships
                    .iter_mut()
                    .find(|m| m.user_id == invitee && m.space_id == space)
                    .ok_or_else(|| SpaceStoreError::query("membership vanished"))?;
                row.status = MembershipStatus::Pending;
                row.joined_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn pending_invites(
        &self,
        user: UserId,
    ) -> Result<Vec<PendingInvite>, SpaceStoreError> {
        let world = self.world();
        world.require_user(user)?;
        Ok(world
            .memberships
            .iter()
            .filter(|m| m.user_id == user && m.status == MembershipStatus::Pending)
            .map(|m| {
                let space_name = world
                    .spaces
                    .iter()
                    .find(|s| s.id == m.space_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                PendingInvite {
                    id: m.id,
                    space_id: m.space_id,
                    space_name,
                    status: m.status,
                    invited_at: m.joined_at,
                }
            })
            .collect())
    }

    async fn respond_to_invite(
        &self,
        user: UserId,
        invite: InviteId,
        reply: InviteReply,
    ) -> Result<(), SpaceStoreError> {
        let mut world = self.world();
        let current = world
            .memberships
            .iter()
            .find(|m| m.id == invite && m.user_id == user)
            .map(|m| m.status)
            .ok_or_else(|| SpaceStoreError::Rule(Error::not_found("invite not found")))?;
        let next = membership::respond_to_invite(current, reply)?;
        let row = world
            .memberships
            .iter_mut()
            .find(|m| m.id == invite)
            .ok_or_else(|| SpaceStoreError::query("membership vanished"))?;
        row.status = next;
        if next == MembershipStatus::Approved {
            row.joined_at = Utc::now();
        }
        Ok(())
    }

    async fn spaces_for(&self, user: UserId) -> Result<Vec<SpaceSummary>, SpaceStoreError> {
        let world = self.world();
        world.require_user(user)?;
        Ok(world
            .spaces
            .iter()
            .filter(|s| world.membership_status(user, s.id) == Some(MembershipStatus::Approved))
            .map(|s| world.summary(s))
            .collect())
    }

    async fn fetch_space(&self, id: SpaceId) -> Result<SpaceSummary, SpaceStoreError> {
        let world = self.world();
        let space = world.require_space(id)?;
        Ok(world.summary(space))
    }

    async fn members(
        &self,
        caller: UserId,
        space: SpaceId,
        filter: Option<&str>,
    ) -> Result<Vec<SpaceMember>, SpaceStoreError> {
        let world = self.world();
        let space_row = world.require_space(space)?.clone();
        workflow::ensure_approved_member(world.membership_status(caller, space))?;
        let needle = filter.map(str::to_lowercase);
        Ok(world
            .memberships
            .iter()
            .filter(|m| m.space_id == space && m.status == MembershipStatus::Approved)
            .filter_map(|m| {
                let user = world.users.iter().find(|u| u.id == m.user_id)?;
                if let Some(needle) = &needle {
                    let matches = user.display_name.to_lowercase().contains(needle)
                        || user.email.to_lowercase().contains(needle);
                    if !matches {
                        return None;
                    }
                }
                Some(SpaceMember {
                    user_id: user.id,
                    name: user.display_name.clone(),
                    email: user.email.clone(),
                    role: if user.id == space_row.created_by {
                        MemberRole::Creator
                    } else {
                        MemberRole::Member
                    },
                    joined_at: m.joined_at,
                })
            })
            .collect())
    }

    async fn leave(&self, user: UserId, space: SpaceId) -> Result<(), SpaceStoreError> {
        let mut world = self.world();
        let owner = world.require_space(space)?.created_by;
        let status = world.membership_status(user, space);
        let in_review = world
            .commitments
            .iter()
            .any(|c| {
                c.space_id == space
                    && c.created_by == user
                    && c.status == CommitmentStatus::Review
            });
        membership::ensure_can_leave(owner, user, status, in_review)?;
        world
            .memberships
            .retain(|m| !(m.user_id == user && m.space_id == space));
        Ok(())
    }
}

/// HTTP state over the in-memory backend, the real services, and the static
/// dev verifier.
pub fn http_state() -> HttpState {
    let backend = Arc::new(InMemoryBackend::default());
    HttpState::new(
        Arc::new(WorkflowService::new(backend.clone())),
        Arc::new(SpaceService::new(backend.clone())),
        Arc::new(IdentityService::new(
            Arc::new(StaticTokenVerifier),
            backend,
        )),
    )
}

/// Static bearer token for a short user name: `sub-a:a@example.com:A`.
pub fn token(name: &str) -> String {
    format!("sub-{name}:{name}@example.com:{}", name.to_uppercase())
}

/// E-mail address matching [`token`].
pub fn email(name: &str) -> String {
    format!("{name}@example.com")
}
