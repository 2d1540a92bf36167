//! PostgreSQL-backed `CommitmentStore` implementation using Diesel.
//!
//! Every mutation runs in one transaction that first takes a `FOR UPDATE`
//! lock on the commitment row. The approver set and the caller's membership
//! are read under that lock and fed to the pure state machine, whose
//! transition is applied before the transaction commits. Two concurrent
//! approvals therefore serialise: the second observes the first's row and
//! the lock-check cannot miss, and an approval interleaving with a
//! rejection can never leave the approver rows half reset.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{
    CommitmentDraft, CommitmentPatch, CommitmentStore, CommitmentStoreError,
};
use crate::domain::{
    Approver, ApproverStatus, ApproverView, Commitment, CommitmentId, CommitmentRecord,
    CommitmentStatus, Error, EventActor, EventId, EventKind, HistoryEntry, MembershipStatus,
    ReviewDecision, SpaceId, UserId, workflow,
};

use super::models::{
    ApproverRow, CommitmentChangeset, CommitmentRow, EventRow, NewApproverRow, NewCommitmentRow,
    NewEventRow,
};
use super::pool::DbPool;
use super::schema::{commitment_approvers, commitment_events, commitments, space_members, spaces, users};

/// Diesel-backed implementation of the `CommitmentStore` port.
#[derive(Clone)]
pub struct DieselCommitmentStore {
    pool: DbPool,
}

impl DieselCommitmentStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn corrupt_column(what: &str, err: impl std::fmt::Display) -> CommitmentStoreError {
    CommitmentStoreError::query(format!("corrupt {what}: {err}"))
}

fn row_to_commitment(row: CommitmentRow) -> Result<Commitment, CommitmentStoreError> {
    let status = row
        .status
        .parse::<CommitmentStatus>()
        .map_err(|err| corrupt_column("commitment status", err))?;
    Ok(Commitment {
        id: CommitmentId::new(row.id),
        space_id: SpaceId::new(row.space_id),
        title: row.title,
        description: row.description,
        status,
        created_by: UserId::new(row.created_by),
        created_at: row.created_at,
        deadline: row.deadline,
    })
}

fn row_to_approver(row: &ApproverRow) -> Result<Approver, CommitmentStoreError> {
    let status = row
        .status
        .parse::<ApproverStatus>()
        .map_err(|err| corrupt_column("approver status", err))?;
    Ok(Approver {
        user_id: UserId::new(row.user_id),
        status,
        acted_at: row.acted_at,
    })
}

fn joined_to_view((row, name): (ApproverRow, String)) -> Result<ApproverView, CommitmentStoreError> {
    let status = row
        .status
        .parse::<ApproverStatus>()
        .map_err(|err| corrupt_column("approver status", err))?;
    Ok(ApproverView {
        user_id: UserId::new(row.user_id),
        name,
        status,
        acted_at: row.acted_at,
    })
}

async fn require_user(
    conn: &mut AsyncPgConnection,
    id: UserId,
) -> Result<(), CommitmentStoreError> {
    let found: Option<i64> = users::table
        .find(id.get())
        .select(users::id)
        .first(conn)
        .await
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(Error::not_found("user not found").into()),
    }
}

async fn require_space(
    conn: &mut AsyncPgConnection,
    id: SpaceId,
) -> Result<(), CommitmentStoreError> {
    let found: Option<i64> = spaces::table
        .find(id.get())
        .select(spaces::id)
        .first(conn)
        .await
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(Error::not_found("space not found").into()),
    }
}

/// Load the commitment row and lock it for the rest of the transaction.
async fn lock_commitment(
    conn: &mut AsyncPgConnection,
    id: CommitmentId,
) -> Result<CommitmentRow, CommitmentStoreError> {
    commitments::table
        .find(id.get())
        .select(CommitmentRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| CommitmentStoreError::Rule(Error::not_found("commitment not found")))
}

async fn find_commitment(
    conn: &mut AsyncPgConnection,
    id: CommitmentId,
) -> Result<CommitmentRow, CommitmentStoreError> {
    commitments::table
        .find(id.get())
        .select(CommitmentRow::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| CommitmentStoreError::Rule(Error::not_found("commitment not found")))
}

async fn membership_status(
    conn: &mut AsyncPgConnection,
    user: UserId,
    space: SpaceId,
) -> Result<Option<MembershipStatus>, CommitmentStoreError> {
    let raw: Option<String> = space_members::table
        .filter(
            space_members::user_id
                .eq(user.get())
                .and(space_members::space_id.eq(space.get())),
        )
        .select(space_members::status)
        .first(conn)
        .await
        .optional()?;
    raw.map(|tag| {
        tag.parse::<MembershipStatus>()
            .map_err(|err| corrupt_column("membership status", err))
    })
    .transpose()
}

async fn load_approvers(
    conn: &mut AsyncPgConnection,
    commitment_id: CommitmentId,
) -> Result<Vec<ApproverRow>, CommitmentStoreError> {
    Ok(commitment_approvers::table
        .filter(commitment_approvers::commitment_id.eq(commitment_id.get()))
        .order(commitment_approvers::id.asc())
        .select(ApproverRow::as_select())
        .load(conn)
        .await?)
}

async fn approver_views(
    conn: &mut AsyncPgConnection,
    commitment_id: i64,
) -> Result<Vec<ApproverView>, CommitmentStoreError> {
    let joined: Vec<(ApproverRow, String)> = commitment_approvers::table
        .inner_join(users::table)
        .filter(commitment_approvers::commitment_id.eq(commitment_id))
        .order(commitment_approvers::id.asc())
        .select((ApproverRow::as_select(), users::display_name))
        .load(conn)
        .await?;
    joined.into_iter().map(joined_to_view).collect()
}

async fn append_event(
    conn: &mut AsyncPgConnection,
    commitment_id: i64,
    actor: UserId,
    kind: EventKind,
    at: DateTime<Utc>,
) -> Result<(), CommitmentStoreError> {
    diesel::insert_into(commitment_events::table)
        .values(NewEventRow {
            commitment_id,
            actor_id: actor.get(),
            event_type: kind.tag(),
            payload: None,
            created_at: at,
        })
        .execute(conn)
        .await?;
    Ok(())
}

/// Assemble the projection returned by every operation.
async fn record(
    conn: &mut AsyncPgConnection,
    row: CommitmentRow,
) -> Result<CommitmentRecord, CommitmentStoreError> {
    let approvers = approver_views(conn, row.id).await?;
    Ok(CommitmentRecord {
        commitment: row_to_commitment(row)?,
        approvers,
    })
}

#[async_trait]
impl CommitmentStore for DieselCommitmentStore {
    async fn create(
        &self,
        caller: UserId,
        space: SpaceId,
        draft: CommitmentDraft,
    ) -> Result<CommitmentRecord, CommitmentStoreError> {
        let now = Utc::now();
        let mut conn = self.pool.get().await?;
        conn.transaction::<CommitmentRecord, CommitmentStoreError, _>(|conn| {
            async move {
                require_user(conn, caller).await?;
                require_space(conn, space).await?;
                workflow::ensure_approved_member(
                    membership_status(conn, caller, space).await?,
                )?;

                let approver_set = workflow::assemble_approver_set(caller, &draft.approver_ids);
                let raw_ids: Vec<i64> = approver_set.iter().map(|id| id.get()).collect();

                let known: Vec<i64> = users::table
                    .filter(users::id.eq_any(&raw_ids))
                    .select(users::id)
                    .load(conn)
                    .await?;
                if known.len() != raw_ids.len() {
                    return Err(Error::not_found("one or more approvers not found").into());
                }

                let approved: BTreeSet<UserId> = space_members::table
                    .filter(
                        space_members::space_id
                            .eq(space.get())
                            .and(space_members::user_id.eq_any(&raw_ids))
                            .and(space_members::status.eq(MembershipStatus::Approved.as_str())),
                    )
                    .select(space_members::user_id)
                    .load::<i64>(conn)
                    .await?
                    .into_iter()
                    .map(UserId::new)
                    .collect();
                workflow::ensure_approvers_are_members(&approver_set, &approved)?;

                let row: CommitmentRow = diesel::insert_into(commitments::table)
                    .values(NewCommitmentRow {
                        space_id: space.get(),
                        title: &draft.title,
                        description: draft.description.as_deref(),
                        status: CommitmentStatus::Draft.as_str(),
                        created_by: caller.get(),
                        created_at: now,
                        deadline: draft.deadline,
                    })
                    .returning(CommitmentRow::as_returning())
                    .get_result(conn)
                    .await?;

                let approver_rows: Vec<NewApproverRow<'_>> = approver_set
                    .iter()
                    .map(|user| NewApproverRow {
                        commitment_id: row.id,
                        user_id: user.get(),
                        status: ApproverStatus::Pending.as_str(),
                    })
                    .collect();
                diesel::insert_into(commitment_approvers::table)
                    .values(&approver_rows)
                    .execute(conn)
                    .await?;

                append_event(conn, row.id, caller, EventKind::Created, now).await?;
                record(conn, row).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn update(
        &self,
        caller: UserId,
        id: CommitmentId,
        patch: CommitmentPatch,
    ) -> Result<CommitmentRecord, CommitmentStoreError> {
        let now = Utc::now();
        let mut conn = self.pool.get().await?;
        conn.transaction::<CommitmentRecord, CommitmentStoreError, _>(|conn| {
            async move {
                let row = lock_commitment(conn, id).await?;
                require_user(conn, caller).await?;
                workflow::ensure_editable(&row_to_commitment(row.clone())?)?;

                let updated = if patch.is_empty() {
                    row
                } else {
                    diesel::update(commitments::table.find(id.get()))
                        .set(CommitmentChangeset {
                            title: patch.title.as_deref(),
                            description: patch.description.as_deref(),
                            deadline: patch.deadline,
                        })
                        .returning(CommitmentRow::as_returning())
                        .get_result(conn)
                        .await?
                };

                append_event(conn, updated.id, caller, EventKind::Edited, now).await?;
                record(conn, updated).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn send_for_review(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<CommitmentRecord, CommitmentStoreError> {
        let now = Utc::now();
        let mut conn = self.pool.get().await?;
        conn.transaction::<CommitmentRecord, CommitmentStoreError, _>(|conn| {
            async move {
                let row = lock_commitment(conn, id).await?;
                require_user(conn, caller).await?;
                let kind = workflow::start_review(&row_to_commitment(row)?)?;

                let updated: CommitmentRow = diesel::update(commitments::table.find(id.get()))
                    .set(commitments::status.eq(CommitmentStatus::Review.as_str()))
                    .returning(CommitmentRow::as_returning())
                    .get_result(conn)
                    .await?;

                append_event(conn, updated.id, caller, kind, now).await?;
                record(conn, updated).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn decide(
        &self,
        caller: UserId,
        id: CommitmentId,
        decision: ReviewDecision,
    ) -> Result<CommitmentRecord, CommitmentStoreError> {
        let now = Utc::now();
        let mut conn = self.pool.get().await?;
        conn.transaction::<CommitmentRecord, CommitmentStoreError, _>(|conn| {
            async move {
                let row = lock_commitment(conn, id).await?;
                require_user(conn, caller).await?;
                let commitment = row_to_commitment(row)?;
                let approvers: Vec<Approver> = load_approvers(conn, id)
                    .await?
                    .iter()
                    .map(row_to_approver)
                    .collect::<Result<_, _>>()?;

                let transition =
                    workflow::decide_review(&commitment, &approvers, caller, decision, now)?;

                diesel::update(
                    commitment_approvers::table.filter(
                        commitment_approvers::commitment_id
                            .eq(id.get())
                            .and(commitment_approvers::user_id.eq(caller.get())),
                    ),
                )
                .set((
                    commitment_approvers::status.eq(transition.caller_status.as_str()),
                    commitment_approvers::acted_at.eq(transition.caller_acted_at),
                ))
                .execute(conn)
                .await?;

                if transition.reset_round {
                    diesel::update(
                        commitment_approvers::table
                            .filter(commitment_approvers::commitment_id.eq(id.get())),
                    )
                    .set((
                        commitment_approvers::status.eq(ApproverStatus::Pending.as_str()),
                        commitment_approvers::acted_at.eq(None::<DateTime<Utc>>),
                    ))
                    .execute(conn)
                    .await?;
                }

                let updated: CommitmentRow = diesel::update(commitments::table.find(id.get()))
                    .set(commitments::status.eq(transition.commitment_status.as_str()))
                    .returning(CommitmentRow::as_returning())
                    .get_result(conn)
                    .await?;

                for kind in &transition.events {
                    append_event(conn, id.get(), caller, *kind, now).await?;
                }
                record(conn, updated).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn list_for_space(
        &self,
        caller: UserId,
        space: SpaceId,
    ) -> Result<Vec<CommitmentRecord>, CommitmentStoreError> {
        let mut conn = self.pool.get().await?;
        require_user(&mut conn, caller).await?;
        require_space(&mut conn, space).await?;
        workflow::ensure_approved_member(membership_status(&mut conn, caller, space).await?)?;

        let rows: Vec<CommitmentRow> = commitments::table
            .filter(commitments::space_id.eq(space.get()))
            .order((commitments::created_at.asc(), commitments::id.asc()))
            .select(CommitmentRow::as_select())
            .load(&mut conn)
            .await?;

        // One joined fetch for every commitment's approvers instead of one
        // query per row.
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let joined: Vec<(ApproverRow, String)> = commitment_approvers::table
            .inner_join(users::table)
            .filter(commitment_approvers::commitment_id.eq_any(&ids))
            .order(commitment_approvers::id.asc())
            .select((ApproverRow::as_select(), users::display_name))
            .load(&mut conn)
            .await?;

        let mut approvers_by_commitment: HashMap<i64, Vec<ApproverView>> = HashMap::new();
        for entry in joined {
            let commitment_id = entry.0.commitment_id;
            approvers_by_commitment
                .entry(commitment_id)
                .or_default()
                .push(joined_to_view(entry)?);
        }

        rows.into_iter()
            .map(|row| {
                let approvers = approvers_by_commitment.remove(&row.id).unwrap_or_default();
                Ok(CommitmentRecord {
                    commitment: row_to_commitment(row)?,
                    approvers,
                })
            })
            .collect()
    }

    async fn fetch(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<CommitmentRecord, CommitmentStoreError> {
        let mut conn = self.pool.get().await?;
        let row = find_commitment(&mut conn, id).await?;
        workflow::ensure_approved_member(
            membership_status(&mut conn, caller, SpaceId::new(row.space_id)).await?,
        )?;
        record(&mut conn, row).await
    }

    async fn history(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<Vec<HistoryEntry>, CommitmentStoreError> {
        let mut conn = self.pool.get().await?;
        let row = find_commitment(&mut conn, id).await?;
        workflow::ensure_approved_member(
            membership_status(&mut conn, caller, SpaceId::new(row.space_id)).await?,
        )?;

        let events: Vec<(EventRow, String)> = commitment_events::table
            .inner_join(users::table)
            .filter(commitment_events::commitment_id.eq(id.get()))
            .order((commitment_events::created_at.asc(), commitment_events::id.asc()))
            .select((EventRow::as_select(), users::display_name))
            .load(&mut conn)
            .await?;

        Ok(events
            .into_iter()
            .map(|(event, name)| HistoryEntry {
                id: EventId::new(event.id),
                action: event.event_type,
                performed_by: EventActor {
                    user_id: UserId::new(event.actor_id),
                    name,
                },
                at: event.created_at,
                details: event.payload,
            })
            .collect())
    }
}
