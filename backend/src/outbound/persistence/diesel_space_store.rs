//! PostgreSQL-backed `SpaceStore` implementation using Diesel.
//!
//! Space creation, the invite lifecycle, and leaving all run as single
//! transactions; the invite and leave rules are evaluated against rows read
//! inside them, with the targeted membership row locked `FOR UPDATE`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{NewSpace, SpaceStore, SpaceStoreError};
use crate::domain::{
    CommitmentStatus, Error, InviteId, InvitePlan, InviteReply, MemberRole, MembershipStatus,
    PendingInvite, Space, SpaceId, SpaceMember, SpaceSummary, UserId, membership, workflow,
};

use super::models::{MembershipRow, NewMembershipRow, NewSpaceRow, SpaceRow, UserRow};
use super::pool::DbPool;
use super::schema::{commitments, space_members, spaces, users};

/// Diesel-backed implementation of the `SpaceStore` port.
#[derive(Clone)]
pub struct DieselSpaceStore {
    pool: DbPool,
}

impl DieselSpaceStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn corrupt_column(what: &str, err: impl std::fmt::Display) -> SpaceStoreError {
    SpaceStoreError::query(format!("corrupt {what}: {err}"))
}

fn row_to_space(row: SpaceRow) -> Space {
    Space {
        id: SpaceId::new(row.id),
        name: row.name,
        description: row.description,
        created_by: UserId::new(row.created_by),
        created_at: row.created_at,
    }
}

async fn require_user(conn: &mut AsyncPgConnection, id: UserId) -> Result<(), SpaceStoreError> {
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

async fn find_space(
    conn: &mut AsyncPgConnection,
    id: SpaceId,
) -> Result<SpaceRow, SpaceStoreError> {
    spaces::table
        .find(id.get())
        .select(SpaceRow::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| SpaceStoreError::Rule(Error::not_found("space not found")))
}

async fn membership_status(
    conn: &mut AsyncPgConnection,
    user: UserId,
    space: SpaceId,
) -> Result<Option<MembershipStatus>, SpaceStoreError> {
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

async fn summarise(
    conn: &mut AsyncPgConnection,
    row: SpaceRow,
) -> Result<SpaceSummary, SpaceStoreError> {
    let member_count: i64 = space_members::table
        .filter(
            space_members::space_id
                .eq(row.id)
                .and(space_members::status.eq(MembershipStatus::Approved.as_str())),
        )
        .count()
        .get_result(conn)
        .await?;
    let commitment_count: i64 = commitments::table
        .filter(commitments::space_id.eq(row.id))
        .count()
        .get_result(conn)
        .await?;
    Ok(SpaceSummary {
        space: row_to_space(row),
        member_count,
        commitment_count,
    })
}

/// Summarise a batch of spaces with two grouped count queries instead of two
/// per row.
async fn summarise_all(
    conn: &mut AsyncPgConnection,
    rows: Vec<SpaceRow>,
) -> Result<Vec<SpaceSummary>, SpaceStoreError> {
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

    let member_counts: HashMap<i64, i64> = space_members::table
        .filter(
            space_members::space_id
                .eq_any(&ids)
                .and(space_members::status.eq(MembershipStatus::Approved.as_str())),
        )
        .group_by(space_members::space_id)
        .select((space_members::space_id, diesel::dsl::count_star()))
        .load::<(i64, i64)>(conn)
        .await?
        .into_iter()
        .collect();

    let commitment_counts: HashMap<i64, i64> = commitments::table
        .filter(commitments::space_id.eq_any(&ids))
        .group_by(commitments::space_id)
        .select((commitments::space_id, diesel::dsl::count_star()))
        .load::<(i64, i64)>(conn)
        .await?
        .into_iter()
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| {
            let member_count = member_counts.get(&row.id).copied().unwrap_or(0);
            let commitment_count = commitment_counts.get(&row.id).copied().unwrap_or(0);
            SpaceSummary {
                space: row_to_space(row),
                member_count,
                commitment_count,
            }
        })
        .collect())
}

#[async_trait]
impl SpaceStore for DieselSpaceStore {
    async fn create_space(
        &self,
        owner: UserId,
        space: NewSpace,
    ) -> Result<SpaceSummary, SpaceStoreError> {
        let now = Utc::now();
        let mut conn = self.pool.get().await?;
        conn.transaction::<SpaceSummary, SpaceStoreError, _>(|conn| {
            async move {
                require_user(conn, owner).await?;

                let row: SpaceRow = diesel::insert_into(spaces::table)
                    .values(NewSpaceRow {
                        name: &space.name,
                        description: space.description.as_deref(),
                        created_by: owner.get(),
                        created_at: now,
                    })
                    .returning(SpaceRow::as_returning())
                    .get_result(conn)
                    .await?;

                diesel::insert_into(space_members::table)
                    .values(NewMembershipRow {
                        user_id: owner.get(),
                        space_id: row.id,
                        status: MembershipStatus::Approved.as_str(),
                        joined_at: now,
                    })
                    .execute(conn)
                    .await?;

                summarise(conn, row).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn invite_by_email(
        &self,
        inviter: UserId,
        space: SpaceId,
        email: &str,
    ) -> Result<(), SpaceStoreError> {
        let now = Utc::now();
        let email = email.to_owned();
        let mut conn = self.pool.get().await?;
        conn.transaction::<(), SpaceStoreError, _>(|conn| {
            async move {
                find_space(conn, space).await?;
                workflow::ensure_approved_member(
                    membership_status(conn, inviter, space).await?,
                )?;

                let invitee: UserRow = users::table
                    .filter(users::email.eq(&email))
                    .select(UserRow::as_select())
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| {
                        SpaceStoreError::Rule(Error::not_found(
                            "user not found; ask them to join the platform first",
                        ))
                    })?;

                let existing: Option<MembershipRow> = space_members::table
                    .filter(
                        space_members::user_id
                            .eq(invitee.id)
                            .and(space_members::space_id.eq(space.get())),
                    )
                    .select(MembershipRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;

                let status = existing
                    .as_ref()
                    .map(|row| {
                        row.status
                            .parse::<MembershipStatus>()
                            .map_err(|err| corrupt_column("membership status", err))
                    })
                    .transpose()?;

                match membership::plan_invite(status)? {
                    InvitePlan::Create => {
                        diesel::insert_into(space_members::table)
                            .values(NewMembershipRow {
                                user_id: invitee.id,
                                space_id: space.get(),
                                status: MembershipStatus::Pending.as_str(),
                                joined_at: now,
                            })
                            .execute(conn)
                            .await?;
                    }
                    InvitePlan::Rearm => {
                        let row = existing.ok_or_else(|| {
                            SpaceStoreError::query("membership row vanished during invite")
                        })?;
                        diesel::update(space_members::table.find(row.id))
                            .set((
                                space_members::status.eq(MembershipStatus::Pending.as_str()),
                                space_members::joined_at.eq(now),
                            ))
                            .execute(conn)
                            .await?;
                    }
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn pending_invites(
        &self,
        user: UserId,
    ) -> Result<Vec<PendingInvite>, SpaceStoreError> {
        let mut conn = self.pool.get().await?;
        require_user(&mut conn, user).await?;

        let rows: Vec<(MembershipRow, SpaceRow)> = space_members::table
            .inner_join(spaces::table)
            .filter(
                space_members::user_id
                    .eq(user.get())
                    .and(space_members::status.eq(MembershipStatus::Pending.as_str())),
            )
            .order(space_members::joined_at.desc())
            .select((MembershipRow::as_select(), SpaceRow::as_select()))
            .load(&mut conn)
            .await?;

        rows.into_iter()
            .map(|(invite, space)| {
                let status = invite
                    .status
                    .parse::<MembershipStatus>()
                    .map_err(|err| corrupt_column("membership status", err))?;
                Ok(PendingInvite {
                    id: InviteId::new(invite.id),
                    space_id: SpaceId::new(space.id),
                    space_name: space.name,
                    status,
                    invited_at: invite.joined_at,
                })
            })
            .collect()
    }

    async fn respond_to_invite(
        &self,
        user: UserId,
        invite: InviteId,
        reply: InviteReply,
    ) -> Result<(), SpaceStoreError> {
        let now = Utc::now();
        let mut conn = self.pool.get().await?;
        conn.transaction::<(), SpaceStoreError, _>(|conn| {
            async move {
                let row: MembershipRow = space_members::table
                    .filter(
                        space_members::id
                            .eq(invite.get())
                            .and(space_members::user_id.eq(user.get())),
                    )
                    .select(MembershipRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| SpaceStoreError::Rule(Error::not_found("invite not found")))?;

                let current = row
                    .status
                    .parse::<MembershipStatus>()
                    .map_err(|err| corrupt_column("membership status", err))?;
                let next = membership::respond_to_invite(current, reply)?;

                match next {
                    MembershipStatus::Approved => {
                        diesel::update(space_members::table.find(row.id))
                            .set((
                                space_members::status.eq(next.as_str()),
                                space_members::joined_at.eq(now),
                            ))
                            .execute(conn)
                            .await?;
                    }
                    _ => {
                        diesel::update(space_members::table.find(row.id))
                            .set(space_members::status.eq(next.as_str()))
                            .execute(conn)
                            .await?;
                    }
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn spaces_for(&self, user: UserId) -> Result<Vec<SpaceSummary>, SpaceStoreError> {
        let mut conn = self.pool.get().await?;
        require_user(&mut conn, user).await?;

        let rows: Vec<SpaceRow> = space_members::table
            .inner_join(spaces::table)
            .filter(
                space_members::user_id
                    .eq(user.get())
                    .and(space_members::status.eq(MembershipStatus::Approved.as_str())),
            )
            .order(spaces::created_at.asc())
            .select(SpaceRow::as_select())
            .load(&mut conn)
            .await?;

        summarise_all(&mut conn, rows).await
    }

    async fn fetch_space(&self, id: SpaceId) -> Result<SpaceSummary, SpaceStoreError> {
        let mut conn = self.pool.get().await?;
        let row = find_space(&mut conn, id).await?;
        summarise(&mut conn, row).await
    }

    async fn members(
        &self,
        caller: UserId,
        space: SpaceId,
        filter: Option<&str>,
    ) -> Result<Vec<SpaceMember>, SpaceStoreError> {
        let mut conn = self.pool.get().await?;
        let space_row = find_space(&mut conn, space).await?;
        workflow::ensure_approved_member(membership_status(&mut conn, caller, space).await?)?;

        let mut query = space_members::table
            .inner_join(users::table)
            .filter(
                space_members::space_id
                    .eq(space.get())
                    .and(space_members::status.eq(MembershipStatus::Approved.as_str())),
            )
            .select((MembershipRow::as_select(), UserRow::as_select()))
            .order(space_members::id.asc())
            .into_boxed();
        if let Some(needle) = filter {
            let pattern = format!("%{needle}%");
            query = query.filter(
                users::display_name
                    .ilike(pattern.clone())
                    .or(users::email.ilike(pattern)),
            );
        }

        let rows: Vec<(MembershipRow, UserRow)> = query.load(&mut conn).await?;

        Ok(rows
            .into_iter()
            .map(|(member, user)| SpaceMember {
                user_id: UserId::new(user.id),
                name: user.display_name,
                email: user.email,
                role: if user.id == space_row.created_by {
                    MemberRole::Creator
                } else {
                    MemberRole::Member
                },
                joined_at: member.joined_at,
            })
            .collect())
    }

    async fn leave(&self, user: UserId, space: SpaceId) -> Result<(), SpaceStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<(), SpaceStoreError, _>(|conn| {
            async move {
                let space_row = find_space(conn, space).await?;

                let row: Option<MembershipRow> = space_members::table
                    .filter(
                        space_members::user_id
                            .eq(user.get())
                            .and(space_members::space_id.eq(space.get())),
                    )
                    .select(MembershipRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;

                let status = row
                    .as_ref()
                    .map(|member| {
                        member
                            .status
                            .parse::<MembershipStatus>()
                            .map_err(|err| corrupt_column("membership status", err))
                    })
                    .transpose()?;

                let in_review: i64 = commitments::table
                    .filter(
                        commitments::space_id
                            .eq(space.get())
                            .and(commitments::created_by.eq(user.get()))
                            .and(commitments::status.eq(CommitmentStatus::Review.as_str())),
                    )
                    .count()
                    .get_result(conn)
                    .await?;

                membership::ensure_can_leave(
                    UserId::new(space_row.created_by),
                    user,
                    status,
                    in_review > 0,
                )?;

                let membership_row = row.ok_or_else(|| {
                    SpaceStoreError::query("membership row vanished during leave")
                })?;
                diesel::delete(space_members::table.find(membership_row.id))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }
}
