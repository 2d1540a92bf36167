//! Internal Diesel row structs.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. Status columns are stored as their uppercase tags and parsed on
//! the way out.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{commitment_approvers, commitment_events, commitments, space_members, spaces, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub subject: String,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for registering users.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub subject: &'a str,
    pub email: &'a str,
    pub display_name: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the spaces table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = spaces)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SpaceRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating spaces.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = spaces)]
pub(crate) struct NewSpaceRow<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the space_members table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = space_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MembershipRow {
    pub id: i64,
    #[expect(dead_code, reason = "queried by column; kept for row completeness")]
    pub user_id: i64,
    #[expect(dead_code, reason = "queried by column; kept for row completeness")]
    pub space_id: i64,
    pub status: String,
    pub joined_at: DateTime<Utc>,
}

/// Insertable struct for membership rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = space_members)]
pub(crate) struct NewMembershipRow<'a> {
    pub user_id: i64,
    pub space_id: i64,
    pub status: &'a str,
    pub joined_at: DateTime<Utc>,
}

/// Row struct for reading from the commitments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = commitments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommitmentRow {
    pub id: i64,
    pub space_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Insertable struct for creating commitments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = commitments)]
pub(crate) struct NewCommitmentRow<'a> {
    pub space_id: i64,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Changeset for the partial draft update. `None` fields stay untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = commitments)]
pub(crate) struct CommitmentChangeset<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Row struct for reading from the commitment_approvers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = commitment_approvers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApproverRow {
    #[expect(dead_code, reason = "ordering key; never read back")]
    pub id: i64,
    pub commitment_id: i64,
    pub user_id: i64,
    pub status: String,
    pub acted_at: Option<DateTime<Utc>>,
}

/// Insertable struct for approver rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = commitment_approvers)]
pub(crate) struct NewApproverRow<'a> {
    pub commitment_id: i64,
    pub user_id: i64,
    pub status: &'a str,
}

/// Row struct for reading from the commitment_events table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = commitment_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: i64,
    #[expect(dead_code, reason = "queried by column; kept for row completeness")]
    pub commitment_id: i64,
    pub actor_id: i64,
    pub event_type: String,
    pub payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for audit events.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = commitment_events)]
pub(crate) struct NewEventRow<'a> {
    pub commitment_id: i64,
    pub actor_id: i64,
    pub event_type: &'a str,
    pub payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
