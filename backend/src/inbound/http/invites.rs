//! Invite HTTP handlers.
//!
//! ```text
//! GET  /api/v1/invites
//! POST /api/v1/invites/{id}/accept
//! POST /api/v1/invites/{id}/reject
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, InviteId, PendingInvite};

use super::caller::Caller;
use super::state::HttpState;
use super::ApiResult;

/// Pending invite projection.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    /// Invite handle.
    pub id: i64,
    /// Target space.
    pub space_id: i64,
    /// Target space name.
    pub space_name: String,
    /// Always `PENDING` in listings.
    pub status: String,
    /// When the invite was issued or last re-armed.
    pub invited_at: DateTime<Utc>,
}

impl From<PendingInvite> for InviteResponse {
    fn from(invite: PendingInvite) -> Self {
        Self {
            id: invite.id.get(),
            space_id: invite.space_id.get(),
            space_name: invite.space_name,
            status: invite.status.as_str().to_owned(),
            invited_at: invite.invited_at,
        }
    }
}

/// List the caller's pending invites.
#[utoipa::path(
    get,
    path = "/api/v1/invites",
    responses(
        (status = 200, description = "Pending invites", body = [InviteResponse])
    ),
    tags = ["invites"],
    operation_id = "listInvites"
)]
#[get("/invites")]
pub async fn list_invites(state: web::Data<HttpState>, caller: Caller) -> ApiResult<HttpResponse> {
    let invites = state.spaces.pending_invites(caller.id()).await?;
    let body: Vec<InviteResponse> = invites.into_iter().map(InviteResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Accept a pending invite.
#[utoipa::path(
    post,
    path = "/api/v1/invites/{id}/accept",
    params(("id" = i64, Path, description = "Invite to accept")),
    responses(
        (status = 200, description = "Invite accepted"),
        (status = 404, description = "Invite not found", body = Error),
        (status = 409, description = "Invite is not pending", body = Error)
    ),
    tags = ["invites"],
    operation_id = "acceptInvite"
)]
#[post("/invites/{id}/accept")]
pub async fn accept_invite(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .spaces
        .accept_invite(caller.id(), InviteId::from(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().finish())
}

/// Decline a pending invite.
#[utoipa::path(
    post,
    path = "/api/v1/invites/{id}/reject",
    params(("id" = i64, Path, description = "Invite to decline")),
    responses(
        (status = 200, description = "Invite declined"),
        (status = 404, description = "Invite not found", body = Error),
        (status = 409, description = "Invite is not pending", body = Error)
    ),
    tags = ["invites"],
    operation_id = "rejectInvite"
)]
#[post("/invites/{id}/reject")]
pub async fn reject_invite(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .spaces
        .reject_invite(caller.id(), InviteId::from(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().finish())
}
