//! Space and membership HTTP handlers.
//!
//! ```text
//! POST /api/v1/spaces
//! GET  /api/v1/spaces
//! GET  /api/v1/spaces/{space_id}
//! POST /api/v1/spaces/{space_id}/invite
//! GET  /api/v1/spaces/{space_id}/members
//! GET  /api/v1/spaces/{space_id}/members/search?q=
//! POST /api/v1/spaces/{space_id}/leave
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::NewSpace;
use crate::domain::{Error, SpaceId, SpaceMember, SpaceSummary};

use super::caller::Caller;
use super::state::HttpState;
use super::validation::{optional_text, require_text};
use super::ApiResult;

/// Request payload for creating a space.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpaceRequest {
    /// Display name. Required, non-blank.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
}

/// Request payload for inviting a platform user.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteToSpaceRequest {
    /// Invitee's e-mail address.
    pub email: String,
}

/// Space projection with aggregate counts.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpaceResponse {
    /// Space identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Description, if any.
    pub description: Option<String>,
    /// The owner.
    pub created_by: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Number of approved members.
    pub member_count: i64,
    /// Number of commitments, regardless of status.
    pub commitment_count: i64,
}

/// Member listing entry.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpaceMemberResponse {
    /// The member.
    pub user_id: i64,
    /// Display name.
    pub name: String,
    /// E-mail address.
    pub email: String,
    /// `creator` or `member`.
    pub role: String,
    /// When the member joined.
    pub joined_at: DateTime<Utc>,
}

/// Confirmation message for operations without a richer body.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

/// Query string of the member search endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct MemberSearchQuery {
    /// Case-insensitive substring matched against name and e-mail.
    pub q: Option<String>,
}

impl From<SpaceSummary> for SpaceResponse {
    fn from(summary: SpaceSummary) -> Self {
        let SpaceSummary {
            space,
            member_count,
            commitment_count,
        } = summary;
        Self {
            id: space.id.get(),
            name: space.name,
            description: space.description,
            created_by: space.created_by.get(),
            created_at: space.created_at,
            member_count,
            commitment_count,
        }
    }
}

impl From<SpaceMember> for SpaceMemberResponse {
    fn from(member: SpaceMember) -> Self {
        Self {
            user_id: member.user_id.get(),
            name: member.name,
            email: member.email,
            role: match member.role {
                crate::domain::MemberRole::Creator => "creator".to_owned(),
                crate::domain::MemberRole::Member => "member".to_owned(),
            },
            joined_at: member.joined_at,
        }
    }
}

fn validated_email(email: &str) -> Result<String, Error> {
    let email = require_text("email", email)?;
    if !email.contains('@') {
        return Err(Error::invalid_request("email must be a valid address")
            .with_details(json!({ "field": "email" })));
    }
    Ok(email)
}

/// Create a space owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/spaces",
    request_body = CreateSpaceRequest,
    responses(
        (status = 201, description = "Space created", body = SpaceResponse),
        (status = 400, description = "Malformed request", body = Error)
    ),
    tags = ["spaces"],
    operation_id = "createSpace"
)]
#[post("/spaces")]
pub async fn create_space(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateSpaceRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let space = NewSpace {
        name: require_text("name", &payload.name)?,
        description: optional_text(payload.description),
    };
    let summary = state.spaces.create_space(caller.id(), space).await?;
    Ok(HttpResponse::Created().json(SpaceResponse::from(summary)))
}

/// List the caller's spaces.
#[utoipa::path(
    get,
    path = "/api/v1/spaces",
    responses(
        (status = 200, description = "Spaces the caller belongs to", body = [SpaceResponse])
    ),
    tags = ["spaces"],
    operation_id = "listSpaces"
)]
#[get("/spaces")]
pub async fn list_spaces(state: web::Data<HttpState>, caller: Caller) -> ApiResult<HttpResponse> {
    let summaries = state.spaces.spaces_for(caller.id()).await?;
    let body: Vec<SpaceResponse> = summaries.into_iter().map(SpaceResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Fetch one space.
#[utoipa::path(
    get,
    path = "/api/v1/spaces/{space_id}",
    params(("space_id" = i64, Path, description = "Space to fetch")),
    responses(
        (status = 200, description = "The space", body = SpaceResponse),
        (status = 404, description = "Space not found", body = Error)
    ),
    tags = ["spaces"],
    operation_id = "getSpace"
)]
#[get("/spaces/{space_id}")]
pub async fn get_space(
    state: web::Data<HttpState>,
    _caller: Caller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let summary = state.spaces.space(SpaceId::from(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(SpaceResponse::from(summary)))
}

/// Invite a platform user to a space by e-mail.
#[utoipa::path(
    post,
    path = "/api/v1/spaces/{space_id}/invite",
    request_body = InviteToSpaceRequest,
    params(("space_id" = i64, Path, description = "Space to invite into")),
    responses(
        (status = 201, description = "Invite created or re-armed"),
        (status = 400, description = "Malformed request", body = Error),
        (status = 403, description = "Caller is not an approved member", body = Error),
        (status = 404, description = "Space or invitee not found", body = Error),
        (status = 409, description = "Already a member or already invited", body = Error)
    ),
    tags = ["spaces"],
    operation_id = "inviteToSpace"
)]
#[post("/spaces/{space_id}/invite")]
pub async fn invite_to_space(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<i64>,
    payload: web::Json<InviteToSpaceRequest>,
) -> ApiResult<HttpResponse> {
    let email = validated_email(&payload.email)?;
    state
        .spaces
        .invite(caller.id(), SpaceId::from(path.into_inner()), &email)
        .await?;
    Ok(HttpResponse::Created().finish())
}

/// List the approved members of a space.
#[utoipa::path(
    get,
    path = "/api/v1/spaces/{space_id}/members",
    params(("space_id" = i64, Path, description = "Space to list")),
    responses(
        (status = 200, description = "Approved members", body = [SpaceMemberResponse]),
        (status = 403, description = "Caller is not an approved member", body = Error),
        (status = 404, description = "Space not found", body = Error)
    ),
    tags = ["spaces"],
    operation_id = "listSpaceMembers"
)]
#[get("/spaces/{space_id}/members")]
pub async fn list_members(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let members = state
        .spaces
        .members(caller.id(), SpaceId::from(path.into_inner()))
        .await?;
    let body: Vec<SpaceMemberResponse> =
        members.into_iter().map(SpaceMemberResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Search the approved members of a space.
#[utoipa::path(
    get,
    path = "/api/v1/spaces/{space_id}/members/search",
    params(
        ("space_id" = i64, Path, description = "Space to search"),
        MemberSearchQuery
    ),
    responses(
        (status = 200, description = "Matching members", body = [SpaceMemberResponse]),
        (status = 403, description = "Caller is not an approved member", body = Error),
        (status = 404, description = "Space not found", body = Error)
    ),
    tags = ["spaces"],
    operation_id = "searchSpaceMembers"
)]
#[get("/spaces/{space_id}/members/search")]
pub async fn search_members(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<i64>,
    query: web::Query<MemberSearchQuery>,
) -> ApiResult<HttpResponse> {
    let members = state
        .spaces
        .search_members(
            caller.id(),
            SpaceId::from(path.into_inner()),
            query.into_inner().q,
        )
        .await?;
    let body: Vec<SpaceMemberResponse> =
        members.into_iter().map(SpaceMemberResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Leave a space.
#[utoipa::path(
    post,
    path = "/api/v1/spaces/{space_id}/leave",
    params(("space_id" = i64, Path, description = "Space to leave")),
    responses(
        (status = 200, description = "Membership removed", body = MessageResponse),
        (status = 404, description = "Space or membership not found", body = Error),
        (status = 409, description = "Owner, or commitments in review", body = Error)
    ),
    tags = ["spaces"],
    operation_id = "leaveSpace"
)]
#[post("/spaces/{space_id}/leave")]
pub async fn leave_space(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .spaces
        .leave(caller.id(), SpaceId::from(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "successfully left the space".to_owned(),
    }))
}
