//! Commitment workflow HTTP handlers.
//!
//! ```text
//! POST /api/v1/spaces/{space_id}/commitments
//! GET  /api/v1/spaces/{space_id}/commitments
//! PUT  /api/v1/commitments/{id}
//! POST /api/v1/commitments/{id}/review
//! POST /api/v1/commitments/{id}/approve
//! POST /api/v1/commitments/{id}/reject
//! GET  /api/v1/commitments/{id}
//! GET  /api/v1/commitments/{id}/history
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{CommitmentDraft, CommitmentPatch};
use crate::domain::{
    ApproverView, CommitmentId, CommitmentRecord, Error, HistoryEntry, SpaceId, UserId,
};

use super::caller::Caller;
use super::state::HttpState;
use super::validation::{optional_text, require_text};
use super::ApiResult;

/// Request payload for creating a commitment.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommitmentRequest {
    /// Short title. Required, non-blank.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional deadline date.
    pub deadline: Option<NaiveDate>,
    /// Required approvers besides the creator. Must not be empty.
    pub approver_ids: Vec<i64>,
}

/// Request payload for editing a draft commitment.
///
/// Absent fields leave the stored value unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommitmentRequest {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement deadline date.
    pub deadline: Option<NaiveDate>,
}

/// Approver entry of a commitment response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproverResponse {
    /// The approving user.
    pub user_id: i64,
    /// Display name.
    pub name: String,
    /// `PENDING`, `APPROVED`, or `REJECTED`.
    pub status: String,
    /// When the approver acted in the current round.
    pub acted_at: Option<DateTime<Utc>>,
}

/// Commitment projection returned by every workflow endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentResponse {
    /// Commitment identifier.
    pub id: i64,
    /// Owning space.
    pub space_id: i64,
    /// Title.
    pub title: String,
    /// Description, if any.
    pub description: Option<String>,
    /// `DRAFT`, `REVIEW`, or `LOCKED`.
    pub status: String,
    /// The creator.
    pub created_by: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Deadline, if any.
    pub deadline: Option<DateTime<Utc>>,
    /// Approvers in row order.
    pub approvers: Vec<ApproverResponse>,
}

/// Actor entry of a history response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformedByResponse {
    /// The acting user.
    pub user_id: i64,
    /// Display name at read time.
    pub name: String,
}

/// One audit trail entry.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryResponse {
    /// Event identifier.
    pub id: i64,
    /// Transition tag, e.g. `SENT_FOR_REVIEW`.
    pub action: String,
    /// Who performed the transition.
    pub performed_by: PerformedByResponse,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// Opaque payload, returned verbatim.
    pub details: Option<Value>,
}

impl From<ApproverView> for ApproverResponse {
    fn from(view: ApproverView) -> Self {
        Self {
            user_id: view.user_id.get(),
            name: view.name,
            status: view.status.as_str().to_owned(),
            acted_at: view.acted_at,
        }
    }
}

impl From<CommitmentRecord> for CommitmentResponse {
    fn from(record: CommitmentRecord) -> Self {
        let CommitmentRecord {
            commitment,
            approvers,
        } = record;
        Self {
            id: commitment.id.get(),
            space_id: commitment.space_id.get(),
            title: commitment.title,
            description: commitment.description,
            status: commitment.status.as_str().to_owned(),
            created_by: commitment.created_by.get(),
            created_at: commitment.created_at,
            deadline: commitment.deadline,
            approvers: approvers.into_iter().map(ApproverResponse::from).collect(),
        }
    }
}

impl From<HistoryEntry> for HistoryEntryResponse {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            id: entry.id.get(),
            action: entry.action,
            performed_by: PerformedByResponse {
                user_id: entry.performed_by.user_id.get(),
                name: entry.performed_by.name,
            },
            timestamp: entry.at,
            details: entry.details,
        }
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn into_draft(payload: CreateCommitmentRequest) -> Result<CommitmentDraft, Error> {
    let title = require_text("title", &payload.title)?;
    if payload.approver_ids.is_empty() {
        return Err(
            Error::invalid_request("approverIds must not be empty")
                .with_details(json!({ "field": "approverIds" })),
        );
    }
    Ok(CommitmentDraft {
        title,
        description: optional_text(payload.description),
        deadline: payload.deadline.map(midnight_utc),
        approver_ids: payload.approver_ids.into_iter().map(UserId::from).collect(),
    })
}

fn into_patch(payload: UpdateCommitmentRequest) -> Result<CommitmentPatch, Error> {
    let title = match payload.title {
        Some(title) => Some(require_text("title", &title)?),
        None => None,
    };
    Ok(CommitmentPatch {
        title,
        description: optional_text(payload.description),
        deadline: payload.deadline.map(midnight_utc),
    })
}

/// Create a draft commitment in a space.
#[utoipa::path(
    post,
    path = "/api/v1/spaces/{space_id}/commitments",
    request_body = CreateCommitmentRequest,
    params(("space_id" = i64, Path, description = "Space to create the commitment in")),
    responses(
        (status = 201, description = "Commitment created as a draft", body = CommitmentResponse),
        (status = 400, description = "Malformed request", body = Error),
        (status = 403, description = "Caller is not an approved member", body = Error),
        (status = 404, description = "Space or approver not found", body = Error),
        (status = 409, description = "An approver is not an approved member", body = Error)
    ),
    tags = ["commitments"],
    operation_id = "createCommitment"
)]
#[post("/spaces/{space_id}/commitments")]
pub async fn create_commitment(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<i64>,
    payload: web::Json<CreateCommitmentRequest>,
) -> ApiResult<HttpResponse> {
    let space = SpaceId::from(path.into_inner());
    let draft = into_draft(payload.into_inner())?;
    let record = state
        .workflow
        .create_commitment(caller.id(), space, draft)
        .await?;
    Ok(HttpResponse::Created().json(CommitmentResponse::from(record)))
}

/// List the commitments of a space.
#[utoipa::path(
    get,
    path = "/api/v1/spaces/{space_id}/commitments",
    params(("space_id" = i64, Path, description = "Space to list")),
    responses(
        (status = 200, description = "Commitments, oldest first", body = [CommitmentResponse]),
        (status = 403, description = "Caller is not an approved member", body = Error),
        (status = 404, description = "Space not found", body = Error)
    ),
    tags = ["commitments"],
    operation_id = "listSpaceCommitments"
)]
#[get("/spaces/{space_id}/commitments")]
pub async fn list_space_commitments(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let space = SpaceId::from(path.into_inner());
    let records = state.workflow.space_commitments(caller.id(), space).await?;
    let body: Vec<CommitmentResponse> =
        records.into_iter().map(CommitmentResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Edit a draft commitment. Absent fields stay unchanged.
#[utoipa::path(
    put,
    path = "/api/v1/commitments/{id}",
    request_body = UpdateCommitmentRequest,
    params(("id" = i64, Path, description = "Commitment to edit")),
    responses(
        (status = 200, description = "Updated commitment", body = CommitmentResponse),
        (status = 400, description = "Malformed request", body = Error),
        (status = 404, description = "Commitment not found", body = Error),
        (status = 409, description = "Commitment is not a draft", body = Error)
    ),
    tags = ["commitments"],
    operation_id = "updateCommitment"
)]
#[put("/commitments/{id}")]
pub async fn update_commitment(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<i64>,
    payload: web::Json<UpdateCommitmentRequest>,
) -> ApiResult<HttpResponse> {
    let id = CommitmentId::from(path.into_inner());
    let patch = into_patch(payload.into_inner())?;
    let record = state
        .workflow
        .update_commitment(caller.id(), id, patch)
        .await?;
    Ok(HttpResponse::Ok().json(CommitmentResponse::from(record)))
}

/// Send a draft commitment for review.
#[utoipa::path(
    post,
    path = "/api/v1/commitments/{id}/review",
    params(("id" = i64, Path, description = "Commitment to send")),
    responses(
        (status = 200, description = "Commitment now under review", body = CommitmentResponse),
        (status = 404, description = "Commitment not found", body = Error),
        (status = 409, description = "Commitment is not a draft", body = Error)
    ),
    tags = ["commitments"],
    operation_id = "sendForReview"
)]
#[post("/commitments/{id}/review")]
pub async fn send_for_review(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = CommitmentId::from(path.into_inner());
    let record = state.workflow.send_for_review(caller.id(), id).await?;
    Ok(HttpResponse::Ok().json(CommitmentResponse::from(record)))
}

/// Approve a commitment under review.
#[utoipa::path(
    post,
    path = "/api/v1/commitments/{id}/approve",
    params(("id" = i64, Path, description = "Commitment to approve")),
    responses(
        (status = 200, description = "Verdict recorded; locks when last", body = CommitmentResponse),
        (status = 403, description = "Caller is not an approver", body = Error),
        (status = 404, description = "Commitment not found", body = Error),
        (status = 409, description = "Not in review, or already acted", body = Error)
    ),
    tags = ["commitments"],
    operation_id = "approveCommitment"
)]
#[post("/commitments/{id}/approve")]
pub async fn approve(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = CommitmentId::from(path.into_inner());
    let record = state.workflow.approve(caller.id(), id).await?;
    Ok(HttpResponse::Ok().json(CommitmentResponse::from(record)))
}

/// Reject a commitment under review, restarting the approval round.
#[utoipa::path(
    post,
    path = "/api/v1/commitments/{id}/reject",
    params(("id" = i64, Path, description = "Commitment to reject")),
    responses(
        (status = 200, description = "Commitment back in draft", body = CommitmentResponse),
        (status = 403, description = "Caller is not an approver", body = Error),
        (status = 404, description = "Commitment not found", body = Error),
        (status = 409, description = "Not in review, or already acted", body = Error)
    ),
    tags = ["commitments"],
    operation_id = "rejectCommitment"
)]
#[post("/commitments/{id}/reject")]
pub async fn reject(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = CommitmentId::from(path.into_inner());
    let record = state.workflow.reject(caller.id(), id).await?;
    Ok(HttpResponse::Ok().json(CommitmentResponse::from(record)))
}

/// Fetch one commitment.
#[utoipa::path(
    get,
    path = "/api/v1/commitments/{id}",
    params(("id" = i64, Path, description = "Commitment to fetch")),
    responses(
        (status = 200, description = "The commitment", body = CommitmentResponse),
        (status = 403, description = "Caller is not an approved member", body = Error),
        (status = 404, description = "Commitment not found", body = Error)
    ),
    tags = ["commitments"],
    operation_id = "getCommitment"
)]
#[get("/commitments/{id}")]
pub async fn get_commitment(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = CommitmentId::from(path.into_inner());
    let record = state.workflow.commitment(caller.id(), id).await?;
    Ok(HttpResponse::Ok().json(CommitmentResponse::from(record)))
}

/// Fetch a commitment's audit history, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/commitments/{id}/history",
    params(("id" = i64, Path, description = "Commitment whose history to fetch")),
    responses(
        (status = 200, description = "Audit entries", body = [HistoryEntryResponse]),
        (status = 403, description = "Caller is not an approved member", body = Error),
        (status = 404, description = "Commitment not found", body = Error)
    ),
    tags = ["commitments"],
    operation_id = "getCommitmentHistory"
)]
#[get("/commitments/{id}/history")]
pub async fn get_history(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = CommitmentId::from(path.into_inner());
    let entries = state.workflow.history(caller.id(), id).await?;
    let body: Vec<HistoryEntryResponse> =
        entries.into_iter().map(HistoryEntryResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}
