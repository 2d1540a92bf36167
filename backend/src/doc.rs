//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API: every
//! endpoint of the inbound layer, the request/response schemas, and the
//! bearer-token security scheme. Swagger UI serves it in debug builds; the
//! `openapi-dump` binary exports it for external tooling.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::error::{Error, ErrorCode};
use crate::inbound::http::commitments::{
    ApproverResponse, CommitmentResponse, CreateCommitmentRequest, HistoryEntryResponse,
    PerformedByResponse, UpdateCommitmentRequest,
};
use crate::inbound::http::invites::InviteResponse;
use crate::inbound::http::spaces::{
    CreateSpaceRequest, InviteToSpaceRequest, MessageResponse, SpaceMemberResponse, SpaceResponse,
};
use crate::inbound::http::users::UserResponse;

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Pact backend API",
        description = "Collaborative commitment tracking: spaces, invites, and \
                       multi-approver commitment review."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::spaces::create_space,
        crate::inbound::http::spaces::list_spaces,
        crate::inbound::http::spaces::get_space,
        crate::inbound::http::spaces::invite_to_space,
        crate::inbound::http::spaces::list_members,
        crate::inbound::http::spaces::search_members,
        crate::inbound::http::spaces::leave_space,
        crate::inbound::http::commitments::create_commitment,
        crate::inbound::http::commitments::list_space_commitments,
        crate::inbound::http::commitments::update_commitment,
        crate::inbound::http::commitments::send_for_review,
        crate::inbound::http::commitments::approve,
        crate::inbound::http::commitments::reject,
        crate::inbound::http::commitments::get_commitment,
        crate::inbound::http::commitments::get_history,
        crate::inbound::http::invites::list_invites,
        crate::inbound::http::invites::accept_invite,
        crate::inbound::http::invites::reject_invite,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CreateCommitmentRequest,
        UpdateCommitmentRequest,
        CommitmentResponse,
        ApproverResponse,
        HistoryEntryResponse,
        PerformedByResponse,
        CreateSpaceRequest,
        InviteToSpaceRequest,
        SpaceResponse,
        SpaceMemberResponse,
        MessageResponse,
        InviteResponse,
        UserResponse,
    )),
    tags(
        (name = "spaces", description = "Spaces and memberships"),
        (name = "commitments", description = "Commitment approval workflow"),
        (name = "invites", description = "Invite lifecycle"),
        (name = "users", description = "User identity"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;
