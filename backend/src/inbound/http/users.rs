//! User HTTP handlers.
//!
//! ```text
//! GET /api/v1/users/me
//! GET /api/v1/users/{user_id}
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, User, UserId};

use super::caller::Caller;
use super::state::HttpState;
use super::ApiResult;

/// User projection.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// E-mail address.
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.get(),
            name: user.display_name,
            email: user.email,
        }
    }
}

/// The calling user, registering first-time subjects as a side effect.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "The caller", body = UserResponse),
        (status = 401, description = "Missing or invalid credential", body = Error)
    ),
    tags = ["users"],
    operation_id = "getCurrentUser"
)]
#[get("/users/me")]
pub async fn current_user(caller: Caller) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserResponse::from(caller.0)))
}

/// Look up a user by id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = i64, Path, description = "User to fetch")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUserById"
)]
#[get("/users/{user_id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    _caller: Caller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let user = state.identity.user(UserId::from(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
