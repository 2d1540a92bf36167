//! HTTP adapter.
//!
//! Handlers stay thin: they extract the caller, validate request shape,
//! delegate to a driving port from [`HttpState`], and map the result onto a
//! response DTO. Domain errors convert to HTTP responses in [`error`].

pub mod caller;
pub mod commitments;
pub mod error;
pub mod health;
pub mod invites;
pub mod spaces;
pub mod state;
pub mod users;
pub mod validation;

pub use caller::Caller;
pub use state::HttpState;

use actix_web::web;

use crate::domain::Error;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Register every API route on the given scope.
///
/// Mounted under `/api/v1` by the server; tests mount it directly.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(spaces::create_space)
        .service(spaces::list_spaces)
        .service(spaces::get_space)
        .service(spaces::invite_to_space)
        .service(spaces::list_members)
        .service(spaces::search_members)
        .service(spaces::leave_space)
        .service(commitments::create_commitment)
        .service(commitments::list_space_commitments)
        .service(commitments::update_commitment)
        .service(commitments::send_for_review)
        .service(commitments::approve)
        .service(commitments::reject)
        .service(commitments::get_commitment)
        .service(commitments::get_history)
        .service(invites::list_invites)
        .service(invites::accept_invite)
        .service(invites::reject_invite)
        .service(users::current_user)
        .service(users::get_user);
}
