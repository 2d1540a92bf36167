//! Caller identity resolution.
//!
//! Implements the [`IdentityDirectory`] driving port: a bearer token goes to
//! the external verifier, and the returned subject is mapped onto an
//! internal user row. Subjects seen for the first time are registered on the
//! spot with a display name from the claims, falling back to the local part
//! of the e-mail address.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use super::error::Error;
use super::ids::UserId;
use super::ports::{
    IdentityDirectory, NewUser, TokenVerifier, TokenVerifierError, UserStore, UserStoreError,
};
use super::user::{User, derive_display_name};

/// Identity resolution backed by a token verifier and the user store.
#[derive(Clone)]
pub struct IdentityService {
    verifier: Arc<dyn TokenVerifier>,
    users: Arc<dyn UserStore>,
}

impl IdentityService {
    /// Create a new service over the given verifier and store.
    pub fn new(verifier: Arc<dyn TokenVerifier>, users: Arc<dyn UserStore>) -> Self {
        Self { verifier, users }
    }
}

fn map_verifier_error(error: TokenVerifierError) -> Error {
    match error {
        TokenVerifierError::Expired => Error::unauthorized("token expired"),
        TokenVerifierError::Rejected { .. } => Error::unauthorized("invalid token"),
        TokenVerifierError::Unavailable { message } => {
            Error::service_unavailable(format!("token verifier unavailable: {message}"))
        }
    }
}

fn map_user_store_error(error: UserStoreError) -> Error {
    match error {
        UserStoreError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserStoreError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
        UserStoreError::SubjectTaken { subject } => {
            Error::internal(format!("unresolved registration race for subject {subject}"))
        }
    }
}

#[async_trait]
impl IdentityDirectory for IdentityService {
    #[instrument(skip(self, token))]
    async fn resolve_bearer(&self, token: &str) -> Result<User, Error> {
        let claims = self
            .verifier
            .verify(token)
            .await
            .map_err(map_verifier_error)?;

        if let Some(user) = self
            .users
            .find_by_subject(&claims.subject)
            .await
            .map_err(map_user_store_error)?
        {
            return Ok(user);
        }

        let new_user = NewUser {
            subject: claims.subject.clone(),
            email: claims.email.clone(),
            display_name: derive_display_name(claims.name.as_deref(), &claims.email),
        };

        match self.users.create(new_user).await {
            Ok(user) => {
                info!(user = %user.id, "registered first-time subject");
                Ok(user)
            }
            // A concurrent request registered the subject between our lookup
            // and insert; the row now exists.
            Err(UserStoreError::SubjectTaken { .. }) => self
                .users
                .find_by_subject(&claims.subject)
                .await
                .map_err(map_user_store_error)?
                .ok_or_else(|| {
                    Error::internal("user row disappeared during registration race")
                }),
            Err(err) => Err(map_user_store_error(err)),
        }
    }

    #[instrument(skip(self), fields(user = %id))]
    async fn user(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}
