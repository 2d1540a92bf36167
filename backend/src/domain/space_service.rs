//! Space directory service.
//!
//! Implements the [`SpaceDirectory`] driving port over a [`SpaceStore`],
//! mapping infrastructure failures onto domain errors.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use super::error::Error;
use super::ids::{InviteId, SpaceId, UserId};
use super::membership::InviteReply;
use super::ports::{NewSpace, SpaceDirectory, SpaceStore, SpaceStoreError};
use super::space::{PendingInvite, SpaceMember, SpaceSummary};

/// Space and membership use-cases backed by an atomic store.
#[derive(Clone)]
pub struct SpaceService {
    store: Arc<dyn SpaceStore>,
}

impl SpaceService {
    /// Create a new service over the given store.
    pub fn new(store: Arc<dyn SpaceStore>) -> Self {
        Self { store }
    }
}

fn map_store_error(error: SpaceStoreError) -> Error {
    match error {
        SpaceStoreError::Rule(rule) => rule,
        SpaceStoreError::Connection { message } => {
            Error::service_unavailable(format!("space store unavailable: {message}"))
        }
        SpaceStoreError::Query { message } => {
            Error::internal(format!("space store error: {message}"))
        }
    }
}

#[async_trait]
impl SpaceDirectory for SpaceService {
    #[instrument(skip(self, space), fields(caller = %caller))]
    async fn create_space(
        &self,
        caller: UserId,
        space: NewSpace,
    ) -> Result<SpaceSummary, Error> {
        self.store
            .create_space(caller, space)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self, email), fields(caller = %caller, space = %space))]
    async fn invite(&self, caller: UserId, space: SpaceId, email: &str) -> Result<(), Error> {
        self.store
            .invite_by_email(caller, space, email)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self), fields(caller = %caller))]
    async fn pending_invites(&self, caller: UserId) -> Result<Vec<PendingInvite>, Error> {
        self.store
            .pending_invites(caller)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self), fields(caller = %caller, invite = %invite))]
    async fn accept_invite(&self, caller: UserId, invite: InviteId) -> Result<(), Error> {
        self.store
            .respond_to_invite(caller, invite, InviteReply::Accept)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self), fields(caller = %caller, invite = %invite))]
    async fn reject_invite(&self, caller: UserId, invite: InviteId) -> Result<(), Error> {
        self.store
            .respond_to_invite(caller, invite, InviteReply::Decline)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self), fields(caller = %caller))]
    async fn spaces_for(&self, caller: UserId) -> Result<Vec<SpaceSummary>, Error> {
        self.store.spaces_for(caller).await.map_err(map_store_error)
    }

    #[instrument(skip(self), fields(space = %id))]
    async fn space(&self, id: SpaceId) -> Result<SpaceSummary, Error> {
        self.store.fetch_space(id).await.map_err(map_store_error)
    }

    #[instrument(skip(self), fields(caller = %caller, space = %space))]
    async fn members(&self, caller: UserId, space: SpaceId) -> Result<Vec<SpaceMember>, Error> {
        self.store
            .members(caller, space, None)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self, query), fields(caller = %caller, space = %space))]
    async fn search_members(
        &self,
        caller: UserId,
        space: SpaceId,
        query: Option<String>,
    ) -> Result<Vec<SpaceMember>, Error> {
        let filter = query.as_deref().map(str::trim).filter(|q| !q.is_empty());
        self.store
            .members(caller, space, filter)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self), fields(caller = %caller, space = %space))]
    async fn leave(&self, caller: UserId, space: SpaceId) -> Result<(), Error> {
        self.store.leave(caller, space).await.map_err(map_store_error)
    }
}
