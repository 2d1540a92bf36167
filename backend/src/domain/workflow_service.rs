//! Workflow engine service.
//!
//! Implements the [`CommitmentWorkflow`] driving port over a
//! [`CommitmentStore`]. The store runs each operation atomically and raises
//! rule violations from the state machine; this layer maps infrastructure
//! failures onto domain errors and attaches tracing spans.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use super::commitment::{CommitmentRecord, HistoryEntry};
use super::error::Error;
use super::ids::{CommitmentId, SpaceId, UserId};
use super::ports::{
    CommitmentDraft, CommitmentPatch, CommitmentStore, CommitmentStoreError, CommitmentWorkflow,
};
use super::workflow::ReviewDecision;

/// Commitment workflow engine backed by an atomic store.
#[derive(Clone)]
pub struct WorkflowService {
    store: Arc<dyn CommitmentStore>,
}

impl WorkflowService {
    /// Create a new engine over the given store.
    pub fn new(store: Arc<dyn CommitmentStore>) -> Self {
        Self { store }
    }
}

fn map_store_error(error: CommitmentStoreError) -> Error {
    match error {
        CommitmentStoreError::Rule(rule) => rule,
        CommitmentStoreError::Connection { message } => {
            Error::service_unavailable(format!("commitment store unavailable: {message}"))
        }
        CommitmentStoreError::Query { message } => {
            Error::internal(format!("commitment store error: {message}"))
        }
    }
}

#[async_trait]
impl CommitmentWorkflow for WorkflowService {
    #[instrument(skip(self, draft), fields(caller = %caller, space = %space))]
    async fn create_commitment(
        &self,
        caller: UserId,
        space: SpaceId,
        draft: CommitmentDraft,
    ) -> Result<CommitmentRecord, Error> {
        self.store
            .create(caller, space, draft)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self, patch), fields(caller = %caller, commitment = %id))]
    async fn update_commitment(
        &self,
        caller: UserId,
        id: CommitmentId,
        patch: CommitmentPatch,
    ) -> Result<CommitmentRecord, Error> {
        self.store
            .update(caller, id, patch)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self), fields(caller = %caller, commitment = %id))]
    async fn send_for_review(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<CommitmentRecord, Error> {
        self.store
            .send_for_review(caller, id)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self), fields(caller = %caller, commitment = %id))]
    async fn approve(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<CommitmentRecord, Error> {
        self.store
            .decide(caller, id, ReviewDecision::Approve)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self), fields(caller = %caller, commitment = %id))]
    async fn reject(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<CommitmentRecord, Error> {
        self.store
            .decide(caller, id, ReviewDecision::Reject)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self), fields(caller = %caller, space = %space))]
    async fn space_commitments(
        &self,
        caller: UserId,
        space: SpaceId,
    ) -> Result<Vec<CommitmentRecord>, Error> {
        self.store
            .list_for_space(caller, space)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self), fields(caller = %caller, commitment = %id))]
    async fn commitment(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<CommitmentRecord, Error> {
        self.store.fetch(caller, id).await.map_err(map_store_error)
    }

    #[instrument(skip(self), fields(caller = %caller, commitment = %id))]
    async fn history(
        &self,
        caller: UserId,
        id: CommitmentId,
    ) -> Result<Vec<HistoryEntry>, Error> {
        self.store
            .history(caller, id)
            .await
            .map_err(map_store_error)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::workflow::ReviewDecision;

    /// Stub store that fails every call with a configured error.
    struct FailingStore {
        error: Mutex<Option<CommitmentStoreError>>,
        seen_decision: Mutex<Option<ReviewDecision>>,
    }

    impl FailingStore {
        fn with(error: CommitmentStoreError) -> Self {
            Self {
                error: Mutex::new(Some(error)),
                seen_decision: Mutex::new(None),
            }
        }

        fn take(&self) -> CommitmentStoreError {
            self.error
                .lock()
                .expect("error lock")
                .take()
                .unwrap_or_else(|| CommitmentStoreError::query("exhausted"))
        }
    }

    #[async_trait]
    impl CommitmentStore for FailingStore {
        async fn create(
            &self,
            _caller: UserId,
            _space: SpaceId,
            _draft: CommitmentDraft,
        ) -> Result<CommitmentRecord, CommitmentStoreError> {
            Err(self.take())
        }

        async fn update(
            &self,
            _caller: UserId,
            _id: CommitmentId,
            _patch: CommitmentPatch,
        ) -> Result<CommitmentRecord, CommitmentStoreError> {
            Err(self.take())
        }

        async fn send_for_review(
            &self,
            _caller: UserId,
            _id: CommitmentId,
        ) -> Result<CommitmentRecord, CommitmentStoreError> {
            Err(self.take())
        }

        async fn decide(
            &self,
            _caller: UserId,
            _id: CommitmentId,
            decision: ReviewDecision,
        ) -> Result<CommitmentRecord, CommitmentStoreError> {
            *self.seen_decision.lock().expect("decision lock") = Some(decision);
            Err(self.take())
        }

        async fn list_for_space(
            &self,
            _caller: UserId,
            _space: SpaceId,
        ) -> Result<Vec<CommitmentRecord>, CommitmentStoreError> {
            Err(self.take())
        }

        async fn fetch(
            &self,
            _caller: UserId,
            _id: CommitmentId,
        ) -> Result<CommitmentRecord, CommitmentStoreError> {
            Err(self.take())
        }

        async fn history(
            &self,
            _caller: UserId,
            _id: CommitmentId,
        ) -> Result<Vec<HistoryEntry>, CommitmentStoreError> {
            Err(self.take())
        }
    }

    #[tokio::test]
    async fn rule_errors_pass_through_unmodified() {
        let store = Arc::new(FailingStore::with(CommitmentStoreError::Rule(
            Error::invalid_state("already acted on this commitment"),
        )));
        let service = WorkflowService::new(store);

        let err = service
            .approve(UserId::new(1), CommitmentId::new(1))
            .await
            .expect_err("rule violation");
        assert_eq!(err.code(), ErrorCode::InvalidState);
        assert_eq!(err.message(), "already acted on this commitment");
    }

    #[tokio::test]
    async fn connection_failures_surface_as_unavailable() {
        let store = Arc::new(FailingStore::with(CommitmentStoreError::connection(
            "pool exhausted",
        )));
        let service = WorkflowService::new(store);

        let err = service
            .commitment(UserId::new(1), CommitmentId::new(1))
            .await
            .expect_err("connection failure");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn query_failures_surface_as_internal() {
        let store = Arc::new(FailingStore::with(CommitmentStoreError::query("boom")));
        let service = WorkflowService::new(store);

        let err = service
            .history(UserId::new(1), CommitmentId::new(1))
            .await
            .expect_err("query failure");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn approve_and_reject_forward_the_right_decision() {
        let store = Arc::new(FailingStore::with(CommitmentStoreError::query("stub")));
        let service = WorkflowService::new(store.clone());

        let _unused = service.approve(UserId::new(1), CommitmentId::new(1)).await;
        assert_eq!(
            *store.seen_decision.lock().expect("decision lock"),
            Some(ReviewDecision::Approve)
        );

        *store.error.lock().expect("error lock") = Some(CommitmentStoreError::query("stub"));
        let _unused = service.reject(UserId::new(1), CommitmentId::new(1)).await;
        assert_eq!(
            *store.seen_decision.lock().expect("decision lock"),
            Some(ReviewDecision::Reject)
        );
    }
}
