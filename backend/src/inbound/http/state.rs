//! Shared HTTP adapter state.
//!
//! Handlers accept this via `actix_web::web::Data`, so they depend only on
//! driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{CommitmentWorkflow, IdentityDirectory, SpaceDirectory};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Commitment approval workflow.
    pub workflow: Arc<dyn CommitmentWorkflow>,
    /// Spaces, memberships, and invites.
    pub spaces: Arc<dyn SpaceDirectory>,
    /// Caller identity resolution.
    pub identity: Arc<dyn IdentityDirectory>,
}

impl HttpState {
    /// Bundle the three driving ports.
    pub fn new(
        workflow: Arc<dyn CommitmentWorkflow>,
        spaces: Arc<dyn SpaceDirectory>,
        identity: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            workflow,
            spaces,
            identity,
        }
    }
}
