//! Application wiring.
//!
//! Builds the connection pool, runs migrations, and assembles the adapter
//! and service graph into the [`HttpState`] handlers consume.

pub mod config;

use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::{StaticTokenVerifier, TokenVerifier};
use crate::domain::{IdentityService, SpaceService, WorkflowService};
use crate::inbound::http::HttpState;
use crate::outbound::identity::RemoteTokenVerifier;
use crate::outbound::persistence::migrate::MigrationError;
use crate::outbound::persistence::{
    DbPool, DieselCommitmentStore, DieselSpaceStore, DieselUserStore, PoolConfig, PoolError,
    migrate,
};

pub use config::{AppConfig, AuthMode, ConfigError};

/// Errors raised while bootstrapping the application.
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    /// The connection pool could not be built.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// Migrations failed to apply.
    #[error(transparent)]
    Migration(#[from] MigrationError),
    /// The verifier HTTP client could not be constructed.
    #[error("failed to build token verifier client: {0}")]
    Verifier(#[from] reqwest::Error),
}

fn build_verifier(auth: &AuthMode) -> Result<Arc<dyn TokenVerifier>, BootError> {
    match auth {
        AuthMode::Remote { verify_url } => {
            Ok(Arc::new(RemoteTokenVerifier::new(verify_url.clone())?))
        }
        AuthMode::Insecure => {
            warn!("using the static dev token verifier; do not expose this instance");
            Ok(Arc::new(StaticTokenVerifier))
        }
    }
}

/// Assemble the service graph over an existing pool.
///
/// # Errors
///
/// [`BootError::Verifier`] when the verifier client cannot be built.
pub fn build_http_state(pool: DbPool, auth: &AuthMode) -> Result<HttpState, BootError> {
    let verifier = build_verifier(auth)?;
    let users = Arc::new(DieselUserStore::new(pool.clone()));
    let workflow = WorkflowService::new(Arc::new(DieselCommitmentStore::new(pool.clone())));
    let spaces = SpaceService::new(Arc::new(DieselSpaceStore::new(pool)));
    let identity = IdentityService::new(verifier, users);

    Ok(HttpState::new(
        Arc::new(workflow),
        Arc::new(spaces),
        Arc::new(identity),
    ))
}

/// Build the pool, migrate the schema, and assemble the service graph.
///
/// # Errors
///
/// [`BootError`] when the pool cannot be built, migrations fail, or the
/// verifier client cannot be constructed.
pub async fn bootstrap(config: &AppConfig) -> Result<HttpState, BootError> {
    migrate::run_pending(&config.database_url).await?;
    let pool = DbPool::new(PoolConfig::new(&config.database_url)).await?;
    build_http_state(pool, &config.auth)
}
