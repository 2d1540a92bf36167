//! Embedded schema migrations.
//!
//! Migrations ship inside the binary and run once at startup, before the
//! pool serves traffic. `diesel_migrations` needs a synchronous connection,
//! so the async connection is wrapped and driven on a blocking thread.

use diesel::Connection;
use diesel_async::AsyncPgConnection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// All migrations bundled at compile time.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while migrating.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Could not connect to the database.
    #[error("failed to connect for migrations: {message}")]
    Connection {
        /// Driver-level description.
        message: String,
    },
    /// A migration failed to apply.
    #[error("failed to run migrations: {message}")]
    Apply {
        /// Harness-level description.
        message: String,
    },
    /// The blocking migration task was cancelled.
    #[error("migration task failed: {message}")]
    Task {
        /// Join-level description.
        message: String,
    },
}

/// Apply all pending migrations against the given database.
///
/// # Errors
///
/// [`MigrationError`] when the connection cannot be established, a
/// migration fails, or the blocking task is cancelled.
pub async fn run_pending(database_url: &str) -> Result<(), MigrationError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn: AsyncConnectionWrapper<AsyncPgConnection> =
            AsyncConnectionWrapper::establish(&url).map_err(|err| {
                MigrationError::Connection {
                    message: err.to_string(),
                }
            })?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| MigrationError::Apply {
                message: err.to_string(),
            })?;
        for version in applied {
            info!(%version, "applied migration");
        }
        Ok(())
    })
    .await
    .map_err(|err| MigrationError::Task {
        message: err.to_string(),
    })?
}
