//! Diesel/PostgreSQL adapters for the store ports.
//!
//! Each mutating store method runs as one transaction. Workflow mutations
//! additionally take a `FOR UPDATE` lock on the commitment row before
//! reading the approver set, so the lock-check and the reject-reset always
//! evaluate against a snapshot no concurrent caller can invalidate.

mod diesel_commitment_store;
mod diesel_space_store;
mod diesel_user_store;
mod error_map;
pub mod migrate;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_commitment_store::DieselCommitmentStore;
pub use diesel_space_store::DieselSpaceStore;
pub use diesel_user_store::DieselUserStore;
pub use pool::{DbPool, PoolConfig, PoolError};
