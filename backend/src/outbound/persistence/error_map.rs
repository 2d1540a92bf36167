//! Diesel error conversions for the store error enums.
//!
//! Letting the store errors absorb `diesel::result::Error` keeps `?` usable
//! inside transaction closures while the port enums themselves stay
//! driver-agnostic.

use crate::domain::ports::{CommitmentStoreError, SpaceStoreError, UserStoreError};

use super::pool::PoolError;

impl From<diesel::result::Error> for CommitmentStoreError {
    fn from(err: diesel::result::Error) -> Self {
        Self::query(err.to_string())
    }
}

impl From<PoolError> for CommitmentStoreError {
    fn from(err: PoolError) -> Self {
        Self::connection(err.to_string())
    }
}

impl From<diesel::result::Error> for SpaceStoreError {
    fn from(err: diesel::result::Error) -> Self {
        Self::query(err.to_string())
    }
}

impl From<PoolError> for SpaceStoreError {
    fn from(err: PoolError) -> Self {
        Self::connection(err.to_string())
    }
}

impl From<diesel::result::Error> for UserStoreError {
    fn from(err: diesel::result::Error) -> Self {
        Self::query(err.to_string())
    }
}

impl From<PoolError> for UserStoreError {
    fn from(err: PoolError) -> Self {
        Self::connection(err.to_string())
    }
}
