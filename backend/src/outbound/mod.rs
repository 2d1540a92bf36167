//! Driven adapters.
//!
//! [`persistence`] implements the store ports over Diesel/PostgreSQL;
//! [`identity`] implements the token verifier port over HTTP.

pub mod identity;
pub mod persistence;
