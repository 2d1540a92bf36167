//! Inbound adapters.
//!
//! Only HTTP today; the module split keeps room for other entry points
//! without touching the domain.

pub mod http;
