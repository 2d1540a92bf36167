//! Identity provider adapters.

mod remote;

pub use remote::RemoteTokenVerifier;
