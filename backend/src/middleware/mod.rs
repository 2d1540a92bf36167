//! Request middleware.
//!
//! Lifecycle concerns that apply to every request, currently trace
//! identifier propagation.

pub mod trace;

pub use trace::Trace;
