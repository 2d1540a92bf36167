//! Pact backend library modules.
//!
//! Pact is a collaborative commitment-tracking service: users form spaces,
//! propose commitments inside them, and route each commitment through a
//! multi-approver review workflow with an append-only audit history.
//!
//! The crate follows a ports-and-adapters layout:
//!
//! - [`domain`]: entities, the approval state machine, membership rules,
//!   ports, and the services implementing the driving ports.
//! - [`inbound`]: the HTTP adapter (actix-web handlers, DTOs, bearer-token
//!   caller extraction, error mapping).
//! - [`outbound`]: driven adapters, i.e. the Diesel/PostgreSQL stores and
//!   the remote token verifier.
//! - [`middleware`]: request lifecycle middleware (trace identifiers).
//! - [`server`]: configuration and application wiring.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
