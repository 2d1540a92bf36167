//! Domain ports.
//!
//! Driving ports (`CommitmentWorkflow`, `SpaceDirectory`, `IdentityDirectory`)
//! are what inbound adapters call; driven ports (`CommitmentStore`,
//! `SpaceStore`, `UserStore`, `TokenVerifier`) are what outbound adapters
//! implement. Port error enums stay transport- and driver-agnostic; services
//! map them onto domain errors at the boundary between the two.

mod commitment_store;
mod commitment_workflow;
mod identity_directory;
mod space_directory;
mod space_store;
mod token_verifier;
mod user_store;

pub use commitment_store::{
    CommitmentDraft, CommitmentPatch, CommitmentStore, CommitmentStoreError,
};
pub use commitment_workflow::CommitmentWorkflow;
pub use identity_directory::IdentityDirectory;
pub use space_directory::SpaceDirectory;
pub use space_store::{NewSpace, SpaceStore, SpaceStoreError};
pub use token_verifier::{StaticTokenVerifier, TokenClaims, TokenVerifier, TokenVerifierError};
pub use user_store::{NewUser, UserStore, UserStoreError};

#[cfg(test)]
pub use commitment_workflow::MockCommitmentWorkflow;
#[cfg(test)]
pub use identity_directory::MockIdentityDirectory;
#[cfg(test)]
pub use space_directory::MockSpaceDirectory;
