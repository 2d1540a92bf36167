//! Driven port for user persistence.

use async_trait::async_trait;

use crate::domain::ids::UserId;
use crate::domain::user::User;

/// Fields of a user registered on first authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Stable subject from the external identity provider.
    pub subject: String,
    /// E-mail address.
    pub email: String,
    /// Display name derived from the verifier claims.
    pub display_name: String,
}

/// Errors raised by user store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserStoreError {
    /// Store connection could not be established.
    #[error("user store connection failed: {message}")]
    Connection {
        /// Driver-level description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user store query failed: {message}")]
    Query {
        /// Driver-level description.
        message: String,
    },
    /// Another request registered the same subject first.
    #[error("subject already registered: {subject}")]
    SubjectTaken {
        /// The contested subject.
        subject: String,
    },
}

impl UserStoreError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a subject-taken error for the given subject.
    pub fn subject_taken(subject: impl Into<String>) -> Self {
        Self::SubjectTaken {
            subject: subject.into(),
        }
    }
}

/// Port for user rows.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by internal id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError>;

    /// Find a user by external subject.
    async fn find_by_subject(&self, subject: &str) -> Result<Option<User>, UserStoreError>;

    /// Register a user seen for the first time.
    ///
    /// Fails with [`UserStoreError::SubjectTaken`] when a concurrent request
    /// won the registration race; callers re-read by subject.
    async fn create(&self, user: NewUser) -> Result<User, UserStoreError>;
}
