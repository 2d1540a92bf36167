//! Driven port for bearer-token verification.
//!
//! Token verification is an external collaborator: the backend never
//! inspects token internals itself. An adapter hands the opaque token to the
//! verifier and receives back the claims needed to resolve a user.

use async_trait::async_trait;

/// Claims returned by a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Stable subject identifying the account at the provider.
    pub subject: String,
    /// Verified e-mail address.
    pub email: String,
    /// Display name, when the provider knows one.
    pub name: Option<String>,
}

/// Errors raised by token verifier adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenVerifierError {
    /// The token is malformed, unsigned, or otherwise rejected.
    #[error("token rejected: {message}")]
    Rejected {
        /// Verifier-supplied description.
        message: String,
    },
    /// The token was valid once but has expired.
    #[error("token expired")]
    Expired,
    /// The verifier could not be reached.
    #[error("token verifier unavailable: {message}")]
    Unavailable {
        /// Transport-level description.
        message: String,
    },
}

impl TokenVerifierError {
    /// Create a rejection error with the given message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Create an unavailable error with the given message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Port for resolving a bearer token into verified claims.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify the token and return its claims.
    async fn verify(&self, token: &str) -> Result<TokenClaims, TokenVerifierError>;
}

/// Deterministic verifier for development and tests.
///
/// Treats the token itself as `subject:email[:name]`. Only wired in debug
/// builds or when insecure auth is explicitly enabled; never in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticTokenVerifier;

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<TokenClaims, TokenVerifierError> {
        let mut parts = token.splitn(3, ':');
        let subject = parts.next().unwrap_or_default();
        let email = parts.next().unwrap_or_default();
        if subject.is_empty() || email.is_empty() {
            return Err(TokenVerifierError::rejected(
                "static tokens take the form subject:email[:name]",
            ));
        }
        Ok(TokenClaims {
            subject: subject.to_owned(),
            email: email.to_owned(),
            name: parts.next().map(ToOwned::to_owned),
        })
    }
}
