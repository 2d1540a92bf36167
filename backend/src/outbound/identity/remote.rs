//! HTTP adapter for the token verifier port.
//!
//! Posts the opaque token to the configured verification endpoint and maps
//! the response onto claims. The endpoint is expected to answer `200` with
//! `{subject, email, name?}` for valid tokens and `401` with an `error`
//! description otherwise.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenClaims, TokenVerifier, TokenVerifierError};

const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Token verifier calling a remote verification endpoint.
#[derive(Clone)]
pub struct RemoteTokenVerifier {
    client: reqwest::Client,
    verify_url: String,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClaimsDto {
    subject: String,
    email: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RejectionDto {
    error: Option<String>,
}

impl RemoteTokenVerifier {
    /// Create a verifier posting to the given endpoint.
    ///
    /// # Errors
    ///
    /// [`reqwest::Error`] when the HTTP client cannot be constructed.
    pub fn new(verify_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(VERIFY_TIMEOUT).build()?;
        Ok(Self {
            client,
            verify_url: verify_url.into(),
        })
    }
}

#[async_trait]
impl TokenVerifier for RemoteTokenVerifier {
    async fn verify(&self, token: &str) -> Result<TokenClaims, TokenVerifierError> {
        let response = self
            .client
            .post(&self.verify_url)
            .json(&VerifyRequest { token })
            .send()
            .await
            .map_err(|err| TokenVerifierError::unavailable(err.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let claims: ClaimsDto = response
                    .json()
                    .await
                    .map_err(|err| TokenVerifierError::unavailable(err.to_string()))?;
                Ok(TokenClaims {
                    subject: claims.subject,
                    email: claims.email,
                    name: claims.name,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let rejection: RejectionDto = response
                    .json()
                    .await
                    .unwrap_or(RejectionDto { error: None });
                let message = rejection.error.unwrap_or_else(|| "invalid token".to_owned());
                if message.contains("expired") {
                    Err(TokenVerifierError::Expired)
                } else {
                    Err(TokenVerifierError::rejected(message))
                }
            }
            status => Err(TokenVerifierError::unavailable(format!(
                "verifier answered {status}"
            ))),
        }
    }
}
