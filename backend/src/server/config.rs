//! Environment-driven application configuration.
//!
//! | Variable              | Meaning                                   |
//! |-----------------------|-------------------------------------------|
//! | `BIND_ADDR`           | Listen address, default `0.0.0.0:8080`    |
//! | `DATABASE_URL`        | PostgreSQL connection string (required)   |
//! | `AUTH_VERIFY_URL`     | Remote token verification endpoint        |
//! | `AUTH_ALLOW_INSECURE` | `1` permits the static dev verifier       |
//!
//! Release builds refuse to boot without `AUTH_VERIFY_URL` unless insecure
//! auth is explicitly enabled; debug builds fall back to the deterministic
//! dev verifier with a warning.

use std::env;
use std::net::SocketAddr;

/// How bearer tokens are verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Verify against a remote endpoint.
    Remote {
        /// The verification endpoint.
        verify_url: String,
    },
    /// Deterministic dev verifier; development and tests only.
    Insecure,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Token verification mode.
    pub auth: AuthMode,
}

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is absent.
    #[error("missing required environment variable {name}")]
    MissingVar {
        /// The variable's name.
        name: &'static str,
    },
    /// A variable failed to parse.
    #[error("invalid value for {name}: {message}")]
    Invalid {
        /// The variable's name.
        name: &'static str,
        /// What went wrong.
        message: String,
    },
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

fn parse_bind_addr(raw: &str) -> Result<SocketAddr, ConfigError> {
    raw.parse().map_err(|err| ConfigError::Invalid {
        name: "BIND_ADDR",
        message: format!("{err}"),
    })
}

/// Pick the auth mode from the optional verify URL and the insecure toggle.
///
/// # Errors
///
/// [`ConfigError::MissingVar`] when no URL is configured and insecure auth
/// is not permitted (release builds without the explicit toggle).
pub fn resolve_auth(
    verify_url: Option<String>,
    allow_insecure: bool,
) -> Result<AuthMode, ConfigError> {
    match verify_url {
        Some(url) if !url.trim().is_empty() => Ok(AuthMode::Remote { verify_url: url }),
        _ if allow_insecure || cfg!(debug_assertions) => Ok(AuthMode::Insecure),
        _ => Err(ConfigError::MissingVar {
            name: "AUTH_VERIFY_URL",
        }),
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when `DATABASE_URL` is absent, `BIND_ADDR` fails to
    /// parse, or no auth mode can be resolved.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = parse_bind_addr(
            &env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned()),
        )?;
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar {
            name: "DATABASE_URL",
        })?;
        let allow_insecure = env::var("AUTH_ALLOW_INSECURE").ok().as_deref() == Some("1");
        let auth = resolve_auth(env::var("AUTH_VERIFY_URL").ok(), allow_insecure)?;

        Ok(Self {
            bind_addr,
            database_url,
            auth,
        })
    }
}
