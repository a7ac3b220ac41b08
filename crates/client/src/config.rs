//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LADLE_FIRESTORE_PROJECT` - Cloud project id owning the document store
//! - `LADLE_CART_ID` - Cart document id under the `carts` collection
//!
//! ## Optional
//! - `LADLE_FIRESTORE_DATABASE` - Database id (default: `(default)`)
//! - `LADLE_FIRESTORE_BASE_URL` - REST endpoint base
//!   (default: `https://firestore.googleapis.com/v1`; point at an emulator
//!   for local development)
//! - `LADLE_FIRESTORE_TOKEN` - OAuth bearer token for authenticated access
//! - `LADLE_CACHE_PATH` - Local cart cache file (default: `.ladle/cart.json`)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use ladle_core::CartId;

const DEFAULT_DATABASE: &str = "(default)";
const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_CACHE_PATH: &str = ".ladle/cart.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Remote document-store configuration.
    pub remote: RemoteConfig,
    /// Cart document id; the cart collection path is `carts/{cart_id}/items`.
    pub cart_id: CartId,
    /// Path of the local durable cart cache.
    pub cache_path: PathBuf,
}

/// Remote document-store configuration.
///
/// Implements `Debug` manually to redact the bearer token.
#[derive(Clone)]
pub struct RemoteConfig {
    /// Cloud project id.
    pub project: String,
    /// Database id within the project.
    pub database: String,
    /// REST endpoint base URL.
    pub base_url: Url,
    /// OAuth bearer token; anonymous access when absent.
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("project", &self.project)
            .field("database", &self.database)
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a lookup function.
    ///
    /// The indirection keeps loading testable without mutating the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// fails to parse.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let project = require(&lookup, "LADLE_FIRESTORE_PROJECT")?;
        let cart_id = CartId::new(require(&lookup, "LADLE_CART_ID")?);

        let database =
            lookup("LADLE_FIRESTORE_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_owned());

        let base_url_raw =
            lookup("LADLE_FIRESTORE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let base_url = Url::parse(&base_url_raw).map_err(|e| {
            ConfigError::InvalidEnvVar("LADLE_FIRESTORE_BASE_URL".to_owned(), e.to_string())
        })?;

        let token = lookup("LADLE_FIRESTORE_TOKEN").map(SecretString::from);

        let cache_path = lookup("LADLE_CACHE_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH), PathBuf::from);

        Ok(Self {
            remote: RemoteConfig {
                project,
                database,
                base_url,
                token,
            },
            cart_id,
            cache_path,
        })
    }
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<String, ConfigError> {
    match lookup(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(key.to_owned())),
    }
}
