//! Remote document-store access.
//!
//! # Architecture
//!
//! - [`FirestoreClient`] speaks the Firestore REST v1 data plane: point
//!   upsert, atomic numeric increment, point delete, and collection scan.
//! - [`FirestoreCartItems`] binds the client to one cart's `items`
//!   subcollection and implements [`RemoteCollection`], the adapter seam the
//!   synchronizer mocks in tests.
//! - The remote tier is a best-effort, eventually-consistent mirror of the
//!   local cart, not a transactional system: cart writes are dispatched
//!   fire-and-forget and never retried.

pub mod documents;
mod firestore;

pub use firestore::{FirestoreCartItems, FirestoreClient};

use async_trait::async_trait;
use thiserror::Error;

use ladle_core::{CartLine, RecipeId};

/// Errors that can occur when talking to the remote document store.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        message: String,
    },

    /// Failed to decode a response body.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A document is missing fields or holds values of the wrong type.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// The remote cart collection: keyed line records under a fixed,
/// application-known path.
///
/// Any call may fail with a network or backend error; the synchronizer does
/// not retry, does not roll back the local mutation, and does not block the
/// UI on the outcome.
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    /// Upsert a record keyed by the line's id.
    async fn create_or_set_line(&self, line: &CartLine) -> Result<(), RemoteError>;

    /// Atomically adjust a record's quantity counter by `delta` (may be
    /// negative).
    async fn adjust_quantity(&self, id: &RecipeId, delta: i64) -> Result<(), RemoteError>;

    /// Remove a record by key.
    async fn delete_line(&self, id: &RecipeId) -> Result<(), RemoteError>;

    /// Full read of the collection, used at session start to hydrate.
    async fn fetch_all_lines(&self) -> Result<Vec<CartLine>, RemoteError>;
}
