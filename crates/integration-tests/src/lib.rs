//! Integration tests for Ladle.
//!
//! # Test Categories
//!
//! - `cart_reconciliation` - Mutation sequences driven through the
//!   synchronizer against recording adapters
//! - `cart_persistence` - Cache durability across synchronizer restarts
//!
//! This library exposes the shared recording adapters used by the test
//! binaries.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use ladle_client::cache::CartCache;
use ladle_client::remote::{RemoteCollection, RemoteError};
use ladle_core::{CartLine, ProductRef, RecipeId};

/// A remote adapter call, recorded in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    /// `create_or_set_line` with the line's id and quantity.
    Upsert(RecipeId, u32),
    /// `adjust_quantity` with the id and delta.
    Adjust(RecipeId, i64),
    /// `delete_line` with the id.
    Delete(RecipeId),
    /// `fetch_all_lines`.
    FetchAll,
}

/// In-memory remote collection that records every call.
#[derive(Default)]
pub struct RecordingRemote {
    calls: Mutex<Vec<RemoteCall>>,
    lines: Mutex<Vec<CartLine>>,
    fail: bool,
}

impl RecordingRemote {
    /// A remote that accepts every call.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A remote that fails every call with a backend error.
    #[must_use]
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    /// A remote pre-seeded with lines for hydrate tests.
    #[must_use]
    pub fn with_lines(lines: Vec<CartLine>) -> Arc<Self> {
        Arc::new(Self {
            lines: Mutex::new(lines),
            ..Self::default()
        })
    }

    /// Calls recorded so far, in dispatch order.
    #[must_use]
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RemoteCall) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(RemoteError::Api {
                status: 503,
                message: "backend unavailable".to_owned(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteCollection for RecordingRemote {
    async fn create_or_set_line(&self, line: &CartLine) -> Result<(), RemoteError> {
        self.record(RemoteCall::Upsert(line.id.clone(), line.quantity.get()))?;
        let mut lines = self.lines.lock().unwrap();
        lines.retain(|existing| existing.id != line.id);
        lines.push(line.clone());
        Ok(())
    }

    async fn adjust_quantity(&self, id: &RecipeId, delta: i64) -> Result<(), RemoteError> {
        self.record(RemoteCall::Adjust(id.clone(), delta))
    }

    async fn delete_line(&self, id: &RecipeId) -> Result<(), RemoteError> {
        self.record(RemoteCall::Delete(id.clone()))?;
        self.lines.lock().unwrap().retain(|line| line.id != *id);
        Ok(())
    }

    async fn fetch_all_lines(&self) -> Result<Vec<CartLine>, RemoteError> {
        self.record(RemoteCall::FetchAll)?;
        Ok(self.lines.lock().unwrap().clone())
    }
}

/// In-memory cart cache that records every save.
///
/// Clones share state, so tests can keep a handle after boxing one clone
/// into the synchronizer.
#[derive(Clone, Default)]
pub struct RecordingCache {
    state: Arc<Mutex<Vec<CartLine>>>,
    save_count: Arc<Mutex<usize>>,
}

impl RecordingCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache pre-seeded with lines.
    #[must_use]
    pub fn with_lines(lines: Vec<CartLine>) -> Self {
        Self {
            state: Arc::new(Mutex::new(lines)),
            save_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of saves performed.
    #[must_use]
    pub fn save_count(&self) -> usize {
        *self.save_count.lock().unwrap()
    }

    /// The lines most recently saved (or seeded).
    #[must_use]
    pub fn saved_lines(&self) -> Vec<CartLine> {
        self.state.lock().unwrap().clone()
    }
}

impl CartCache for RecordingCache {
    fn load(&self) -> Vec<CartLine> {
        self.state.lock().unwrap().clone()
    }

    fn save(&self, lines: &[CartLine]) {
        *self.state.lock().unwrap() = lines.to_vec();
        *self.save_count.lock().unwrap() += 1;
    }
}

/// Shorthand product reference for tests.
#[must_use]
pub fn product(id: &str, title: &str) -> ProductRef {
    ProductRef {
        id: RecipeId::new(id),
        title: title.to_owned(),
        photo_url: format!("https://img.example/{id}.jpg"),
    }
}
