//! Ladle Client - Cart synchronization and catalog access.
//!
//! This crate is the state-synchronization layer of the Ladle recipe-catalog
//! client. It is a library embedded in a larger UI application; it exposes no
//! process boundary of its own.
//!
//! # Architecture
//!
//! The cart lives in three tiers:
//!
//! - in-memory [`ladle_core::CartState`] - source of truth for rendering,
//! - a local durable cache ([`cache::JsonFileCache`]) - survives reloads,
//! - a remote shared collection ([`remote::FirestoreCartItems`]) -
//!   multi-device source of truth, eventually consistent.
//!
//! UI events mutate the in-memory state synchronously through
//! [`sync::CartSynchronizer`]; the cache is rewritten on every mutation, and
//! the remote write is dispatched fire-and-forget. Remote failures are logged
//! and never surfaced - the local mirror is always authoritative for what the
//! user sees.
//!
//! # Example
//!
//! ```rust,ignore
//! use ladle_client::{config::ClientConfig, session::Session};
//! use ladle_core::ProductRef;
//!
//! let config = ClientConfig::from_env()?;
//! let mut session = Session::initialize(config).await;
//!
//! session.cart_mut().add(&ProductRef {
//!     id: "tomato-soup".into(),
//!     title: "Tomato Soup".into(),
//!     photo_url: "https://img.example/soup.jpg".into(),
//! });
//! let badge = session.cart().total_quantity();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod catalog;
pub mod config;
pub mod remote;
pub mod session;
pub mod sync;

pub use cache::{CartCache, JsonFileCache};
pub use catalog::RecipeCatalog;
pub use config::ClientConfig;
pub use remote::{FirestoreCartItems, FirestoreClient, RemoteCollection, RemoteError};
pub use session::Session;
pub use sync::{CartSynchronizer, EffectRunner};
