//! Ladle Core - Shared domain types and cart logic.
//!
//! This crate provides the domain model used across all Ladle components:
//! - `client` - The synchronization layer embedded in the recipe-catalog UI
//! - `integration-tests` - Cross-crate scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no network
//! clients, no storage. The cart state machine in [`cart`] is a synchronous
//! state-transition function: each mutation updates the in-memory state and
//! returns the remote side effect (if any) for the caller to dispatch. This
//! keeps the reconciliation algorithm fully testable without adapters.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe ids and quantities
//! - [`cart`] - Cart lines, cart state, and the reconciliation transitions
//! - [`recipe`] - Recipe catalog entries
//! - [`stats`] - Usage-statistics series derived from cart and catalog data

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod recipe;
pub mod stats;
pub mod types;

pub use cart::{CartLine, CartState, ProductRef, RemoteEffect};
pub use recipe::Recipe;
pub use stats::ChartSeries;
pub use types::*;
