//! Local durable cart cache.
//!
//! The cache is the middle tier of the cart: it survives reloads on this
//! device but is not shared across devices. Its failure contract is
//! deliberately soft - a load that fails yields an empty cart, a save that
//! fails is logged and forgotten - so the trait surface is infallible.

mod json_file;

pub use json_file::JsonFileCache;

use ladle_core::CartLine;

/// Durable on-device storage for the serialized cart line sequence.
pub trait CartCache: Send + Sync {
    /// Load the cached line sequence.
    ///
    /// Absent or corrupt data yields an empty sequence, never an error.
    fn load(&self) -> Vec<CartLine>;

    /// Persist the full line sequence, overwriting any previous state.
    ///
    /// Best-effort: failures are not observable to the caller.
    fn save(&self, lines: &[CartLine]);
}
