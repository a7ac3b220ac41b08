//! Session wiring shared with the UI layer.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::JsonFileCache;
use crate::catalog::RecipeCatalog;
use crate::config::ClientConfig;
use crate::remote::{FirestoreCartItems, FirestoreClient, RemoteCollection};
use crate::sync::CartSynchronizer;

/// One user session: the owned cart synchronizer plus catalog access.
///
/// The session is the explicit, constructor-initialized owner of the cart
/// state - there is no ambient singleton. The UI layer holds the session for
/// its lifetime and drives everything through it.
pub struct Session {
    cart: CartSynchronizer,
    catalog: RecipeCatalog,
}

impl Session {
    /// Build the adapters and hydrate the cart.
    ///
    /// The remote collection is scanned once so a returning user sees the
    /// cart from their other devices; if the scan fails the session falls
    /// back to the locally cached mirror (logged, not surfaced).
    pub async fn initialize(config: ClientConfig) -> Self {
        let firestore = FirestoreClient::new(&config.remote);

        let cache = JsonFileCache::new(config.cache_path.clone());
        let remote: Arc<dyn RemoteCollection> =
            Arc::new(FirestoreCartItems::new(firestore.clone(), &config.cart_id));

        let mut cart = CartSynchronizer::new(Box::new(cache), remote);
        match cart.hydrate_from_remote().await {
            Ok(()) => debug!(lines = cart.lines().len(), "cart hydrated from remote"),
            Err(error) => {
                warn!(%error, "remote cart unavailable, using cached mirror");
            }
        }

        let catalog = RecipeCatalog::new(firestore);

        Self { cart, catalog }
    }

    /// The cart synchronizer.
    #[must_use]
    pub fn cart(&self) -> &CartSynchronizer {
        &self.cart
    }

    /// The cart synchronizer, mutable for UI event handlers.
    #[must_use]
    pub fn cart_mut(&mut self) -> &mut CartSynchronizer {
        &mut self.cart
    }

    /// The recipe catalog.
    #[must_use]
    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }
}
