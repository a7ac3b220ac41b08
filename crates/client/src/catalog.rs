//! Read-side access to the shared recipe catalog.
//!
//! Recipes live in the remote `recipes` collection and change rarely, so
//! reads are cached with `moka` (5-minute TTL). Unlike the cart mirror,
//! catalog failures are real errors returned to the caller - there is no
//! local fallback tier for the catalog.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, warn};

use ladle_core::{Recipe, RecipeId};

use crate::remote::documents::recipe_from_document;
use crate::remote::{FirestoreClient, RemoteError};

const RECIPES_COLLECTION: &str = "recipes";
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Recipe(RecipeId),
    RecipeList,
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Recipe(Box<Recipe>),
    RecipeList(Vec<Recipe>),
}

/// Client for the shared recipe catalog.
///
/// Cheaply cloneable; clones share the HTTP pool and the response cache.
#[derive(Clone)]
pub struct RecipeCatalog {
    inner: Arc<RecipeCatalogInner>,
}

struct RecipeCatalogInner {
    client: FirestoreClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl RecipeCatalog {
    /// Create a catalog client over a document-store client.
    #[must_use]
    pub fn new(client: FirestoreClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(RecipeCatalogInner { client, cache }),
        }
    }

    /// List every recipe in the catalog.
    ///
    /// Malformed documents are skipped so one bad record does not hide the
    /// rest of the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the collection scan fails.
    pub async fn list_recipes(&self) -> Result<Vec<Recipe>, RemoteError> {
        if let Some(CacheValue::RecipeList(recipes)) =
            self.inner.cache.get(&CacheKey::RecipeList).await
        {
            debug!(count = recipes.len(), "recipe list served from cache");
            return Ok(recipes);
        }

        let documents = self.inner.client.list_documents(RECIPES_COLLECTION).await?;

        let mut recipes = Vec::with_capacity(documents.len());
        for document in &documents {
            match recipe_from_document(document) {
                Ok(recipe) => recipes.push(recipe),
                Err(e) => {
                    warn!(name = ?document.name, error = %e, "skipping malformed recipe document");
                }
            }
        }

        self.inner
            .cache
            .insert(CacheKey::RecipeList, CacheValue::RecipeList(recipes.clone()))
            .await;
        Ok(recipes)
    }

    /// Fetch a single recipe, or `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the read fails or the document is
    /// malformed (a point read of a broken record is an error, not a skip).
    pub async fn get_recipe(&self, id: &RecipeId) -> Result<Option<Recipe>, RemoteError> {
        let key = CacheKey::Recipe(id.clone());
        if let Some(CacheValue::Recipe(recipe)) = self.inner.cache.get(&key).await {
            return Ok(Some(*recipe));
        }

        let path = format!("{RECIPES_COLLECTION}/{id}");
        let Some(document) = self.inner.client.get_document(&path).await? else {
            return Ok(None);
        };

        let recipe = recipe_from_document(&document)?;
        self.inner
            .cache
            .insert(key, CacheValue::Recipe(Box::new(recipe.clone())))
            .await;
        Ok(Some(recipe))
    }

    /// Delete a recipe from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the delete fails; the caches are only
    /// invalidated on success.
    pub async fn delete_recipe(&self, id: &RecipeId) -> Result<(), RemoteError> {
        let path = format!("{RECIPES_COLLECTION}/{id}");
        self.inner.client.delete_document(&path).await?;

        self.inner.cache.invalidate(&CacheKey::Recipe(id.clone())).await;
        self.inner.cache.invalidate(&CacheKey::RecipeList).await;
        Ok(())
    }
}
