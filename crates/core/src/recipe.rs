//! Recipe catalog entries.

use serde::{Deserialize, Serialize};

use crate::types::RecipeId;

/// A recipe in the shared catalog.
///
/// Field names follow the remote document layout (camelCase), which is also
/// what the UI layer consumes directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Document key in the recipes collection.
    pub id: RecipeId,
    /// Display name.
    pub title: String,
    /// Preparation time in minutes.
    pub cooking_time: u32,
    /// Ingredient list, free-form.
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Image references.
    #[serde(default)]
    pub images: Vec<String>,
    /// Preparation instructions.
    #[serde(default)]
    pub method: String,
}

impl Recipe {
    /// The first image reference, used as the card/cart thumbnail.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}
