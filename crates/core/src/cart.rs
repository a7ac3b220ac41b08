//! Cart state and reconciliation transitions.
//!
//! [`CartState`] is the in-memory source of truth for what the user sees.
//! Every mutation is a synchronous state transition that returns the remote
//! side effect (if any) as a [`RemoteEffect`] value instead of performing I/O
//! itself. The client layer persists the state to the local cache and hands
//! the effect to an effect runner; this module stays pure.
//!
//! # Invariants
//!
//! - A line's quantity is always >= 1 (enforced by [`Quantity`]); a line that
//!   would reach zero is never retained - only `remove` deletes lines.
//! - At most one line exists per recipe id.
//! - Line order is insertion order (display stability, not correctness).

use serde::{Deserialize, Serialize};

use crate::types::{Quantity, RecipeId};

/// A product reference handed to [`CartState::add`] by the UI layer.
///
/// Carries the display fields copied onto a new cart line. The quantity is
/// not part of the reference; adding always contributes exactly one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Unique recipe identifier.
    pub id: RecipeId,
    /// Display name.
    pub title: String,
    /// Display image reference.
    #[serde(rename = "photoURL")]
    pub photo_url: String,
}

/// One product entry in the cart with an integer quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Unique recipe identifier; doubles as the remote record key.
    pub id: RecipeId,
    /// Display name.
    pub title: String,
    /// Units of this product in the cart, always >= 1.
    pub quantity: Quantity,
    /// Display image reference.
    #[serde(rename = "photoURL")]
    pub photo_url: String,
}

impl CartLine {
    /// Create a fresh line for a product with quantity 1.
    #[must_use]
    pub fn from_product(product: &ProductRef) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            quantity: Quantity::ONE,
            photo_url: product.photo_url.clone(),
        }
    }
}

/// A pending remote side effect produced by a cart transition.
///
/// Effects describe the remote write that mirrors a local mutation. They are
/// executed fire-and-forget by the client layer: failures are logged, never
/// retried, and never fed back into [`CartState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEffect {
    /// Upsert the full record keyed by the line's id.
    Upsert(CartLine),
    /// Atomically adjust the record's quantity counter by `delta`.
    AdjustQuantity {
        /// Key of the record to adjust.
        id: RecipeId,
        /// Signed adjustment; the transitions only ever emit +1 or -1.
        delta: i64,
    },
    /// Delete the record keyed by `id`.
    Delete(RecipeId),
}

/// An ordered sequence of cart lines, keyed by recipe id.
///
/// Owned exclusively by the synchronizer; the UI never mutates it directly,
/// only through the transition methods here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartState {
    lines: Vec<CartLine>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Create a cart from an existing line sequence (cache or remote load).
    #[must_use]
    pub const fn from_lines(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// Add one unit of a product.
    ///
    /// If a line with the product's id exists its quantity is incremented;
    /// otherwise a new line with quantity 1 is appended. Always produces a
    /// remote effect: an atomic increment for an existing line, an upsert of
    /// the new record otherwise.
    pub fn add(&mut self, product: &ProductRef) -> RemoteEffect {
        if let Some(line) = self.line_mut(&product.id) {
            line.quantity = line.quantity.saturating_increment();
            return RemoteEffect::AdjustQuantity {
                id: product.id.clone(),
                delta: 1,
            };
        }

        let line = CartLine::from_product(product);
        self.lines.push(line.clone());
        RemoteEffect::Upsert(line)
    }

    /// Increment the quantity of the line with `id` by one.
    ///
    /// No-op (not an error) when the id is absent; no effect is produced.
    pub fn increment(&mut self, id: &RecipeId) -> Option<RemoteEffect> {
        let line = self.line_mut(id)?;
        line.quantity = line.quantity.saturating_increment();
        Some(RemoteEffect::AdjustQuantity {
            id: id.clone(),
            delta: 1,
        })
    }

    /// Decrement the quantity of the line with `id` by one.
    ///
    /// No-op when the id is absent or the quantity is already 1: decrementing
    /// a quantity-1 line does not remove it - removal requires an explicit
    /// [`CartState::remove`]. The effect is produced only when the local
    /// decrement actually occurred.
    pub fn decrement(&mut self, id: &RecipeId) -> Option<RemoteEffect> {
        let line = self.line_mut(id)?;
        let decremented = line.quantity.decrement()?;
        line.quantity = decremented;
        Some(RemoteEffect::AdjustQuantity {
            id: id.clone(),
            delta: -1,
        })
    }

    /// Delete the line with `id` if present; no-op otherwise.
    pub fn remove(&mut self, id: &RecipeId) -> Option<RemoteEffect> {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != *id);
        if self.lines.len() == before {
            return None;
        }
        Some(RemoteEffect::Delete(id.clone()))
    }

    /// Replace the entire state with a supplied sequence.
    ///
    /// Used when loading from the remote collection at session start. No
    /// merge, no validation beyond structural shape, no remote effect.
    pub fn hydrate(&mut self, lines: Vec<CartLine>) {
        self.lines = lines;
    }

    /// The cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up a line by recipe id.
    #[must_use]
    pub fn get(&self, id: &RecipeId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == *id)
    }

    /// Sum of all line quantities; derived, never stored.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines (not units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    fn line_mut(&mut self, id: &RecipeId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.id == *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, title: &str) -> ProductRef {
        ProductRef {
            id: RecipeId::new(id),
            title: title.to_owned(),
            photo_url: format!("https://img.example/{id}.jpg"),
        }
    }

    fn quantity_of(cart: &CartState, id: &str) -> Option<u32> {
        cart.get(&RecipeId::new(id)).map(|line| line.quantity.get())
    }

    #[test]
    fn test_add_new_product_appends_line_with_quantity_one() {
        let mut cart = CartState::new();
        let effect = cart.add(&product("r1", "Soup"));

        assert_eq!(cart.len(), 1);
        assert_eq!(quantity_of(&cart, "r1"), Some(1));
        match effect {
            RemoteEffect::Upsert(line) => {
                assert_eq!(line.id, RecipeId::new("r1"));
                assert_eq!(line.quantity, Quantity::ONE);
            }
            other => panic!("expected upsert effect, got {other:?}"),
        }
    }

    #[test]
    fn test_add_existing_product_increments_instead_of_duplicating() {
        let mut cart = CartState::new();
        cart.add(&product("r1", "Soup"));
        let effect = cart.add(&product("r1", "Soup"));

        assert_eq!(cart.len(), 1, "cart must never hold two lines per id");
        assert_eq!(quantity_of(&cart, "r1"), Some(2));
        assert_eq!(
            effect,
            RemoteEffect::AdjustQuantity {
                id: RecipeId::new("r1"),
                delta: 1,
            }
        );
    }

    #[test]
    fn test_increment_absent_id_is_silent_noop() {
        let mut cart = CartState::new();
        cart.add(&product("r1", "Soup"));
        let before = cart.clone();

        let effect = cart.increment(&RecipeId::new("missing"));

        assert_eq!(effect, None);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_decrement_absent_id_is_silent_noop() {
        let mut cart = CartState::new();
        cart.add(&product("r1", "Soup"));
        let before = cart.clone();

        let effect = cart.decrement(&RecipeId::new("missing"));

        assert_eq!(effect, None);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_decrement_at_quantity_one_keeps_line() {
        let mut cart = CartState::new();
        cart.add(&product("r1", "Soup"));

        let effect = cart.decrement(&RecipeId::new("r1"));

        assert_eq!(effect, None, "no remote effect when nothing changed");
        assert_eq!(quantity_of(&cart, "r1"), Some(1));
    }

    #[test]
    fn test_decrement_emits_negative_adjustment_only_when_applied() {
        let mut cart = CartState::new();
        cart.add(&product("r1", "Soup"));
        cart.add(&product("r1", "Soup"));

        let effect = cart.decrement(&RecipeId::new("r1"));

        assert_eq!(quantity_of(&cart, "r1"), Some(1));
        assert_eq!(
            effect,
            Some(RemoteEffect::AdjustQuantity {
                id: RecipeId::new("r1"),
                delta: -1,
            })
        );
    }

    #[test]
    fn test_remove_deletes_line_and_emits_delete() {
        let mut cart = CartState::new();
        cart.add(&product("r1", "Soup"));

        let effect = cart.remove(&RecipeId::new("r1"));

        assert!(cart.is_empty());
        assert_eq!(effect, Some(RemoteEffect::Delete(RecipeId::new("r1"))));
    }

    #[test]
    fn test_remove_absent_id_is_silent_noop() {
        let mut cart = CartState::new();
        cart.add(&product("r1", "Soup"));
        let before = cart.clone();

        assert_eq!(cart.remove(&RecipeId::new("missing")), None);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_hydrate_replaces_without_merge() {
        let mut cart = CartState::new();
        cart.add(&product("stale", "Old"));

        let replacement = vec![
            CartLine {
                id: RecipeId::new("a"),
                title: "A".to_owned(),
                quantity: Quantity::new(3).unwrap(),
                photo_url: String::new(),
            },
            CartLine {
                id: RecipeId::new("b"),
                title: "B".to_owned(),
                quantity: Quantity::ONE,
                photo_url: String::new(),
            },
        ];
        cart.hydrate(replacement.clone());

        assert_eq!(cart.lines(), replacement.as_slice());
        assert_eq!(cart.get(&RecipeId::new("stale")), None);
    }

    #[test]
    fn test_full_lifecycle_scenario() {
        // add r1 -> [r1 x1]; add r1 -> x2; decrement -> x1; decrement -> x1;
        // remove -> [].
        let mut cart = CartState::new();
        let soup = product("r1", "Soup");

        cart.add(&soup);
        assert_eq!(quantity_of(&cart, "r1"), Some(1));

        cart.add(&soup);
        assert_eq!(quantity_of(&cart, "r1"), Some(2));

        cart.decrement(&RecipeId::new("r1"));
        assert_eq!(quantity_of(&cart, "r1"), Some(1));

        cart.decrement(&RecipeId::new("r1"));
        assert_eq!(quantity_of(&cart, "r1"), Some(1));

        cart.remove(&RecipeId::new("r1"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_quantity_is_derived_sum() {
        let mut cart = CartState::new();
        cart.add(&product("a", "A"));
        cart.add(&product("b", "B"));
        assert_eq!(cart.total_quantity(), 2);

        cart.remove(&RecipeId::new("a"));
        assert_eq!(cart.total_quantity(), 1);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(
            cart.lines().first().map(|line| line.id.as_str()),
            Some("b")
        );
    }

    #[test]
    fn test_insertion_order_is_stable_across_mutations() {
        let mut cart = CartState::new();
        cart.add(&product("a", "A"));
        cart.add(&product("b", "B"));
        cart.add(&product("c", "C"));
        cart.increment(&RecipeId::new("a"));
        cart.remove(&RecipeId::new("b"));

        let order: Vec<&str> = cart.lines().iter().map(|line| line.id.as_str()).collect();
        assert_eq!(order, ["a", "c"]);
    }

    #[test]
    fn test_quantity_never_below_one_across_random_walk() {
        let mut cart = CartState::new();
        let ops: &[&dyn Fn(&mut CartState)] = &[
            &|c| {
                c.add(&product("x", "X"));
            },
            &|c| {
                c.increment(&RecipeId::new("x"));
            },
            &|c| {
                c.decrement(&RecipeId::new("x"));
            },
            &|c| {
                c.decrement(&RecipeId::new("x"));
            },
            &|c| {
                c.remove(&RecipeId::new("x"));
            },
            &|c| {
                c.add(&product("x", "X"));
            },
            &|c| {
                c.decrement(&RecipeId::new("x"));
            },
        ];

        for op in ops {
            op(&mut cart);
            for line in cart.lines() {
                assert!(line.quantity.get() >= 1);
            }
        }
    }

    #[test]
    fn test_cart_line_serde_wire_shape() {
        let line = CartLine {
            id: RecipeId::new("r1"),
            title: "Soup".to_owned(),
            quantity: Quantity::new(2).unwrap(),
            photo_url: "https://img.example/r1.jpg".to_owned(),
        };

        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "r1",
                "title": "Soup",
                "quantity": 2,
                "photoURL": "https://img.example/r1.jpg",
            })
        );

        let parsed: CartLine = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, line);
    }
}
