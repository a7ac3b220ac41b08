//! Cart line quantity type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The value is zero; a cart line never holds a zero quantity.
    #[error("quantity must be at least 1")]
    Zero,
}

/// A cart line quantity.
///
/// Always at least 1: a line that would reach zero must be removed from the
/// cart instead, so zero is unrepresentable here. Decrementing at the floor
/// is a no-op surfaced as `None`.
///
/// ## Examples
///
/// ```
/// use ladle_core::Quantity;
///
/// let qty = Quantity::new(2).unwrap();
/// assert_eq!(qty.get(), 2);
///
/// // Zero is rejected
/// assert!(Quantity::new(0).is_err());
///
/// // Decrement stops at 1
/// let one = Quantity::ONE;
/// assert_eq!(one.decrement(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// The smallest representable quantity.
    pub const ONE: Self = Self(1);

    /// Create a `Quantity` from an integer.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] if the value is 0.
    pub const fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 {
            return Err(QuantityError::Zero);
        }
        Ok(Self(value))
    }

    /// Get the underlying integer value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Increment by one, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Decrement by one, or `None` when already at the floor of 1.
    #[must_use]
    pub const fn decrement(self) -> Option<Self> {
        if self.0 > 1 { Some(Self(self.0 - 1)) } else { None }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}
