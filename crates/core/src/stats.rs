//! Usage-statistics series derived from cart and catalog data.
//!
//! The chart widgets only need parallel label/value sequences; rendering is
//! the UI layer's concern. Both derivations preserve source order.

use crate::cart::CartState;
use crate::recipe::Recipe;

/// Parallel labels and values for a single chart series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartSeries {
    labels: Vec<String>,
    values: Vec<u64>,
}

impl ChartSeries {
    /// Cart quantity per line, labeled by line title.
    ///
    /// Feeds the "quantity of items by name" pie widget.
    #[must_use]
    pub fn quantity_by_title(cart: &CartState) -> Self {
        let mut series = Self::default();
        for line in cart.lines() {
            series.labels.push(line.title.clone());
            series.values.push(u64::from(line.quantity.get()));
        }
        series
    }

    /// Preparation minutes per recipe, labeled by recipe title.
    ///
    /// Feeds the "preparation time by name" bar widget.
    #[must_use]
    pub fn cooking_time_by_title(recipes: &[Recipe]) -> Self {
        let mut series = Self::default();
        for recipe in recipes {
            series.labels.push(recipe.title.clone());
            series.values.push(u64::from(recipe.cooking_time));
        }
        series
    }

    /// Series labels, parallel to [`ChartSeries::values`].
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Series values, parallel to [`ChartSeries::labels`].
    #[must_use]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Whether the series holds no data points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
