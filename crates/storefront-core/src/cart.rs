//! # Cart
//!
//! The checkout cart. The SPA keeps its own cart in local state and submits
//! `[{productId, quantity}]` at checkout; this type applies the same rules on
//! the server before any stock is touched.
//!
//! ## Cart Rules
//! ```text
//! add_item("p-1", 2)  ─┐
//! add_item("p-1", 1)  ─┴─► one line, quantity 3   (merge by product id)
//!
//! update_quantity("p-1", 0) ─► quantity 1          (clamped, never removes)
//! remove_item("p-1")        ─► line gone
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::validate_quantity;
use crate::MAX_CART_ITEMS;

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Ordered list of cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a checkout cart from submitted lines.
    ///
    /// Every quantity is validated, duplicate product ids are merged, and the
    /// result must hold between one and [`MAX_CART_ITEMS`] products.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> CoreResult<Self> {
        let mut cart = Cart::new();
        for line in lines {
            validate_quantity(line.quantity)?;
            cart.add_item(line.product_id, line.quantity)?;
        }

        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        // Merging may push a line over the per-item limit.
        for line in &cart.lines {
            validate_quantity(line.quantity)?;
        }

        Ok(cart)
    }

    /// Adds `quantity` of a product, merging with an existing line.
    pub fn add_item(&mut self, product_id: impl Into<String>, quantity: i64) -> CoreResult<()> {
        let product_id = product_id.into();
        if product_id.trim().is_empty() {
            return Err(crate::error::ValidationError::required("productId").into());
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity += quantity;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(CartLine {
            product_id,
            quantity,
        });
        Ok(())
    }

    /// Sets a line's quantity, never below one. Returns false if the product
    /// is not in the cart.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> bool {
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity.max(1);
                true
            }
            None => false,
        }
    }

    /// Removes a product. Returns false if it was not in the cart.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of distinct products.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn quantity_of(&self, product_id: &str) -> Option<i64> {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map(|l| l.quantity)
    }
}

/// Total of `(unit price, quantity)` pairs.
///
/// Fails with `AmountOverflow` rather than wrapping.
pub fn order_total<I>(priced_lines: I) -> CoreResult<Money>
where
    I: IntoIterator<Item = (Money, i64)>,
{
    priced_lines
        .into_iter()
        .try_fold(Money::zero(), |total, (price, qty)| {
            total.checked_add(price.multiply_quantity(qty)?)
        })
}
