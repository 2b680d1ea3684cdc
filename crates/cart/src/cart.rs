//! The cart value and its transitions.
//!
//! A [`Cart`] is never mutated in place. Each transition borrows the current
//! cart and returns the next one, or the [`Rejection`] explaining why the
//! change is not allowed. The store decides when the result becomes visible.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use rocketshoes_core::{CartItem, Product, ProductId, Stock};

use crate::catalog::CatalogError;
use crate::snapshot::SnapshotError;

/// Why a cart operation did not change the cart.
#[derive(Debug, Error)]
pub enum Rejection {
    /// The requested quantity exceeds the reported stock level.
    #[error("requested {requested} of product {product_id} but only {available} in stock")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// The operation names a product that is not in the cart.
    #[error("product {product_id} is not in the cart")]
    NotInCart { product_id: ProductId },

    /// Product or stock lookup failed.
    #[error("catalog lookup failed: {0}")]
    LookupFailed(#[from] CatalogError),

    /// The next cart could not be written to the snapshot slot.
    #[error("could not persist cart: {0}")]
    PersistFailed(#[from] SnapshotError),
}

/// Ordered cart contents, at most one line per product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from stored line items.
    ///
    /// Lines with a zero amount are dropped and for repeated product IDs the
    /// first line wins, so the result always satisfies the cart invariants.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.amount == 0 {
                warn!(product_id = %item.id(), "Dropping stored cart line with zero amount");
                continue;
            }
            if cart.contains(item.id()) {
                warn!(product_id = %item.id(), "Dropping duplicate stored cart line");
                continue;
            }
            cart.items.push(item);
        }
        cart
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line for `product_id`.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == product_id)
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Sum of all line amounts.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add one unit of `product`.
    ///
    /// A product not yet in the cart is appended with an amount of one;
    /// otherwise its amount grows by one. Either way the resulting amount must
    /// fit within `stock`.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::OutOfStock`] if the new amount exceeds `stock`.
    pub fn with_product_added(&self, product: Product, stock: &Stock) -> Result<Self, Rejection> {
        let product_id = product.id;
        let mut items = self.items.clone();

        if let Some(item) = items.iter_mut().find(|item| item.id() == product_id) {
            let next = item
                .amount
                .checked_add(1)
                .filter(|next| stock.allows(i64::from(*next)))
                .ok_or(Rejection::OutOfStock {
                    product_id,
                    requested: i64::from(item.amount) + 1,
                    available: stock.amount,
                })?;
            item.amount = next;
        } else {
            if !stock.allows(1) {
                return Err(Rejection::OutOfStock {
                    product_id,
                    requested: 1,
                    available: stock.amount,
                });
            }
            items.push(CartItem::new(product));
        }

        Ok(Self { items })
    }

    /// Set the amount of an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::NotInCart`] if there is no line for `product_id`
    /// and [`Rejection::OutOfStock`] if `amount` exceeds `stock`.
    pub fn with_amount(
        &self,
        product_id: ProductId,
        amount: u32,
        stock: &Stock,
    ) -> Result<Self, Rejection> {
        let mut items = self.items.clone();
        let item = items
            .iter_mut()
            .find(|item| item.id() == product_id)
            .ok_or(Rejection::NotInCart { product_id })?;

        if !stock.allows(i64::from(amount)) {
            return Err(Rejection::OutOfStock {
                product_id,
                requested: i64::from(amount),
                available: stock.amount,
            });
        }
        item.amount = amount;

        Ok(Self { items })
    }

    /// Drop the line for `product_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::NotInCart`] if there is no such line.
    pub fn without_product(&self, product_id: ProductId) -> Result<Self, Rejection> {
        let index = self
            .items
            .iter()
            .position(|item| item.id() == product_id)
            .ok_or(Rejection::NotInCart { product_id })?;

        let mut items = self.items.clone();
        items.remove(index);
        Ok(Self { items })
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: u32) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Tênis {id}"),
            price: Decimal::new(1000 + i64::from(id), 1),
            image: format!("https://cdn.example.com/{id}.jpg"),
        }
    }

    fn line(id: u32, amount: u32) -> CartItem {
        CartItem {
            product: product(id),
            amount,
        }
    }

    const fn stock(amount: i64) -> Stock {
        Stock { id: None, amount }
    }

    #[test]
    fn test_add_new_product_starts_at_one() {
        let cart = Cart::new().with_product_added(product(1), &stock(5)).unwrap();
        assert_eq!(cart.items(), &[line(1, 1)]);
    }

    #[test]
    fn test_add_new_product_without_stock() {
        let result = Cart::new().with_product_added(product(1), &stock(0));
        assert!(matches!(
            result,
            Err(Rejection::OutOfStock {
                requested: 1,
                available: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_add_existing_product_increments() {
        let cart = Cart::from_items([line(1, 1), line(2, 3)]);
        let next = cart.with_product_added(product(2), &stock(4)).unwrap();
        assert_eq!(next.items(), &[line(1, 1), line(2, 4)]);
        // The original value is untouched.
        assert_eq!(cart.get(ProductId::new(2)).unwrap().amount, 3);
    }

    #[test]
    fn test_add_existing_product_at_stock_limit() {
        let cart = Cart::from_items([line(1, 1)]);
        let result = cart.with_product_added(product(1), &stock(1));
        assert!(matches!(
            result,
            Err(Rejection::OutOfStock {
                requested: 2,
                available: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let cart = Cart::new()
            .with_product_added(product(3), &stock(1))
            .unwrap()
            .with_product_added(product(1), &stock(1))
            .unwrap();
        let ids: Vec<u32> = cart.iter().map(|item| item.id().get()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_with_amount_within_stock() {
        let cart = Cart::from_items([line(1, 2)]);
        let next = cart.with_amount(ProductId::new(1), 5, &stock(10)).unwrap();
        assert_eq!(next.items(), &[line(1, 5)]);
    }

    #[test]
    fn test_with_amount_equal_to_stock() {
        let cart = Cart::from_items([line(1, 2)]);
        let next = cart.with_amount(ProductId::new(1), 3, &stock(3)).unwrap();
        assert_eq!(next.get(ProductId::new(1)).unwrap().amount, 3);
    }

    #[test]
    fn test_with_amount_over_stock() {
        let cart = Cart::from_items([line(1, 2)]);
        let result = cart.with_amount(ProductId::new(1), 4, &stock(3));
        assert!(matches!(result, Err(Rejection::OutOfStock { .. })));
    }

    #[test]
    fn test_with_amount_missing_product() {
        let cart = Cart::from_items([line(2, 1)]);
        let result = cart.with_amount(ProductId::new(1), 1, &stock(3));
        assert!(matches!(result, Err(Rejection::NotInCart { .. })));
    }

    #[test]
    fn test_without_product() {
        let cart = Cart::from_items([line(1, 1), line(2, 1), line(3, 2)]);
        let next = cart.without_product(ProductId::new(2)).unwrap();
        assert_eq!(next.items(), &[line(1, 1), line(3, 2)]);
    }

    #[test]
    fn test_without_product_twice() {
        let cart = Cart::from_items([line(1, 1)]);
        let next = cart.without_product(ProductId::new(1)).unwrap();
        assert!(next.is_empty());
        assert!(matches!(
            next.without_product(ProductId::new(1)),
            Err(Rejection::NotInCart { .. })
        ));
    }

    #[test]
    fn test_from_items_enforces_invariants() {
        let cart = Cart::from_items([line(1, 2), line(2, 0), line(1, 5), line(3, 1)]);
        assert_eq!(cart.items(), &[line(1, 2), line(3, 1)]);
    }

    #[test]
    fn test_totals() {
        let cart = Cart::from_items([line(1, 2), line(2, 1)]);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_quantity(), 3);
        // 100.1 * 2 + 100.2
        assert_eq!(cart.subtotal(), Decimal::new(3004, 1));
    }
}
