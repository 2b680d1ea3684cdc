//! Catalog records and cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// A product as returned by the catalog service.
///
/// Everything except `id` is display data; the cart never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Unit price, a JSON number on the wire.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Image URL.
    pub image: String,
}

/// A product in the cart together with the quantity selected.
///
/// Serialized flat, i.e. `{"id":1,"title":"...","price":179.9,"image":"...","amount":2}`,
/// which is the shape the storefront has always stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    /// Quantity in cart. Always at least 1 while the item is present.
    pub amount: u32,
}

impl CartItem {
    /// Create a line item for `product` with a quantity of one.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self { product, amount: 1 }
    }

    /// The product identifier of this line.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.amount)
    }
}

/// Stock level for a product as reported by the catalog service.
///
/// `amount` is signed because the service is not trusted to never report a
/// negative level; anything below one means nothing can be purchased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub amount: i64,
}

impl Stock {
    /// Whether `quantity` units may be held in a cart.
    #[must_use]
    pub fn allows(&self, quantity: i64) -> bool {
        quantity <= self.amount
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sneaker() -> Product {
        Product {
            id: ProductId::new(1),
            title: "Tênis de Caminhada Leve Confortável".to_string(),
            price: Decimal::new(1799, 1),
            image: "https://cdn.example.com/tenis1.jpg".to_string(),
        }
    }

    #[test]
    fn test_product_from_catalog_json() {
        let product: Product = serde_json::from_value(json!({
            "id": 1,
            "title": "Tênis de Caminhada Leve Confortável",
            "price": 179.9,
            "image": "https://cdn.example.com/tenis1.jpg"
        }))
        .unwrap();
        assert_eq!(product, sneaker());
    }

    #[test]
    fn test_cart_item_serializes_flat() {
        let item = CartItem {
            product: sneaker(),
            amount: 2,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["id"], json!(1));
        assert_eq!(value["amount"], json!(2));
        assert_eq!(value["price"], json!(179.9));
        assert!(value.get("product").is_none());
    }

    #[test]
    fn test_cart_item_line_total() {
        let item = CartItem {
            product: sneaker(),
            amount: 3,
        };
        assert_eq!(item.line_total(), Decimal::new(5397, 1));
    }

    #[test]
    fn test_stock_without_id() {
        let stock: Stock = serde_json::from_value(json!({ "amount": 3 })).unwrap();
        assert_eq!(stock.id, None);
        assert!(stock.allows(3));
        assert!(!stock.allows(4));
    }

    #[test]
    fn test_negative_stock_allows_nothing() {
        let stock = Stock {
            id: Some(ProductId::new(2)),
            amount: -1,
        };
        assert!(!stock.allows(1));
    }
}
