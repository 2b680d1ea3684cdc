//! Cart commands.
//!
//! Each command opens the file-backed cart, performs at most one operation,
//! prints any notifications followed by the resulting cart, and exits.
//!
//! # Environment Variables
//!
//! - `CATALOG_BASE_URL` - Catalog service base URL
//! - `CART_STORAGE_DIR` - Directory holding the snapshot file

use std::fmt::Write as _;
use std::sync::Arc;

use rocketshoes_cart::{
    Cart, CartConfig, CartOutcome, CartStore, CatalogError, FileStorage, HttpCatalog, ProductId,
    RecordingNotifier, StoreSettings, UpdateProductAmount,
};
use rocketshoes_core::format_price;

type Store = CartStore<HttpCatalog, FileStorage, Arc<RecordingNotifier>>;

/// An opened cart plus the notifications it has produced.
pub struct CartSession {
    store: Store,
    notifier: Arc<RecordingNotifier>,
}

impl CartSession {
    /// Open the cart described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog client cannot be built.
    pub fn open(config: &CartConfig) -> Result<Self, CatalogError> {
        let catalog = HttpCatalog::new(&config.catalog)?;
        let storage = FileStorage::new(&config.storage_dir);
        let notifier = Arc::new(RecordingNotifier::new());

        tracing::debug!(
            dir = %storage.dir().display(),
            catalog = %catalog.base_url(),
            "Opening cart"
        );

        let store = CartStore::open(
            catalog,
            storage,
            Arc::clone(&notifier),
            StoreSettings::from(config),
        );

        Ok(Self { store, notifier })
    }

    pub fn show(&self) {
        self.print(None);
    }

    pub async fn add(&self, product_id: ProductId) {
        let outcome = self.store.add_product(product_id).await;
        self.print(Some(&outcome));
    }

    pub fn remove(&self, product_id: ProductId) {
        let outcome = self.store.remove_product(product_id);
        self.print(Some(&outcome));
    }

    pub async fn update(&self, product_id: ProductId, amount: i64) {
        let outcome = self
            .store
            .update_product_amount(UpdateProductAmount { product_id, amount })
            .await;
        self.print(Some(&outcome));
    }

    #[allow(clippy::print_stdout)] // CLI output
    fn print(&self, outcome: Option<&CartOutcome>) {
        for message in self.notifier.take() {
            println!("! {message}");
        }
        if matches!(outcome, Some(CartOutcome::Ignored)) {
            println!("(nothing to do)");
        }
        print!("{}", render_cart(&self.store.cart()));
    }
}

/// Render the cart as a plain-text table.
#[must_use]
pub fn render_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let title_width = cart
        .iter()
        .map(|item| item.product.title.chars().count())
        .max()
        .unwrap_or(0)
        .max("Product".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<title_width$}  {:>5}  {:>12}  {:>12}",
        "ID", "Product", "Qty", "Price", "Subtotal"
    );
    for item in cart {
        let _ = writeln!(
            out,
            "{:>4}  {:<title_width$}  {:>5}  {:>12}  {:>12}",
            item.id().get(),
            item.product.title,
            item.amount,
            format_price(item.product.price),
            format_price(item.line_total()),
        );
    }
    let _ = writeln!(
        out,
        "{} product(s), {} unit(s), total {}",
        cart.len(),
        cart.total_quantity(),
        format_price(cart.subtotal())
    );
    out
}
