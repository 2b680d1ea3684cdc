//! The cart store.
//!
//! [`CartStore`] owns the current [`Cart`] and the collaborators needed to
//! change it: a [`Catalog`] for product and stock lookups, a
//! [`SnapshotStorage`] slot mirroring every successful change, and a
//! [`NotificationSink`] that hears about every rejected one.
//!
//! Operations never return errors. A rejected request is reported to the
//! sink, leaves the cart and the snapshot untouched, and comes back as
//! [`CartOutcome::Rejected`] for callers that care.
//!
//! # Consistency
//!
//! Remote lookups run first, without any lock held. The transition is then
//! applied to the cart as it is *at commit time*, the snapshot is written,
//! and only after the write succeeds is the new cart published. Memory and
//! storage therefore advance together or not at all, and concurrent
//! operations on one store never lose each other's changes.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, instrument, warn};

use rocketshoes_core::ProductId;

use crate::cart::{Cart, Rejection};
use crate::catalog::Catalog;
use crate::config::{CartConfig, DEFAULT_STORAGE_KEY};
use crate::messages::{Locale, Messages};
use crate::notify::NotificationSink;
use crate::snapshot;
use crate::storage::SnapshotStorage;

/// Result of a cart operation.
#[derive(Debug)]
pub enum CartOutcome {
    /// The cart changed and the snapshot was written.
    Applied,
    /// The request was invalid input and was dropped without notification.
    Ignored,
    /// The request was refused; the shopper has been notified.
    Rejected(Rejection),
}

impl CartOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    #[must_use]
    pub const fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            Self::Applied | Self::Ignored => None,
        }
    }
}

/// Request to set a product's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// Requested quantity. Requests outside `1..=u32::MAX` are ignored.
    pub amount: i64,
}

/// Store settings that are not collaborators.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Key of the snapshot slot
    pub storage_key: String,
    /// Language for shopper notifications
    pub locale: Locale,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            locale: Locale::default(),
        }
    }
}

impl From<&CartConfig> for StoreSettings {
    fn from(config: &CartConfig) -> Self {
        Self {
            storage_key: config.storage_key.clone(),
            locale: config.locale,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Add,
    Remove,
    Update,
}

impl Operation {
    const fn failure_message(self, messages: &Messages) -> &'static str {
        match self {
            Self::Add => messages.add_failed(),
            Self::Remove => messages.remove_failed(),
            Self::Update => messages.update_failed(),
        }
    }
}

/// Stock-bounded cart with snapshot persistence.
pub struct CartStore<C, S, N> {
    catalog: C,
    storage: S,
    notifier: N,
    messages: Messages,
    storage_key: String,
    state: Mutex<Arc<Cart>>,
}

impl<C, S, N> CartStore<C, S, N>
where
    C: Catalog,
    S: SnapshotStorage,
    N: NotificationSink,
{
    /// Open the store, restoring the cart from the snapshot slot.
    ///
    /// A missing or unreadable snapshot yields an empty cart.
    pub fn open(catalog: C, storage: S, notifier: N, settings: StoreSettings) -> Self {
        let cart = snapshot::read_or_empty(&storage, &settings.storage_key);
        info!(
            key = %settings.storage_key,
            items = cart.len(),
            "Cart store opened"
        );

        Self {
            catalog,
            storage,
            notifier,
            messages: Messages::new(settings.locale),
            storage_key: settings.storage_key,
            state: Mutex::new(Arc::new(cart)),
        }
    }

    /// The current cart.
    #[must_use]
    pub fn cart(&self) -> Arc<Cart> {
        Arc::clone(&self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Add one unit of a product.
    ///
    /// Looks up the product and its stock concurrently. A new product enters
    /// the cart with an amount of one if at least one unit is in stock; an
    /// existing line grows by one if stock exceeds its current amount.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> CartOutcome {
        let lookups = tokio::try_join!(
            self.catalog.product(product_id),
            self.catalog.stock(product_id)
        );

        let (product, stock) = match lookups {
            Ok(found) => found,
            Err(e) => return self.reject(Operation::Add, Rejection::LookupFailed(e)),
        };

        self.commit(Operation::Add, |cart| {
            cart.with_product_added(product, &stock)
        })
    }

    /// Remove a product's line from the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_product(&self, product_id: ProductId) -> CartOutcome {
        self.commit(Operation::Remove, |cart| cart.without_product(product_id))
    }

    /// Set a product's quantity, bounded by its current stock.
    ///
    /// Requests outside `1..=u32::MAX` units are ignored as invalid input.
    /// The stock lookup only happens for products already in the cart.
    #[instrument(skip(self), fields(product_id = %request.product_id, amount = request.amount))]
    pub async fn update_product_amount(&self, request: UpdateProductAmount) -> CartOutcome {
        let UpdateProductAmount { product_id, amount } = request;

        let Some(amount) = u32::try_from(amount).ok().filter(|&n| n > 0) else {
            debug!("Ignoring amount outside the representable range");
            return CartOutcome::Ignored;
        };

        if !self.cart().contains(product_id) {
            return self.reject(Operation::Update, Rejection::NotInCart { product_id });
        }

        let stock = match self.catalog.stock(product_id).await {
            Ok(stock) => stock,
            Err(e) => return self.reject(Operation::Update, Rejection::LookupFailed(e)),
        };

        self.commit(Operation::Update, |cart| {
            cart.with_amount(product_id, amount, &stock)
        })
    }

    /// Apply `transition` to the current cart, persist, then publish.
    fn commit(
        &self,
        operation: Operation,
        transition: impl FnOnce(&Cart) -> Result<Cart, Rejection>,
    ) -> CartOutcome {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let next = match transition(&state) {
            Ok(next) => next,
            Err(rejection) => {
                drop(state);
                return self.reject(operation, rejection);
            }
        };

        if let Err(e) = snapshot::write(&self.storage, &self.storage_key, &next) {
            drop(state);
            tracing::error!(error = %e, "Failed to persist cart snapshot");
            return self.reject(operation, Rejection::PersistFailed(e));
        }

        info!(
            operation = ?operation,
            items = next.len(),
            quantity = next.total_quantity(),
            "Cart updated"
        );
        *state = Arc::new(next);

        CartOutcome::Applied
    }

    fn reject(&self, operation: Operation, rejection: Rejection) -> CartOutcome {
        let message = match rejection {
            Rejection::OutOfStock { .. } => self.messages.out_of_stock(),
            Rejection::NotInCart { .. }
            | Rejection::LookupFailed(_)
            | Rejection::PersistFailed(_) => operation.failure_message(&self.messages),
        };

        warn!(operation = ?operation, reason = %rejection, "Cart operation rejected");
        self.notifier.error(message);

        CartOutcome::Rejected(rejection)
    }
}
