//! RocketShoes cart library.
//!
//! Holds the shopper's cart, bounds every quantity by the catalog's stock
//! level and mirrors each successful change into a snapshot slot so the cart
//! survives restarts.
//!
//! # Modules
//!
//! - [`store`] - [`CartStore`], the add / remove / update-quantity entry points
//! - [`cart`] - [`Cart`] value and its pure transitions
//! - [`catalog`] - product and stock lookups ([`HttpCatalog`])
//! - [`notify`] - user-facing notification sinks
//! - [`messages`] - localized notification texts
//! - [`storage`] - snapshot slot backends (memory, files)
//! - [`snapshot`] - versioned snapshot encoding
//! - [`config`] - environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod messages;
pub mod notify;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use cart::{Cart, Rejection};
pub use catalog::{Catalog, CatalogError, HttpCatalog};
pub use config::{CartConfig, CatalogConfig, ConfigError};
pub use messages::{Locale, Messages};
pub use notify::{NotificationSink, RecordingNotifier, TracingNotifier};
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage, StorageError};
pub use store::{CartOutcome, CartStore, StoreSettings, UpdateProductAmount};

pub use rocketshoes_core::{CartItem, Product, ProductId, Stock};
