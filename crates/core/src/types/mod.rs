//! Core types for RocketShoes.
//!
//! This module provides type-safe wrappers for catalog and cart concepts.

pub mod id;
pub mod price;
pub mod product;

pub use id::*;
pub use price::format_price;
pub use product::{CartItem, Product, Stock};
