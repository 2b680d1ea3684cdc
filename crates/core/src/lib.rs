//! RocketShoes Core - Shared types library.
//!
//! This crate provides the types shared by the RocketShoes components:
//! - `cart` - Cart store, catalog client and snapshot persistence
//! - `cli` - Command-line driver for a file-backed cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, catalog records, cart line items and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
