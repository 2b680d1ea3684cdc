//! Versioned cart snapshot format.
//!
//! # Formats
//!
//! - **v1** (written): `{"version":1,"saved_at":"2026-10-19T12:00:00Z","items":[...]}`
//! - **legacy** (read only): a bare JSON array of line items, as stored by the
//!   first storefront release
//!
//! Line items are always the flat `{id,title,price,image,amount}` records.
//! A legacy snapshot is upgraded to v1 by the next successful mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use rocketshoes_core::CartItem;

use crate::cart::Cart;
use crate::storage::{SnapshotStorage, StorageError};

/// Version written by [`encode`].
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors reading or writing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The stored text is not a snapshot.
    #[error("malformed snapshot: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The stored JSON has neither the legacy nor the versioned shape.
    #[error("unrecognized snapshot shape (expected an array or an object)")]
    UnrecognizedShape,

    /// The snapshot was written by a newer release.
    #[error("unsupported snapshot version {0} (newest known is {SNAPSHOT_VERSION})")]
    UnsupportedVersion(u64),

    /// The cart could not be serialized.
    #[error("could not encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Layout a snapshot was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Legacy,
    V1,
}

/// A decoded snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub format: SnapshotFormat,
    /// When the snapshot was written. Legacy snapshots carry no timestamp.
    pub saved_at: Option<DateTime<Utc>>,
    pub cart: Cart,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    items: &'a [CartItem],
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    items: Vec<CartItem>,
}

/// Serialize `cart` as a v1 snapshot.
///
/// # Errors
///
/// Returns [`SnapshotError::Encode`] if serialization fails.
pub fn encode(cart: &Cart, saved_at: DateTime<Utc>) -> Result<String, SnapshotError> {
    serde_json::to_string(&EnvelopeRef {
        version: SNAPSHOT_VERSION,
        saved_at,
        items: cart.items(),
    })
    .map_err(SnapshotError::Encode)
}

/// Parse snapshot text in either supported layout.
///
/// # Errors
///
/// Returns an error if the text is not JSON, has an unknown shape, or was
/// written by a newer version.
pub fn decode(raw: &str) -> Result<Snapshot, SnapshotError> {
    let value: Value = serde_json::from_str(raw).map_err(SnapshotError::Malformed)?;

    match value {
        Value::Array(_) => {
            let items: Vec<CartItem> =
                serde_json::from_value(value).map_err(SnapshotError::Malformed)?;
            Ok(Snapshot {
                format: SnapshotFormat::Legacy,
                saved_at: None,
                cart: Cart::from_items(items),
            })
        }
        Value::Object(_) => {
            let version = value
                .get("version")
                .and_then(Value::as_u64)
                .ok_or(SnapshotError::UnrecognizedShape)?;
            if version != u64::from(SNAPSHOT_VERSION) {
                return Err(SnapshotError::UnsupportedVersion(version));
            }
            let envelope: Envelope =
                serde_json::from_value(value).map_err(SnapshotError::Malformed)?;
            Ok(Snapshot {
                format: SnapshotFormat::V1,
                saved_at: envelope.saved_at,
                cart: Cart::from_items(envelope.items),
            })
        }
        _ => Err(SnapshotError::UnrecognizedShape),
    }
}

/// Read and decode the snapshot stored under `key`.
///
/// Returns `Ok(None)` if the slot is empty.
///
/// # Errors
///
/// Returns an error if the slot cannot be read or decoded.
pub fn read(storage: &impl SnapshotStorage, key: &str) -> Result<Option<Snapshot>, SnapshotError> {
    storage.load(key)?.map(|raw| decode(&raw)).transpose()
}

/// Read the cart stored under `key`, falling back to an empty cart.
///
/// An unreadable snapshot is logged and left in place; it is only replaced
/// by the next successful mutation.
pub fn read_or_empty(storage: &impl SnapshotStorage, key: &str) -> Cart {
    match read(storage, key) {
        Ok(Some(snapshot)) => {
            debug!(
                key,
                format = ?snapshot.format,
                items = snapshot.cart.len(),
                "Loaded cart snapshot"
            );
            snapshot.cart
        }
        Ok(None) => {
            debug!(key, "No cart snapshot, starting empty");
            Cart::new()
        }
        Err(e) => {
            warn!(key, error = %e, "Ignoring unreadable cart snapshot, starting empty");
            Cart::new()
        }
    }
}

/// Encode `cart` and store it under `key`.
///
/// # Errors
///
/// Returns an error if encoding or the storage write fails.
pub fn write(storage: &impl SnapshotStorage, key: &str, cart: &Cart) -> Result<(), SnapshotError> {
    let raw = encode(cart, Utc::now())?;
    storage.save(key, &raw)?;
    Ok(())
}
