//! Persistence seam for the cart store.
//!
//! A cart is persisted as one JSON array under a single storage key
//! ([`CART_STORAGE_KEY`]). Backends only move strings; encoding and the
//! tolerant decoding of older or damaged payloads live here so every backend
//! behaves the same.

use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use super::LineItem;
use crate::ProductId;

/// Storage key the cart payload is persisted under.
pub const CART_STORAGE_KEY: &str = "wearview-cart";

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable client-local storage holding one cart payload.
///
/// Implementations are synchronous: a mutation is not complete until `save`
/// has returned.
pub trait CartStorage {
    /// Read the stored payload, or `None` if nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn save(&mut self, payload: &str) -> Result<(), StorageError>;
}

impl<S: CartStorage + ?Sized> CartStorage for &mut S {
    fn load(&self) -> Result<Option<String>, StorageError> {
        (**self).load()
    }

    fn save(&mut self, payload: &str) -> Result<(), StorageError> {
        (**self).save(payload)
    }
}

/// In-process storage.
///
/// Clones share the same slot, so dropping a store and restoring a new one
/// from a clone behaves like a page reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemorySlot>>,
}

#[derive(Debug, Default)]
struct MemorySlot {
    payload: Option<String>,
    fail_writes: bool,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with a raw payload.
    #[must_use]
    pub fn with_payload(payload: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.slot().payload = Some(payload.into());
        storage
    }

    /// The raw payload currently stored.
    #[must_use]
    pub fn payload(&self) -> Option<String> {
        self.slot().payload.clone()
    }

    /// Make subsequent writes fail, simulating a full or revoked storage area.
    pub fn set_fail_writes(&self, fail: bool) {
        self.slot().fail_writes = fail;
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, MemorySlot> {
        // The slot holds plain data; a panic mid-write cannot leave it inconsistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.payload())
    }

    fn save(&mut self, payload: &str) -> Result<(), StorageError> {
        let mut slot = self.slot();
        if slot.fail_writes {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        slot.payload = Some(payload.to_owned());
        Ok(())
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Serialize line items to the persisted layout.
///
/// # Errors
///
/// Returns an error only if a price cannot be represented as a JSON number.
pub fn encode_items(items: &[LineItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

/// A persisted entry as it may appear on disk: every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredLineItem {
    id: Option<String>,
    name: Option<String>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision_option")]
    price: Option<Decimal>,
    image: Option<String>,
    category: Option<String>,
    quantity: Option<i64>,
}

impl StoredLineItem {
    fn into_line_item(self) -> Option<LineItem> {
        let id = self.id.filter(|id| !id.is_empty())?;
        let quantity = match self.quantity {
            None => 1,
            Some(q) if q <= 0 => return None,
            Some(q) => u32::try_from(q).unwrap_or(u32::MAX),
        };

        Some(LineItem {
            id: ProductId::new(id),
            name: self.name.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            quantity,
        })
    }
}

/// Decode a persisted payload, tolerating partial damage.
///
/// The payload must be a JSON array; anything else is an error and the caller
/// discards it. Within the array:
/// - entries that are not objects, have no `id`, or have `quantity <= 0` are dropped
/// - missing text fields become empty, a missing price becomes zero and a
///   missing quantity becomes one
/// - repeated ids are merged into the first occurrence by summing quantities
///
/// # Errors
///
/// Returns an error if the payload is not a JSON array.
pub fn decode_items(payload: &str) -> Result<Vec<LineItem>, serde_json::Error> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(payload)?;

    let mut items: Vec<LineItem> = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(item) = serde_json::from_value::<StoredLineItem>(entry)
            .ok()
            .and_then(StoredLineItem::into_line_item)
        else {
            continue;
        };

        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => items.push(item),
        }
    }

    Ok(items)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_entries_preserves_order() {
        let payload = r#"[
            {"id":"2","name":"Slim Fit Jeans","price":2499,"image":"/images/jeans.jpeg","category":"Pants","quantity":1},
            {"id":"3","name":"Blessed Hoodie","price":1999.0,"image":"/images/hoodie.webp","category":"Hoodies","quantity":2}
        ]"#;

        let items = decode_items(payload).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id.as_str(), "2");
        assert_eq!(items[0].price, Decimal::new(2499, 0));
        assert_eq!(items[1].id.as_str(), "3");
        assert_eq!(items[1].quantity, 2);
    }

    #[test]
    fn test_decode_fractional_price_is_exact() {
        let items = decode_items(r#"[{"id":"1","price":29.99,"quantity":1}]"#).unwrap();
        assert_eq!(items[0].price, Decimal::new(2999, 2));
    }

    #[test]
    fn test_decode_fills_missing_fields() {
        let items = decode_items(r#"[{"id":"9"}]"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "");
        assert_eq!(items[0].price, Decimal::ZERO);
        assert_eq!(items[0].quantity, 1);
    }

    #[test]
    fn test_decode_drops_invalid_entries() {
        let payload = r#"[
            42,
            {"name":"no id"},
            {"id":"","quantity":1},
            {"id":"1","quantity":0},
            {"id":"2","quantity":-3},
            {"id":"3","quantity":4}
        ]"#;

        let items = decode_items(payload).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_str(), "3");
        assert_eq!(items[0].quantity, 4);
    }

    #[test]
    fn test_decode_merges_duplicate_ids_in_first_position() {
        let payload = r#"[
            {"id":"1","quantity":1},
            {"id":"2","quantity":1},
            {"id":"1","quantity":2}
        ]"#;

        let items = decode_items(payload).unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(items[0].quantity, 3);
    }

    #[test]
    fn test_decode_rejects_non_array_payloads() {
        assert!(decode_items("not json").is_err());
        assert!(decode_items(r#"{"id":"1"}"#).is_err());
        assert!(decode_items("").is_err());
    }

    #[test]
    fn test_encode_writes_price_as_number() {
        let items = vec![LineItem {
            id: ProductId::new("1"),
            name: "Classic White T-Shirt".to_string(),
            price: Decimal::new(1299, 0),
            image: "/images/tshirt.jpeg".to_string(),
            category: "Shirts".to_string(),
            quantity: 2,
        }];

        let json: serde_json::Value = serde_json::from_str(&encode_items(&items).unwrap()).unwrap();
        assert!(json[0]["price"].is_number());
        assert_eq!(json[0]["quantity"], 2);
        assert_eq!(json[0]["id"], "1");
    }

    #[test]
    fn test_memory_storage_clones_share_slot() {
        let storage = MemoryStorage::new();
        let mut writer = storage.clone();
        writer.save("[]").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_storage_failing_writes() {
        let mut storage = MemoryStorage::with_payload("[]");
        storage.set_fail_writes(true);
        assert!(matches!(
            storage.save("[1]"),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(storage.payload().as_deref(), Some("[]"));
    }
}
