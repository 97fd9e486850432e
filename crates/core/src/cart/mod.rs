//! Client-side shopping cart store.
//!
//! [`CartStore`] is the single source of truth for one client's cart. It owns
//! an ordered collection of [`LineItem`]s (at most one per product id, in
//! add-order), persists the full collection through a [`CartStorage`] backend
//! after every mutation, and derives [`CartTotals`] from the collection.
//!
//! Every mutation runs the same pipeline:
//!
//! ```text
//! mutate -> persist -> recompute totals -> notify subscribers
//! ```
//!
//! Totals are therefore never observed stale relative to the last completed
//! mutation, even when persisting fails.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use wearview_core::cart::{CartStore, MemoryStorage, ProductDescriptor};
//!
//! let mut cart = CartStore::restore(MemoryStorage::new());
//! let tee = ProductDescriptor {
//!     id: "1".into(),
//!     name: "Classic White T-Shirt".to_string(),
//!     price: Decimal::new(1299, 0),
//!     image: "/images/tshirt.jpeg".to_string(),
//!     category: "Shirts".to_string(),
//! };
//!
//! cart.add_to_cart(tee.clone())?;
//! cart.add_to_cart(tee)?;
//! assert_eq!(cart.total_items(), 2);
//! assert_eq!(cart.total_price(), Decimal::new(2598, 0));
//! # Ok::<(), wearview_core::cart::CartError>(())
//! ```

pub mod storage;

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ProductId;

pub use storage::{CART_STORAGE_KEY, CartStorage, MemoryStorage, StorageError};

/// Errors raised by cart mutations.
///
/// Only persistence can fail; operations on absent products are no-ops.
#[derive(Debug, Error)]
pub enum CartError {
    /// The updated cart could not be written to storage.
    ///
    /// The in-memory cart already reflects the mutation.
    #[error("failed to persist cart: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be encoded.
    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A product as supplied by the catalog when the shopper adds it to the cart.
///
/// The store trusts these values; it does not re-check them against any
/// catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    pub image: String,
    pub category: String,
}

/// One product in the cart with its requested quantity.
///
/// `name`, `price`, `image` and `category` are copied from the catalog at
/// add-time and never refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    pub image: String,
    pub category: String,
    /// Always at least 1.
    pub quantity: u32,
}

impl LineItem {
    fn from_descriptor(product: ProductDescriptor) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            image: product.image,
            category: product.category,
            quantity: 1,
        }
    }

    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Totals derived from the line item collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartTotals {
    /// Sum of all quantities.
    pub total_items: u64,
    /// Sum of `price * quantity` over all line items.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_price: Decimal,
}

impl CartTotals {
    /// Compute totals for a collection.
    #[must_use]
    pub fn of(items: &[LineItem]) -> Self {
        items.iter().fold(Self::default(), |acc, item| Self {
            total_items: acc.total_items + u64::from(item.quantity),
            total_price: acc.total_price.saturating_add(item.line_total()),
        })
    }
}

/// A completed mutation, as seen by subscribers.
#[derive(Debug, Clone, Copy)]
pub struct CartChange<'a> {
    pub items: &'a [LineItem],
    pub totals: CartTotals,
}

type Listener = Box<dyn FnMut(CartChange<'_>) + Send>;

/// The cart store for one client context.
pub struct CartStore<S> {
    storage: S,
    items: Vec<LineItem>,
    totals: CartTotals,
    listeners: Vec<Listener>,
}

impl<S: fmt::Debug> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("storage", &self.storage)
            .field("items", &self.items)
            .field("totals", &self.totals)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<S: CartStorage> CartStore<S> {
    /// Restore the cart from storage.
    ///
    /// Restoration is best-effort: an absent payload yields an empty cart, and
    /// an unreadable or malformed payload is discarded with a warning and an
    /// empty cart substituted.
    pub fn restore(storage: S) -> Self {
        let items = match storage.load() {
            Ok(Some(payload)) => storage::decode_items(&payload).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding malformed stored cart");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored cart, starting empty");
                Vec::new()
            }
        };

        let totals = CartTotals::of(&items);
        Self {
            storage,
            items,
            totals,
            listeners: Vec::new(),
        }
    }

    /// Add one unit of a product.
    ///
    /// Increments the quantity if the product is already in the cart,
    /// otherwise appends a new line item with quantity 1.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] if the updated cart cannot be persisted.
    pub fn add_to_cart(&mut self, product: ProductDescriptor) -> Result<(), CartError> {
        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(LineItem::from_descriptor(product)),
        }
        self.commit()
    }

    /// Remove a product. Absent products are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] if the updated cart cannot be persisted.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> Result<(), CartError> {
        self.items.retain(|item| &item.id != product_id);
        self.commit()
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// A quantity of zero or less removes the product. Absent products are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] if the updated cart cannot be persisted.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return self.remove_from_cart(product_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self.items.iter_mut().find(|item| &item.id == product_id) {
            item.quantity = quantity;
        }
        self.commit()
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] if the empty cart cannot be persisted.
    pub fn clear_cart(&mut self) -> Result<(), CartError> {
        self.items.clear();
        self.commit()
    }

    /// Register a listener called after every completed mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(CartChange<'_>) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Persist, recompute and notify.
    fn commit(&mut self) -> Result<(), CartError> {
        let persisted = storage::encode_items(&self.items)
            .map_err(CartError::from)
            .and_then(|payload| self.storage.save(&payload).map_err(CartError::from));

        self.totals = CartTotals::of(&self.items);

        let change = CartChange {
            items: &self.items,
            totals: self.totals,
        };
        for listener in &mut self.listeners {
            listener(change);
        }

        persisted
    }
}

impl<S> CartStore<S> {
    /// Line items in add-order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up the line item for a product.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == product_id)
    }

    /// Current derived totals.
    #[must_use]
    pub const fn totals(&self) -> CartTotals {
        self.totals
    }

    /// Sum of all quantities.
    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.totals.total_items
    }

    /// Sum of `price * quantity`.
    #[must_use]
    pub const fn total_price(&self) -> Decimal {
        self.totals.total_price
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }
}
