//! Application state shared across handlers.

use std::sync::Arc;

use wearview_core::ClientId;
use wearview_core::cart::CartStore;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result};
use crate::middleware::BoundedMemoryStore;
use crate::storage::FileStorage;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration, the catalog, the session store, and per-client cart stores.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    sessions: BoundedMemoryStore,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                sessions: BoundedMemoryStore::default(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn sessions(&self) -> &BoundedMemoryStore {
        &self.inner.sessions
    }

    /// Storage slot for a client's cart.
    #[must_use]
    pub fn cart_storage(&self, client: ClientId) -> FileStorage {
        FileStorage::for_client(&self.inner.config.data_dir, client)
    }

    /// Restore a client's cart store.
    ///
    /// Each request restores the cart afresh, the way a page load would, and
    /// drops the store when the request ends.
    #[must_use]
    pub fn cart(&self, client: ClientId) -> CartStore<FileStorage> {
        let mut cart = CartStore::restore(self.cart_storage(client));
        cart.subscribe(move |change| {
            tracing::debug!(
                client_id = %client,
                line_items = change.items.len(),
                total_items = change.totals.total_items,
                total_price = %change.totals.total_price,
                "Cart updated"
            );
        });
        cart
    }

    /// Run `f` against a client's restored cart on the blocking thread pool.
    ///
    /// Cart persistence is synchronous file I/O; handlers go through here so
    /// it never runs on an async worker.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or [`AppError::Internal`] if the blocking
    /// task panicked or was cancelled.
    pub async fn with_cart<T, F>(&self, client: ClientId, f: F) -> Result<T>
    where
        F: FnOnce(&mut CartStore<FileStorage>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        let span = tracing::Span::current();
        tokio::task::spawn_blocking(move || {
            span.in_scope(|| {
                let mut cart = state.cart(client);
                f(&mut cart)
            })
        })
        .await
        .map_err(|e| AppError::Internal(format!("cart task failed: {e}")))?
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::thread;

    use wearview_core::ProductId;

    use super::*;

    fn state(dir: &tempfile::TempDir) -> AppState {
        AppState::new(StorefrontConfig::for_tests(dir.path()), Catalog::default())
    }

    #[tokio::test]
    async fn test_with_cart_runs_off_the_async_thread() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        let caller = thread::current().id();

        let worker = state
            .with_cart(ClientId::generate(), |_| Ok(thread::current().id()))
            .await
            .unwrap();
        assert_ne!(worker, caller);
    }

    #[tokio::test]
    async fn test_with_cart_persists_between_calls() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        let client = ClientId::generate();
        let tee = state.catalog().find(&ProductId::new("1")).unwrap().descriptor();

        state
            .with_cart(client, move |cart| Ok(cart.add_to_cart(tee)?))
            .await
            .unwrap();
        let count = state
            .with_cart(client, |cart| Ok(cart.total_items()))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_with_cart_propagates_handler_errors() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);

        let err = state
            .with_cart(ClientId::generate(), |_| -> Result<()> {
                Err(AppError::BadRequest("nope".to_string()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
