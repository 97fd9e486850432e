//! Session middleware configuration.
//!
//! Sessions only carry the browser's client id and any pending try-on, so
//! they live in memory. Carts themselves are persisted separately by
//! [`crate::storage::FileStorage`].
//!
//! Every cookieless visitor gets a session on their first request, so the
//! store is bounded: expired records are swept periodically, and once the
//! store is full a new session evicts the record closest to expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "wv_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Upper bound on sessions held in memory.
pub const MAX_SESSIONS: usize = 50_000;

/// How often expired sessions are swept.
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// In-memory session store with a capacity limit and expired-record sweeping.
#[derive(Debug, Clone)]
pub struct BoundedMemoryStore {
    records: Arc<Mutex<HashMap<Id, Record>>>,
    capacity: usize,
}

impl Default for BoundedMemoryStore {
    fn default() -> Self {
        Self::new(MAX_SESSIONS)
    }
}

impl BoundedMemoryStore {
    /// Create a store holding at most `capacity` sessions (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    /// Number of records currently held, expired or not.
    pub async fn session_count(&self) -> usize {
        self.records.lock().await.len()
    }
}

fn is_active(record: &Record, now: OffsetDateTime) -> bool {
    record.expiry_date > now
}

/// Free a slot for one more record.
fn make_room(records: &mut HashMap<Id, Record>, capacity: usize) {
    if records.len() < capacity {
        return;
    }

    let now = OffsetDateTime::now_utc();
    records.retain(|_, record| is_active(record, now));

    while records.len() >= capacity {
        let Some(oldest) = records
            .values()
            .min_by_key(|record| record.expiry_date)
            .map(|record| record.id)
        else {
            break;
        };
        records.remove(&oldest);
        tracing::debug!("Session store full, evicted least recently active session");
    }
}

#[async_trait]
impl SessionStore for BoundedMemoryStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        while records.contains_key(&record.id) {
            record.id = Id::default();
        }
        make_room(&mut records, self.capacity);
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        if !records.contains_key(&record.id) {
            make_room(&mut records, self.capacity);
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .records
            .lock()
            .await
            .get(session_id)
            .filter(|record| is_active(record, now))
            .cloned())
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.lock().await.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for BoundedMemoryStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let now = OffsetDateTime::now_utc();
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| is_active(record, now));
        let removed = before - records.len();
        if removed > 0 {
            tracing::debug!(removed, "Swept expired sessions");
        }
        Ok(())
    }
}

/// Sweep expired sessions every `period`, forever.
///
/// Spawn this next to the server.
pub async fn sweep_expired_sessions(store: BoundedMemoryStore, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        if let Err(e) = store.delete_expired().await {
            tracing::warn!(error = %e, "Failed to sweep expired sessions");
        }
    }
}

/// Create the session layer over `store`.
#[must_use]
pub fn create_session_layer(
    store: BoundedMemoryStore,
    config: &StorefrontConfig,
) -> SessionManagerLayer<BoundedMemoryStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
