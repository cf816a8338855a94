mod catalog;

pub use catalog::{normalize_query, CatalogReader, DEFAULT_DEPARTMENT};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, SyncError};
use crate::storage::DurableStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

pub const CACHE_TTL_MINUTES: i64 = 30;

/// Every cache entry lives under this prefix so it can never collide with
/// keys owned by other components.
const CACHE_KEY_PREFIX: &str = "cache_";

#[derive(Serialize, Deserialize)]
struct CacheRecord {
    data: Value,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "storedAt")]
    stored_at: i64,
}

/// Read-through cache over durable storage with a fixed time-to-live.
///
/// Expired entries are removed lazily by the `get` that finds them. Storage
/// failures never escape: reads degrade to a miss and writes are dropped.
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn DurableStore>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
}

impl TtlCache {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn DurableStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: chrono::Duration::minutes(CACHE_TTL_MINUTES),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        match self.try_get(key) {
            Ok(hit) => hit,
            Err(e) => {
                tracing::debug!(key, error = %e, "cache read failed; treating as miss");
                None
            }
        }
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::debug!(key, error = %e, "cached payload has unexpected shape");
                None
            }
        }
    }

    /// Store `payload`, replacing any existing entry and resetting its age.
    pub fn set(&self, key: &str, payload: &Value) {
        if let Err(e) = self.try_set(key, payload) {
            tracing::debug!(key, error = %e, "cache write failed; continuing without it");
        }
    }

    /// Drop every cache entry. Keys owned by other components are untouched.
    pub fn clear(&self) {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::debug!(error = %e, "cache clear could not list keys");
                return;
            }
        };
        for key in keys.iter().filter(|k| k.starts_with(CACHE_KEY_PREFIX)) {
            if let Err(e) = self.store.remove(key) {
                tracing::debug!(key = %key, error = %e, "cache clear could not remove entry");
            }
        }
    }

    /// Serve `key` from the cache, or run `fetch` and cache its result.
    /// Fetch errors are returned as-is and nothing is cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if let Some(hit) = self.get(key) {
            tracing::debug!(key, "cache hit");
            return Ok(hit);
        }
        tracing::debug!(key, "cache miss");
        let fresh = fetch().await?;
        self.set(key, &fresh);
        Ok(fresh)
    }

    fn try_get(&self, key: &str) -> Result<Option<Value>> {
        let storage_key = storage_key(key);
        let raw = match self.store.get(&storage_key).map_err(into_cache_error)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let record: CacheRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                self.store.remove(&storage_key).map_err(into_cache_error)?;
                return Err(SyncError::Cache(format!("corrupt entry removed: {}", e)));
            }
        };

        let age = self.clock.now().timestamp_millis() - record.stored_at;
        if age < self.ttl.num_milliseconds() {
            Ok(Some(record.data))
        } else {
            tracing::debug!(key, age_ms = age, "evicting expired cache entry");
            self.store.remove(&storage_key).map_err(into_cache_error)?;
            Ok(None)
        }
    }

    fn try_set(&self, key: &str, payload: &Value) -> Result<()> {
        let record = CacheRecord {
            data: payload.clone(),
            stored_at: self.clock.now().timestamp_millis(),
        };
        let raw = serde_json::to_string(&record).map_err(|e| SyncError::Cache(e.to_string()))?;
        self.store
            .set(&storage_key(key), &raw)
            .map_err(into_cache_error)
    }
}

fn storage_key(key: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, key)
}

fn into_cache_error(err: SyncError) -> SyncError {
    match err {
        SyncError::Cache(_) => err,
        other => SyncError::Cache(other.to_string()),
    }
}
