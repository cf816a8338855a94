mod filesystem;
mod memory;

pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Durable key for the persisted access/refresh pair. Owned by the session manager.
pub const CREDENTIAL_KEY: &str = "authTokens";
/// Durable key for the viewed-movie id list. Owned by the catalog reader.
pub const VIEWED_MOVIES_KEY: &str = "viewedMovies";
/// Durable key for user preferences. Owned by the preferences store.
pub const PREFERENCES_KEY: &str = "userPreferences";

/// Trait for durable key-value backends
pub trait DurableStore: Send + Sync {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// List every key currently stored
    fn keys(&self) -> Result<Vec<String>>;
}

pub fn load_json<T: DeserializeOwned>(store: &dyn DurableStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn save_json<T: Serialize>(store: &dyn DurableStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
