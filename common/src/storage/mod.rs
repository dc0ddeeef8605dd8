//! Persistent key-value store holding the session.

pub mod file_store;
pub mod memory_store;

use crate::errors::RiderError;

pub use file_store::JsonFileStore;
pub use memory_store::MemoryStore;

/// String key-value storage. Implementations handle their own locking.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, RiderError>;
    fn set(&self, key: &str, value: &str) -> Result<(), RiderError>;
    fn remove(&self, key: &str) -> Result<(), RiderError>;
}

pub(crate) fn poisoned<T>(_: std::sync::PoisonError<T>) -> RiderError {
    RiderError::Storage("store lock poisoned".to_string())
}
