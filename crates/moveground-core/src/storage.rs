//! Durable key/value storage trait.

use crate::error::Result;
use async_trait::async_trait;

/// A string-keyed, string-valued store that survives restarts.
///
/// The keyspace is shared: two sessions configured with the same key
/// overwrite each other (last writer wins).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
