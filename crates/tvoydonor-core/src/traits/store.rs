//! Persistent key-value storage trait.

use async_trait::async_trait;

use crate::Result;

/// A flat namespace of string keys.
///
/// Device storage and an embedded host's cloud storage both implement
/// this. Every call may suspend and may fail with a storage error (store
/// absent, quota exceeded, host too old).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys yield `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;
}
