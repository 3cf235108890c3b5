//! Process-local cache of resolved principals.
//!
//! Keys are `"admin:<id>"` / `"customer:<id>"`; values are JSON snapshots of
//! the [`Principal`]. Entries expire a fixed time after insertion regardless
//! of reads. Backed by `moka`, which shards internally, so concurrent `get`
//! and `set` need no outside locking.

use std::time::Duration;

use moka::future::Cache;

use energy_maximum_core::{Principal, PrincipalKey};

/// Errors from the principal cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The principal could not be serialized.
    #[error("failed to encode cached principal: {0}")]
    Encode(#[source] serde_json::Error),

    /// A stored value is not a valid principal snapshot.
    #[error("failed to decode cached principal: {0}")]
    Decode(#[source] serde_json::Error),
}

/// TTL cache from principal key to serialized principal.
#[derive(Clone)]
pub struct PrincipalCache {
    entries: Cache<String, Vec<u8>>,
    ttl: Duration,
}

impl PrincipalCache {
    /// Create a cache whose entries live for `ttl` after insertion.
    #[must_use]
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { entries, ttl }
    }

    /// The life window applied to every entry.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a principal.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Decode` if the stored bytes are not a principal.
    pub async fn get(&self, key: &PrincipalKey) -> Result<Option<Principal>, CacheError> {
        let Some(bytes) = self.entries.get(&key.to_string()).await else {
            return Ok(None);
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(CacheError::Decode)
    }

    /// Store a principal under its key. Last write wins.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Encode` if serialization fails.
    pub async fn set(&self, key: &PrincipalKey, principal: &Principal) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(principal).map_err(CacheError::Encode)?;
        self.entries.insert(key.to_string(), bytes).await;
        Ok(())
    }

    /// Drop the entry for `key`, if any.
    pub async fn invalidate(&self, key: &PrincipalKey) {
        self.entries.invalidate(&key.to_string()).await;
    }

    #[cfg(test)]
    pub(crate) async fn insert_raw(&self, key: &PrincipalKey, bytes: Vec<u8>) {
        self.entries.insert(key.to_string(), bytes).await;
    }
}
