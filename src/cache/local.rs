//! Process-local template tier.
//!
//! Entries expire lazily: an expired entry is removed by the lookup that
//! observes it, there is no background sweeper.

use chrono::Utc;
use dashmap::DashMap;
use std::time::Duration;
use tracing::debug;

use super::entry::CacheEntry;

/// In-memory map from resolution key to [`CacheEntry`].
///
/// Shared by every resolution in the process; hold it behind an `Arc` and
/// hand the same instance to each resolver.
#[derive(Debug, Default)]
pub struct LocalTier {
    entries: DashMap<String, CacheEntry>,
}

impl LocalTier {
    /// Create an empty tier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a live value.
    ///
    /// Returns `None` when the key is absent. An expired entry is deleted
    /// and also reported as `None`.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Utc::now();

        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired_at(now) {
                debug!(
                    "Local cache still valid for '{}', expiring at {}",
                    key, entry.expires_at
                );
                return Some(entry.value.clone());
            }
        } else {
            return None;
        }

        // The read guard must be released before removing.
        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired_at(now))
            .is_some()
        {
            debug!("Local cache entry for '{}' is too old, removing", key);
        }
        None
    }

    /// Store a value for `ttl`, replacing any existing entry.
    ///
    /// Returns the stored value unchanged.
    pub fn put(&self, key: &str, value: impl Into<String>, ttl: Duration) -> String {
        let entry = CacheEntry::new(value, ttl);
        debug!(
            "Caching template '{}' locally for {}s; will expire at {}",
            key,
            ttl.as_secs(),
            entry.expires_at
        );
        let value = entry.value.clone();
        self.entries.insert(key.to_string(), entry);
        value
    }

    /// Install a pre-built entry, replacing any existing one.
    pub fn insert_entry(&self, key: impl Into<String>, entry: CacheEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Inspect the raw entry for a key without applying expiry.
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the tier holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
