//! Shared tier interface.
//!
//! The shared tier is a long-lived store of last known good template bodies,
//! visible to every process in a fleet. Values carry no expiry: an entry
//! stays until the origin produces a new body for the same key, or until the
//! store is cleared by something outside this crate.

use dashmap::DashMap;

use crate::error::Result;

/// A distributed key/value store used as the second tier.
///
/// Hosts backed by Redis, memcached or similar implement this over their
/// client. `get` returning `Ok(None)` is an ordinary miss.
pub trait SharedTier: Send + Sync {
    /// Fetch the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key` with no expiry.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Thread-safe in-memory [`SharedTier`].
///
/// Useful for single-process hosts and tests.
#[derive(Debug, Default)]
pub struct MemorySharedTier {
    entries: DashMap<String, String>,
}

impl MemorySharedTier {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SharedTier for MemorySharedTier {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_is_ok_none() {
        let store = MemorySharedTier::new();

        assert!(store.get("rlt:shop").unwrap().is_none());
    }

    #[test]
    fn set_then_get() {
        let store = MemorySharedTier::new();

        store.set("rlt:shop", "T1").unwrap();

        assert_eq!(store.get("rlt:shop").unwrap(), Some("T1".to_string()));
    }

    #[test]
    fn set_overwrites() {
        let store = MemorySharedTier::new();

        store.set("rlt:shop", "T1").unwrap();
        store.set("rlt:shop", "T2").unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("rlt:shop").unwrap(), Some("T2".to_string()));
    }

    #[test]
    fn with_entries_prepopulates() {
        let store = MemorySharedTier::with_entries([("rlt:a", "1"), ("rlt:b", "2")]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("rlt:b").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn usable_as_trait_object() {
        let store: Box<dyn SharedTier> = Box::new(MemorySharedTier::new());

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
    }
}
