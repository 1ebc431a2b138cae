//! Cache tiers.
//!
//! This module provides the two cache tiers in front of the origin: the
//! process-local [`LocalTier`] with TTL expiry, and the [`SharedTier`]
//! interface with in-memory and directory-backed implementations.

pub mod entry;
pub mod local;
pub mod shared;
pub mod store;

pub use entry::CacheEntry;
pub use local::LocalTier;
pub use shared::{MemorySharedTier, SharedTier};
pub use store::DirectorySharedTier;

/// Default namespace prepended to keys in the shared tier.
pub const DEFAULT_SHARED_KEY_PREFIX: &str = "rlt:";

/// Build the shared tier key for a resolution key.
pub fn shared_key(prefix: &str, key: &str) -> String {
    format!("{}{}", prefix, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_key_is_namespaced() {
        assert_eq!(
            shared_key(DEFAULT_SHARED_KEY_PREFIX, "kabeleins_local"),
            "rlt:kabeleins_local"
        );
    }
}
