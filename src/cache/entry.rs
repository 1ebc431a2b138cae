//! Local cache entry type.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// A template body held by the local tier together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The template body.
    pub value: String,
    /// When this entry was written.
    pub cached_at: DateTime<Utc>,
    /// When this entry stops being served.
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry that expires `ttl` from now.
    pub fn new(value: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            value: value.into(),
            cached_at: now,
            expires_at: expiry_after(now, ttl),
        }
    }

    /// Create an entry with an explicit expiry.
    pub fn expiring_at(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            cached_at: Utc::now(),
            expires_at,
        }
    }

    /// Check if the entry has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check expiry against a given instant.
    ///
    /// An entry whose expiry equals `now` is already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Remaining lifetime in whole seconds, zero once expired.
    pub fn remaining_ttl(&self) -> i64 {
        self.expires_at
            .signed_duration_since(Utc::now())
            .num_seconds()
            .max(0)
    }
}

/// `now + ttl`, saturating at the largest representable instant.
pub(crate) fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
