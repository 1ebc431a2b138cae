//! Resolution counters.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use super::pipeline::TierSource;

/// Per-outcome counters for a resolver.
#[derive(Debug, Default)]
pub struct ResolverStats {
    local_hits: AtomicU64,
    shared_hits: AtomicU64,
    origin_hits: AtomicU64,
    defaults: AtomicU64,
    not_applicable: AtomicU64,
    shared_errors: AtomicU64,
}

/// Point-in-time copy of [`ResolverStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub local_hits: u64,
    pub shared_hits: u64,
    pub origin_hits: u64,
    pub defaults: u64,
    pub not_applicable: u64,
    pub shared_errors: u64,
}

impl StatsSnapshot {
    /// Resolutions that produced a template.
    pub fn resolved(&self) -> u64 {
        self.local_hits + self.shared_hits + self.origin_hits + self.defaults
    }
}

impl ResolverStats {
    pub(crate) fn record(&self, source: TierSource) {
        let counter = match source {
            TierSource::Local => &self.local_hits,
            TierSource::Shared => &self.shared_hits,
            TierSource::Origin => &self.origin_hits,
            TierSource::Default => &self.defaults,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_not_applicable(&self) {
        self.not_applicable.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_shared_error(&self) {
        self.shared_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            local_hits: self.local_hits.load(Ordering::Relaxed),
            shared_hits: self.shared_hits.load(Ordering::Relaxed),
            origin_hits: self.origin_hits.load(Ordering::Relaxed),
            defaults: self.defaults.load(Ordering::Relaxed),
            not_applicable: self.not_applicable.load(Ordering::Relaxed),
            shared_errors: self.shared_errors.load(Ordering::Relaxed),
        }
    }
}
