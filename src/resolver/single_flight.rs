//! In-flight deduplication of origin fetches.
//!
//! Without coordination, every resolution that misses both cache tiers
//! fetches the origin on its own. [`SingleFlight`] lets the first caller for
//! a key do the work while concurrent callers for the same key block and
//! receive its result. It only coordinates threads of one process.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use tracing::debug;

type Outcome = Option<String>;

#[derive(Default)]
struct Flight {
    /// `None` while running, `Some(outcome)` once the leader is done.
    state: Mutex<Option<Outcome>>,
    done: Condvar,
}

impl Flight {
    fn lock(&self) -> MutexGuard<'_, Option<Outcome>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn complete(&self, outcome: Outcome) {
        *self.lock() = Some(outcome);
        self.done.notify_all();
    }

    fn wait(&self) -> Outcome {
        let mut state = self.lock();
        while state.is_none() {
            state = self
                .done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.clone().flatten()
    }
}

/// Publishes the leader's outcome even if the work panics.
struct Leader<'a> {
    inflight: &'a DashMap<String, Arc<Flight>>,
    key: &'a str,
    flight: Arc<Flight>,
    outcome: Outcome,
}

impl Drop for Leader<'_> {
    fn drop(&mut self) {
        self.inflight
            .remove_if(self.key, |_, flight| Arc::ptr_eq(flight, &self.flight));
        self.flight.complete(self.outcome.take());
    }
}

/// Per-key deduplication of concurrent work.
#[derive(Default)]
pub struct SingleFlight {
    inflight: DashMap<String, Arc<Flight>>,
}

impl SingleFlight {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` for `key`, or wait for the run already in progress.
    pub fn run<F>(&self, key: &str, work: F) -> Outcome
    where
        F: FnOnce() -> Outcome,
    {
        let (flight, is_leader) = match self.inflight.entry(key.to_string()) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let flight = Arc::new(Flight::default());
                entry.insert(Arc::clone(&flight));
                (flight, true)
            }
        };

        if !is_leader {
            debug!("Waiting for in-flight origin fetch of '{}'", key);
            return flight.wait();
        }

        let mut leader = Leader {
            inflight: &self.inflight,
            key,
            flight,
            outcome: None,
        };
        leader.outcome = work();
        leader.outcome.clone()
    }

    /// Number of keys with work in progress.
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }
}

impl std::fmt::Debug for SingleFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
