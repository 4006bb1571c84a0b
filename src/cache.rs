//! Time-boxed caching for collaborator data feeds
//!
//! External feeds (reference rates, prices) are fetched by collaborators
//! outside this crate; they wrap their lookups in a [`TtlCache`] so
//! repeated queries inside the freshness window reuse the last
//! observation. The clock is injected so tests control time without
//! touching process-wide state.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};

/// Source of the current instant
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    stored_at: DateTime<Utc>,
    value: V,
}

/// Key-value cache whose entries expire after a fixed time-to-live
///
/// An entry is fresh strictly less than `ttl` after insertion; expired
/// entries are evicted on read and count as misses.
#[derive(Debug)]
pub struct TtlCache<K, V, C = SystemClock> {
    entries: HashMap<K, CacheEntry<V>>,
    ttl: Duration,
    clock: C,
    hits: u64,
    misses: u64,
}

impl<K: Eq + Hash, V> TtlCache<K, V, SystemClock> {
    /// Create a cache with the given TTL on the system clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<K: Eq + Hash, V, C: Clock> TtlCache<K, V, C> {
    /// Create a cache with an explicit clock
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            clock,
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a fresh entry
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let now = self.clock.now();
        let fresh = self
            .entries
            .get(key)
            .is_some_and(|entry| now - entry.stored_at < self.ttl);

        if !fresh {
            self.entries.remove(key);
            self.misses += 1;
            return None;
        }

        self.hits += 1;
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Store a value, resetting its freshness window
    pub fn insert(&mut self, key: K, value: V) {
        let stored_at = self.clock.now();
        self.entries.insert(key, CacheEntry { stored_at, value });
    }

    /// Drop every expired entry
    pub fn purge_expired(&mut self) {
        let now = self.clock.now();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| now - entry.stored_at < ttl);
    }

    /// Drop all entries and reset statistics
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Fraction of lookups served from cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
