//! TTL-bounded prediction cache
//!
//! An advisory memoization layer over the engine's three operations. Entries
//! are whole immutable values swapped into a concurrent map, so a racing
//! reader either sees a complete entry or nothing; duplicate recomputation on
//! a shared-key race is acceptable, a torn read is not. Expiry is lazy on
//! lookup, with an eager sweep available for housekeeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{ExhaustionWarning, Prediction, ThresholdCrossing, ThresholdType};

/// Cache key: entity plus the request that was answered
///
/// Forecast keys normalize their horizon list (sorted, deduplicated) so that
/// permutations of the same request share an entry. Threshold values are
/// keyed by bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    entity_id: String,
    request: RequestKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RequestKey {
    Forecast {
        metric_name: String,
        horizons_minutes: Vec<u32>,
    },
    Crossing {
        metric_name: String,
        threshold_bits: u64,
        threshold_type: ThresholdType,
        lookahead_secs: u64,
    },
    Exhaustion,
}

impl CacheKey {
    pub fn forecast(entity_id: &str, metric_name: &str, horizons_minutes: &[u32]) -> Self {
        let mut horizons = horizons_minutes.to_vec();
        horizons.sort_unstable();
        horizons.dedup();
        Self {
            entity_id: entity_id.to_string(),
            request: RequestKey::Forecast {
                metric_name: metric_name.to_string(),
                horizons_minutes: horizons,
            },
        }
    }

    pub fn crossing(
        entity_id: &str,
        metric_name: &str,
        threshold_value: f64,
        threshold_type: ThresholdType,
        lookahead: Duration,
    ) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            request: RequestKey::Crossing {
                metric_name: metric_name.to_string(),
                threshold_bits: threshold_value.to_bits(),
                threshold_type,
                lookahead_secs: lookahead.as_secs(),
            },
        }
    }

    pub fn exhaustion(entity_id: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            request: RequestKey::Exhaustion,
        }
    }
}

/// The result shapes the cache can hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CachedValue {
    Predictions(Vec<Prediction>),
    Crossing(Option<ThresholdCrossing>),
    Warnings(Vec<ExhaustionWarning>),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedValue,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

/// Hit/miss counters and current entry count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Concurrent, TTL-bounded map of recently computed results
///
/// Lookups and inserts are O(1); nothing blocks a caller. The cache never
/// serves an entry past its TTL and offers no external invalidation: entries
/// simply expire.
#[derive(Debug)]
pub struct PredictionCache {
    entries: DashMap<CacheKey, CacheEntry>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PredictionCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a live entry, dropping it if its TTL has lapsed
    pub fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(?key, "prediction cache hit");
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert with the cache's default TTL
    pub fn put(&self, key: CacheKey, value: CachedValue) {
        self.put_with_ttl(key, value, self.default_ttl);
    }

    pub fn put_with_ttl(&self, key: CacheKey, value: CachedValue, ttl: Duration) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn statistics(&self) -> CacheStatistics {
        CacheStatistics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}
