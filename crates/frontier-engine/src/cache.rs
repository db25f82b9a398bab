//! Per-user cache of optimization results.
//!
//! Entries are keyed by a structured [`CacheKey`] and hold the serialized
//! result, so a hit returns exactly what the original computation produced.
//! Entries expire after a TTL and are dropped wholesale for a user whenever
//! that user's holdings change.
//!
//! Every invalidation bumps a generation. A result computed from inputs read
//! before an invalidation is refused by [`OptimizationCache::put_if_current`],
//! so a mutation racing a computation can never leave a stale entry behind.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use frontier_traits::{AccountFilter, UserId};

/// Which service operation produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheOperation {
    /// Full frontier report
    EfficientFrontier,
    /// Minimum-variance portfolio
    MinimumVariance,
    /// Tangency portfolio
    MaximumSharpe,
    /// Target-return portfolio
    TargetReturn,
    /// Risk parity portfolio
    RiskParity,
    /// Correlation report
    CorrelationMatrix,
    /// Current position report
    CurrentPosition,
}

/// One request parameter in hashable form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheParam {
    /// A float, stored as its bit pattern
    Float(u64),
    /// A count
    Count(usize),
}

impl CacheParam {
    /// Normalizes `-0.0` to `0.0` so both hit the same entry.
    pub fn float(value: f64) -> Self {
        let value = if value == 0.0 { 0.0 } else { value };
        Self::Float(value.to_bits())
    }
}

/// Identifies one cached result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Owner of the result
    pub user_id: UserId,
    /// Producing operation
    pub operation: CacheOperation,
    /// Account restriction (a sorted set, so order never matters)
    pub accounts: AccountFilter,
    /// Remaining parameters in a fixed per-operation order
    pub params: Vec<CacheParam>,
}

impl CacheKey {
    /// Creates a key with no parameters.
    pub fn new(user_id: &UserId, operation: CacheOperation, accounts: &AccountFilter) -> Self {
        Self {
            user_id: user_id.clone(),
            operation,
            accounts: accounts.clone(),
            params: Vec::new(),
        }
    }

    /// Appends a float parameter.
    pub fn with_float(mut self, value: f64) -> Self {
        self.params.push(CacheParam::float(value));
        self
    }

    /// Appends a count parameter.
    pub fn with_count(mut self, value: usize) -> Self {
        self.params.push(CacheParam::Count(value));
        self
    }
}

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
    /// Entries written
    pub insertions: u64,
    /// Entries removed by invalidation
    pub invalidations: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, or 0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Invalidation generation observed before a computation started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeneration {
    epoch: u64,
    user: u64,
}

struct CachedResult {
    payload: String,
    stored_at: Instant,
    ttl: Duration,
}

impl CachedResult {
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() > self.ttl
    }
}

/// Optimization result cache with TTL expiry and per-user invalidation.
pub struct OptimizationCache {
    entries: DashMap<CacheKey, CachedResult>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    invalidations: AtomicU64,
    // Lock order: epoch, then generations, then entries
    epoch: RwLock<u64>,
    generations: DashMap<UserId, u64>,
}

impl OptimizationCache {
    /// Create a new cache.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            insertions: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
            epoch: RwLock::new(0),
            generations: DashMap::new(),
        }
    }

    /// The TTL applied by [`put`](Self::put).
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get a live entry.
    ///
    /// Expired or undecodable entries are removed and count as misses.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let decoded = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                serde_json::from_str::<T>(&entry.payload).map_err(|e| {
                    tracing::warn!(user = %key.user_id, operation = ?key.operation, error = %e, "dropping undecodable cache entry");
                })
            }
            Some(_) => Err(()),
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(user = %key.user_id, operation = ?key.operation, "cache miss");
                return None;
            }
        };

        match decoded {
            Ok(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(user = %key.user_id, operation = ?key.operation, "cache hit");
                Some(value)
            }
            Err(()) => {
                self.entries.remove(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(user = %key.user_id, operation = ?key.operation, "cache miss (stale)");
                None
            }
        }
    }

    /// Store a result with the default TTL.
    pub fn put<T: Serialize>(&self, key: CacheKey, value: &T) -> Result<(), serde_json::Error> {
        self.put_with_ttl(key, value, self.default_ttl)
    }

    /// Store a result with an explicit TTL.
    pub fn put_with_ttl<T: Serialize>(
        &self,
        key: CacheKey,
        value: &T,
        ttl: Duration,
    ) -> Result<(), serde_json::Error> {
        let payload = serde_json::to_string(value)?;
        self.insert(key, payload, ttl);
        Ok(())
    }

    /// Current invalidation generation of a user.
    ///
    /// Capture it before reading the inputs of a computation and hand it to
    /// [`put_if_current`](Self::put_if_current).
    pub fn generation(&self, user_id: &UserId) -> CacheGeneration {
        let epoch = *self.epoch.read();
        let user = self.generations.get(user_id).map_or(0, |g| *g);
        CacheGeneration { epoch, user }
    }

    /// Store a result with the default TTL unless the user was invalidated
    /// since `seen` was captured. Returns whether the result was stored.
    pub fn put_if_current<T: Serialize>(
        &self,
        key: CacheKey,
        value: &T,
        seen: CacheGeneration,
    ) -> Result<bool, serde_json::Error> {
        let payload = serde_json::to_string(value)?;

        let epoch = self.epoch.read();
        let generation = self.generations.entry(key.user_id.clone()).or_insert(0);
        if *epoch != seen.epoch || *generation != seen.user {
            tracing::debug!(user = %key.user_id, operation = ?key.operation, "discarding result computed before an invalidation");
            return Ok(false);
        }
        self.insert(key, payload, self.default_ttl);
        Ok(true)
    }

    fn insert(&self, key: CacheKey, payload: String, ttl: Duration) {
        self.entries.insert(
            key,
            CachedResult {
                payload,
                stored_at: Instant::now(),
                ttl,
            },
        );
        self.insertions.fetch_add(1, Ordering::Relaxed);
    }

    /// Remove every entry of one user. Returns the number removed.
    pub fn invalidate_user(&self, user_id: &UserId) -> usize {
        let _epoch = self.epoch.read();
        let mut generation = self.generations.entry(user_id.clone()).or_insert(0);
        *generation += 1;

        let before = self.entries.len();
        self.entries.retain(|key, _| &key.user_id != user_id);
        let removed = before.saturating_sub(self.entries.len());
        drop(generation);
        self.invalidations.fetch_add(removed as u64, Ordering::Relaxed);
        tracing::info!(user = %user_id, removed, "invalidated cached results");
        removed
    }

    /// Remove every entry. Returns the number removed.
    pub fn invalidate_all(&self) -> usize {
        let mut epoch = self.epoch.write();
        *epoch += 1;
        let removed = self.entries.len();
        self.entries.clear();
        drop(epoch);
        self.invalidations.fetch_add(removed as u64, Ordering::Relaxed);
        tracing::info!(removed, "invalidated all cached results");
        removed
    }

    /// Remove expired entries.
    pub fn cleanup_expired(&self) {
        self.entries.retain(|_, entry| !entry.is_expired());
    }

    /// Number of stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            insertions: self.insertions.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

impl Default for OptimizationCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600)) // 1 hour
    }
}
