//! Bounded TTL/LRU cache shared by the pipeline stages
//!
//! A single store backs three logical namespaces, distinguished purely by
//! caller key prefix convention (`record:`, `translate:`, `ruby:`); the
//! store itself is prefix-agnostic. Everything in here is an optimization:
//! every cached value can be rebuilt by re-fetching, re-translating, or
//! re-annotating, so a miss is never an error.
//!
//! The clock is injected so tests can drive TTL expiry deterministically.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Default entry capacity
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default time-to-live per entry
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Time source, injectable for deterministic TTL tests
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Production clock backed by `Instant::now`
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Entry {
    value: Value,
    stored_at: Instant,
    /// Logical access counter, higher means more recently used
    last_used: u64,
}

struct Inner {
    entries: HashMap<String, Entry>,
    tick: u64,
}

/// Bounded key-value store with TTL expiry and LRU eviction
pub struct Cache {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl Cache {
    /// Create a cache with the given capacity and TTL, using the system clock
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(capacity, ttl, Arc::new(SystemClock))
    }

    /// Create a cache with an injected clock (tests)
    pub fn with_clock(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                tick: 0,
            }),
            capacity: capacity.max(1),
            ttl,
            clock,
        }
    }

    /// Look up a value. Expired entries are dropped on access and report as
    /// absent. A hit marks the entry most-recently-used.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().await;
        let expired = match inner.entries.get(key) {
            Some(entry) => now.duration_since(entry.stored_at) >= self.ttl,
            None => return None,
        };
        if expired {
            inner.entries.remove(key);
            return None;
        }
        inner.tick += 1;
        let tick = inner.tick;
        let entry = inner.entries.get_mut(key)?;
        entry.last_used = tick;
        Some(entry.value.clone())
    }

    /// Insert or overwrite a value, resetting its TTL. When the store is at
    /// capacity and the key is new, the least-recently-used entry is evicted.
    pub async fn set(&self, key: &str, value: Value) {
        let now = self.clock.now();
        let mut inner = self.inner.lock().await;
        if !inner.entries.contains_key(key) && inner.entries.len() >= self.capacity {
            if let Some(lru_key) = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone())
            {
                inner.entries.remove(&lru_key);
            }
        }
        inner.tick += 1;
        let tick = inner.tick;
        inner.entries.insert(
            key.to_string(),
            Entry {
                value,
                stored_at: now,
                last_used: tick,
            },
        );
    }

    /// Typed lookup; deserialization failures report as a miss
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).await?;
        serde_json::from_value(value).ok()
    }

    /// Typed insert; serialization failures are logged and dropped since the
    /// cache is an optimization, not a system of record
    pub async fn set_as<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(v) => self.set(key, v).await,
            Err(e) => warn!(%key, error = %e, "Value not cacheable, skipping"),
        }
    }

    /// Current entry count (expired entries may still be counted until read)
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
