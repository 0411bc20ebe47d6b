//! In-memory TTL cache
//!
//! Entries carry an absolute expiry; an entry is valid while `now < expires_at`
//! and expired entries behave exactly like absent ones. Expired entries are
//! dropped lazily, either when the key is next requested or on
//! [`TtlCache::purge_expired`].
//!
//! Misses are single-flight per key: concurrent callers of
//! [`TtlCache::get_or_create`] for the same key wait on one factory call and
//! read its stored result. A failed factory call stores nothing, so the next
//! waiter (or the next call) runs the factory again. Dropping a caller's
//! future mid-fetch leaves the slot as it was before the call.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::version::clock::{Clock, SystemClock};

/// A cached value together with its lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: V,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    fn new(key: &str, value: V, now: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        Self {
            key: key.to_string(),
            value,
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

type Slot<V> = Arc<tokio::sync::Mutex<Option<CacheEntry<V>>>>;

pub struct TtlCache<V> {
    slots: Mutex<HashMap<String, Slot<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone + Send> TtlCache<V> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, Slot<V>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, key: &str) -> Slot<V> {
        self.lock_slots()
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    /// Return the valid value for `key`, or run `factory`, store its result
    /// for `ttl` and return it. Factory errors are returned as-is and never
    /// stored.
    pub async fn get_or_create<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        factory: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(key);
        let mut guard = slot.lock().await;

        let now = self.clock.now();
        if let Some(entry) = guard.as_ref()
            && entry.is_valid(now)
        {
            debug!("Cache hit for {}", key);
            return Ok(entry.value.clone());
        }

        debug!("Cache miss for {}", key);
        let value = match factory().await {
            Ok(value) => value,
            Err(e) => {
                if guard.is_none() {
                    drop(guard);
                    self.release_empty_slot(key, &slot);
                }
                return Err(e);
            }
        };

        // Expiry counts from when the value was produced
        *guard = Some(CacheEntry::new(key, value.clone(), self.clock.now(), ttl));

        Ok(value)
    }

    /// Drop the slot of a failed first fetch unless another caller holds it.
    /// Slots are only cloned under the map lock, so the count is stable here.
    fn release_empty_slot(&self, key: &str, slot: &Slot<V>) {
        let mut slots = self.lock_slots();
        if let Some(current) = slots.get(key)
            && Arc::ptr_eq(current, slot)
            && Arc::strong_count(slot) == 2
        {
            slots.remove(key);
        }
    }

    /// Peek at the value for `key` if it is still valid.
    ///
    /// Waits for an in-flight fetch of the same key to settle.
    pub async fn get(&self, key: &str) -> Option<V> {
        let slot = self.lock_slots().get(key).cloned()?;
        let guard = slot.lock().await;

        let now = self.clock.now();
        guard
            .as_ref()
            .filter(|entry| entry.is_valid(now))
            .map(|entry| entry.value.clone())
    }

    /// Drop the entry for `key`. Callers already waiting on an in-flight
    /// fetch of the key still receive its result.
    pub fn invalidate(&self, key: &str) {
        if self.lock_slots().remove(key).is_some() {
            debug!("Invalidated cache entry {}", key);
        }
    }

    /// Evict every expired entry. Slots with a fetch in flight are skipped.
    /// Returns the number of evicted entries.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut slots = self.lock_slots();
        let before = slots.len();

        slots.retain(|_, slot| match slot.try_lock() {
            Ok(guard) => guard.as_ref().is_some_and(|entry| entry.is_valid(now)),
            Err(_) => true,
        });

        let purged = before - slots.len();
        if purged > 0 {
            debug!("Purged {} expired cache entries", purged);
        }
        purged
    }
}

impl<V: Clone + Send> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
