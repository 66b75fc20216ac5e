// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-key async mutual exclusion.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<u64, Arc<Mutex<()>>>;

/// Map of per-athlete mutexes, shared across clones.
///
/// Tasks locking the same key run one at a time; different keys never
/// contend. An entry lives only while some task holds or waits on it.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<LockMap>,
}

/// Exclusive access to one key. Dropping it releases the lock and removes
/// the key's entry if nobody else is waiting.
pub struct KeyedGuard {
    guard: Option<OwnedMutexGuard<()>>,
    key: u64,
    locks: Arc<LockMap>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: u64) -> KeyedGuard {
        // Clone the Arc out so the DashMap shard lock is not held across await.
        let lock = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        KeyedGuard {
            guard: Some(lock.lock_owned().await),
            key,
            locks: self.locks.clone(),
        }
    }
}

impl Drop for KeyedGuard {
    fn drop(&mut self) {
        // Release first so the guard's own reference is gone.
        self.guard.take();
        // Waiters hold a clone, so a count of 1 means only the map is left.
        // remove_if holds the shard lock, which `lock` also needs to clone.
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
