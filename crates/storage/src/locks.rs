//! Per-key write serialization.
//!
//! Storage writes replace whole documents, so two read-modify-write
//! sequences on the same document can lose an update if they interleave.
//! [`KeyedLocks`] hands out one async mutex per key (habit id, user id, ...)
//! so callers can run the sequence exclusively without blocking other keys.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Registry<K> = Arc<Mutex<HashMap<K, Arc<AsyncMutex<()>>>>>;

/// Registry of async mutexes keyed by `K`.
///
/// Entries are created on first use and dropped again once no task holds or
/// waits on them, so the registry only grows with the number of keys in
/// flight.
pub struct KeyedLocks<K> {
    registry: Registry<K>,
}

/// Exclusive access to one key. Released on drop.
pub struct KeyedGuard<K: Eq + Hash + Copy> {
    key: K,
    registry: Registry<K>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K: Eq + Hash + Copy> KeyedLocks<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: K) -> KeyedGuard<K> {
        let mutex = {
            let mut map = self.registry.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(key).or_default().clone()
        };

        let guard = mutex.lock_owned().await;
        KeyedGuard {
            key,
            registry: Arc::clone(&self.registry),
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or awaited.
    pub fn active(&self) -> usize {
        self.registry.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl<K: Eq + Hash + Copy> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Copy> Drop for KeyedGuard<K> {
    fn drop(&mut self) {
        // Release the mutex before checking whether anyone else still uses it
        self.guard.take();

        let mut map = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        let unused = map
            .get(&self.key)
            .is_some_and(|entry| Arc::strong_count(entry) == 1);
        if unused {
            map.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = Arc::new(KeyedLocks::new());
        let counter = Arc::new(AsyncMutex::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..4 {
            let locks = Arc::clone(&locks);
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock(1u32).await;
                counter.lock().await.push(("start", i));
                tokio::time::sleep(Duration::from_millis(5)).await;
                counter.lock().await.push(("end", i));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Every start is immediately followed by its own end
        let events = counter.lock().await;
        for pair in events.chunks(2) {
            assert_eq!(pair[0].0, "start");
            assert_eq!(pair[1].0, "end");
            assert_eq!(pair[0].1, pair[1].1);
        }
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.lock(1u32).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock(2u32)).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_entries_are_pruned_after_release() {
        let locks = KeyedLocks::new();
        {
            let _guard = locks.lock(7u32).await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }
}
