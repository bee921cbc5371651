//! Cache Store Module
//!
//! In-memory backend combining an `IndexMap` (recency order for LRU eviction)
//! with a byte budget and TTL expiration.

use std::time::Duration;

use bytes::Bytes;
use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::cache::{
    CacheBackend, CacheEntry, CacheStats, Counters, BYTES_PER_MIB, ENTRY_SIZE_DIVISOR,
    MAX_KEY_LENGTH, MIN_CAPACITY_BYTES,
};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Inner {
    /// Front = least recently used, back = most recently used
    entries: IndexMap<Vec<u8>, CacheEntry>,
    /// Sum of key and value lengths of every stored entry
    used_bytes: usize,
    counters: Counters,
}

impl Inner {
    fn remove_index(&mut self, index: usize) -> Option<CacheEntry> {
        let (key, entry) = self.entries.shift_remove_index(index)?;
        self.used_bytes -= entry.footprint(&key);
        Some(entry)
    }
}

// == Memory Store ==
/// Thread-safe in-memory cache bounded by a byte budget.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    capacity_bytes: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a store holding at most `capacity_bytes` of keys and values.
    ///
    /// Budgets below 512 KiB are raised to 512 KiB.
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity_bytes: capacity_bytes.max(MIN_CAPACITY_BYTES),
        }
    }

    /// Creates a store with a budget expressed in MiB.
    pub fn with_capacity_mib(mib: usize) -> Self {
        Self::new(mib.saturating_mul(BYTES_PER_MIB))
    }

    /// Total byte budget.
    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    /// Largest key + value size a single entry may have.
    pub fn max_entry_bytes(&self) -> usize {
        self.capacity_bytes / ENTRY_SIZE_DIVISOR
    }

    /// Bytes currently charged against the budget.
    #[cfg(test)]
    pub(crate) fn used_bytes(&self) -> usize {
        self.inner.lock().used_bytes
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

impl CacheBackend for MemoryStore {
    // == Get ==
    /// Expired entries are removed on access and counted as misses.
    fn get(&self, key: &[u8]) -> Result<Bytes, StoreError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let Some(index) = inner.entries.get_index_of(key) else {
            inner.counters.record_miss();
            return Err(StoreError::NotFound);
        };

        let expired = inner
            .entries
            .get_index(index)
            .is_some_and(|(_, entry)| entry.is_expired());
        if expired {
            inner.remove_index(index);
            inner.counters.record_miss();
            inner.counters.record_expired(1);
            return Err(StoreError::NotFound);
        }

        inner.counters.record_hit();
        let last = inner.entries.len() - 1;
        inner.entries.move_index(index, last);
        match inner.entries.get_index_mut(last) {
            Some((_, entry)) => {
                entry.touch();
                Ok(entry.value.clone())
            }
            None => Err(StoreError::NotFound),
        }
    }

    // == Set ==
    /// Stores `value` under `key`, evicting least recently used entries
    /// until it fits the budget.
    fn set(&self, key: &[u8], value: Bytes, ttl: Option<Duration>) -> Result<(), StoreError> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(StoreError::KeyTooLarge {
                len: key.len(),
                max: MAX_KEY_LENGTH,
            });
        }

        let entry = CacheEntry::new(value, ttl);
        let size = entry.footprint(key);
        let max = self.max_entry_bytes();
        if size > max {
            return Err(StoreError::EntryTooLarge { size, max });
        }

        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if let Some(index) = inner.entries.get_index_of(key) {
            if let Some(previous) = inner.remove_index(index) {
                if previous.is_expired() {
                    inner.counters.record_expired(1);
                } else {
                    inner.counters.record_overwrite();
                }
            }
        }

        while inner.used_bytes + size > self.capacity_bytes {
            if inner.remove_index(0).is_none() {
                break;
            }
        }

        inner.entries.insert(key.to_vec(), entry);
        inner.used_bytes += size;
        Ok(())
    }

    // == Delete ==
    /// Returns true only if a live entry was removed.
    fn delete(&self, key: &[u8]) -> bool {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let Some(index) = inner.entries.get_index_of(key) else {
            return false;
        };
        match inner.remove_index(index) {
            Some(entry) if entry.is_expired() => {
                inner.counters.record_expired(1);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.used_bytes = 0;
    }

    // == Stats ==
    fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();

        let (count, access_total) = inner
            .entries
            .values()
            .filter(|entry| !entry.is_expired())
            .fold((0i64, 0i64), |(count, total), entry| {
                (count + 1, total + entry.last_access)
            });
        let average_access_time = if count == 0 { 0 } else { access_total / count };

        CacheStats::snapshot(&inner.counters, count as u64, average_access_time)
    }

    fn reset_stats(&self) {
        self.inner.lock().counters.reset();
    }

    // == Purge Expired ==
    fn purge_expired(&self) -> usize {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let before = inner.entries.len();
        let mut freed = 0;
        inner.entries.retain(|key, entry| {
            if entry.is_expired() {
                freed += entry.footprint(key);
                false
            } else {
                true
            }
        });
        let removed = before - inner.entries.len();

        inner.used_bytes -= freed;
        inner.counters.record_expired(removed as u64);
        removed
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn store() -> MemoryStore {
        MemoryStore::with_capacity_mib(1)
    }

    fn value(s: &str) -> Bytes {
        Bytes::copy_from_slice(s.as_bytes())
    }

    #[test]
    fn test_store_new() {
        let store = store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity_bytes(), BYTES_PER_MIB);
        assert_eq!(store.max_entry_bytes(), 1024);
    }

    #[test]
    fn test_store_minimum_capacity() {
        let store = MemoryStore::new(0);
        assert_eq!(store.capacity_bytes(), MIN_CAPACITY_BYTES);
    }

    #[test]
    fn test_store_set_and_get() {
        let store = store();

        store.set(b"key1", value("value1"), None).unwrap();
        let got = store.get(b"key1").unwrap();

        assert_eq!(&got[..], b"value1");
        assert_eq!(store.len(), 1);
        assert_eq!(store.used_bytes(), 10);
    }

    #[test]
    fn test_store_binary_key_and_value() {
        let store = store();
        let key = [0u8, 159, 146, 150];
        let val = Bytes::from_static(&[255, 0, 1, 2]);

        store.set(&key, val.clone(), None).unwrap();

        assert_eq!(store.get(&key).unwrap(), val);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = store();
        assert_eq!(store.get(b"nonexistent"), Err(StoreError::NotFound));
    }

    #[test]
    fn test_store_delete() {
        let store = store();

        store.set(b"key1", value("value1"), None).unwrap();
        assert!(store.delete(b"key1"));

        assert!(store.is_empty());
        assert_eq!(store.used_bytes(), 0);
        assert_eq!(store.get(b"key1"), Err(StoreError::NotFound));
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let store = store();
        assert!(!store.delete(b"nonexistent"));
    }

    #[test]
    fn test_store_overwrite() {
        let store = store();

        store.set(b"key1", value("value1"), None).unwrap();
        store.set(b"key1", value("v2"), None).unwrap();

        assert_eq!(&store.get(b"key1").unwrap()[..], b"v2");
        assert_eq!(store.len(), 1);
        assert_eq!(store.used_bytes(), 6);
        assert_eq!(store.stats().overwrite_count, 1);
    }

    #[test]
    fn test_store_clear() {
        let store = store();
        store.set(b"a", value("1"), None).unwrap();
        store.set(b"b", value("2"), None).unwrap();

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.used_bytes(), 0);
        assert_eq!(store.get(b"a"), Err(StoreError::NotFound));
    }

    #[test]
    fn test_store_ttl_expiration() {
        let store = store();

        store
            .set(b"key1", value("value1"), Some(Duration::from_secs(1)))
            .unwrap();
        assert!(store.get(b"key1").is_ok());

        sleep(Duration::from_millis(1100));

        assert_eq!(store.get(b"key1"), Err(StoreError::NotFound));
        let stats = store.stats();
        assert_eq!(stats.expired_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 1);
    }

    #[test]
    fn test_store_lru_eviction() {
        let store = MemoryStore::new(MIN_CAPACITY_BYTES);
        let chunk = Bytes::from(vec![7u8; store.max_entry_bytes() - 8]);
        // "keyNNNN" is 7 bytes
        let per_entry = 7 + chunk.len();
        let fits = store.capacity_bytes() / per_entry;

        for i in 0..fits {
            store.set(format!("key{i:04}").as_bytes(), chunk.clone(), None).unwrap();
        }
        assert_eq!(store.len(), fits);

        // Touch the oldest so the second oldest is evicted instead
        store.get(b"key0000").unwrap();
        store.set(b"overflow", chunk.clone(), None).unwrap();

        assert!(store.used_bytes() <= store.capacity_bytes());
        assert!(store.get(b"key0000").is_ok());
        assert_eq!(store.get(b"key0001"), Err(StoreError::NotFound));
        assert!(store.get(b"overflow").is_ok());
    }

    #[test]
    fn test_store_stats() {
        let store = store();

        store.set(b"key1", value("value1"), None).unwrap();
        store.get(b"key1").unwrap();
        let _ = store.get(b"nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.lookup_count, 2);
        assert_eq!(stats.entry_count, 1);
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
        assert!(stats.average_access_time > 0);
    }

    #[test]
    fn test_store_reset_stats_keeps_entries() {
        let store = store();
        store.set(b"key1", value("value1"), None).unwrap();
        store.get(b"key1").unwrap();
        let _ = store.get(b"missing");

        store.reset_stats();

        let stats = store.stats();
        assert_eq!(stats.hit_count, 0);
        assert_eq!(stats.miss_count, 0);
        assert_eq!(stats.lookup_count, 0);
        assert_eq!(stats.entry_count, 1);
        assert!(store.get(b"key1").is_ok());
    }

    #[test]
    fn test_store_purge_expired() {
        let store = store();

        store
            .set(b"key1", value("value1"), Some(Duration::from_secs(1)))
            .unwrap();
        store
            .set(b"key2", value("value2"), Some(Duration::from_secs(10)))
            .unwrap();

        sleep(Duration::from_millis(1100));

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.used_bytes(), 10);
        assert_eq!(store.stats().expired_count, 1);
        assert!(store.get(b"key2").is_ok());
    }

    #[test]
    fn test_store_key_too_long() {
        let store = store();
        let long_key = vec![b'x'; MAX_KEY_LENGTH + 1];

        let result = store.set(&long_key, value("value"), None);
        assert!(matches!(result, Err(StoreError::KeyTooLarge { .. })));
    }

    #[test]
    fn test_store_entry_too_large() {
        let store = store();
        let large_value = Bytes::from(vec![b'x'; store.max_entry_bytes()]);

        let result = store.set(b"key", large_value, None);
        assert!(matches!(result, Err(StoreError::EntryTooLarge { .. })));
        assert!(store.is_empty());
    }
}
