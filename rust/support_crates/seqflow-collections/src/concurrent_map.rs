//! Sharded concurrent map with atomically swapped value slots.
//!
//! Keys are distributed over a fixed number of shards, each guarded by an
//! `RwLock`. Every key owns a slot holding an `Option<Arc<V>>` behind an
//! [`ArcSwapOption`], so reads and writes of an existing key only take the
//! shard's *shared* lock and then operate on the slot with atomic load, swap
//! and compare-and-swap. The exclusive lock is taken only to create a slot for
//! a new key, to delete a key, or to clear the map.
//!
//! Because slot operations run while the shard's shared lock is held, a delete
//! (which needs the exclusive lock) can never race with an in-flight update of
//! the same slot: updates are never written into a slot that is no longer
//! reachable from the map.
//!
//! The per-key operations are exposed through the short-lived [`Entry`] handle:
//!
//! ```
//! use seqflow_collections::ConcurrentMap;
//!
//! let map = ConcurrentMap::new();
//! map.entry("hits").or_set(0u64);
//! std::thread::scope(|s| {
//!     for _ in 0..4 {
//!         s.spawn(|| {
//!             for _ in 0..100 {
//!                 map.entry("hits").transform(|n| n + 1);
//!             }
//!         });
//!     }
//! });
//! assert_eq!(*map.get("hits").unwrap(), 400);
//! ```

use std::{
    borrow::Borrow,
    hash::{BuildHasher, Hash},
    sync::{Arc, RwLock},
};

use ahash::{AHashMap, RandomState};
use arc_swap::{ArcSwapOption, Guard};

type Shard<K, V> = RwLock<AHashMap<K, ArcSwapOption<V>>>;

/// A concurrent key to `Arc<V>` map. See the [module documentation](self).
pub struct ConcurrentMap<K, V> {
    shards: Box<[Shard<K, V>]>,
    hasher: RandomState,
}

impl<K: Hash + Eq, V> ConcurrentMap<K, V> {
    /// Creates a map with a shard count derived from the available parallelism.
    pub fn new() -> Self {
        let shards = std::thread::available_parallelism()
            .map(|n| n.get() * 4)
            .unwrap_or(16)
            .next_power_of_two();
        Self::with_shards(shards)
    }

    /// Creates a map with exactly `shards` shards (at least one).
    pub fn with_shards(shards: usize) -> Self {
        let shards = shards.max(1);
        ConcurrentMap {
            shards: (0..shards).map(|_| RwLock::new(AHashMap::new())).collect(),
            hasher: RandomState::new(),
        }
    }

    /// Returns a handle bound to `key`.
    pub fn entry(&self, key: K) -> Entry<'_, K, V> {
        Entry { map: self, key }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let shard = self.shard(key).read().unwrap();
        shard.get(key).and_then(|slot| slot.load_full())
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut shard = self.shard(key).write().unwrap();
        shard.remove(key).and_then(ArcSwapOption::into_inner)
    }

    /// Number of keys holding a value. The result may be stale as soon as it
    /// is returned if other threads are writing.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| {
                let shard = shard.read().unwrap();
                shard.values().filter(|slot| slot.load().is_some()).count()
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.write().unwrap().clear();
        }
    }

    /// Visits every key/value pair, one shard at a time.
    ///
    /// The shard being visited is read-locked for the duration of the callback,
    /// so `f` must not delete keys from this map.
    pub fn for_each(&self, mut f: impl FnMut(&K, &Arc<V>)) {
        for shard in self.shards.iter() {
            let shard = shard.read().unwrap();
            for (key, slot) in shard.iter() {
                if let Some(value) = slot.load_full() {
                    f(key, &value);
                }
            }
        }
    }

    fn shard<Q>(&self, key: &Q) -> &Shard<K, V>
    where
        Q: Hash + ?Sized,
    {
        let hash = BuildHasher::hash_one(&self.hasher, key);
        &self.shards[(hash as usize) % self.shards.len()]
    }

    /// Runs `f` on the slot of an existing key under the shard's shared lock.
    fn with_slot<R>(&self, key: &K, f: impl FnOnce(&ArcSwapOption<V>) -> R) -> Option<R> {
        let shard = self.shard(key).read().unwrap();
        shard.get(key).map(f)
    }
}

impl<K: Hash + Eq + Clone, V> ConcurrentMap<K, V> {
    /// Runs `f` on the slot of `key`, creating an empty slot first if needed.
    fn with_slot_or_insert<R>(&self, key: &K, f: impl FnOnce(&ArcSwapOption<V>) -> R) -> R {
        let lock = self.shard(key);
        {
            let shard = lock.read().unwrap();
            if let Some(slot) = shard.get(key) {
                return f(slot);
            }
        }
        let mut shard = lock.write().unwrap();
        let slot = shard
            .entry(key.clone())
            .or_insert_with(ArcSwapOption::empty);
        f(slot)
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn insert(&self, key: K, value: V) -> Option<Arc<V>> {
        self.entry(key).set(value)
    }

    /// Copies out every key/value pair.
    pub fn snapshot(&self) -> Vec<(K, Arc<V>)> {
        let mut out = Vec::new();
        self.for_each(|k, v| out.push((k.clone(), v.clone())));
        out
    }

    pub fn keys(&self) -> Vec<K> {
        let mut out = Vec::new();
        self.for_each(|k, _| out.push(k.clone()));
        out
    }
}

impl<K: Hash + Eq, V> Default for ConcurrentMap<K, V> {
    fn default() -> Self {
        ConcurrentMap::new()
    }
}

impl<K, V> std::fmt::Debug for ConcurrentMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentMap")
            .field("shards", &self.shards.len())
            .finish_non_exhaustive()
    }
}

/// A view of one key of a [`ConcurrentMap`].
///
/// The handle does not own the map and holds no lock between calls; every
/// operation re-resolves the key's slot.
pub struct Entry<'a, K, V> {
    map: &'a ConcurrentMap<K, V>,
    key: K,
}

impl<K: Hash + Eq + Clone, V> Entry<'_, K, V> {
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Atomically loads the current value.
    pub fn get(&self) -> Option<Arc<V>> {
        self.map
            .with_slot(&self.key, |slot| slot.load_full())
            .flatten()
    }

    /// Unconditionally stores `value`, returning the previous value.
    pub fn set(&self, value: V) -> Option<Arc<V>> {
        let value = Arc::new(value);
        self.map
            .with_slot_or_insert(&self.key, |slot| slot.swap(Some(value)))
    }

    /// Stores `value` only if the key holds no value. Returns `true` if this
    /// call stored it.
    pub fn set_if_absent(&self, value: V) -> bool {
        let value = Arc::new(value);
        let current = self.install_with(|| value.clone());
        Arc::ptr_eq(&current, &value)
    }

    /// Returns the current value, storing `value` first if the key is absent.
    pub fn or_set(&self, value: V) -> Arc<V> {
        self.or_set_with(|| value)
    }

    /// Returns the current value, storing `f()` first if the key is absent.
    ///
    /// `f` is not called when a value is already present. It may be called and
    /// its result discarded if another writer stores a value concurrently.
    pub fn or_set_with(&self, f: impl FnOnce() -> V) -> Arc<V> {
        self.install_with(|| Arc::new(f()))
    }

    /// Returns the value present after trying to store `f()` into an empty
    /// slot. The result is the stored `Arc` itself only if this call won.
    fn install_with(&self, f: impl FnOnce() -> Arc<V>) -> Arc<V> {
        if let Some(existing) = self.get() {
            return existing;
        }
        self.map.with_slot_or_insert(&self.key, |slot| {
            let current = slot.load_full();
            if let Some(existing) = current {
                return existing;
            }
            let value = f();
            let prev = slot.compare_and_swap(&current, Some(value.clone()));
            match Guard::into_inner(prev) {
                None => value,
                Some(winner) => winner,
            }
        })
    }

    pub fn or_default(&self) -> Arc<V>
    where
        V: Default,
    {
        self.or_set_with(V::default)
    }

    /// Replaces the value with `f(current)` using a compare-and-swap loop.
    ///
    /// `f` runs once per attempt; an attempt is repeated only if another writer
    /// replaced the value between the load and the swap. No update is ever
    /// lost. Returns the stored value, or `None` without calling `f` if the key
    /// holds no value.
    pub fn transform(&self, mut f: impl FnMut(&V) -> V) -> Option<Arc<V>> {
        self.map
            .with_slot(&self.key, |slot| {
                let mut current = slot.load_full();
                loop {
                    let value = Arc::new(f(current.as_deref()?));
                    let prev = slot.compare_and_swap(&current, Some(value.clone()));
                    let prev = Guard::into_inner(prev);
                    if same_value(&prev, &current) {
                        return Some(value);
                    }
                    current = prev;
                }
            })
            .flatten()
    }

    /// Atomically removes the key, returning its value.
    pub fn delete(&self) -> Option<Arc<V>> {
        self.map.remove(&self.key)
    }
}

fn same_value<V>(a: &Option<Arc<V>>, b: &Option<Arc<V>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_basic_entry_ops() {
        let map = ConcurrentMap::<String, i32>::with_shards(4);
        let e = map.entry("a".to_string());
        assert_eq!(e.get(), None);
        assert_eq!(e.set(1), None);
        assert_eq!(e.set(2).as_deref(), Some(&1));
        assert_eq!(*e.or_set(5), 2);
        assert_eq!(e.delete().as_deref(), Some(&2));
        assert_eq!(e.get(), None);
        assert_eq!(e.delete(), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_set_if_absent_reports_the_stored_value() {
        let map = ConcurrentMap::with_shards(2);
        let e = map.entry('k');
        assert!(e.set_if_absent(10));
        assert!(!e.set_if_absent(20));
        assert_eq!(e.get().as_deref(), Some(&10));
        e.delete();
        assert!(e.set_if_absent(30));
        assert_eq!(*map.get(&'k').unwrap(), 30);
    }

    #[test]
    fn test_or_set_with_skips_generator_when_present() {
        let map = ConcurrentMap::new();
        let calls = AtomicUsize::new(0);
        let make = || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![1, 2, 3]
        };
        map.entry(7u32).or_set_with(make);
        map.entry(7u32).or_set_with(make);
        map.entry(7u32).or_set_with(make);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(map.get(&7).unwrap().len(), 3);
    }

    #[test]
    fn test_transform_absent_does_not_call() {
        let map = ConcurrentMap::<u8, u8>::new();
        let out = map.entry(1).transform(|_| panic!("must not run"));
        assert!(out.is_none());
        assert!(!map.contains_key(&1));
    }

    #[test]
    fn test_concurrent_transform_no_lost_updates() {
        for k in [10usize, 1000, 10_000] {
            let map = ConcurrentMap::new();
            map.insert("counter", 5usize);
            let threads = 8;
            std::thread::scope(|s| {
                for t in 0..threads {
                    let map = &map;
                    s.spawn(move || {
                        let share = k / threads + usize::from(t < k % threads);
                        for _ in 0..share {
                            map.entry("counter").transform(|n| n + 1);
                        }
                    });
                }
            });
            assert_eq!(*map.get("counter").unwrap(), 5 + k);
        }
    }

    #[test]
    fn test_concurrent_set_if_absent_single_winner() {
        let map = ConcurrentMap::new();
        let winners = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for t in 0..16 {
                let (map, winners) = (&map, &winners);
                s.spawn(move || {
                    if map.entry(42u64).set_if_absent(t) {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });
        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_snapshot_and_clear() {
        let map = ConcurrentMap::with_shards(3);
        for i in 0..50 {
            map.insert(i, i * i);
        }
        let mut snap = map.snapshot();
        snap.sort_by_key(|(k, _)| *k);
        assert_eq!(snap.len(), 50);
        assert_eq!(*snap[7].1, 49);
        assert_eq!(map.remove(&7).as_deref(), Some(&49));
        assert_eq!(map.keys().len(), 49);
        map.clear();
        assert!(map.is_empty());
    }
}
