//! Insertion-ordered map backed by a list of key/value pairs.

use std::{borrow::Borrow, cmp::Ordering, hash::Hash};

use ahash::{AHashMap, AHashSet};

use crate::ordering::Comparator;

/// A map that remembers the order in which keys were first inserted.
///
/// Entries live in a single `Vec<(K, V)>` without duplicate keys. Single-key
/// operations are linear scans that only require `K: Eq`. Batch operations
/// ([`set_all`](Self::set_all), [`delete_all`](Self::delete_all)) build a
/// temporary hash index so that they stay O(n + k) instead of O(n * k).
///
/// Iteration follows insertion order unless the map is explicitly re-sorted
/// with [`sort_by`](Self::sort_by) or [`sort_by_key`](Self::sort_by_key).
/// Equality is order sensitive: two maps are equal only when the same keys
/// appear in the same positions with equal values.
#[derive(Clone)]
pub struct OrderedMap<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        OrderedMap {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        OrderedMap {
            entries: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.entries.get(index).map(|(k, v)| (k, v))
    }

    pub fn first(&self) -> Option<(&K, &V)> {
        self.get_index(0)
    }

    pub fn last(&self) -> Option<(&K, &V)> {
        self.entries.last().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut V> + ExactSizeIterator {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + ExactSizeIterator {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (&K, &mut V)> + ExactSizeIterator {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    /// Keeps the entries for which `f` returns `true`, preserving their order.
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        self.entries.retain_mut(|(k, v)| f(k, v));
    }

    /// Re-sorts the entries with a caller-supplied comparator over the pairs.
    /// The sort is stable.
    pub fn sort_by<C>(&mut self, cmp: C)
    where
        C: Comparator<(K, V)>,
    {
        self.entries.sort_by(|a, b| cmp.compare(a, b));
    }

    /// Re-sorts the entries by a key derived from each pair. The sort is stable.
    pub fn sort_by_key<S: Ord>(&mut self, mut f: impl FnMut(&K, &V) -> S) {
        self.entries.sort_by_key(|(k, v)| f(k, v));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}

impl<K: Eq, V> OrderedMap<K, V> {
    /// Position of `key` in iteration order.
    pub fn index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.entries
            .iter()
            .position(|(k, _)| <K as Borrow<Q>>::borrow(k) == key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.index_of(key).is_some()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.index_of(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.index_of(key).map(|i| &mut self.entries[i].1)
    }

    /// Inserts or replaces the value for `key`.
    ///
    /// An existing key keeps its position and the previous value is returned;
    /// a new key is appended at the end.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        match self.index_of(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Returns the value for `key`, appending `f()` first if the key is absent.
    pub fn get_or_insert_with(&mut self, key: K, f: impl FnOnce() -> V) -> &mut V {
        let index = match self.index_of(&key) {
            Some(i) => i,
            None => {
                self.entries.push((key, f()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    /// Removes `key`, keeping the relative order of the remaining entries.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let index = self.index_of(key)?;
        Some(self.entries.remove(index).1)
    }
}

impl<K: Eq + Hash, V> OrderedMap<K, V> {
    /// Removes every key in `keys` in a single pass over the entries.
    ///
    /// Returns the number of entries removed.
    pub fn delete_all<'a, Q>(&mut self, keys: impl IntoIterator<Item = &'a Q>) -> usize
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized + 'a,
    {
        let doomed: AHashSet<&Q> = keys.into_iter().collect();
        if doomed.is_empty() {
            return 0;
        }
        let before = self.entries.len();
        self.entries
            .retain(|(k, _)| !doomed.contains(<K as Borrow<Q>>::borrow(k)));
        before - self.entries.len()
    }
}

impl<K: Eq + Hash + Clone, V> OrderedMap<K, V> {
    /// Upserts every pair in `pairs`, behaving like repeated [`set`](Self::set)
    /// calls but using a temporary position index for the whole batch.
    pub fn set_all(&mut self, pairs: impl IntoIterator<Item = (K, V)>) {
        let mut index: AHashMap<K, usize> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (k.clone(), i))
            .collect();
        for (key, value) in pairs {
            match index.get(&key) {
                Some(&i) => self.entries[i].1 = value,
                None => {
                    index.insert(key.clone(), self.entries.len());
                    self.entries.push((key, value));
                }
            }
        }
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        OrderedMap::new()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMap<K, V> {}

impl<K: PartialOrd, V: PartialOrd> PartialOrd for OrderedMap<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.entries.partial_cmp(&other.entries)
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Eq, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Eq, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
