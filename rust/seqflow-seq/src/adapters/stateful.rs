//! Adapters that remember or buffer elements while driving.
//!
//! Windowing and grouping adapters copy elements into owned buffers before
//! yielding them; a sequence gives no guarantee that its elements share any
//! backing storage.

use std::hash::Hash;

use ahash::AHashSet;
use seqflow_collections::{Comparator, Deque};

use crate::Sequence;

/// Collapses runs of consecutive elements that `same` deems equal, keeping
/// the first element of each run.
///
/// Created by [`SequenceExt::dedup`](crate::SequenceExt::dedup) and
/// [`SequenceExt::dedup_by`](crate::SequenceExt::dedup_by).
#[derive(Debug, Clone)]
pub struct DedupBy<S, F> {
    pub(crate) inner: S,
    pub(crate) same: F,
}

impl<S, F> Sequence for DedupBy<S, F>
where
    S: Sequence,
    S::Item: Clone,
    F: FnMut(&S::Item, &S::Item) -> bool,
{
    type Item = S::Item;

    fn drive<V: FnMut(S::Item) -> bool>(self, visit: &mut V) -> bool {
        let DedupBy { inner, mut same } = self;
        let mut prev: Option<S::Item> = None;
        inner.drive(&mut |x| {
            if let Some(p) = &prev {
                if same(p, &x) {
                    return true;
                }
            }
            prev = Some(x.clone());
            visit(x)
        })
    }
}

/// Collapses runs of consecutive elements with equal keys.
///
/// Only the key of the previous element is kept, so the element type need
/// not be `Clone`. Created by
/// [`SequenceExt::dedup_by_key`](crate::SequenceExt::dedup_by_key).
#[derive(Debug, Clone)]
pub struct DedupByKey<S, F> {
    pub(crate) inner: S,
    pub(crate) key: F,
}

impl<S, K, F> Sequence for DedupByKey<S, F>
where
    S: Sequence,
    K: PartialEq,
    F: FnMut(&S::Item) -> K,
{
    type Item = S::Item;

    fn drive<V: FnMut(S::Item) -> bool>(self, visit: &mut V) -> bool {
        let DedupByKey { inner, mut key } = self;
        let mut prev: Option<K> = None;
        inner.drive(&mut |x| {
            let k = key(&x);
            if prev.as_ref() == Some(&k) {
                return true;
            }
            prev = Some(k);
            visit(x)
        })
    }
}

/// Drops every element whose key was already seen, anywhere earlier in the
/// sequence. Holds one key per distinct element.
///
/// Created by [`SequenceExt::unique`](crate::SequenceExt::unique) and
/// [`SequenceExt::unique_by`](crate::SequenceExt::unique_by).
#[derive(Debug, Clone)]
pub struct UniqueBy<S, F> {
    pub(crate) inner: S,
    pub(crate) key: F,
}

impl<S, K, F> Sequence for UniqueBy<S, F>
where
    S: Sequence,
    K: Hash + Eq,
    F: FnMut(&S::Item) -> K,
{
    type Item = S::Item;

    fn drive<V: FnMut(S::Item) -> bool>(self, visit: &mut V) -> bool {
        let UniqueBy { inner, mut key } = self;
        let mut seen = AHashSet::new();
        inner.drive(&mut |x| !seen.insert(key(&x)) || visit(x))
    }
}

/// Running accumulation that yields the initial value first.
///
/// Created by [`SequenceExt::scan`](crate::SequenceExt::scan).
#[derive(Debug, Clone)]
pub struct Scan<S, A, F> {
    pub(crate) inner: S,
    pub(crate) init: A,
    pub(crate) f: F,
}

impl<S, A, F> Sequence for Scan<S, A, F>
where
    S: Sequence,
    A: Clone,
    F: FnMut(&A, S::Item) -> A,
{
    type Item = A;

    fn drive<V: FnMut(A) -> bool>(self, visit: &mut V) -> bool {
        let Scan { inner, init, mut f } = self;
        if !visit(init.clone()) {
            return false;
        }
        let mut acc = init;
        inner.drive(&mut |x| {
            acc = f(&acc, x);
            visit(acc.clone())
        })
    }
}

/// Overlapping windows of a fixed size.
///
/// Created by [`SequenceExt::windows`](crate::SequenceExt::windows).
#[derive(Debug, Clone)]
pub struct Windows<S> {
    pub(crate) inner: S,
    pub(crate) size: usize,
}

impl<S> Sequence for Windows<S>
where
    S: Sequence,
    S::Item: Clone,
{
    type Item = Vec<S::Item>;

    fn drive<V: FnMut(Vec<S::Item>) -> bool>(self, visit: &mut V) -> bool {
        let size = self.size;
        let mut window = Deque::with_capacity(size);
        self.inner.drive(&mut |x| {
            if window.len() == size {
                window.pop_front();
            }
            window.push_back(x);
            window.len() < size || visit(window.to_vec())
        })
    }
}

/// Non-overlapping chunks; the last chunk may be shorter.
///
/// Created by [`SequenceExt::chunks`](crate::SequenceExt::chunks).
#[derive(Debug, Clone)]
pub struct Chunks<S> {
    pub(crate) inner: S,
    pub(crate) size: usize,
}

impl<S: Sequence> Sequence for Chunks<S> {
    type Item = Vec<S::Item>;

    fn drive<V: FnMut(Vec<S::Item>) -> bool>(self, visit: &mut V) -> bool {
        let size = self.size;
        let mut chunk = Vec::with_capacity(size);
        let finished = self.inner.drive(&mut |x| {
            chunk.push(x);
            if chunk.len() < size {
                return true;
            }
            visit(std::mem::replace(&mut chunk, Vec::with_capacity(size)))
        });
        if !finished {
            return false;
        }
        chunk.is_empty() || visit(chunk)
    }
}

/// Runs of consecutive elements sharing a key, yielded as `(key, run)`.
///
/// Created by [`SequenceExt::group_by`](crate::SequenceExt::group_by).
#[derive(Debug, Clone)]
pub struct GroupBy<S, F> {
    pub(crate) inner: S,
    pub(crate) key: F,
}

impl<S, K, F> Sequence for GroupBy<S, F>
where
    S: Sequence,
    K: PartialEq,
    F: FnMut(&S::Item) -> K,
{
    type Item = (K, Vec<S::Item>);

    fn drive<V: FnMut((K, Vec<S::Item>)) -> bool>(self, visit: &mut V) -> bool {
        let GroupBy { inner, mut key } = self;
        let mut current: Option<(K, Vec<S::Item>)> = None;
        let finished = inner.drive(&mut |x| {
            let k = key(&x);
            if let Some((ck, run)) = &mut current {
                if *ck == k {
                    run.push(x);
                    return true;
                }
            }
            match current.replace((k, vec![x])) {
                Some(done) => visit(done),
                None => true,
            }
        });
        if !finished {
            return false;
        }
        current.is_none_or(|group| visit(group))
    }
}

/// Materializes the sequence and replays it sorted by a comparator.
///
/// Created by [`SequenceExt::sorted`](crate::SequenceExt::sorted) and
/// [`SequenceExt::sorted_by`](crate::SequenceExt::sorted_by). The sort is
/// stable.
#[derive(Debug, Clone)]
pub struct SortedBy<S, C> {
    pub(crate) inner: S,
    pub(crate) cmp: C,
}

impl<S, C> Sequence for SortedBy<S, C>
where
    S: Sequence,
    C: Comparator<S::Item>,
{
    type Item = S::Item;

    fn drive<V: FnMut(S::Item) -> bool>(self, visit: &mut V) -> bool {
        let SortedBy { inner, cmp } = self;
        let mut items = Vec::new();
        inner.drive(&mut |x| {
            items.push(x);
            true
        });
        items.sort_by(|a, b| cmp.compare(a, b));
        items.into_iter().all(visit)
    }
}

/// Materializes the sequence and replays it backwards.
///
/// Created by [`SequenceExt::rev`](crate::SequenceExt::rev).
#[derive(Debug, Clone)]
pub struct Rev<S> {
    pub(crate) inner: S,
}

impl<S: Sequence> Sequence for Rev<S> {
    type Item = S::Item;

    fn drive<V: FnMut(S::Item) -> bool>(self, visit: &mut V) -> bool {
        let mut items = Deque::new();
        self.inner.drive(&mut |x| {
            items.push_front(x);
            true
        });
        items.into_iter().all(visit)
    }
}
