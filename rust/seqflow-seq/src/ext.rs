//! Combinators and consumers available on every [`Sequence`].

use std::hash::Hash;
use std::ops::Add;

use seqflow_collections::ordering::{Natural, by_key, max_of, min_of};
use seqflow_collections::{Comparator, Deque, Heap, OrderedMap};
use seqflow_workflow::done_signal::DoneSignal;
use seqflow_workflow::simple_mpmc::Sender;

use crate::adapters::stateful::{
    Chunks, DedupBy, DedupByKey, GroupBy, Rev, Scan, SortedBy, UniqueBy, Windows,
};
use crate::adapters::{
    Chain, Enumerate, Exclude, Filter, FilterMap, FlatMap, Flatten, Inspect, Map, MapWhile, Skip,
    SkipWhile, StepBy, Take, TakeWhile, Zip,
};
use crate::channel;
use crate::pull::{Pull, Rest};
use crate::{BoxSeq, IntoSequence, Sequence};

/// Extension trait with the lazy combinators and the terminal consumers.
///
/// Combinators return new sequences and do no work until a consumer drives
/// them. Consumers drive the sequence on the calling thread and stop pulling
/// elements as soon as their answer is known.
pub trait SequenceExt: Sequence {
    // ---- stateless combinators ----

    fn map<B, F>(self, f: F) -> Map<Self, F>
    where
        F: FnMut(Self::Item) -> B,
    {
        Map { inner: self, f }
    }

    /// Keeps the elements matching `pred`.
    fn filter<P>(self, pred: P) -> Filter<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        Filter { inner: self, pred }
    }

    /// Drops the elements matching `pred`.
    fn exclude<P>(self, pred: P) -> Exclude<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        Exclude { inner: self, pred }
    }

    fn filter_map<B, F>(self, f: F) -> FilterMap<Self, F>
    where
        F: FnMut(Self::Item) -> Option<B>,
    {
        FilterMap { inner: self, f }
    }

    fn inspect<F>(self, f: F) -> Inspect<Self, F>
    where
        F: FnMut(&Self::Item),
    {
        Inspect { inner: self, f }
    }

    fn enumerate(self) -> Enumerate<Self> {
        Enumerate { inner: self }
    }

    /// Maps elements until `f` returns `None`, then ends.
    fn map_while<B, F>(self, f: F) -> MapWhile<Self, F>
    where
        F: FnMut(Self::Item) -> Option<B>,
    {
        MapWhile { inner: self, f }
    }

    fn take_while<P>(self, pred: P) -> TakeWhile<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        TakeWhile { inner: self, pred }
    }

    fn skip_while<P>(self, pred: P) -> SkipWhile<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        SkipWhile { inner: self, pred }
    }

    /// Yields at most `n` elements. The source is not driven at all when
    /// `n` is 0, and is stopped right after the `n`-th element.
    fn take(self, n: usize) -> Take<Self> {
        Take { inner: self, n }
    }

    fn skip(self, n: usize) -> Skip<Self> {
        Skip { inner: self, n }
    }

    /// Yields the first element and then every `step`-th one after it.
    ///
    /// # Panics
    ///
    /// Panics if `step` is 0.
    fn step_by(self, step: usize) -> StepBy<Self> {
        assert!(step != 0, "step_by requires a non-zero step");
        StepBy { inner: self, step }
    }

    /// Appends `other` after this sequence.
    fn chain<B>(self, other: B) -> Chain<Self, B::IntoSeq>
    where
        B: IntoSequence<Item = Self::Item>,
    {
        Chain {
            first: self,
            second: other.into_sequence(),
        }
    }

    /// Concatenates the nested sequences one level deep.
    ///
    /// Works for any element type that converts into a [`Sequence`], such as
    /// `Vec<T>`, `Option<T>`, borrowed slices or other pipelines.
    fn flatten(self) -> Flatten<Self>
    where
        Self::Item: IntoSequence,
    {
        Flatten { inner: self }
    }

    fn flat_map<U, F>(self, f: F) -> FlatMap<Self, F>
    where
        U: IntoSequence,
        F: FnMut(Self::Item) -> U,
    {
        FlatMap { inner: self, f }
    }

    /// Pairs each element with the next item pulled from `other`, ending
    /// when either side runs out.
    ///
    /// To zip two push sequences, turn the second into a cursor with
    /// [`pull`](Self::pull) first.
    fn zip<I>(self, other: I) -> Zip<Self, I::IntoIter>
    where
        I: IntoIterator,
    {
        Zip {
            inner: self,
            other: other.into_iter(),
        }
    }

    // ---- stateful combinators ----

    /// Removes consecutive duplicates.
    fn dedup(self) -> DedupBy<Self, fn(&Self::Item, &Self::Item) -> bool>
    where
        Self::Item: PartialEq + Clone,
    {
        DedupBy {
            inner: self,
            same: <Self::Item as PartialEq>::eq,
        }
    }

    /// Removes consecutive elements for which `same(previous, current)` holds.
    fn dedup_by<F>(self, same: F) -> DedupBy<Self, F>
    where
        Self::Item: Clone,
        F: FnMut(&Self::Item, &Self::Item) -> bool,
    {
        DedupBy { inner: self, same }
    }

    fn dedup_by_key<K, F>(self, key: F) -> DedupByKey<Self, F>
    where
        K: PartialEq,
        F: FnMut(&Self::Item) -> K,
    {
        DedupByKey { inner: self, key }
    }

    /// Removes every repeated element, keeping first occurrences.
    fn unique(self) -> UniqueBy<Self, fn(&Self::Item) -> Self::Item>
    where
        Self::Item: Hash + Eq + Clone,
    {
        UniqueBy {
            inner: self,
            key: <Self::Item as Clone>::clone,
        }
    }

    fn unique_by<K, F>(self, key: F) -> UniqueBy<Self, F>
    where
        K: Hash + Eq,
        F: FnMut(&Self::Item) -> K,
    {
        UniqueBy { inner: self, key }
    }

    /// Yields `init`, then the running accumulation after each element.
    fn scan<A, F>(self, init: A, f: F) -> Scan<Self, A, F>
    where
        A: Clone,
        F: FnMut(&A, Self::Item) -> A,
    {
        Scan {
            inner: self,
            init,
            f,
        }
    }

    /// # Panics
    ///
    /// Panics if `size` is 0.
    fn windows(self, size: usize) -> Windows<Self>
    where
        Self::Item: Clone,
    {
        assert!(size != 0, "window size must be non-zero");
        Windows { inner: self, size }
    }

    /// # Panics
    ///
    /// Panics if `size` is 0.
    fn chunks(self, size: usize) -> Chunks<Self> {
        assert!(size != 0, "chunk size must be non-zero");
        Chunks { inner: self, size }
    }

    /// Groups consecutive elements with equal keys.
    fn group_by<K, F>(self, key: F) -> GroupBy<Self, F>
    where
        K: PartialEq,
        F: FnMut(&Self::Item) -> K,
    {
        GroupBy { inner: self, key }
    }

    fn sorted(self) -> SortedBy<Self, Natural>
    where
        Self::Item: Ord,
    {
        SortedBy {
            inner: self,
            cmp: Natural,
        }
    }

    fn sorted_by<C>(self, cmp: C) -> SortedBy<Self, C>
    where
        C: Comparator<Self::Item>,
    {
        SortedBy { inner: self, cmp }
    }

    fn rev(self) -> Rev<Self> {
        Rev { inner: self }
    }

    fn boxed<'a>(self) -> BoxSeq<'a, Self::Item>
    where
        Self: 'a,
    {
        BoxSeq::new(self)
    }

    // ---- consumers ----

    fn for_each<F>(self, mut f: F)
    where
        F: FnMut(Self::Item),
    {
        self.drive(&mut |x| {
            f(x);
            true
        });
    }

    /// Drives the sequence with a visitor that can stop it. Returns `false`
    /// if the visitor stopped early.
    fn range<F>(self, mut f: F) -> bool
    where
        F: FnMut(Self::Item) -> bool,
    {
        self.drive(&mut f)
    }

    /// Collects into any default-constructible, extendable container.
    fn collect<B>(self) -> B
    where
        B: Default + Extend<Self::Item>,
    {
        let mut out = B::default();
        self.drive(&mut |x| {
            out.extend(Some(x));
            true
        });
        out
    }

    fn collect_vec(self) -> Vec<Self::Item> {
        let mut out = Vec::new();
        self.drive(&mut |x| {
            out.push(x);
            true
        });
        out
    }

    fn collect_deque(self) -> Deque<Self::Item> {
        let mut out = Deque::new();
        self.drive(&mut |x| {
            out.push_back(x);
            true
        });
        out
    }

    fn count(self) -> usize {
        let mut n = 0;
        self.drive(&mut |_| {
            n += 1;
            true
        });
        n
    }

    fn first(self) -> Option<Self::Item> {
        let mut found = None;
        self.drive(&mut |x| {
            found = Some(x);
            false
        });
        found
    }

    fn last(self) -> Option<Self::Item> {
        let mut found = None;
        self.drive(&mut |x| {
            found = Some(x);
            true
        });
        found
    }

    /// Returns the zero-based `n`-th element.
    fn nth(self, n: usize) -> Option<Self::Item> {
        self.skip(n).first()
    }

    fn find<P>(self, mut pred: P) -> Option<Self::Item>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        let mut found = None;
        self.drive(&mut |x| {
            if pred(&x) {
                found = Some(x);
                return false;
            }
            true
        });
        found
    }

    fn position<P>(self, mut pred: P) -> Option<usize>
    where
        P: FnMut(Self::Item) -> bool,
    {
        let mut index = 0;
        let mut found = None;
        self.drive(&mut |x| {
            if pred(x) {
                found = Some(index);
                return false;
            }
            index += 1;
            true
        });
        found
    }

    fn any<P>(self, mut pred: P) -> bool
    where
        P: FnMut(Self::Item) -> bool,
    {
        !self.drive(&mut |x| !pred(x))
    }

    fn all<P>(self, mut pred: P) -> bool
    where
        P: FnMut(Self::Item) -> bool,
    {
        self.drive(&mut pred)
    }

    fn fold<A, F>(self, init: A, mut f: F) -> A
    where
        F: FnMut(A, Self::Item) -> A,
    {
        let mut acc = Some(init);
        self.drive(&mut |x| {
            acc = Option::take(&mut acc).map(|a| f(a, x));
            true
        });
        // The accumulator is put back after every step.
        acc.expect("accumulator")
    }

    fn reduce<F>(self, mut f: F) -> Option<Self::Item>
    where
        F: FnMut(Self::Item, Self::Item) -> Self::Item,
    {
        let mut acc: Option<Self::Item> = None;
        self.drive(&mut |x| {
            acc = Some(match Option::take(&mut acc) {
                Some(a) => f(a, x),
                None => x,
            });
            true
        });
        acc
    }

    fn sum(self) -> Self::Item
    where
        Self::Item: Default + Add<Output = Self::Item>,
    {
        self.fold(<Self::Item as Default>::default(), |a, b| a + b)
    }

    /// The first minimum under `cmp`.
    fn min_by<C>(self, cmp: C) -> Option<Self::Item>
    where
        C: Comparator<Self::Item>,
    {
        self.reduce(|a, b| min_of(&cmp, a, b))
    }

    /// The last maximum under `cmp`.
    fn max_by<C>(self, cmp: C) -> Option<Self::Item>
    where
        C: Comparator<Self::Item>,
    {
        self.reduce(|a, b| max_of(&cmp, a, b))
    }

    fn min_by_key<K, F>(self, key: F) -> Option<Self::Item>
    where
        K: Ord,
        F: Fn(&Self::Item) -> K,
    {
        self.min_by(by_key(key))
    }

    fn max_by_key<K, F>(self, key: F) -> Option<Self::Item>
    where
        K: Ord,
        F: Fn(&Self::Item) -> K,
    {
        self.max_by(by_key(key))
    }

    /// Splits the elements into `(matching, rest)`, preserving order.
    fn partition<P>(self, mut pred: P) -> (Vec<Self::Item>, Vec<Self::Item>)
    where
        P: FnMut(&Self::Item) -> bool,
    {
        let mut yes = Vec::new();
        let mut no = Vec::new();
        self.for_each(|x| {
            if pred(&x) {
                yes.push(x)
            } else {
                no.push(x)
            }
        });
        (yes, no)
    }

    /// Groups all elements by key. Groups appear in order of their first
    /// element; each group keeps sequence order.
    fn group_into_map<K, F>(self, mut key: F) -> OrderedMap<K, Vec<Self::Item>>
    where
        K: Eq,
        F: FnMut(&Self::Item) -> K,
    {
        let mut groups = OrderedMap::new();
        self.for_each(|x| {
            groups.get_or_insert_with(key(&x), Vec::new).push(x);
        });
        groups
    }

    fn into_heap<C>(self, cmp: C) -> Heap<Self::Item, C>
    where
        C: Comparator<Self::Item>,
    {
        let mut heap = Heap::new(cmp);
        self.for_each(|x| heap.push(x));
        heap
    }

    // ---- Result-carrying consumers ----

    /// Runs `f` on every `Ok` value, stopping at the first `Err`.
    fn try_for_each<T, E, F>(self, mut f: F) -> Result<(), E>
    where
        Self: Sequence<Item = Result<T, E>>,
        F: FnMut(T),
    {
        let mut error = None;
        self.drive(&mut |x| match x {
            Ok(v) => {
                f(v);
                true
            }
            Err(e) => {
                error = Some(e);
                false
            }
        });
        error.map_or(Ok(()), Err)
    }

    fn try_fold<T, E, A, F>(self, init: A, mut f: F) -> Result<A, E>
    where
        Self: Sequence<Item = Result<T, E>>,
        F: FnMut(A, T) -> A,
    {
        let mut acc = Some(init);
        let mut error = None;
        self.drive(&mut |x| match x {
            Ok(v) => {
                acc = Option::take(&mut acc).map(|a| f(a, v));
                true
            }
            Err(e) => {
                error = Some(e);
                false
            }
        });
        match error {
            Some(e) => Err(e),
            None => Ok(acc.expect("accumulator")),
        }
    }

    fn try_collect<T, E, B>(self) -> Result<B, E>
    where
        Self: Sequence<Item = Result<T, E>>,
        B: Default + Extend<T>,
    {
        let mut out = B::default();
        self.try_for_each(|v| out.extend(Some(v)))?;
        Ok(out)
    }

    /// `Ok(true)` if an `Ok` value matching `pred` comes before any `Err`.
    fn try_any<T, E, P>(self, mut pred: P) -> Result<bool, E>
    where
        Self: Sequence<Item = Result<T, E>>,
        P: FnMut(T) -> bool,
    {
        let mut outcome = Ok(false);
        self.drive(&mut |x| match x {
            Ok(v) => {
                if pred(v) {
                    outcome = Ok(true);
                    return false;
                }
                true
            }
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome
    }

    /// `Ok(false)` if an `Ok` value failing `pred` comes before any `Err`.
    fn try_all<T, E, P>(self, mut pred: P) -> Result<bool, E>
    where
        Self: Sequence<Item = Result<T, E>>,
        P: FnMut(T) -> bool,
    {
        self.try_any(|v| !pred(v)).map(|any_failed| !any_failed)
    }

    fn try_find<T, E, P>(self, mut pred: P) -> Result<Option<T>, E>
    where
        Self: Sequence<Item = Result<T, E>>,
        P: FnMut(&T) -> bool,
    {
        let mut outcome = Ok(None);
        self.drive(&mut |x| match x {
            Ok(v) if pred(&v) => {
                outcome = Ok(Some(v));
                false
            }
            Ok(_) => true,
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome
    }

    // ---- channel hand-off ----

    /// Sends every element into `tx`; see [`channel::to_channel`].
    fn to_channel(self, tx: &Sender<Self::Item>) -> seqflow_common::Result<()> {
        channel::to_channel(self, tx)
    }

    /// Sends elements into `tx` until exhausted or `done` fires; see
    /// [`channel::to_channel_until`].
    fn to_channel_until(
        self,
        tx: &Sender<Self::Item>,
        done: &DoneSignal,
    ) -> seqflow_common::Result<bool>
    where
        Self::Item: Send + 'static,
    {
        channel::to_channel_until(self, tx, done)
    }

    // ---- pull-style consumption ----

    /// Turns the sequence into a cursor. See [`Pull`].
    fn pull(self) -> Pull<Self::Item>
    where
        Self: Send + 'static,
        Self::Item: Send + 'static,
    {
        Pull::new(self)
    }

    /// Takes one element and returns it with the remainder of the sequence.
    ///
    /// ```
    /// use seqflow_seq::{SequenceExt, from_iter};
    ///
    /// let (first, rest) = from_iter(vec![1, 2, 3]).next_split();
    /// assert_eq!(first, Some(1));
    /// let (second, rest) = rest.next_split();
    /// assert_eq!(second, Some(2));
    /// assert_eq!(rest.collect_vec(), vec![3]);
    /// ```
    fn next_split(self) -> (Option<Self::Item>, Rest<Self::Item>)
    where
        Self: Send + 'static,
        Self::Item: Send + 'static,
    {
        Rest::new(self.pull()).next_split()
    }
}

impl<S: Sequence> SequenceExt for S {}
