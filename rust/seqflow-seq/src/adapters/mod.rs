//! Sequence adapters returned by [`SequenceExt`](crate::SequenceExt).
//!
//! Stateless adapters live here; adapters that buffer or remember elements
//! live in [`stateful`].

use crate::{IntoSequence, Sequence};

pub mod stateful;

/// Created by [`SequenceExt::map`](crate::SequenceExt::map).
#[derive(Debug, Clone)]
pub struct Map<S, F> {
    pub(crate) inner: S,
    pub(crate) f: F,
}

impl<S: Sequence, B, F: FnMut(S::Item) -> B> Sequence for Map<S, F> {
    type Item = B;

    fn drive<V: FnMut(B) -> bool>(self, visit: &mut V) -> bool {
        let Map { inner, mut f } = self;
        inner.drive(&mut |x| visit(f(x)))
    }
}

/// Created by [`SequenceExt::filter`](crate::SequenceExt::filter).
#[derive(Debug, Clone)]
pub struct Filter<S, P> {
    pub(crate) inner: S,
    pub(crate) pred: P,
}

impl<S: Sequence, P: FnMut(&S::Item) -> bool> Sequence for Filter<S, P> {
    type Item = S::Item;

    fn drive<V: FnMut(S::Item) -> bool>(self, visit: &mut V) -> bool {
        let Filter { inner, mut pred } = self;
        inner.drive(&mut |x| !pred(&x) || visit(x))
    }
}

/// Created by [`SequenceExt::exclude`](crate::SequenceExt::exclude).
#[derive(Debug, Clone)]
pub struct Exclude<S, P> {
    pub(crate) inner: S,
    pub(crate) pred: P,
}

impl<S: Sequence, P: FnMut(&S::Item) -> bool> Sequence for Exclude<S, P> {
    type Item = S::Item;

    fn drive<V: FnMut(S::Item) -> bool>(self, visit: &mut V) -> bool {
        let Exclude { inner, mut pred } = self;
        inner.drive(&mut |x| pred(&x) || visit(x))
    }
}

/// Created by [`SequenceExt::filter_map`](crate::SequenceExt::filter_map).
#[derive(Debug, Clone)]
pub struct FilterMap<S, F> {
    pub(crate) inner: S,
    pub(crate) f: F,
}

impl<S: Sequence, B, F: FnMut(S::Item) -> Option<B>> Sequence for FilterMap<S, F> {
    type Item = B;

    fn drive<V: FnMut(B) -> bool>(self, visit: &mut V) -> bool {
        let FilterMap { inner, mut f } = self;
        inner.drive(&mut |x| match f(x) {
            Some(y) => visit(y),
            None => true,
        })
    }
}

/// Created by [`SequenceExt::inspect`](crate::SequenceExt::inspect).
#[derive(Debug, Clone)]
pub struct Inspect<S, F> {
    pub(crate) inner: S,
    pub(crate) f: F,
}

impl<S: Sequence, F: FnMut(&S::Item)> Sequence for Inspect<S, F> {
    type Item = S::Item;

    fn drive<V: FnMut(S::Item) -> bool>(self, visit: &mut V) -> bool {
        let Inspect { inner, mut f } = self;
        inner.drive(&mut |x| {
            f(&x);
            visit(x)
        })
    }
}

/// Created by [`SequenceExt::enumerate`](crate::SequenceExt::enumerate).
#[derive(Debug, Clone)]
pub struct Enumerate<S> {
    pub(crate) inner: S,
}

impl<S: Sequence> Sequence for Enumerate<S> {
    type Item = (usize, S::Item);

    fn drive<V: FnMut((usize, S::Item)) -> bool>(self, visit: &mut V) -> bool {
        let mut index = 0;
        self.inner.drive(&mut |x| {
            let i = index;
            index += 1;
            visit((i, x))
        })
    }
}

/// Created by [`SequenceExt::map_while`](crate::SequenceExt::map_while).
#[derive(Debug, Clone)]
pub struct MapWhile<S, F> {
    pub(crate) inner: S,
    pub(crate) f: F,
}

impl<S: Sequence, B, F: FnMut(S::Item) -> Option<B>> Sequence for MapWhile<S, F> {
    type Item = B;

    fn drive<V: FnMut(B) -> bool>(self, visit: &mut V) -> bool {
        let MapWhile { inner, mut f } = self;
        let mut stopped = false;
        inner.drive(&mut |x| match f(x) {
            Some(y) => {
                stopped = !visit(y);
                !stopped
            }
            None => false,
        });
        !stopped
    }
}

/// Created by [`SequenceExt::take_while`](crate::SequenceExt::take_while).
#[derive(Debug, Clone)]
pub struct TakeWhile<S, P> {
    pub(crate) inner: S,
    pub(crate) pred: P,
}

impl<S: Sequence, P: FnMut(&S::Item) -> bool> Sequence for TakeWhile<S, P> {
    type Item = S::Item;

    fn drive<V: FnMut(S::Item) -> bool>(self, visit: &mut V) -> bool {
        let TakeWhile { inner, mut pred } = self;
        let mut stopped = false;
        inner.drive(&mut |x| {
            if !pred(&x) {
                return false;
            }
            stopped = !visit(x);
            !stopped
        });
        !stopped
    }
}

/// Created by [`SequenceExt::skip_while`](crate::SequenceExt::skip_while).
#[derive(Debug, Clone)]
pub struct SkipWhile<S, P> {
    pub(crate) inner: S,
    pub(crate) pred: P,
}

impl<S: Sequence, P: FnMut(&S::Item) -> bool> Sequence for SkipWhile<S, P> {
    type Item = S::Item;

    fn drive<V: FnMut(S::Item) -> bool>(self, visit: &mut V) -> bool {
        let SkipWhile { inner, mut pred } = self;
        let mut skipping = true;
        inner.drive(&mut |x| {
            if skipping && pred(&x) {
                return true;
            }
            skipping = false;
            visit(x)
        })
    }
}

/// Created by [`SequenceExt::take`](crate::SequenceExt::take).
#[derive(Debug, Clone)]
pub struct Take<S> {
    pub(crate) inner: S,
    pub(crate) n: usize,
}

impl<S: Sequence> Sequence for Take<S> {
    type Item = S::Item;

    fn drive<V: FnMut(S::Item) -> bool>(self, visit: &mut V) -> bool {
        let mut remaining = self.n;
        if remaining == 0 {
            return true;
        }
        let mut stopped = false;
        self.inner.drive(&mut |x| {
            remaining -= 1;
            stopped = !visit(x);
            !stopped && remaining > 0
        });
        !stopped
    }
}

/// Created by [`SequenceExt::skip`](crate::SequenceExt::skip).
#[derive(Debug, Clone)]
pub struct Skip<S> {
    pub(crate) inner: S,
    pub(crate) n: usize,
}

impl<S: Sequence> Sequence for Skip<S> {
    type Item = S::Item;

    fn drive<V: FnMut(S::Item) -> bool>(self, visit: &mut V) -> bool {
        let mut remaining = self.n;
        self.inner.drive(&mut |x| {
            if remaining > 0 {
                remaining -= 1;
                return true;
            }
            visit(x)
        })
    }
}

/// Created by [`SequenceExt::step_by`](crate::SequenceExt::step_by).
#[derive(Debug, Clone)]
pub struct StepBy<S> {
    pub(crate) inner: S,
    pub(crate) step: usize,
}

impl<S: Sequence> Sequence for StepBy<S> {
    type Item = S::Item;

    fn drive<V: FnMut(S::Item) -> bool>(self, visit: &mut V) -> bool {
        let step = self.step;
        let mut index = 0usize;
        self.inner.drive(&mut |x| {
            let keep = index % step == 0;
            index = index.wrapping_add(1);
            !keep || visit(x)
        })
    }
}

/// Created by [`SequenceExt::chain`](crate::SequenceExt::chain).
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
    pub(crate) first: A,
    pub(crate) second: B,
}

impl<A, B> Sequence for Chain<A, B>
where
    A: Sequence,
    B: Sequence<Item = A::Item>,
{
    type Item = A::Item;

    fn drive<V: FnMut(A::Item) -> bool>(self, visit: &mut V) -> bool {
        self.first.drive(&mut *visit) && self.second.drive(visit)
    }
}

/// Concatenates any number of sequences of the same type, in order.
pub fn chain_all<I>(seqs: I) -> ChainAll<I>
where
    I: IntoIterator,
    I::Item: IntoSequence,
{
    ChainAll { seqs }
}

/// Created by [`chain_all`].
#[derive(Debug, Clone)]
pub struct ChainAll<I> {
    pub(crate) seqs: I,
}

impl<I> Sequence for ChainAll<I>
where
    I: IntoIterator,
    I::Item: IntoSequence,
{
    type Item = <I::Item as IntoSequence>::Item;

    fn drive<V: FnMut(Self::Item) -> bool>(self, visit: &mut V) -> bool {
        for seq in self.seqs {
            if !seq.into_sequence().drive(&mut *visit) {
                return false;
            }
        }
        true
    }
}

/// Created by [`SequenceExt::flatten`](crate::SequenceExt::flatten).
#[derive(Debug, Clone)]
pub struct Flatten<S> {
    pub(crate) inner: S,
}

impl<S> Sequence for Flatten<S>
where
    S: Sequence,
    S::Item: IntoSequence,
{
    type Item = <S::Item as IntoSequence>::Item;

    fn drive<V: FnMut(Self::Item) -> bool>(self, visit: &mut V) -> bool {
        self.inner
            .drive(&mut |nested| nested.into_sequence().drive(&mut *visit))
    }
}

/// Created by [`SequenceExt::flat_map`](crate::SequenceExt::flat_map).
#[derive(Debug, Clone)]
pub struct FlatMap<S, F> {
    pub(crate) inner: S,
    pub(crate) f: F,
}

impl<S, U, F> Sequence for FlatMap<S, F>
where
    S: Sequence,
    U: IntoSequence,
    F: FnMut(S::Item) -> U,
{
    type Item = U::Item;

    fn drive<V: FnMut(U::Item) -> bool>(self, visit: &mut V) -> bool {
        let FlatMap { inner, mut f } = self;
        inner.drive(&mut |x| f(x).into_sequence().drive(&mut *visit))
    }
}

/// Created by [`SequenceExt::zip`](crate::SequenceExt::zip).
#[derive(Debug, Clone)]
pub struct Zip<S, I> {
    pub(crate) inner: S,
    pub(crate) other: I,
}

impl<S: Sequence, I: Iterator> Sequence for Zip<S, I> {
    type Item = (S::Item, I::Item);

    fn drive<V: FnMut(Self::Item) -> bool>(self, visit: &mut V) -> bool {
        let Zip { inner, mut other } = self;
        let mut stopped = false;
        inner.drive(&mut |a| match other.next() {
            Some(b) => {
                stopped = !visit((a, b));
                !stopped
            }
            None => false,
        });
        !stopped
    }
}
