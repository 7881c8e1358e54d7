//! Constructors for sequences that do not wrap another sequence.

use std::marker::PhantomData;

use crate::Sequence;

/// A sequence over the elements of an iterator.
///
/// Created by [`from_iter`] and [`IteratorSeqExt::into_seq`].
#[derive(Debug, Clone)]
pub struct IterSeq<I> {
    iter: I,
}

impl<I: Iterator> Sequence for IterSeq<I> {
    type Item = I::Item;

    fn drive<V: FnMut(I::Item) -> bool>(self, visit: &mut V) -> bool {
        for item in self.iter {
            if !visit(item) {
                return false;
            }
        }
        true
    }
}

/// Creates a sequence from anything iterable, including ranges and channel
/// receivers.
///
/// ```
/// use seqflow_seq::{SequenceExt, from_iter};
///
/// assert_eq!(from_iter(1..4).map(|x| x * 2).collect_vec(), vec![2, 4, 6]);
/// ```
pub fn from_iter<I: IntoIterator>(iter: I) -> IterSeq<I::IntoIter> {
    IterSeq {
        iter: iter.into_iter(),
    }
}

/// Conversion of iterables into sequences.
pub trait IteratorSeqExt: IntoIterator + Sized {
    fn into_seq(self) -> IterSeq<Self::IntoIter> {
        from_iter(self)
    }
}

impl<I: IntoIterator> IteratorSeqExt for I {}

/// A sequence produced by a closure that pushes into a visitor.
///
/// Created by [`from_fn`].
pub struct FromFn<F, T> {
    f: F,
    _t: PhantomData<fn() -> T>,
}

impl<F: Clone, T> Clone for FromFn<F, T> {
    fn clone(&self) -> Self {
        FromFn {
            f: self.f.clone(),
            _t: PhantomData,
        }
    }
}

impl<F, T> Sequence for FromFn<F, T>
where
    F: FnOnce(&mut dyn FnMut(T) -> bool),
{
    type Item = T;

    fn drive<V: FnMut(T) -> bool>(self, visit: &mut V) -> bool {
        let mut stopped = false;
        (self.f)(&mut |item| {
            // Shields the visitor from producers that ignore a `false`.
            if stopped {
                return false;
            }
            stopped = !visit(item);
            !stopped
        });
        !stopped
    }
}

/// Creates a sequence from a closure that drives a visitor.
///
/// The closure should return as soon as the visitor answers `false`; any
/// element it pushes after that point is discarded.
///
/// ```
/// use seqflow_seq::{SequenceExt, from_fn};
///
/// let naturals = from_fn(|visit: &mut dyn FnMut(u64) -> bool| {
///     let mut n = 0;
///     while visit(n) {
///         n += 1;
///     }
/// });
/// assert_eq!(naturals.take(3).collect_vec(), vec![0, 1, 2]);
/// ```
pub fn from_fn<T, F>(f: F) -> FromFn<F, T>
where
    F: FnOnce(&mut dyn FnMut(T) -> bool),
{
    FromFn { f, _t: PhantomData }
}

/// A sequence that yields nothing. Created by [`empty`].
pub struct Empty<T>(PhantomData<fn() -> T>);

impl<T> Clone for Empty<T> {
    fn clone(&self) -> Self {
        Empty(PhantomData)
    }
}

impl<T> Sequence for Empty<T> {
    type Item = T;

    fn drive<V: FnMut(T) -> bool>(self, _visit: &mut V) -> bool {
        true
    }
}

pub fn empty<T>() -> Empty<T> {
    Empty(PhantomData)
}

/// A sequence of exactly one element. Created by [`once`].
#[derive(Debug, Clone)]
pub struct Once<T>(T);

impl<T> Sequence for Once<T> {
    type Item = T;

    fn drive<V: FnMut(T) -> bool>(self, visit: &mut V) -> bool {
        visit(self.0)
    }
}

pub fn once<T>(value: T) -> Once<T> {
    Once(value)
}

/// An endless sequence of clones of one value. Created by [`repeat`].
#[derive(Debug, Clone)]
pub struct Repeat<T>(T);

impl<T: Clone> Sequence for Repeat<T> {
    type Item = T;

    fn drive<V: FnMut(T) -> bool>(self, visit: &mut V) -> bool {
        while visit(self.0.clone()) {}
        false
    }
}

pub fn repeat<T: Clone>(value: T) -> Repeat<T> {
    Repeat(value)
}

/// An endless sequence of generated values. Created by [`repeat_with`].
#[derive(Debug, Clone)]
pub struct RepeatWith<F>(F);

impl<T, F: FnMut() -> T> Sequence for RepeatWith<F> {
    type Item = T;

    fn drive<V: FnMut(T) -> bool>(mut self, visit: &mut V) -> bool {
        while visit((self.0)()) {}
        false
    }
}

pub fn repeat_with<T, F: FnMut() -> T>(f: F) -> RepeatWith<F> {
    RepeatWith(f)
}

/// Each element is computed from the previous one. Created by [`successors`].
#[derive(Debug, Clone)]
pub struct Successors<T, F> {
    first: Option<T>,
    succ: F,
}

impl<T, F: FnMut(&T) -> Option<T>> Sequence for Successors<T, F> {
    type Item = T;

    fn drive<V: FnMut(T) -> bool>(self, visit: &mut V) -> bool {
        let Successors { first, mut succ } = self;
        let mut current = first;
        while let Some(value) = current {
            let next = succ(&value);
            if !visit(value) {
                return false;
            }
            current = next;
        }
        true
    }
}

/// Starts at `first` and applies `succ` to each element until it returns `None`.
pub fn successors<T, F>(first: Option<T>, succ: F) -> Successors<T, F>
where
    F: FnMut(&T) -> Option<T>,
{
    Successors { first, succ }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SequenceExt;
    use std::cell::Cell;

    #[test]
    fn test_from_fn_ignores_pushes_after_stop() {
        let pushed = Cell::new(0);
        let seq = from_fn(|visit: &mut dyn FnMut(i32) -> bool| {
            for i in 0..10 {
                pushed.set(pushed.get() + 1);
                visit(i);
            }
        });
        assert_eq!(seq.take(2).collect_vec(), vec![0, 1]);
        assert_eq!(pushed.get(), 10);
    }

    #[test]
    fn test_simple_sources() {
        assert_eq!(empty::<u8>().count(), 0);
        assert_eq!(once("x").collect_vec(), vec!["x"]);
        assert_eq!(repeat(7).take(3).collect_vec(), vec![7, 7, 7]);

        let mut n = 0;
        let evens = repeat_with(|| {
            n += 2;
            n
        });
        assert_eq!(evens.take(3).collect_vec(), vec![2, 4, 6]);
    }

    #[test]
    fn test_successors() {
        let powers = successors(Some(1u32), |x| x.checked_mul(10));
        assert_eq!(powers.count(), 10);
        assert_eq!(successors(None::<u8>, |_| Some(1)).count(), 0);
    }

    #[test]
    fn test_into_seq() {
        let total: i64 = vec![3i64, 4, 5].into_seq().sum();
        assert_eq!(total, 12);
        let rx = {
            let (tx, rx) = std::sync::mpsc::channel();
            for i in 0..4 {
                tx.send(i).unwrap();
            }
            rx
        };
        assert_eq!(rx.into_seq().collect_vec(), vec![0, 1, 2, 3]);
    }
}
