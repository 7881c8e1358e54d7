//! The three-way comparison contract shared by sortable and priority structures.
//!
//! A [`Comparator`] answers `Less`, `Equal` or `Greater` for a pair of values of the
//! same type. The order is always supplied by the caller; no structure in this crate
//! falls back to structural equality on its own. Callers supplying a comparator that
//! is not a total order get unspecified (but memory-safe) results.
//!
//! Any `Fn(&T, &T) -> Ordering` closure is a comparator, so most call sites simply
//! pass a closure:
//!
//! ```
//! use seqflow_collections::ordering::{Comparator, natural, reverse};
//! use std::cmp::Ordering;
//!
//! let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
//! assert_eq!(by_len.compare(&"ab", &"abc"), Ordering::Less);
//! assert_eq!(natural().compare(&3, &1), Ordering::Greater);
//! assert_eq!(reverse(natural()).compare(&3, &1), Ordering::Less);
//! ```

use std::{cmp::Ordering, marker::PhantomData};

/// A caller-supplied total order over `T`.
pub trait Comparator<T: ?Sized> {
    fn compare(&self, a: &T, b: &T) -> Ordering;

    /// Returns `true` when `a` sorts strictly before `b`.
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Compares values through their [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Natural;

impl<T: Ord + ?Sized> Comparator<T> for Natural {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Inverts the order of the wrapped comparator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reversed<C>(pub C);

impl<T: ?Sized, C: Comparator<T>> Comparator<T> for Reversed<C> {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.0.compare(b, a)
    }
}

/// Compares values by a key extracted with `F`.
pub struct ByKey<F, K> {
    key: F,
    _k: PhantomData<fn() -> K>,
}

impl<F: Clone, K> Clone for ByKey<F, K> {
    fn clone(&self) -> Self {
        ByKey {
            key: self.key.clone(),
            _k: PhantomData,
        }
    }
}

impl<T: ?Sized, K: Ord, F: Fn(&T) -> K> Comparator<T> for ByKey<F, K> {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.key)(a).cmp(&(self.key)(b))
    }
}

/// Lexicographic combination: `B` breaks ties left by `A`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Then<A, B>(pub A, pub B);

impl<T: ?Sized, A: Comparator<T>, B: Comparator<T>> Comparator<T> for Then<A, B> {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.0.compare(a, b).then_with(|| self.1.compare(a, b))
    }
}

/// Adapter methods for building comparators by chaining.
///
/// ```
/// use seqflow_collections::ordering::{ComparatorExt, Comparator, by_key};
/// use std::cmp::Ordering;
///
/// let cmp = by_key(|p: &(u32, u32)| p.0).then(by_key(|p: &(u32, u32)| p.1).reversed());
/// assert_eq!(cmp.compare(&(1, 9), &(1, 2)), Ordering::Less);
/// ```
pub trait ComparatorExt: Sized {
    fn reversed(self) -> Reversed<Self> {
        Reversed(self)
    }

    fn then<B>(self, next: B) -> Then<Self, B> {
        Then(self, next)
    }
}

impl ComparatorExt for Natural {}
impl<C> ComparatorExt for Reversed<C> {}
impl<F, K> ComparatorExt for ByKey<F, K> {}
impl<A, B> ComparatorExt for Then<A, B> {}

/// Compares by [`Ord`].
pub fn natural() -> Natural {
    Natural
}

pub fn reverse<C>(cmp: C) -> Reversed<C> {
    Reversed(cmp)
}

pub fn by_key<T: ?Sized, K: Ord, F: Fn(&T) -> K>(key: F) -> ByKey<F, K> {
    ByKey {
        key,
        _k: PhantomData,
    }
}

pub fn then<A, B>(first: A, second: B) -> Then<A, B> {
    Then(first, second)
}

/// Returns the element of `a`, `b` that does not sort after the other,
/// preferring `a` on ties.
pub fn min_of<T, C: Comparator<T> + ?Sized>(cmp: &C, a: T, b: T) -> T {
    if cmp.compare(&b, &a) == Ordering::Less {
        b
    } else {
        a
    }
}

/// Returns the element of `a`, `b` that does not sort before the other,
/// preferring `b` on ties.
pub fn max_of<T, C: Comparator<T> + ?Sized>(cmp: &C, a: T, b: T) -> T {
    if cmp.compare(&b, &a) == Ordering::Less {
        a
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_comparator() {
        let cmp = |a: &i32, b: &i32| b.cmp(a);
        assert_eq!(cmp.compare(&1, &2), Ordering::Greater);
        assert!(cmp.less(&2, &1));
    }

    #[test]
    fn test_natural_follows_ord() {
        assert_eq!(natural().compare(&"a", &"b"), Ordering::Less);
        assert_eq!(natural().compare(&7u8, &7u8), Ordering::Equal);
        assert!(!natural().less(&2, &1));
    }

    #[test]
    fn test_by_key_then() {
        let words = ["bb", "a", "ab", "c"];
        let cmp = then(by_key(|s: &&str| s.len()), natural());
        let mut sorted = words.to_vec();
        sorted.sort_by(|a, b| cmp.compare(a, b));
        assert_eq!(sorted, vec!["a", "c", "ab", "bb"]);
    }

    #[test]
    fn test_reversed() {
        let cmp = reverse(by_key(|p: &(i32, i32)| p.1));
        assert_eq!(cmp.compare(&(0, 1), &(0, 2)), Ordering::Greater);
    }

    #[test]
    fn test_min_max_of_ties() {
        let cmp = by_key(|p: &(i32, &str)| p.0);
        assert_eq!(min_of(&cmp, (1, "a"), (1, "b")).1, "a");
        assert_eq!(max_of(&cmp, (1, "a"), (1, "b")).1, "b");
        assert_eq!(max_of(&cmp, (2, "a"), (1, "b")).1, "a");
    }

    #[test]
    fn test_comparator_ext_chain() {
        let cmp = by_key(|p: &(i32, char)| p.0).reversed().then(by_key(|p: &(i32, char)| p.1));
        let mut items = vec![(1, 'b'), (2, 'z'), (1, 'a'), (2, 'c')];
        items.sort_by(|a, b| cmp.compare(a, b));
        assert_eq!(items, vec![(2, 'c'), (2, 'z'), (1, 'a'), (1, 'b')]);
        assert_eq!(natural().reversed().compare(&1, &2), Ordering::Greater);
    }
}
