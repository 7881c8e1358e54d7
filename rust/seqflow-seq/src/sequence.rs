//! The push-style [`Sequence`] contract and its type-erased form.

/// A lazy, single-shot, push-style producer of values.
///
/// A sequence is driven by handing it a visitor. The sequence calls the
/// visitor once per element, in its defined order, and stops as soon as the
/// visitor returns `false` or it runs out of elements. Nothing happens until
/// the sequence is driven; every combinator in [`SequenceExt`](crate::SequenceExt)
/// returns a new sequence that wraps the previous one.
///
/// `drive` consumes the sequence. Re-running a producer requires cloning it
/// beforehand (all adapters are `Clone` when their parts are).
///
/// Implementing the trait is the only thing a new source has to do:
///
/// ```
/// use seqflow_seq::{Sequence, SequenceExt};
///
/// struct Countdown(u32);
///
/// impl Sequence for Countdown {
///     type Item = u32;
///
///     fn drive<V: FnMut(u32) -> bool>(self, visit: &mut V) -> bool {
///         (1..=self.0).rev().all(|n| visit(n))
///     }
/// }
///
/// assert_eq!(Countdown(3).collect_vec(), vec![3, 2, 1]);
/// ```
pub trait Sequence: Sized {
    type Item;

    /// Pushes elements into `visit` until it returns `false` or the sequence
    /// is exhausted.
    ///
    /// Returns `false` if and only if `visit` returned `false`. A sequence that
    /// ends on its own (including adapters such as `take` that end early)
    /// returns `true`.
    fn drive<V>(self, visit: &mut V) -> bool
    where
        V: FnMut(Self::Item) -> bool;
}

/// Conversion into a [`Sequence`], accepted wherever nested values are
/// flattened or concatenated (`flatten`, `flat_map`, `chain`, `chain_all`).
///
/// Every sequence converts into itself. Owned standard containers (`Vec`,
/// arrays, `Option`, `VecDeque`) and [`OrderedMap`](seqflow_collections::OrderedMap)
/// convert into a sequence over their elements without being sequences
/// themselves, so their inherent methods are never shadowed by
/// [`SequenceExt`](crate::SequenceExt).
///
/// ```
/// use seqflow_seq::{SequenceExt, from_iter};
///
/// let nested = from_iter(vec![vec![1, 2], vec![], vec![3]]);
/// assert_eq!(nested.flatten().collect_vec(), vec![1, 2, 3]);
/// assert_eq!(from_iter([Some(1), None, Some(3)]).flatten().count(), 2);
/// ```
pub trait IntoSequence {
    type Item;
    type IntoSeq: Sequence<Item = Self::Item>;

    fn into_sequence(self) -> Self::IntoSeq;
}

impl<S: Sequence> IntoSequence for S {
    type Item = S::Item;
    type IntoSeq = S;

    #[inline]
    fn into_sequence(self) -> S {
        self
    }
}

/// Object-safe form of [`Sequence`], used by [`BoxSeq`].
trait DynSequence<T> {
    fn drive_dyn(self: Box<Self>, visit: &mut dyn FnMut(T) -> bool) -> bool;
}

impl<S: Sequence> DynSequence<S::Item> for S {
    fn drive_dyn(self: Box<Self>, mut visit: &mut dyn FnMut(S::Item) -> bool) -> bool {
        (*self).drive(&mut visit)
    }
}

/// A boxed, type-erased sequence.
///
/// Useful for returning differently shaped pipelines from one function or for
/// storing sequences in collections.
pub struct BoxSeq<'a, T> {
    inner: Box<dyn DynSequence<T> + 'a>,
}

impl<'a, T> BoxSeq<'a, T> {
    pub fn new<S>(seq: S) -> BoxSeq<'a, T>
    where
        S: Sequence<Item = T> + 'a,
    {
        BoxSeq {
            inner: Box::new(seq),
        }
    }
}

impl<T> Sequence for BoxSeq<'_, T> {
    type Item = T;

    fn drive<V: FnMut(T) -> bool>(self, visit: &mut V) -> bool {
        self.inner.drive_dyn(visit)
    }
}

/// A boxed sequence that can be moved to another thread.
pub struct SendBoxSeq<'a, T> {
    inner: Box<dyn DynSequence<T> + Send + 'a>,
}

impl<'a, T> SendBoxSeq<'a, T> {
    pub fn new<S>(seq: S) -> SendBoxSeq<'a, T>
    where
        S: Sequence<Item = T> + Send + 'a,
    {
        SendBoxSeq {
            inner: Box::new(seq),
        }
    }
}

impl<T> Sequence for SendBoxSeq<'_, T> {
    type Item = T;

    fn drive<V: FnMut(T) -> bool>(self, visit: &mut V) -> bool {
        self.inner.drive_dyn(visit)
    }
}
