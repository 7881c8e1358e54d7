//! Array-backed binary heap with a caller-defined priority.

use std::cmp::Ordering;

use crate::ordering::{Comparator, Natural};

/// A binary heap ordered by a [`Comparator`].
///
/// The comparator defines priority: `a` outranks `b` when `compare(a, b)` is
/// `Less`. With [`Natural`] ordering this is a min-heap; wrap the comparator in
/// [`Reversed`](crate::ordering::Reversed) for a max-heap.
///
/// Invariant: for every non-root index `i`, `compare(data[i], data[parent(i)])`
/// is never `Less`, i.e. no child outranks its parent. The invariant is restored
/// by sift-up on [`push`](Self::push) and sift-down on [`pop`](Self::pop); there
/// is no other way to mutate the elements.
///
/// # Example
///
/// ```
/// use seqflow_collections::Heap;
///
/// let mut heap = Heap::new(|a: &i32, b: &i32| b.cmp(a));
/// heap.extend([3, 9, 1, 7]);
/// assert_eq!(heap.peek(), Some(&9));
/// assert_eq!(heap.iter().collect::<Vec<_>>(), vec![9, 7, 3, 1]);
/// assert_eq!(heap.len(), 4);
/// ```
#[derive(Clone)]
pub struct Heap<T, C = Natural> {
    data: Vec<T>,
    cmp: C,
}

impl<T: Ord> Heap<T, Natural> {
    /// Creates an empty min-heap over `T`'s natural order.
    pub fn natural() -> Self {
        Heap::new(Natural)
    }
}

impl<T: Ord> Default for Heap<T, Natural> {
    fn default() -> Self {
        Heap::natural()
    }
}

impl<T, C: Comparator<T>> Heap<T, C> {
    pub fn new(cmp: C) -> Self {
        Heap {
            data: Vec::new(),
            cmp,
        }
    }

    pub fn with_capacity(cmp: C, capacity: usize) -> Self {
        Heap {
            data: Vec::with_capacity(capacity),
            cmp,
        }
    }

    /// Builds a heap from an unordered vector in O(n).
    pub fn from_vec(cmp: C, data: Vec<T>) -> Self {
        let mut heap = Heap { data, cmp };
        let len = heap.data.len();
        for i in (0..len / 2).rev() {
            heap.sift_down(i);
        }
        heap
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// The elements in heap (not sorted) order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn push(&mut self, item: T) {
        self.data.push(item);
        self.sift_up(self.data.len() - 1);
    }

    /// Pushes every item of `items`, one sift-up each.
    pub fn push_all(&mut self, items: impl IntoIterator<Item = T>) {
        let items = items.into_iter();
        self.data.reserve(items.size_hint().0);
        for item in items {
            self.push(item);
        }
    }

    /// Removes and returns the highest priority element, or `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        let last = self.data.len().checked_sub(1)?;
        self.data.swap(0, last);
        let top = self.data.pop();
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        top
    }

    /// Returns the highest priority element without removing it.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Pops elements off this heap in priority order.
    ///
    /// Dropping the iterator early leaves the remaining elements in the heap.
    pub fn drain(&mut self) -> Drain<'_, T, C> {
        Drain { heap: self }
    }

    /// Consumes the heap and returns its elements in priority order.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        while let Some(item) = self.pop() {
            out.push(item);
        }
        out
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.cmp.compare(&self.data[pos], &self.data[parent]) != Ordering::Less {
                break;
            }
            self.data.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.data.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut best = left;
            if right < len && self.cmp.less(&self.data[right], &self.data[left]) {
                best = right;
            }
            if !self.cmp.less(&self.data[best], &self.data[pos]) {
                break;
            }
            self.data.swap(pos, best);
            pos = best;
        }
    }
}

impl<T: Clone, C: Comparator<T> + Clone> Heap<T, C> {
    /// Iterates a clone of the heap in priority order, leaving `self` untouched.
    ///
    /// Costs O(n) for the clone plus O(log n) per element.
    pub fn iter(&self) -> IntoIter<T, C> {
        IntoIter { heap: self.clone() }
    }
}

impl<T, C: Comparator<T>> Extend<T> for Heap<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.push_all(iter);
    }
}

impl<T: Ord> FromIterator<T> for Heap<T, Natural> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Heap::from_vec(Natural, iter.into_iter().collect())
    }
}

impl<T, C: Comparator<T>> IntoIterator for Heap<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T, C>;

    /// Yields the elements in priority order.
    fn into_iter(self) -> Self::IntoIter {
        IntoIter { heap: self }
    }
}

impl<T: std::fmt::Debug, C> std::fmt::Debug for Heap<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heap").field("data", &self.data).finish()
    }
}

/// Owning priority-order iterator, returned by [`Heap::iter`] and
/// [`Heap::into_iter`].
pub struct IntoIter<T, C> {
    heap: Heap<T, C>,
}

impl<T, C> IntoIter<T, C> {
    /// The elements not yet yielded.
    pub fn into_heap(self) -> Heap<T, C> {
        self.heap
    }
}

impl<T, C: Comparator<T>> Iterator for IntoIter<T, C> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.heap.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.heap.len(), Some(self.heap.len()))
    }
}

impl<T, C: Comparator<T>> ExactSizeIterator for IntoIter<T, C> {}

/// Destructive priority-order iterator, returned by [`Heap::drain`].
pub struct Drain<'a, T, C: Comparator<T>> {
    heap: &'a mut Heap<T, C>,
}

impl<T, C: Comparator<T>> Iterator for Drain<'_, T, C> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.heap.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.heap.len(), Some(self.heap.len()))
    }
}

impl<T, C: Comparator<T>> ExactSizeIterator for Drain<'_, T, C> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::{by_key, reverse};

    fn assert_invariant<T, C: Comparator<T>>(heap: &Heap<T, C>) {
        let data = heap.as_slice();
        for i in 1..data.len() {
            let parent = (i - 1) / 2;
            assert_ne!(
                heap.comparator().compare(&data[i], &data[parent]),
                Ordering::Less,
                "child {i} outranks its parent"
            );
        }
    }

    #[test]
    fn test_empty_heap() {
        let mut heap = Heap::<i32>::natural();
        assert!(heap.is_empty());
        assert_eq!(heap.peek(), None);
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn test_push_pop_non_decreasing() {
        fastrand::seed(17);
        for n in [0usize, 1, 2, 3, 10, 100, 1000] {
            let mut heap = Heap::natural();
            for _ in 0..n {
                heap.push(fastrand::i32(-500..500));
                assert_invariant(&heap);
            }
            let mut prev = None;
            let mut count = 0;
            while let Some(v) = heap.pop() {
                assert_invariant(&heap);
                if let Some(p) = prev {
                    assert!(p <= v);
                }
                prev = Some(v);
                count += 1;
            }
            assert_eq!(count, n);
        }
    }

    #[test]
    fn test_max_heap_with_reversed() {
        let mut heap = Heap::new(reverse(crate::ordering::natural()));
        heap.extend([5, 1, 8, 3, 8]);
        assert_eq!(heap.into_sorted_vec(), vec![8, 8, 5, 3, 1]);
    }

    #[test]
    fn test_from_vec_heapify() {
        fastrand::seed(3);
        let data: Vec<u32> = (0..257).map(|_| fastrand::u32(..1000)).collect();
        let heap = Heap::from_vec(by_key(|x: &u32| *x), data.clone());
        assert_invariant(&heap);
        let mut expected = data;
        expected.sort();
        assert_eq!(heap.into_sorted_vec(), expected);
    }

    #[test]
    fn test_iter_leaves_original() {
        let heap: Heap<i32> = [4, 2, 9, 1].into_iter().collect();
        let first: Vec<_> = heap.iter().collect();
        let second: Vec<_> = heap.iter().collect();
        assert_eq!(first, vec![1, 2, 4, 9]);
        assert_eq!(first, second);
        assert_eq!(heap.len(), 4);
    }

    #[test]
    fn test_into_iter_matches_iter() {
        fastrand::seed(11);
        let heap: Heap<u8> = (0..64).map(|_| fastrand::u8(..)).collect();
        let mut via_iter: Vec<_> = heap.iter().collect();
        let mut via_into: Vec<_> = heap.clone().into_iter().collect();
        via_iter.sort();
        via_into.sort();
        assert_eq!(via_iter, via_into);
        assert_eq!(heap.len(), 64);
    }

    #[test]
    fn test_partial_drain_keeps_remainder() {
        let mut heap: Heap<i32> = (1..=10).collect();
        let taken: Vec<_> = heap.drain().take(3).collect();
        assert_eq!(taken, vec![1, 2, 3]);
        assert_eq!(heap.len(), 7);
        assert_eq!(heap.peek(), Some(&4));
        assert_invariant(&heap);
        assert_eq!(heap.drain().count(), 7);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_clone_shares_comparator() {
        let mut heap = Heap::new(|a: &(u32, &str), b: &(u32, &str)| a.0.cmp(&b.0));
        heap.push((3, "c"));
        heap.push((1, "a"));
        let mut copy = heap.clone();
        copy.push((0, "z"));
        assert_eq!(copy.pop(), Some((0, "z")));
        assert_eq!(heap.pop(), Some((1, "a")));
    }
}
