//! Ring-buffer double-ended queue.

use std::ops::{Index, IndexMut};

/// Capacity allocated by the first growth of an empty deque.
const MIN_CAPACITY: usize = 4;

/// A double-ended queue stored in a growable ring buffer.
///
/// Valid elements occupy `len` consecutive logical slots starting at the
/// physical index `front`, wrapping modulo the buffer capacity. Pushing and
/// popping at either end is O(1) amortized; when the buffer is full it is
/// reallocated at twice the capacity and re-linearized so that `front` is 0.
///
/// Indexing past `len` is a caller defect and panics, while the `get`/`pop`
/// family reports absence through `Option`.
///
/// # Example
///
/// ```
/// use seqflow_collections::Deque;
///
/// let mut d = Deque::new();
/// d.push_back(2);
/// d.push_back(3);
/// d.push_front(1);
/// assert_eq!(d.to_vec(), vec![1, 2, 3]);
/// assert_eq!(d.pop_back(), Some(3));
/// assert_eq!(d[0], 1);
/// ```
#[derive(Clone)]
pub struct Deque<T> {
    buf: Vec<Option<T>>,
    front: usize,
    len: usize,
}

impl<T> Deque<T> {
    pub fn new() -> Self {
        Deque {
            buf: Vec::new(),
            front: 0,
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut buf = Vec::with_capacity(capacity);
        buf.resize_with(capacity, || None);
        Deque {
            buf,
            front: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn push_back(&mut self, value: T) {
        if self.len == self.capacity() {
            self.grow();
        }
        let slot = self.physical(self.len);
        self.buf[slot] = Some(value);
        self.len += 1;
    }

    pub fn push_front(&mut self, value: T) {
        if self.len == self.capacity() {
            self.grow();
        }
        let cap = self.capacity();
        self.front = (self.front + cap - 1) % cap;
        self.buf[self.front] = Some(value);
        self.len += 1;
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.buf[self.front].take();
        self.front = (self.front + 1) % self.capacity();
        self.len -= 1;
        value
    }

    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let slot = self.physical(self.len - 1);
        self.len -= 1;
        self.buf[slot].take()
    }

    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn back(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.len.checked_sub(1).and_then(|i| self.get_mut(i))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.buf[self.physical(index)].as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        let slot = self.physical(index);
        self.buf[slot].as_mut()
    }

    /// Replaces the element at `index`, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn set(&mut self, index: usize, value: T) -> T {
        std::mem::replace(&mut self[index], value)
    }

    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn swap(&mut self, i: usize, j: usize) {
        self.check_index(i);
        self.check_index(j);
        let (pi, pj) = (self.physical(i), self.physical(j));
        self.buf.swap(pi, pj);
    }

    /// Inserts `value` at `index`, shifting later elements towards the back.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&mut self, index: usize, value: T) {
        assert!(
            index <= self.len,
            "insertion index (is {index}) should be <= len (is {})",
            self.len
        );
        self.push_back(value);
        for k in (index..self.len - 1).rev() {
            self.swap(k, k + 1);
        }
    }

    /// Removes the element at `index`, shifting later elements towards the front.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        for k in index..self.len - 1 {
            self.swap(k, k + 1);
        }
        self.pop_back()
    }

    pub fn truncate(&mut self, len: usize) {
        while self.len > len {
            self.pop_back();
        }
    }

    pub fn clear(&mut self) {
        self.buf.iter_mut().for_each(|slot| *slot = None);
        self.front = 0;
        self.len = 0;
    }

    /// Keeps only the elements for which `f` returns `true`, preserving order.
    pub fn retain(&mut self, mut f: impl FnMut(&T) -> bool) {
        for _ in 0..self.len {
            if let Some(value) = self.pop_front() {
                if f(&value) {
                    self.push_back(value);
                }
            }
        }
    }

    /// Rotates the deque `n` places to the left: the element at `n` becomes the front.
    ///
    /// # Panics
    ///
    /// Panics if `n > len()`.
    pub fn rotate_left(&mut self, n: usize) {
        assert!(n <= self.len, "rotation (is {n}) exceeds len (is {})", self.len);
        for _ in 0..n {
            if let Some(value) = self.pop_front() {
                self.push_back(value);
            }
        }
    }

    /// Rotates the deque `n` places to the right: the element at `len - n`
    /// becomes the front.
    ///
    /// # Panics
    ///
    /// Panics if `n > len()`.
    pub fn rotate_right(&mut self, n: usize) {
        assert!(n <= self.len, "rotation (is {n}) exceeds len (is {})", self.len);
        for _ in 0..n {
            if let Some(value) = self.pop_back() {
                self.push_front(value);
            }
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            deque: self,
            head: 0,
            tail: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut T> {
        // Valid slots are `front..cap` followed by the wrapped prefix `..front`;
        // every other slot is `None`.
        let (wrapped, head) = self.buf.split_at_mut(self.front);
        head.iter_mut()
            .chain(wrapped.iter_mut())
            .filter_map(Option::as_mut)
    }

    #[inline]
    fn physical(&self, index: usize) -> usize {
        (self.front + index) % self.capacity()
    }

    #[inline]
    fn check_index(&self, index: usize) {
        assert!(
            index < self.len,
            "index out of bounds: the len is {} but the index is {index}",
            self.len
        );
    }

    fn grow(&mut self) {
        let new_cap = (self.capacity() * 2).max(MIN_CAPACITY);
        let mut buf = Vec::with_capacity(new_cap);
        for i in 0..self.len {
            let slot = self.physical(i);
            buf.push(self.buf[slot].take());
        }
        buf.resize_with(new_cap, || None);
        self.buf = buf;
        self.front = 0;
    }
}

impl<T: Clone> Deque<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T> Default for Deque<T> {
    fn default() -> Self {
        Deque::new()
    }
}

impl<T> Index<usize> for Deque<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.check_index(index);
        match self.get(index) {
            Some(value) => value,
            None => unreachable!("valid slot is empty"),
        }
    }
}

impl<T> IndexMut<usize> for Deque<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.check_index(index);
        match self.get_mut(index) {
            Some(value) => value,
            None => unreachable!("valid slot is empty"),
        }
    }
}

impl<T: PartialEq> PartialEq for Deque<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Deque<T> {}

impl<T: std::fmt::Debug> std::fmt::Debug for Deque<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for Deque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Deque::new();
        deque.extend(iter);
        deque
    }
}

impl<T> Extend<T> for Deque<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> From<Vec<T>> for Deque<T> {
    fn from(vec: Vec<T>) -> Self {
        let len = vec.len();
        Deque {
            buf: vec.into_iter().map(Some).collect(),
            front: 0,
            len,
        }
    }
}

impl<T> IntoIterator for Deque<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter(self)
    }
}

impl<'a, T> IntoIterator for &'a Deque<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Borrowing front-to-back iterator over a [`Deque`].
#[derive(Clone)]
pub struct Iter<'a, T> {
    deque: &'a Deque<T>,
    head: usize,
    tail: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.head == self.tail {
            return None;
        }
        let item = self.deque.get(self.head);
        self.head += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.tail - self.head;
        (n, Some(n))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.head == self.tail {
            return None;
        }
        self.tail -= 1;
        self.deque.get(self.tail)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Owning iterator over a [`Deque`].
pub struct IntoIter<T>(Deque<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.0.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        for n in [0usize, 1, 3, 4, 5, 17, 1000] {
            let mut d = Deque::new();
            for i in 1..=n {
                d.push_back(i);
            }
            let popped: Vec<_> = std::iter::from_fn(|| d.pop_front()).collect();
            assert_eq!(popped, (1..=n).collect::<Vec<_>>());
            assert!(d.is_empty());
        }
    }

    #[test]
    fn test_push_front_pop_back_preserves_order() {
        let mut d = Deque::new();
        for i in 1..=10 {
            d.push_front(i);
        }
        let popped: Vec<_> = std::iter::from_fn(|| d.pop_back()).collect();
        assert_eq!(popped, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_push_front_pop_front_reverses() {
        let mut d = Deque::new();
        for i in 1..=10 {
            d.push_front(i);
        }
        let popped: Vec<_> = std::iter::from_fn(|| d.pop_front()).collect();
        assert_eq!(popped, (1..=10).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_wraparound_growth_relinearizes() {
        let mut d = Deque::with_capacity(4);
        d.push_back(1);
        d.push_back(2);
        d.pop_front();
        d.push_back(3);
        d.push_back(4);
        d.push_back(5); // wraps
        assert_eq!(d.capacity(), 4);
        d.push_front(0); // grows
        assert_eq!(d.capacity(), 8);
        assert_eq!(d.to_vec(), vec![0, 2, 3, 4, 5]);
        assert_eq!(d.front(), Some(&0));
        assert_eq!(d.back(), Some(&5));
    }

    #[test]
    fn test_mixed_ops_against_vec_deque() {
        fastrand::seed(42);
        let mut d = Deque::new();
        let mut model = std::collections::VecDeque::new();
        for i in 0..5000 {
            match fastrand::u8(..6) {
                0 => {
                    d.push_back(i);
                    model.push_back(i);
                }
                1 => {
                    d.push_front(i);
                    model.push_front(i);
                }
                2 => assert_eq!(d.pop_back(), model.pop_back()),
                3 => assert_eq!(d.pop_front(), model.pop_front()),
                4 if !model.is_empty() => {
                    let idx = fastrand::usize(..model.len());
                    assert_eq!(d.get(idx), model.get(idx));
                }
                _ => {
                    let idx = fastrand::usize(..=model.len());
                    d.insert(idx, i);
                    model.insert(idx, i);
                }
            }
            assert_eq!(d.len(), model.len());
        }
        assert!(d.iter().eq(model.iter()));
        assert!(d.iter().rev().eq(model.iter().rev()));
    }

    #[test]
    fn test_index_and_set() {
        let mut d: Deque<_> = (0..5).collect();
        d[2] = 20;
        assert_eq!(d.set(4, 40), 4);
        assert_eq!(d.to_vec(), vec![0, 1, 20, 3, 40]);
        assert_eq!(d.get(5), None);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn test_index_out_of_bounds_panics() {
        let d: Deque<i32> = (0..3).collect();
        let _ = d[3];
    }

    #[test]
    fn test_remove_retain_truncate() {
        let mut d: Deque<_> = (0..10).collect();
        assert_eq!(d.remove(0), Some(0));
        assert_eq!(d.remove(8), Some(9));
        assert_eq!(d.remove(8), None);
        d.retain(|v| v % 2 == 0);
        assert_eq!(d.to_vec(), vec![2, 4, 6, 8]);
        d.truncate(1);
        assert_eq!(d.to_vec(), vec![2]);
        d.clear();
        assert!(d.is_empty());
        assert_eq!(d.pop_front(), None);
    }

    #[test]
    fn test_rotate() {
        let mut d: Deque<_> = (0..5).collect();
        d.rotate_left(2);
        assert_eq!(d.to_vec(), vec![2, 3, 4, 0, 1]);
        d.rotate_right(3);
        assert_eq!(d.to_vec(), vec![4, 0, 1, 2, 3]);
    }

    #[test]
    fn test_iter_mut_after_wrap() {
        let mut d = Deque::with_capacity(4);
        d.push_back(1);
        d.push_back(2);
        d.push_front(0);
        d.push_front(-1);
        for v in d.iter_mut() {
            *v *= 10;
        }
        assert_eq!(d.to_vec(), vec![-10, 0, 10, 20]);
    }

    #[test]
    fn test_equality_and_into_iter() {
        let a: Deque<_> = vec![1, 2, 3].into();
        let mut b = Deque::new();
        b.push_front(2);
        b.push_front(1);
        b.push_back(3);
        assert_eq!(a, b);
        assert_eq!(b.into_iter().rev().collect::<Vec<_>>(), vec![3, 2, 1]);
    }
}
