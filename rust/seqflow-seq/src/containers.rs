//! [`Sequence`] implementations for standard and crate containers.
//!
//! Standard containers are sequences only behind a shared reference, where
//! their inherent methods (`first`, `windows`, `range`...) still take
//! precedence over [`SequenceExt`](crate::SequenceExt); owned values go through
//! [`from_iter`](crate::from_iter). The same holds for [`OrderedMap`], whose
//! `first` and `last` would otherwise be shadowed. [`Deque`] and [`Heap`] are
//! also sequences by value. A heap yields in priority order: by value it is
//! consumed, by reference a clone is popped and the original stays untouched.

use std::collections::{VecDeque, vec_deque};

use seqflow_collections::{Comparator, Deque, Heap, OrderedMap};

use crate::{IntoSequence, IterSeq, Sequence, from_iter};

fn drive_iter<I: Iterator, V: FnMut(I::Item) -> bool>(mut iter: I, visit: &mut V) -> bool {
    iter.all(visit)
}

impl<'a, T> Sequence for &'a [T] {
    type Item = &'a T;

    fn drive<V: FnMut(&'a T) -> bool>(self, visit: &mut V) -> bool {
        drive_iter(self.iter(), visit)
    }
}

impl<'a, T> Sequence for &'a VecDeque<T> {
    type Item = &'a T;

    fn drive<V: FnMut(&'a T) -> bool>(self, visit: &mut V) -> bool {
        drive_iter(self.iter(), visit)
    }
}

impl<T> Sequence for Deque<T> {
    type Item = T;

    fn drive<V: FnMut(T) -> bool>(self, visit: &mut V) -> bool {
        drive_iter(self.into_iter(), visit)
    }
}

impl<'a, T> Sequence for &'a Deque<T> {
    type Item = &'a T;

    fn drive<V: FnMut(&'a T) -> bool>(self, visit: &mut V) -> bool {
        drive_iter(self.iter(), visit)
    }
}

impl<'a, K, V> Sequence for &'a OrderedMap<K, V> {
    type Item = (&'a K, &'a V);

    fn drive<F: FnMut((&'a K, &'a V)) -> bool>(self, visit: &mut F) -> bool {
        drive_iter(self.iter(), visit)
    }
}

impl<T, C: Comparator<T>> Sequence for Heap<T, C> {
    type Item = T;

    fn drive<V: FnMut(T) -> bool>(self, visit: &mut V) -> bool {
        drive_iter(self.into_iter(), visit)
    }
}

impl<T: Clone, C: Comparator<T> + Clone> Sequence for &Heap<T, C> {
    type Item = T;

    fn drive<V: FnMut(T) -> bool>(self, visit: &mut V) -> bool {
        drive_iter(self.iter(), visit)
    }
}

impl<T> IntoSequence for Vec<T> {
    type Item = T;
    type IntoSeq = IterSeq<std::vec::IntoIter<T>>;

    fn into_sequence(self) -> Self::IntoSeq {
        from_iter(self)
    }
}

impl<T, const N: usize> IntoSequence for [T; N] {
    type Item = T;
    type IntoSeq = IterSeq<std::array::IntoIter<T, N>>;

    fn into_sequence(self) -> Self::IntoSeq {
        from_iter(self)
    }
}

impl<T> IntoSequence for Option<T> {
    type Item = T;
    type IntoSeq = IterSeq<std::option::IntoIter<T>>;

    fn into_sequence(self) -> Self::IntoSeq {
        from_iter(self)
    }
}

impl<T> IntoSequence for VecDeque<T> {
    type Item = T;
    type IntoSeq = IterSeq<vec_deque::IntoIter<T>>;

    fn into_sequence(self) -> Self::IntoSeq {
        from_iter(self)
    }
}

impl<K, V> IntoSequence for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoSeq = IterSeq<<OrderedMap<K, V> as IntoIterator>::IntoIter>;

    fn into_sequence(self) -> Self::IntoSeq {
        from_iter(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SequenceExt, from_iter};

    #[test]
    fn test_borrowed_slices_and_std_deques() {
        let v = vec![1, 2, 3];
        assert_eq!(v.as_slice().map(|x| x * 2).collect_vec(), vec![2, 4, 6]);
        assert_eq!(from_iter(v).last(), Some(3));

        let std_deque: VecDeque<_> = VecDeque::from(vec!['a', 'b']);
        assert_eq!((&std_deque).count(), 2);
        assert_eq!(std_deque.range(1..).count(), 1);
    }

    #[test]
    fn test_std_methods_are_not_shadowed() {
        let mut v = vec![3, 3, 1, 2];
        assert_eq!(v.first(), Some(&3));
        assert_eq!(v.last(), Some(&2));
        assert_eq!(v.windows(2).count(), 3);
        assert_eq!(v.chunks(3).count(), 2);
        v.dedup();
        assert_eq!(v, vec![3, 1, 2]);

        let mut opt = Some(5);
        assert_eq!(opt.take(), Some(5));
        assert_eq!(opt, None);
    }

    #[test]
    fn test_owned_containers_flatten() {
        let mut m = OrderedMap::new();
        m.set("z", 1);
        m.set("a", 2);
        assert_eq!(m.into_sequence().collect_vec(), vec![("z", 1), ("a", 2)]);

        let parts = vec![VecDeque::from(vec![1]), VecDeque::new(), VecDeque::from(vec![2, 3])];
        assert_eq!(from_iter(parts).flatten().collect_vec(), vec![1, 2, 3]);
        assert_eq!(from_iter([[1, 2], [3, 4]]).flatten().sum(), 10);
        assert_eq!(from_iter(vec![None, Some('x')]).flatten().collect_vec(), vec!['x']);
    }

    #[test]
    fn test_deque_sequences() {
        let d: Deque<i32> = (1..=4).collect();
        assert_eq!((&d).fold(0, |acc, x| acc + x), 10);
        assert_eq!(d.filter(|x| x % 2 == 1).collect_vec(), vec![1, 3]);
    }

    #[test]
    fn test_ordered_map_pairs_in_insertion_order() {
        let mut m = OrderedMap::new();
        m.set("z", 1);
        m.set("a", 2);
        assert_eq!(m.first(), Some((&"z", &1)));
        let keys = (&m).map(|(k, _)| *k).collect_vec();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_heap_by_reference_is_non_destructive() {
        let heap: Heap<u32> = [5, 1, 4].into_iter().collect();
        assert_eq!((&heap).collect_vec(), vec![1, 4, 5]);
        assert_eq!(heap.len(), 3);
        assert_eq!(heap.take(2).collect_vec(), vec![1, 4]);
    }
}
