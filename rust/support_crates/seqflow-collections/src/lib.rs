//! Containers shared by the sequence engine and its callers.
//!
//! - [`ordering`] - The three-way comparator contract used by every sortable or
//!   priority structure.
//! - [`heap::Heap`] - Array-backed binary heap whose priority is defined by a
//!   [`Comparator`](ordering::Comparator).
//! - [`deque::Deque`] - Ring-buffer double-ended queue.
//! - [`ordered_map::OrderedMap`] - Insertion-ordered map backed by a list of pairs.
//! - [`concurrent_map::ConcurrentMap`] - Sharded concurrent map with lock-free
//!   per-key value slots, manipulated through [`concurrent_map::Entry`] handles.

pub mod concurrent_map;
pub mod deque;
pub mod heap;
pub mod ordered_map;
pub mod ordering;

pub use concurrent_map::{ConcurrentMap, Entry};
pub use deque::Deque;
pub use heap::Heap;
pub use ordered_map::OrderedMap;
pub use ordering::{Comparator, ComparatorExt};
