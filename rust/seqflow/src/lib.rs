//! # Seqflow: lazy sequences, parallel pipelines and containers
//!
//! This crate re-exports the seqflow crates behind a single dependency.
//!
//! ## Module Organization
//!
//! * [`seq`] - The push-style [`Sequence`](seq::Sequence) contract, sources,
//!   combinators, consumers, pull cursors and channel hand-off
//! * [`parallel`] - Worker-pool execution of sequence pipelines
//! * [`collections`] - Comparators, binary heap, ring-buffer deque,
//!   insertion-ordered map and concurrent map
//! * [`common`] - Error type and argument verification shared by all crates
//!
//! ### Support Modules
//!
//! * [`support::workflow`] - Closable MPMC channels, the one-shot done signal and
//!   scoped worker groups the parallel engine is built on
//!
//! ## Getting Started
//!
//! ```
//! use seqflow::prelude::*;
//!
//! let words = from_iter(["b", "a", "b", "c", "a"]);
//! assert_eq!(words.unique().collect_vec(), vec!["b", "a", "c"]);
//!
//! let mut evens = from_iter(0..20u32).par_with(4).filter(|x| x % 2 == 0).collect_vec();
//! evens.sort_unstable();
//! assert_eq!(evens.len(), 10);
//! ```

pub use seqflow_collections as collections;
pub use seqflow_common as common;
pub use seqflow_parallel as parallel;
pub use seqflow_seq as seq;

pub mod support {
    pub use seqflow_workflow as workflow;
}

/// The traits and constructors most pipelines start from.
pub mod prelude {
    pub use seqflow_collections::{Comparator, ComparatorExt, Deque, Heap, OrderedMap};
    pub use seqflow_parallel::{Parallel, ParallelConfig, ParallelSequenceExt};
    pub use seqflow_seq::{
        IntoSequence, IteratorSeqExt, Sequence, SequenceExt, chain_all, empty, from_fn, from_iter, once,
        repeat, repeat_with, successors,
    };
}
