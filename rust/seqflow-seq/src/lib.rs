//! Lazy, push-style sequences.
//!
//! A [`Sequence`] produces its elements by calling a visitor and stops as soon
//! as the visitor returns `false`. Sequences are built from iterators, closures
//! and containers, transformed with the combinators of [`SequenceExt`] and
//! consumed on the calling thread.
//!
//! # Key Types
//!
//! - [`Sequence`] - The driving contract; the only thing a producer implements.
//! - [`SequenceExt`] - Lazy combinators (`map`, `filter`, `dedup`, `windows`, ...)
//!   and consumers (`collect`, `fold`, `find`, `try_*`, ...).
//! - [`BoxSeq`] / [`SendBoxSeq`] - Type-erased sequences.
//! - [`Pull`] / [`Rest`] - Imperative cursors over a sequence.
//! - [`channel`] - Hand-off to and from `simple_mpmc` channels.
//!
//! ```
//! use seqflow_seq::{SequenceExt, from_iter};
//!
//! let evens = from_iter(1..=10)
//!     .filter(|x| x % 2 == 0)
//!     .map(|x| x * 10)
//!     .collect_vec();
//! assert_eq!(evens, vec![20, 40, 60, 80, 100]);
//! ```

pub mod adapters;
pub mod channel;
mod containers;
mod ext;
pub mod pull;
mod sequence;
pub mod source;

pub use adapters::chain_all;
pub use channel::{from_receiver, from_receiver_until};
pub use ext::SequenceExt;
pub use pull::{Pull, Rest};
pub use sequence::{BoxSeq, IntoSequence, SendBoxSeq, Sequence};
pub use source::{
    IterSeq, IteratorSeqExt, empty, from_fn, from_iter, once, repeat, repeat_with, successors,
};
