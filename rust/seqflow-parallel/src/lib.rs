//! Parallel execution of sequence pipelines.
//!
//! [`Parallel`] runs the elements of a [`Sequence`](seqflow_seq::Sequence)
//! through a fixed pool of worker threads. Combinators such as `map`, `filter`
//! or `unique` compose per-element [`stage`]s that the workers apply; consumers
//! such as `collect`, `fold` or `find` drive the run and return once every
//! thread has exited. Ordering across elements is not preserved.
//!
//! # Key Components
//!
//! - [`ParallelConfig`] - Worker count, hand-off queue bound and thread naming,
//!   with environment overrides.
//! - [`Parallel`] - The pipeline and its consumers. [`RunStats`] reports what a
//!   run dispatched and whether it stopped early.
//! - [`feed`] - Producers filling the hand-off queue: one sequence, several
//!   sequences at once, or a per-element expansion.
//! - [`ParallelSequenceExt`] - `par()` and `par_with(n)` on every sequence.
//!
//! Cancellation is cooperative: the first consumer that stops fires the run's
//! [`DoneSignal`](seqflow_workflow::done_signal::DoneSignal) and closes its
//! queue, which releases every blocked producer and worker.

pub mod config;
mod ext;
pub mod feed;
mod parallel;
pub mod stage;

pub use config::ParallelConfig;
pub use ext::ParallelSequenceExt;
pub use parallel::{Parallel, RunStats};
