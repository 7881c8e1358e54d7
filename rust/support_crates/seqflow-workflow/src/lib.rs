//! Coordination primitives for the parallel sequence engine.
//!
//! # Key Components
//!
//! - [`simple_mpmc`] - Blocking multi-producer, multi-consumer channels, bounded or
//!   unbounded, that can additionally be *closed* from either side. Closing wakes
//!   every blocked sender and receiver, which is how a cancelled pipeline releases
//!   its tasks.
//! - [`done_signal::DoneSignal`] - A one-shot, idempotent cancellation flag. The
//!   first caller of [`fire`](done_signal::DoneSignal::fire) wins; registered
//!   hooks (typically "close this queue") run exactly once.
//! - [`worker_group`] - Runs a fixed number of named scoped worker threads next to
//!   a driver closure on the calling thread, invokes a cancel callback if anything
//!   panics, and re-raises the first panic once every thread has exited.

pub mod done_signal;
pub mod simple_mpmc;
pub mod worker_group;
