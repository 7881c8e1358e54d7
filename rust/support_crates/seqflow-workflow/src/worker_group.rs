//! Scoped groups of named worker threads with panic propagation.
//!
//! A [`WorkerGroup`] runs a fixed number of worker closures on dedicated,
//! named threads alongside a "driver" closure on the calling thread. The whole
//! run lives inside [`std::thread::scope`], so workers may borrow from the
//! caller's stack, and nothing outlives the call.
//!
//! A panic on any thread invokes the caller's cancel callback (typically: fire a
//! [`DoneSignal`](crate::done_signal::DoneSignal) and close the hand-off queue),
//! which lets the surviving threads stop. Once every thread has finished, the
//! panic is re-raised on the calling thread.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

/// A description of a group of scoped worker threads.
#[derive(Debug, Clone)]
pub struct WorkerGroup {
    name_prefix: String,
    workers: usize,
}

impl WorkerGroup {
    /// Creates a group of `workers` threads named `{name_prefix}-{index}`.
    ///
    /// # Panics
    ///
    /// Panics if `workers` is 0.
    pub fn new(name_prefix: impl Into<String>, workers: usize) -> WorkerGroup {
        assert_ne!(workers, 0, "worker group needs at least one worker");
        WorkerGroup {
            name_prefix: name_prefix.into(),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    /// Runs `worker(index)` on every worker thread and `driver()` on the
    /// calling thread, then joins all workers and returns the driver's result.
    ///
    /// If any closure panics, `cancel` is invoked as soon as the panic unwinds
    /// through it; after all threads are joined the panic is resumed on the
    /// calling thread. A driver panic takes precedence over worker panics,
    /// otherwise the panic of the lowest-indexed failed worker is raised.
    ///
    /// `cancel` may be called several times and from several threads.
    pub fn run<W, D, R>(&self, cancel: &(dyn Fn() + Sync), worker: W, driver: D) -> R
    where
        W: Fn(usize) + Sync,
        D: FnOnce() -> R,
    {
        thread::scope(|s| {
            let worker = &worker;
            let handles = (0..self.workers)
                .map(|index| {
                    thread::Builder::new()
                        .name(format!("{}-{index}", self.name_prefix))
                        .spawn_scoped(s, move || {
                            let _guard = CancelOnPanic(cancel);
                            worker(index)
                        })
                        .expect("spawn thread")
                })
                .collect::<Vec<_>>();

            let driven = panic::catch_unwind(AssertUnwindSafe(driver));
            if driven.is_err() {
                cancel();
            }

            let mut worker_panic: Option<Box<dyn Any + Send>> = None;
            for handle in handles {
                if let Err(payload) = handle.join() {
                    worker_panic.get_or_insert(payload);
                }
            }

            if driven.is_err() || worker_panic.is_some() {
                log::warn!(
                    "worker group '{}' is re-raising a panic",
                    self.name_prefix
                );
            }

            match (driven, worker_panic) {
                (Err(payload), _) => panic::resume_unwind(payload),
                (Ok(_), Some(payload)) => panic::resume_unwind(payload),
                (Ok(result), None) => result,
            }
        })
    }
}

/// Invokes the cancel callback if dropped while the owning thread is unwinding.
struct CancelOnPanic<'a>(&'a (dyn Fn() + Sync));

impl Drop for CancelOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            (self.0)();
        }
    }
}
