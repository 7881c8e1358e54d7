//! Producers that fill the hand-off queue of a parallel run.
//!
//! A [`Feed`] runs as the driver of the run's worker group, on the calling
//! thread. It may start its own helper threads (several sources fed at once,
//! per-element expansion), but every one of them pushes through the same
//! [`FeedContext`] and stops as soon as the run is cancelled.

use std::sync::Mutex;

use seqflow_seq::{IntoSequence, Sequence};
use seqflow_workflow::done_signal::DoneSignal;
use seqflow_workflow::simple_mpmc::{self, Sender};
use seqflow_workflow::worker_group::WorkerGroup;

use crate::ParallelConfig;
use crate::stage::Stage;

/// The queue side of a run, as seen by its producers.
pub struct FeedContext<'a, T> {
    pub(crate) tx: &'a Sender<T>,
    pub(crate) done: &'a DoneSignal,
    pub(crate) config: &'a ParallelConfig,
    pub(crate) cancel: &'a (dyn Fn() + Sync),
}

impl<T> FeedContext<'_, T> {
    /// Hands one element to the workers. Returns `false` once the run has been
    /// cancelled; the producer must stop then.
    #[inline]
    pub fn push(&self, item: T) -> bool {
        !self.done.is_fired() && self.tx.send(item).is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.done.is_fired()
    }

    pub fn config(&self) -> &ParallelConfig {
        self.config
    }
}

pub trait Feed {
    type Item: Send;

    /// Pushes elements into `ctx` until exhausted or cancelled.
    fn feed(self, ctx: &FeedContext<'_, Self::Item>);
}

/// A single sequence, driven on the calling thread.
pub struct SeqFeed<S> {
    pub(crate) seq: S,
}

impl<S> Feed for SeqFeed<S>
where
    S: Sequence,
    S::Item: Send,
{
    type Item = S::Item;

    fn feed(self, ctx: &FeedContext<'_, S::Item>) {
        self.seq.drive(&mut |x| ctx.push(x));
    }
}

/// Several sequences, driven concurrently by up to `workers` feeder threads.
pub struct ChainFeed<S> {
    pub(crate) seqs: Vec<S>,
}

impl<S> Feed for ChainFeed<S>
where
    S: Sequence + Send,
    S::Item: Send,
{
    type Item = S::Item;

    fn feed(self, ctx: &FeedContext<'_, S::Item>) {
        let feeders = ctx.config.workers.min(self.seqs.len());
        if feeders == 0 {
            return;
        }
        let sources = Mutex::new(self.seqs.into_iter());
        let group = WorkerGroup::new(format!("{}-feed", ctx.config.thread_name_prefix), feeders);
        group.run(
            ctx.cancel,
            |_| loop {
                let next = sources.lock().unwrap().next();
                let Some(seq) = next else {
                    break;
                };
                if !seq.drive(&mut |x| ctx.push(x)) {
                    break;
                }
            },
            || (),
        );
    }
}

/// Expands every element of `base`, after applying `stage`, into a sequence
/// whose elements become the run's elements.
///
/// The expansion happens on an inner group of `workers` threads reading from
/// a queue of its own, so a slow expansion does not serialize the run.
pub struct FlatMapFeed<B, P, F> {
    pub(crate) base: B,
    pub(crate) stage: P,
    pub(crate) f: F,
}

impl<B, P, F, S> Feed for FlatMapFeed<B, P, F>
where
    B: Feed,
    P: Stage<B::Item>,
    F: Fn(P::Out) -> S + Sync,
    S: IntoSequence,
    S::Item: Send,
{
    type Item = S::Item;

    fn feed(self, ctx: &FeedContext<'_, S::Item>) {
        let FlatMapFeed { base, stage, f } = self;
        let (inner_tx, inner_rx) = simple_mpmc::sync_channel::<B::Item>(ctx.config.queue_bound);
        let cancel = || {
            (ctx.cancel)();
            inner_rx.close();
        };
        let group = WorkerGroup::new(
            format!("{}-expand", ctx.config.thread_name_prefix),
            ctx.config.workers,
        );
        group.run(
            &cancel,
            |_| {
                while let Ok(item) = inner_rx.recv() {
                    if ctx.is_cancelled() {
                        break;
                    }
                    let Some(out) = stage.apply(item) else {
                        continue;
                    };
                    if !f(out).into_sequence().drive(&mut |x| ctx.push(x)) {
                        break;
                    }
                }
                if ctx.is_cancelled() {
                    inner_rx.close();
                }
            },
            || {
                let inner_tx = inner_tx;
                base.feed(&FeedContext {
                    tx: &inner_tx,
                    done: ctx.done,
                    config: ctx.config,
                    cancel: &cancel,
                });
            },
        );
    }
}
