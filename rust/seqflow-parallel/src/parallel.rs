//! The parallel pipeline and its consumers.

use std::hash::Hash;
use std::ops::Add;
use std::panic;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use seqflow_collections::ordering::{by_key, max_of, min_of};
use seqflow_collections::{Comparator, ConcurrentMap, Deque};
use seqflow_common::Result;
use seqflow_seq::{IntoSequence, Sequence};
use seqflow_workflow::done_signal::DoneSignal;
use seqflow_workflow::simple_mpmc;
use seqflow_workflow::worker_group::WorkerGroup;

use crate::ParallelConfig;
use crate::feed::{ChainFeed, Feed, FeedContext, FlatMapFeed, SeqFeed};
use crate::stage::{
    ExcludeStage, FilterMapStage, FilterStage, Identity, InspectStage, MapStage, Stage,
    StepByStage, UniqueByStage, UniqueStage,
};

/// Counters of one finished run, returned by
/// [`range_with_stats`](Parallel::range_with_stats).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Elements taken off the hand-off queue and passed through the stages.
    pub dispatched: usize,
    /// Elements that survived the stages and reached the visitor.
    pub kept: usize,
    /// `true` if the visitor stopped the run before the source was exhausted.
    pub stopped_early: bool,
}

/// A sequence processed by a fixed pool of worker threads.
///
/// One feeder pushes the source elements into a bounded queue; every worker
/// takes elements off the queue, applies the composed stages and calls the
/// consumer. Results arrive in no particular order. The first time a consumer
/// decides to stop, the run is cancelled: the feeder stops producing, elements
/// still queued are discarded and every thread exits before the consumer
/// returns. A panic on any thread cancels the run and is re-raised on the
/// caller's thread.
///
/// ```
/// use seqflow_parallel::ParallelSequenceExt;
/// use seqflow_seq::from_iter;
///
/// let mut squares = from_iter(1..=5u64).par_with(3).map(|x| x * x).collect_vec();
/// squares.sort_unstable();
/// assert_eq!(squares, vec![1, 4, 9, 16, 25]);
/// ```
pub struct Parallel<F, P = Identity> {
    feed: F,
    stage: P,
    config: ParallelConfig,
}

impl<S> Parallel<SeqFeed<S>, Identity>
where
    S: Sequence,
    S::Item: Send,
{
    /// Wraps `seq` with the default configuration.
    pub fn new(seq: S) -> Self {
        Self::from_parts(SeqFeed { seq }, ParallelConfig::default())
    }

    /// Wraps `seq` with `workers` worker threads (at least one).
    pub fn with_workers(seq: S, workers: usize) -> Self {
        Self::from_parts(
            SeqFeed { seq },
            ParallelConfig::default().with_workers(workers),
        )
    }

    pub fn with_config(seq: S, config: ParallelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(SeqFeed { seq }, config))
    }
}

impl<S> Parallel<ChainFeed<S>, Identity>
where
    S: Sequence + Send,
    S::Item: Send,
{
    /// Processes the concatenation of `seqs`. The sources are fed
    /// concurrently, by at most `config.workers` feeder threads.
    pub fn chain<T>(seqs: impl IntoIterator<Item = T>, config: ParallelConfig) -> Result<Self>
    where
        T: IntoSequence<IntoSeq = S>,
    {
        config.validate()?;
        Ok(Self::from_parts(
            ChainFeed {
                seqs: seqs.into_iter().map(IntoSequence::into_sequence).collect(),
            },
            config,
        ))
    }
}

impl<F: Feed> Parallel<F, Identity> {
    fn from_parts(feed: F, config: ParallelConfig) -> Self {
        Parallel {
            feed,
            stage: Identity,
            config,
        }
    }
}

impl<F, P> Parallel<F, P>
where
    F: Feed,
    P: Stage<F::Item>,
{
    pub fn config(&self) -> &ParallelConfig {
        &self.config
    }

    fn with_stage<Q: Stage<F::Item>>(self, wrap: impl FnOnce(P) -> Q) -> Parallel<F, Q> {
        Parallel {
            feed: self.feed,
            stage: wrap(self.stage),
            config: self.config,
        }
    }

    // ---- stages ----

    pub fn map<B, G>(self, f: G) -> Parallel<F, MapStage<P, G>>
    where
        G: Fn(P::Out) -> B + Sync,
    {
        self.with_stage(|prev| MapStage { prev, f })
    }

    pub fn filter<G>(self, pred: G) -> Parallel<F, FilterStage<P, G>>
    where
        G: Fn(&P::Out) -> bool + Sync,
    {
        self.with_stage(|prev| FilterStage { prev, pred })
    }

    pub fn exclude<G>(self, pred: G) -> Parallel<F, ExcludeStage<P, G>>
    where
        G: Fn(&P::Out) -> bool + Sync,
    {
        self.with_stage(|prev| ExcludeStage { prev, pred })
    }

    pub fn filter_map<B, G>(self, f: G) -> Parallel<F, FilterMapStage<P, G>>
    where
        G: Fn(P::Out) -> Option<B> + Sync,
    {
        self.with_stage(|prev| FilterMapStage { prev, f })
    }

    pub fn inspect<G>(self, f: G) -> Parallel<F, InspectStage<P, G>>
    where
        G: Fn(&P::Out) + Sync,
    {
        self.with_stage(|prev| InspectStage { prev, f })
    }

    /// Keeps the first element reaching this stage and every `step`-th after
    /// it. Which elements are kept depends on scheduling.
    ///
    /// # Panics
    ///
    /// Panics if `step` is 0.
    pub fn step_by(self, step: usize) -> Parallel<F, StepByStage<P>> {
        assert!(step != 0, "step_by requires a non-zero step");
        self.with_stage(|prev| StepByStage {
            prev,
            step,
            seen: AtomicUsize::new(0),
        })
    }

    /// Drops every element equal to one seen before, by any worker.
    pub fn unique(self) -> Parallel<F, UniqueStage<P, P::Out>>
    where
        P::Out: Hash + Eq + Clone + Send + Sync,
    {
        let shards = self.config.workers * 4;
        self.with_stage(|prev| UniqueStage {
            prev,
            seen: ConcurrentMap::with_shards(shards),
        })
    }

    /// Drops every element whose key equals the key of one seen before.
    pub fn unique_by<K, G>(self, key: G) -> Parallel<F, UniqueByStage<P, G, K>>
    where
        G: Fn(&P::Out) -> K + Sync,
        K: Hash + Eq + Clone + Send + Sync,
    {
        let shards = self.config.workers * 4;
        self.with_stage(|prev| UniqueByStage {
            prev,
            key,
            seen: ConcurrentMap::with_shards(shards),
        })
    }

    /// Expands every element into a sequence. The expansions run on an inner
    /// group of worker threads and their elements become the elements of the
    /// new pipeline.
    pub fn flat_map<S, G>(self, f: G) -> Parallel<FlatMapFeed<F, P, G>, Identity>
    where
        G: Fn(P::Out) -> S + Sync,
        S: IntoSequence,
        S::Item: Send,
    {
        let Parallel {
            feed,
            stage,
            config,
        } = self;
        Parallel {
            feed: FlatMapFeed {
                base: feed,
                stage,
                f,
            },
            stage: Identity,
            config,
        }
    }

    // ---- driving ----

    /// Runs the pipeline, calling `visit` for every surviving element until it
    /// returns `false`, and reports what the run did.
    pub fn range_with_stats<V>(self, visit: V) -> RunStats
    where
        V: Fn(P::Out) -> bool + Sync,
    {
        let Parallel {
            feed,
            stage,
            config,
        } = self;
        let (tx, rx) = simple_mpmc::sync_channel::<F::Item>(config.queue_bound);
        let done = DoneSignal::new();
        let dispatched = AtomicUsize::new(0);
        let kept = AtomicUsize::new(0);

        let cancel = || {
            if done.fire() {
                log::trace!("parallel run '{}' cancelled", config.thread_name_prefix);
            }
            rx.close();
        };

        log::debug!(
            "parallel run '{}': {} workers, queue bound {}",
            config.thread_name_prefix,
            config.workers,
            config.queue_bound
        );

        WorkerGroup::new(config.thread_name_prefix.clone(), config.workers).run(
            &cancel,
            |_| {
                while let Ok(item) = rx.recv() {
                    if done.is_fired() {
                        break;
                    }
                    dispatched.fetch_add(1, Ordering::Relaxed);
                    let Some(out) = stage.apply(item) else {
                        continue;
                    };
                    kept.fetch_add(1, Ordering::Relaxed);
                    if !visit(out) {
                        cancel();
                        break;
                    }
                }
            },
            || {
                let tx = tx;
                feed.feed(&FeedContext {
                    tx: &tx,
                    done: &done,
                    config: &config,
                    cancel: &cancel,
                });
            },
        );

        let stats = RunStats {
            dispatched: dispatched.into_inner(),
            kept: kept.into_inner(),
            stopped_early: done.is_fired(),
        };
        log::debug!(
            "parallel run '{}' finished: {:?}",
            config.thread_name_prefix,
            stats
        );
        stats
    }

    /// Runs the pipeline until `visit` returns `false`. Returns `true` if every
    /// element was visited.
    pub fn range<V>(self, visit: V) -> bool
    where
        V: Fn(P::Out) -> bool + Sync,
    {
        !self.range_with_stats(visit).stopped_early
    }

    pub fn for_each<G>(self, f: G)
    where
        G: Fn(P::Out) + Sync,
    {
        self.range(|x| {
            f(x);
            true
        });
    }

    pub fn count(self) -> usize {
        let n = AtomicUsize::new(0);
        self.for_each(|_| {
            n.fetch_add(1, Ordering::Relaxed);
        });
        n.into_inner()
    }

    /// Feeds every surviving element to `absorb` on a single collector thread.
    fn gather<A, G>(self, init: A, mut absorb: G) -> A
    where
        P::Out: Send,
        A: Send,
        G: FnMut(A, P::Out) -> A + Send,
    {
        let name = format!("{}-collect", self.config.thread_name_prefix);
        thread::scope(|s| {
            let (tx, rx) = simple_mpmc::sync_channel::<P::Out>(self.config.queue_bound);
            let collector = thread::Builder::new()
                .name(name)
                .spawn_scoped(s, move || {
                    let mut acc = init;
                    while let Ok(x) = rx.recv() {
                        acc = absorb(acc, x);
                    }
                    acc
                })
                .expect("spawn thread");
            self.range(|x| tx.send(x).is_ok());
            drop(tx);
            match collector.join() {
                Ok(acc) => acc,
                Err(payload) => panic::resume_unwind(payload),
            }
        })
    }

    /// Collects the surviving elements in arrival order.
    pub fn collect(self) -> Deque<P::Out>
    where
        P::Out: Send,
    {
        self.gather(Deque::new(), |mut out, x| {
            out.push_back(x);
            out
        })
    }

    pub fn collect_vec(self) -> Vec<P::Out>
    where
        P::Out: Send,
    {
        self.gather(Vec::new(), |mut out, x| {
            out.push(x);
            out
        })
    }

    /// Folds the surviving elements in arrival order. The result is
    /// deterministic only if `f` does not depend on that order.
    pub fn fold<A, G>(self, init: A, f: G) -> A
    where
        P::Out: Send,
        A: Send,
        G: FnMut(A, P::Out) -> A + Send,
    {
        self.gather(init, f)
    }

    pub fn reduce<G>(self, mut f: G) -> Option<P::Out>
    where
        P::Out: Send,
        G: FnMut(P::Out, P::Out) -> P::Out + Send,
    {
        self.gather(None, |acc, x| {
            Some(match acc {
                None => x,
                Some(a) => f(a, x),
            })
        })
    }

    pub fn sum(self) -> P::Out
    where
        P::Out: Send + Default + Add<Output = P::Out>,
    {
        self.gather(<P::Out as Default>::default(), |a, b| a + b)
    }

    /// A maximum under `cmp`. Among equal maxima, which one is returned
    /// depends on scheduling.
    pub fn max_by<C>(self, cmp: C) -> Option<P::Out>
    where
        P::Out: Send,
        C: Comparator<P::Out> + Send,
    {
        self.reduce(move |a, b| max_of(&cmp, a, b))
    }

    pub fn min_by<C>(self, cmp: C) -> Option<P::Out>
    where
        P::Out: Send,
        C: Comparator<P::Out> + Send,
    {
        self.reduce(move |a, b| min_of(&cmp, a, b))
    }

    pub fn max_by_key<K, G>(self, key: G) -> Option<P::Out>
    where
        P::Out: Send,
        K: Ord,
        G: Fn(&P::Out) -> K + Send,
    {
        self.max_by(by_key(key))
    }

    pub fn min_by_key<K, G>(self, key: G) -> Option<P::Out>
    where
        P::Out: Send,
        K: Ord,
        G: Fn(&P::Out) -> K + Send,
    {
        self.min_by(by_key(key))
    }

    /// Splits the surviving elements by `pred`: `(matching, rest)`.
    pub fn partition<G>(self, pred: G) -> (Vec<P::Out>, Vec<P::Out>)
    where
        P::Out: Send,
        G: Fn(&P::Out) -> bool + Sync,
    {
        self.map(move |x| (pred(&x), x)).gather(
            (Vec::new(), Vec::new()),
            |(mut yes, mut no), (matched, x)| {
                if matched {
                    yes.push(x);
                } else {
                    no.push(x);
                }
                (yes, no)
            },
        )
    }

    /// Some element matching `pred`, stopping the run once one is found.
    /// When several elements match, which one is returned depends on
    /// scheduling.
    pub fn find<G>(self, pred: G) -> Option<P::Out>
    where
        P::Out: Send,
        G: Fn(&P::Out) -> bool + Sync,
    {
        let found = Mutex::new(None);
        self.range(|x| {
            if pred(&x) {
                found.lock().unwrap().get_or_insert(x);
                false
            } else {
                true
            }
        });
        found.into_inner().unwrap()
    }

    pub fn any<G>(self, pred: G) -> bool
    where
        G: Fn(&P::Out) -> bool + Sync,
    {
        !self.range(|x| !pred(&x))
    }

    pub fn all<G>(self, pred: G) -> bool
    where
        G: Fn(&P::Out) -> bool + Sync,
    {
        self.range(|x| pred(&x))
    }

    // ---- Result elements ----

    /// Calls `f` for every `Ok` element; the first `Err` to arrive stops the
    /// run and is returned.
    pub fn try_for_each<T, E, G>(self, f: G) -> std::result::Result<(), E>
    where
        P: Stage<F::Item, Out = std::result::Result<T, E>>,
        E: Send,
        G: Fn(T) + Sync,
    {
        let error = Mutex::new(None);
        self.range(|x| match x {
            Ok(v) => {
                f(v);
                true
            }
            Err(e) => {
                error.lock().unwrap().get_or_insert(e);
                false
            }
        });
        match error.into_inner().unwrap() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// The first `Ok` element matching `pred` or the first `Err`, whichever
    /// a worker reaches first.
    pub fn try_find<T, E, G>(self, pred: G) -> std::result::Result<Option<T>, E>
    where
        P: Stage<F::Item, Out = std::result::Result<T, E>>,
        T: Send,
        E: Send,
        G: Fn(&T) -> bool + Sync,
    {
        let outcome = Mutex::new(None);
        self.range(|x| match x {
            Ok(v) if !pred(&v) => true,
            hit => {
                outcome.lock().unwrap().get_or_insert(hit);
                false
            }
        });
        outcome.into_inner().unwrap().transpose()
    }

    pub fn try_any<T, E, G>(self, pred: G) -> std::result::Result<bool, E>
    where
        P: Stage<F::Item, Out = std::result::Result<T, E>>,
        T: Send,
        E: Send,
        G: Fn(&T) -> bool + Sync,
    {
        self.try_find(pred).map(|found| found.is_some())
    }

    pub fn try_all<T, E, G>(self, pred: G) -> std::result::Result<bool, E>
    where
        P: Stage<F::Item, Out = std::result::Result<T, E>>,
        T: Send,
        E: Send,
        G: Fn(&T) -> bool + Sync,
    {
        self.try_any(|v| !pred(v)).map(|failed| !failed)
    }
}
