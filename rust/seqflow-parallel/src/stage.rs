//! Per-element pipeline stages applied inside worker threads.
//!
//! Every combinator of [`Parallel`](crate::Parallel) wraps the previous stage
//! in a new one, so a pipeline such as `.map(f).filter(p)` becomes
//! `FilterStage { prev: MapStage { prev: Identity, f }, pred }`. A stage either
//! produces an output for its input or drops the element.
//!
//! Stages are shared by reference between all workers of a run, hence `Sync`.
//! State that has to be shared across workers (the counter of
//! [`StepByStage`], the seen-set of [`UniqueStage`]) is concurrency-safe.

use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};

use seqflow_collections::ConcurrentMap;

pub trait Stage<In>: Sync {
    type Out;

    /// Transforms one element, or returns `None` to drop it.
    fn apply(&self, input: In) -> Option<Self::Out>;
}

/// The stage every pipeline starts from.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<T> Stage<T> for Identity {
    type Out = T;

    #[inline]
    fn apply(&self, input: T) -> Option<T> {
        Some(input)
    }
}

pub struct MapStage<P, F> {
    pub(crate) prev: P,
    pub(crate) f: F,
}

impl<In, B, P, F> Stage<In> for MapStage<P, F>
where
    P: Stage<In>,
    F: Fn(P::Out) -> B + Sync,
{
    type Out = B;

    #[inline]
    fn apply(&self, input: In) -> Option<B> {
        self.prev.apply(input).map(&self.f)
    }
}

pub struct FilterStage<P, F> {
    pub(crate) prev: P,
    pub(crate) pred: F,
}

impl<In, P, F> Stage<In> for FilterStage<P, F>
where
    P: Stage<In>,
    F: Fn(&P::Out) -> bool + Sync,
{
    type Out = P::Out;

    #[inline]
    fn apply(&self, input: In) -> Option<P::Out> {
        self.prev.apply(input).filter(&self.pred)
    }
}

pub struct ExcludeStage<P, F> {
    pub(crate) prev: P,
    pub(crate) pred: F,
}

impl<In, P, F> Stage<In> for ExcludeStage<P, F>
where
    P: Stage<In>,
    F: Fn(&P::Out) -> bool + Sync,
{
    type Out = P::Out;

    #[inline]
    fn apply(&self, input: In) -> Option<P::Out> {
        self.prev.apply(input).filter(|x| !(self.pred)(x))
    }
}

pub struct FilterMapStage<P, F> {
    pub(crate) prev: P,
    pub(crate) f: F,
}

impl<In, B, P, F> Stage<In> for FilterMapStage<P, F>
where
    P: Stage<In>,
    F: Fn(P::Out) -> Option<B> + Sync,
{
    type Out = B;

    #[inline]
    fn apply(&self, input: In) -> Option<B> {
        self.prev.apply(input).and_then(&self.f)
    }
}

pub struct InspectStage<P, F> {
    pub(crate) prev: P,
    pub(crate) f: F,
}

impl<In, P, F> Stage<In> for InspectStage<P, F>
where
    P: Stage<In>,
    F: Fn(&P::Out) + Sync,
{
    type Out = P::Out;

    #[inline]
    fn apply(&self, input: In) -> Option<P::Out> {
        self.prev.apply(input).inspect(&self.f)
    }
}

/// Keeps the first element reaching the stage, then every `step`-th one.
///
/// Which elements those are depends on the order in which workers reach the
/// stage; only the number kept is deterministic.
pub struct StepByStage<P> {
    pub(crate) prev: P,
    pub(crate) step: usize,
    pub(crate) seen: AtomicUsize,
}

impl<In, P: Stage<In>> Stage<In> for StepByStage<P> {
    type Out = P::Out;

    fn apply(&self, input: In) -> Option<P::Out> {
        let out = self.prev.apply(input)?;
        let index = self.seen.fetch_add(1, Ordering::Relaxed);
        (index % self.step == 0).then_some(out)
    }
}

/// Keeps the first element of every distinct value, across all workers.
pub struct UniqueStage<P, T> {
    pub(crate) prev: P,
    pub(crate) seen: ConcurrentMap<T, ()>,
}

impl<In, P, T> Stage<In> for UniqueStage<P, T>
where
    P: Stage<In, Out = T>,
    T: Hash + Eq + Clone + Send + Sync,
{
    type Out = T;

    fn apply(&self, input: In) -> Option<T> {
        let out = self.prev.apply(input)?;
        self.seen
            .entry(out.clone())
            .set_if_absent(())
            .then_some(out)
    }
}

/// Keeps the first element of every distinct key, across all workers.
pub struct UniqueByStage<P, F, K> {
    pub(crate) prev: P,
    pub(crate) key: F,
    pub(crate) seen: ConcurrentMap<K, ()>,
}

impl<In, P, F, K> Stage<In> for UniqueByStage<P, F, K>
where
    P: Stage<In>,
    F: Fn(&P::Out) -> K + Sync,
    K: Hash + Eq + Clone + Send + Sync,
{
    type Out = P::Out;

    fn apply(&self, input: In) -> Option<P::Out> {
        let out = self.prev.apply(input)?;
        self.seen
            .entry((self.key)(&out))
            .set_if_absent(())
            .then_some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composed_stages() {
        let stage = FilterStage {
            prev: MapStage {
                prev: Identity,
                f: |x: i32| x * 3,
            },
            pred: |x: &i32| x % 2 == 0,
        };
        assert_eq!(stage.apply(2), Some(6));
        assert_eq!(stage.apply(3), None);

        let stage = FilterMapStage {
            prev: ExcludeStage {
                prev: Identity,
                pred: |s: &&str| s.is_empty(),
            },
            f: |s: &str| s.parse::<u8>().ok(),
        };
        assert_eq!(stage.apply("7"), Some(7));
        assert_eq!(stage.apply("x"), None);
        assert_eq!(stage.apply(""), None);
    }

    #[test]
    fn test_step_by_counts_only_surviving_elements() {
        let stage = StepByStage {
            prev: FilterStage {
                prev: Identity,
                pred: |x: &u32| x % 2 == 0,
            },
            step: 2,
            seen: AtomicUsize::new(0),
        };
        let kept: Vec<u32> = (0..10).filter_map(|x| stage.apply(x)).collect();
        assert_eq!(kept, vec![0, 4, 8]);
    }

    #[test]
    fn test_unique_stage_shared_between_threads() {
        let stage = UniqueStage {
            prev: Identity,
            seen: ConcurrentMap::new(),
        };
        let kept = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for x in 0..100u32 {
                        if stage.apply(x % 10).is_some() {
                            kept.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });
        assert_eq!(kept.into_inner(), 10);
    }

    #[test]
    fn test_unique_by_key() {
        let stage = UniqueByStage {
            prev: Identity,
            key: |s: &&str| s.len(),
            seen: ConcurrentMap::new(),
        };
        let kept: Vec<&str> = ["a", "bb", "c", "dd", "eee"]
            .into_iter()
            .filter_map(|s| stage.apply(s))
            .collect();
        assert_eq!(kept, vec!["a", "bb", "eee"]);
    }
}
