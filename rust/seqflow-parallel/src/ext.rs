use seqflow_seq::Sequence;

use crate::feed::SeqFeed;
use crate::{Parallel, ParallelConfig};

/// Entry points from a sequential [`Sequence`] into the parallel engine.
pub trait ParallelSequenceExt: Sequence {
    /// Processes the sequence with the default configuration.
    fn par(self) -> Parallel<SeqFeed<Self>>
    where
        Self::Item: Send,
    {
        Parallel::new(self)
    }

    /// Processes the sequence with `workers` worker threads (at least one).
    fn par_with(self, workers: usize) -> Parallel<SeqFeed<Self>>
    where
        Self::Item: Send,
    {
        Parallel::with_workers(self, workers)
    }

    fn par_config(self, config: ParallelConfig) -> seqflow_common::Result<Parallel<SeqFeed<Self>>>
    where
        Self::Item: Send,
    {
        Parallel::with_config(self, config)
    }
}

impl<S: Sequence> ParallelSequenceExt for S {}
