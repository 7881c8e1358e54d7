//! Command implementations for seqflow-cmd

use anyhow::{Context, Result};
use seqflow_parallel::ParallelConfig;

pub mod dedup;
pub mod find;
pub mod map;

/// Builds the run configuration: environment overrides first, then the
/// command-line options.
pub fn parallel_config(workers: Option<usize>, queue_bound: Option<usize>) -> Result<ParallelConfig> {
    let mut config = ParallelConfig::from_env().context("Invalid SEQFLOW_* environment")?;
    if let Some(workers) = workers {
        config = config.with_workers(workers);
    }
    if let Some(queue_bound) = queue_bound {
        config = config.with_queue_bound(queue_bound);
    }
    config.validate().context("Invalid parallel configuration")?;
    log::info!(
        "{} workers, queue bound {}",
        config.workers,
        config.queue_bound
    );
    Ok(config)
}
