//! Sizing of parallel runs.

use seqflow_common::{Error, Result, verify_arg};

/// Environment variable overriding [`ParallelConfig::workers`].
pub const WORKERS_ENV: &str = "SEQFLOW_WORKERS";

/// Environment variable overriding [`ParallelConfig::queue_bound`].
pub const QUEUE_BOUND_ENV: &str = "SEQFLOW_QUEUE_BOUND";

pub const DEFAULT_THREAD_NAME_PREFIX: &str = "seqflow-worker";

/// Worker count, queue capacity and thread naming of one parallel run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Number of worker threads applying the pipeline stages.
    pub workers: usize,
    /// Capacity of the hand-off queue between the feeder and the workers.
    pub queue_bound: usize,
    /// Worker threads are named `{thread_name_prefix}-{index}`.
    pub thread_name_prefix: String,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        let workers = Self::default_workers();
        ParallelConfig {
            workers,
            queue_bound: workers * 2,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl ParallelConfig {
    /// Sets the worker count (at least one) and resets the queue bound to
    /// twice the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self.queue_bound = self.workers * 2;
        self
    }

    pub fn with_queue_bound(mut self, queue_bound: usize) -> Self {
        self.queue_bound = queue_bound;
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        verify_arg!(workers, self.workers >= 1);
        verify_arg!(queue_bound, self.queue_bound >= 1);
        verify_arg!(thread_name_prefix, !self.thread_name_prefix.is_empty());
        Ok(())
    }

    /// The defaults, overridden by `SEQFLOW_WORKERS` and `SEQFLOW_QUEUE_BOUND`
    /// when they are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = ParallelConfig::default();
        if let Some(workers) = parse_var(&lookup, WORKERS_ENV)? {
            config = config.with_workers(workers);
        }
        if let Some(bound) = parse_var(&lookup, QUEUE_BOUND_ENV)? {
            config = config.with_queue_bound(bound);
        }
        config.validate()?;
        Ok(config)
    }

    /// The available parallelism, or 8 when it cannot be determined.
    pub fn default_workers() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(8)
    }
}

fn parse_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<usize>> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<usize>()
        .map(Some)
        .map_err(|e| Error::invalid_arg(name, format!("'{raw}': {e}")))
}
