use std::time::Instant;

use anyhow::{Result, bail};
use itertools::Itertools;
use seqflow_parallel::{Parallel, ParallelConfig};
use seqflow_seq::{SequenceExt, from_iter};

/// A deliberately non-trivial element function.
fn scramble(x: u64) -> u64 {
    (0..16).fold(x, |h, _| h.wrapping_mul(0x9e37_79b9_7f4a_7c15).rotate_left(17) ^ x)
}

pub fn run(count: u64, config: ParallelConfig) -> Result<()> {
    let start = Instant::now();
    let sequential = from_iter(0..count).map(scramble).collect_vec();
    let sequential_time = start.elapsed();

    let start = Instant::now();
    let parallel = Parallel::with_config(from_iter(0..count), config.clone())?
        .map(scramble)
        .collect_vec();
    let parallel_time = start.elapsed();

    let equal = sequential.iter().sorted_unstable().eq(parallel.iter().sorted_unstable());
    println!("elements:   {count}");
    println!("sequential: {sequential_time:?}");
    println!("parallel:   {parallel_time:?} ({} workers)", config.workers);
    println!("same multiset: {equal}");

    if !equal {
        bail!("Parallel and sequential results differ");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scramble_is_deterministic() {
        fastrand::seed(5);
        for _ in 0..100 {
            let x = fastrand::u64(..);
            assert_eq!(scramble(x), scramble(x));
        }
        assert_ne!(scramble(1), scramble(2));
    }

    #[test]
    fn test_run_small() {
        run(1000, ParallelConfig::default().with_workers(3)).unwrap();
    }
}
