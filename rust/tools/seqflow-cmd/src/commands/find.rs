use std::sync::Mutex;
use std::time::Instant;

use anyhow::Result;
use seqflow_parallel::{Parallel, ParallelConfig};
use seqflow_seq::from_iter;

pub fn run(target: u64, config: ParallelConfig) -> Result<()> {
    let found = Mutex::new(None);
    let start = Instant::now();
    let stats = Parallel::with_config(from_iter(0u64..), config)?.range_with_stats(|x| {
        if x == target {
            *found.lock().unwrap() = Some(x);
            false
        } else {
            true
        }
    });
    let elapsed = start.elapsed();

    match found.into_inner().unwrap() {
        Some(x) => println!("found {x} in {elapsed:?}"),
        None => println!("not found"),
    }
    println!(
        "dispatched {} elements ({} past the target)",
        stats.dispatched,
        stats.dispatched.saturating_sub(target as usize + 1)
    );
    Ok(())
}
