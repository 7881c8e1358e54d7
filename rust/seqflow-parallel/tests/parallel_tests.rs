use std::sync::atomic::{AtomicUsize, Ordering};

use seqflow_collections::ConcurrentMap;
use seqflow_parallel::{Parallel, ParallelConfig, ParallelSequenceExt};
use seqflow_seq::{SequenceExt, from_iter};

fn sorted<T: Ord>(mut v: Vec<T>) -> Vec<T> {
    v.sort();
    v
}

/// Parallel and sequential pipelines agree on the resulting multiset for
/// random inputs and worker counts.
#[test]
fn test_randomized_pipeline_equivalence() {
    fastrand::seed(11);
    for _ in 0..20 {
        let len = fastrand::usize(..500);
        let data: Vec<i64> = (0..len).map(|_| fastrand::i64(-1000..1000)).collect();
        let workers = fastrand::usize(1..=8);

        let expected = sorted(
            from_iter(data.clone())
                .filter(|x| x % 3 != 0)
                .map(|x| x * 2 + 1)
                .collect_vec(),
        );
        let actual = sorted(
            from_iter(data)
                .par_with(workers)
                .filter(|x| x % 3 != 0)
                .map(|x| x * 2 + 1)
                .collect_vec(),
        );
        assert_eq!(actual, expected);
    }
}

#[test]
fn test_explicit_worker_count_bounds_threads() {
    let config = ParallelConfig::default().with_workers(3);
    let workers = ConcurrentMap::new();
    Parallel::with_config(from_iter(0..200), config)
        .unwrap()
        .for_each(|_| {
            if let Some(name) = std::thread::current().name() {
                workers.entry(name.to_string()).or_set(());
            }
        });
    assert!(workers.len() <= 3);

    // Other runs keep the machine default.
    assert_eq!(
        from_iter(0..10).par().config().workers,
        ParallelConfig::default_workers()
    );
}

#[test]
fn test_concurrent_counting_through_entries() {
    let counts: ConcurrentMap<u32, u64> = ConcurrentMap::new();
    from_iter(0..10_000u32).par_with(6).for_each(|x| {
        let entry = counts.entry(x % 7);
        entry.or_set(0);
        entry.transform(|n| n + 1);
    });
    let total: u64 = counts.snapshot().iter().map(|(_, n)| **n).sum();
    assert_eq!(total, 10_000);
    assert_eq!(*counts.get(&0).unwrap(), 1429);
}

#[test]
fn test_nested_parallel_runs() {
    let inner_runs = AtomicUsize::new(0);
    let totals = from_iter(1..=4u64)
        .par_with(2)
        .map(|n| {
            inner_runs.fetch_add(1, Ordering::Relaxed);
            from_iter(1..=n * 10).par_with(2).sum()
        })
        .collect_vec();
    assert_eq!(inner_runs.into_inner(), 4);
    assert_eq!(sorted(totals), vec![55, 210, 465, 820]);
}

#[test]
fn test_chain_with_stats() {
    let config = ParallelConfig::default().with_workers(3).with_queue_bound(2);
    let stats = Parallel::chain(vec![vec![1, 2, 3], vec![4, 5], vec![]], config)
        .unwrap()
        .filter(|x| x % 2 == 1)
        .range_with_stats(|_| true);
    assert_eq!(stats.dispatched, 5);
    assert_eq!(stats.kept, 3);
    assert!(!stats.stopped_early);
}
