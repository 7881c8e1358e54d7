use seqflow_collections::{Deque, Heap, OrderedMap, ordering};
use seqflow_seq::{BoxSeq, IntoSequence, Sequence, SequenceExt, chain_all, from_fn, from_iter, once};

/// Consecutive-run removal and global removal differ exactly on repeated
/// non-adjacent values.
#[test]
fn test_dedup_vs_unique() {
    let input = vec![1, 1, 2, 2, 1, 3];
    assert_eq!(from_iter(input.clone()).dedup().collect_vec(), vec![1, 2, 1, 3]);
    assert_eq!(from_iter(input).unique().collect_vec(), vec![1, 2, 3]);
}

#[test]
fn test_randomized_dedup_matches_vec_dedup() {
    fastrand::seed(7);
    for _ in 0..50 {
        let len = fastrand::usize(..200);
        let data: Vec<u8> = (0..len).map(|_| fastrand::u8(..4)).collect();
        let mut expected = data.clone();
        Vec::dedup(&mut expected);
        assert_eq!(from_iter(data).dedup().collect_vec(), expected);
    }
}

#[test]
fn test_long_pipeline_is_lazy_and_short_circuits() {
    let mut produced = 0;
    let first_big = from_iter(1u64..)
        .inspect(|_| produced += 1)
        .map(|x| x * x)
        .filter(|x| x % 3 == 1)
        .skip_while(|x| *x < 1000)
        .first();
    assert_eq!(first_big, Some(1024));
    assert_eq!(produced, 32);
}

#[test]
fn test_scan_emits_initial_accumulator() {
    let prefix = from_iter([1, 2, 3]).scan(0, |acc, x| acc + x).collect_vec();
    assert_eq!(prefix, vec![0, 1, 3, 6]);
}

#[test]
fn test_step_by_takes_first_then_every_nth() {
    let picked = from_iter(1..=10).step_by(3).collect_vec();
    assert_eq!(picked, vec![1, 4, 7, 10]);
}

#[test]
fn test_flatten_and_chain_all_preserve_order() {
    let nested = vec![vec![1, 2], vec![], vec![3]];
    assert_eq!(from_iter(nested).flatten().collect_vec(), vec![1, 2, 3]);

    let parts: Vec<BoxSeq<'_, i32>> = vec![
        from_iter(0..2).boxed(),
        once(10).boxed(),
        from_fn(|visit: &mut dyn FnMut(i32) -> bool| {
            let _ = visit(20) && visit(30);
        })
        .boxed(),
    ];
    assert_eq!(chain_all(parts).collect_vec(), vec![0, 1, 10, 20, 30]);
}

#[test]
fn test_windows_chunks_and_group_by() {
    let w = from_iter(1..=4).windows(2).collect_vec();
    assert_eq!(w, vec![vec![1, 2], vec![2, 3], vec![3, 4]]);

    let c = from_iter(1..=5).chunks(2).collect_vec();
    assert_eq!(c, vec![vec![1, 2], vec![3, 4], vec![5]]);

    let runs = from_iter("aabccc".chars())
        .group_by(|c| *c)
        .map(|(k, run)| (k, run.len()))
        .collect_vec();
    assert_eq!(runs, vec![('a', 2), ('b', 1), ('c', 3)]);
}

#[test]
fn test_result_consumers_stop_at_first_error() {
    let mut visited = 0;
    let items: Vec<Result<i32, String>> = vec![Ok(1), Err("bad".into()), Ok(3)];
    let out: Result<Vec<i32>, String> = from_iter(items.clone())
        .inspect(|_| visited += 1)
        .try_collect();
    assert_eq!(out, Err("bad".to_string()));
    assert_eq!(visited, 2);

    assert_eq!(from_iter(items.clone()).try_any(|x| x == 3), Err("bad".into()));
    assert_eq!(from_iter(items).try_find(|x| *x == 1), Ok(Some(1)));
}

#[test]
fn test_result_consumers_take_owned_values() {
    let words: Vec<Result<String, String>> = vec![Ok("ab".into()), Ok("cde".into()), Err("x".into())];
    assert_eq!(from_iter(words.clone()).try_any(|w| w.len() == 3), Ok(true));
    assert_eq!(from_iter(words.clone()).try_all(|w| w.len() < 3), Ok(false));
    assert_eq!(from_iter(words.clone()).try_any(|w| w.is_empty()), Err("x".to_string()));

    let joined = from_iter(words.into_iter().take(2)).try_fold(String::new(), |acc, w| acc + &w);
    assert_eq!(joined, Ok::<_, String>("abcde".to_string()));

    let longest = from_iter(["a", "abc", "ab"])
        .map(String::from)
        .reduce(|a, b| if b.len() > a.len() { b } else { a });
    assert_eq!(longest.as_deref(), Some("abc"));
    let options = from_iter([Some(1), None, Some(2)]).fold(Some(0), |acc, x| Some(acc? + x?));
    assert_eq!(options, None);
}

#[test]
fn test_containers_as_sinks_and_sources() {
    let heap: Heap<i32, _> =
        from_iter([5, 3, 9, 1]).into_heap(ordering::reverse(ordering::natural()));
    assert_eq!(heap.collect_vec(), vec![9, 5, 3, 1]);

    let deque: Deque<char> = from_iter("xyz".chars()).collect_deque();
    assert_eq!(deque.rev().collect_vec(), vec!['z', 'y', 'x']);

    let groups: OrderedMap<bool, Vec<i32>> = from_iter(1..=6).group_into_map(|x| x % 2 == 0);
    let expected: Vec<(bool, Vec<i32>)> = vec![(false, vec![1, 3, 5]), (true, vec![2, 4, 6])];
    assert_eq!(groups.into_sequence().collect_vec(), expected);
}

#[test]
fn test_custom_sequence_gets_every_combinator() {
    struct Fib {
        limit: u64,
    }

    impl Sequence for Fib {
        type Item = u64;

        fn drive<V: FnMut(u64) -> bool>(self, visit: &mut V) -> bool {
            let (mut a, mut b) = (0u64, 1u64);
            while a <= self.limit {
                if !visit(a) {
                    return false;
                }
                (a, b) = (b, a + b);
            }
            true
        }
    }

    let evens = Fib { limit: 100 }.filter(|x| x % 2 == 0).collect_vec();
    assert_eq!(evens, vec![0, 2, 8, 34]);
    assert_eq!(Fib { limit: 100 }.max_by_key(|x| *x), Some(89));
    let (head, rest) = Fib { limit: 10 }.next_split();
    assert_eq!(head, Some(0));
    assert_eq!(rest.sum(), 1 + 1 + 2 + 3 + 5 + 8);
}
