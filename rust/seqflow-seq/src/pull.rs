//! Pull-style cursors over push-style sequences.
//!
//! A push sequence owns its control flow, so a cursor runs it on a dedicated
//! producer thread and exchanges elements with the consumer one at a time.
//! The hand-off is demand driven: the producer computes the next element only
//! after the consumer asks for it, so side effects in the pipeline happen in
//! lock step with [`Pull::next`](Iterator::next) calls.

use std::panic;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

use crate::Sequence;

/// A stateful cursor over a sequence. Created by
/// [`SequenceExt::pull`](crate::SequenceExt::pull).
///
/// - `next` returns `None` once the sequence is exhausted or the cursor was
///   stopped, and keeps returning `None` afterwards.
/// - [`stop`](Self::stop) may be called any number of times. Dropping the
///   cursor stops it.
/// - A panic in the producer is re-raised from the `next` call that observes
///   it.
///
/// A cursor is a single consumer; it is `Send` but not meant to be shared.
///
/// ```
/// use seqflow_seq::{SequenceExt, from_iter};
///
/// let mut cursor = from_iter(1..).map(|x| x * x).pull();
/// assert_eq!(cursor.next(), Some(1));
/// assert_eq!(cursor.next(), Some(4));
/// cursor.stop();
/// assert_eq!(cursor.next(), None);
/// ```
pub struct Pull<T> {
    demand: Option<SyncSender<()>>,
    items: Option<Receiver<T>>,
    producer: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Pull<T> {
    pub(crate) fn new<S>(seq: S) -> Pull<T>
    where
        S: Sequence<Item = T> + Send + 'static,
    {
        let (demand_tx, demand_rx) = mpsc::sync_channel::<()>(1);
        let (item_tx, item_rx) = mpsc::sync_channel::<T>(1);
        let producer = thread::Builder::new()
            .name("seqflow-pull".to_string())
            .spawn(move || {
                if demand_rx.recv().is_err() {
                    return;
                }
                seq.drive(&mut |x| item_tx.send(x).is_ok() && demand_rx.recv().is_ok());
            })
            .expect("spawn thread");
        Pull {
            demand: Some(demand_tx),
            items: Some(item_rx),
            producer: Some(producer),
        }
    }
}

impl<T> Pull<T> {
    /// Stops the producer and waits for its thread to exit.
    pub fn stop(&mut self) {
        self.demand = None;
        self.items = None;
        if let Some(producer) = self.producer.take() {
            if producer.join().is_err() {
                log::warn!("sequence producer panicked after its cursor was stopped");
            }
        }
    }

    /// `true` once the cursor is exhausted or stopped.
    pub fn is_finished(&self) -> bool {
        self.producer.is_none()
    }

    fn finish(&mut self) {
        self.demand = None;
        self.items = None;
        if let Some(producer) = self.producer.take() {
            if let Err(payload) = producer.join() {
                panic::resume_unwind(payload);
            }
        }
    }
}

impl<T> Iterator for Pull<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let (Some(demand), Some(items)) = (&self.demand, &self.items) else {
            return None;
        };
        if demand.send(()).is_ok() {
            if let Ok(item) = items.recv() {
                return Some(item);
            }
        }
        self.finish();
        None
    }
}

impl<T> Drop for Pull<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<T> std::fmt::Debug for Pull<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pull")
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// The remainder of a sequence after [`next_split`](crate::SequenceExt::next_split).
///
/// `Rest` is itself a [`Sequence`] and can be split again without spawning
/// another producer.
#[derive(Debug)]
pub struct Rest<T> {
    cursor: Pull<T>,
}

impl<T> Rest<T> {
    pub(crate) fn new(cursor: Pull<T>) -> Rest<T> {
        Rest { cursor }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<T> {
        self.cursor.next()
    }

    /// Takes one more element off the front.
    pub fn next_split(mut self) -> (Option<T>, Rest<T>) {
        let head = self.cursor.next();
        (head, self)
    }

    pub fn stop(&mut self) {
        self.cursor.stop();
    }

    /// Converts back into the underlying cursor.
    pub fn into_cursor(self) -> Pull<T> {
        self.cursor
    }
}

impl<T> Sequence for Rest<T> {
    type Item = T;

    fn drive<V: FnMut(T) -> bool>(mut self, visit: &mut V) -> bool {
        while let Some(x) = self.cursor.next() {
            if !visit(x) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SequenceExt, from_fn, from_iter, repeat};
    use std::panic::AssertUnwindSafe;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_pull_until_exhausted() {
        let mut cursor = from_iter(vec!['a', 'b']).pull();
        assert_eq!(cursor.next(), Some('a'));
        assert_eq!(cursor.next(), Some('b'));
        assert_eq!(cursor.next(), None);
        assert!(cursor.is_finished());
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut cursor = repeat(1u8).pull();
        assert_eq!(cursor.next(), Some(1));
        cursor.stop();
        cursor.stop();
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_drop_unstarted_infinite_cursor() {
        let cursor = from_iter(0u64..).pull();
        drop(cursor);
    }

    #[test]
    fn test_producer_does_not_run_ahead() {
        let produced = Arc::new(AtomicUsize::new(0));
        let counter = produced.clone();
        let mut cursor = from_iter(0..100)
            .inspect(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .pull();
        assert_eq!(produced.load(Ordering::SeqCst), 0);
        assert_eq!(cursor.next(), Some(0));
        assert_eq!(cursor.next(), Some(1));
        assert_eq!(produced.load(Ordering::SeqCst), 2);
        cursor.stop();
        assert_eq!(produced.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_producer_panic_reaches_consumer() {
        let mut cursor = from_fn(|visit: &mut dyn FnMut(u32) -> bool| {
            visit(1);
            panic!("producer failed");
        })
        .pull();
        assert_eq!(cursor.next(), Some(1));
        let result = panic::catch_unwind(AssertUnwindSafe(|| cursor.next()));
        assert!(result.is_err());
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_next_split_chain() {
        let (a, rest) = from_iter(1..=4).next_split();
        let (b, mut rest) = rest.next_split();
        assert_eq!((a, b), (Some(1), Some(2)));
        assert_eq!(rest.next(), Some(3));
        assert_eq!(rest.collect_vec(), vec![4]);

        let (none, rest) = crate::empty::<i32>().next_split();
        assert_eq!(none, None);
        assert_eq!(rest.count(), 0);
    }

    #[test]
    fn test_zip_two_sequences_through_pull() {
        let letters = from_iter(['x', 'y', 'z']).pull();
        let pairs = from_iter(1..).zip(letters).collect_vec();
        assert_eq!(pairs, vec![(1, 'x'), (2, 'y'), (3, 'z')]);
    }
}
