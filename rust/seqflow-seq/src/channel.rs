//! Hand-off between sequences and [`simple_mpmc`] channels.
//!
//! The `_until` variants bind the transfer to a [`DoneSignal`]: firing the
//! signal closes the channel, which releases a sender or receiver blocked on
//! it, and the transfer ends without error. The closing hook lives only as
//! long as the transfer, so one signal can outlive many of them.

use seqflow_common::{Error, Result};
use seqflow_workflow::done_signal::{DoneSignal, HookGuard};
use seqflow_workflow::simple_mpmc::{Receiver, Sender};

use crate::Sequence;

/// Sends every element of `seq` into `tx`.
///
/// Fails with [`Disconnected`](seqflow_common::ErrorKind::Disconnected) when
/// the channel is closed, or every receiver is gone, before the sequence is
/// exhausted. The element that could not be delivered is dropped.
pub fn to_channel<S: Sequence>(seq: S, tx: &Sender<S::Item>) -> Result<()> {
    if seq.drive(&mut |x| tx.send(x).is_ok()) {
        Ok(())
    } else {
        Err(Error::disconnected("to_channel"))
    }
}

/// Like [`to_channel`], but stops once `done` fires.
///
/// Returns `Ok(true)` if the sequence was exhausted and `Ok(false)` if the
/// signal stopped the transfer.
pub fn to_channel_until<S>(seq: S, tx: &Sender<S::Item>, done: &DoneSignal) -> Result<bool>
where
    S: Sequence,
    S::Item: Send + 'static,
{
    let closer = tx.closer();
    let _hook = done.on_fire_scoped(move || closer.close());
    let exhausted = seq.drive(&mut |x| !done.is_fired() && tx.send(x).is_ok());
    if exhausted {
        Ok(true)
    } else if done.is_fired() {
        Ok(false)
    } else {
        Err(Error::disconnected("to_channel_until"))
    }
}

/// A sequence over the messages of a channel receiver. See [`from_receiver`].
#[derive(Debug)]
pub struct FromReceiver<T> {
    rx: Receiver<T>,
    done: Option<DoneSignal>,
    _hook: Option<HookGuard>,
}

/// Yields messages until the channel is closed, or drained with every sender
/// gone.
pub fn from_receiver<T>(rx: Receiver<T>) -> FromReceiver<T> {
    FromReceiver {
        rx,
        done: None,
        _hook: None,
    }
}

/// Yields messages until the channel ends or `done` fires, whichever comes
/// first. Firing the signal closes the channel; dropping the sequence
/// unfired deregisters that hook.
pub fn from_receiver_until<T: Send + 'static>(rx: Receiver<T>, done: DoneSignal) -> FromReceiver<T> {
    let closer = rx.closer();
    let hook = done.on_fire_scoped(move || closer.close());
    FromReceiver {
        rx,
        done: Some(done),
        _hook: Some(hook),
    }
}

impl<T> Sequence for FromReceiver<T> {
    type Item = T;

    fn drive<V: FnMut(T) -> bool>(self, visit: &mut V) -> bool {
        loop {
            if self.done.as_ref().is_some_and(DoneSignal::is_fired) {
                return true;
            }
            match self.rx.recv() {
                Ok(x) => {
                    if !visit(x) {
                        return false;
                    }
                }
                Err(_) => return true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SequenceExt, from_iter, repeat};
    use seqflow_common::ErrorKind;
    use seqflow_workflow::simple_mpmc;
    use std::thread;

    #[test]
    fn test_to_channel_then_from_receiver() {
        let (tx, rx) = simple_mpmc::sync_channel(2);
        let consumer = thread::spawn(move || from_receiver(rx).collect_vec());
        to_channel(from_iter(1..=10), &tx).unwrap();
        drop(tx);
        assert_eq!(consumer.join().unwrap(), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_to_channel_reports_closed_channel() {
        let (tx, rx) = simple_mpmc::sync_channel::<i32>(4);
        rx.close();
        let err = to_channel(from_iter(0..3), &tx).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Disconnected { .. }));
    }

    #[test]
    fn test_to_channel_until_stops_blocked_sender() {
        let (tx, rx) = simple_mpmc::sync_channel(1);
        let done = DoneSignal::new();
        let producer = {
            let done = done.clone();
            thread::spawn(move || to_channel_until(repeat(7u8), &tx, &done))
        };
        assert_eq!(rx.recv(), Ok(7));
        done.fire();
        assert!(!producer.join().unwrap().unwrap());
    }

    #[test]
    fn test_from_receiver_until_stops_blocked_consumer() {
        let (tx, rx) = simple_mpmc::channel::<u32>();
        let done = DoneSignal::new();
        tx.send(1).unwrap();
        let (seen_tx, seen_rx) = std::sync::mpsc::channel();
        let consumer = {
            let done = done.clone();
            thread::spawn(move || {
                from_receiver_until(rx, done)
                    .inspect(|_| seen_tx.send(()).unwrap())
                    .collect_vec()
            })
        };
        seen_rx.recv().unwrap();
        done.fire();
        assert_eq!(consumer.join().unwrap(), vec![1]);
        drop(tx);
    }

    #[test]
    fn test_finished_transfers_release_their_hooks() {
        let done = DoneSignal::new();
        for round in 0..50 {
            let (tx, rx) = simple_mpmc::sync_channel(4);
            assert!(to_channel_until(from_iter(0..3), &tx, &done).unwrap());
            drop(tx);
            let got = from_receiver_until(rx, done.clone()).collect_vec();
            assert_eq!(got, vec![0, 1, 2], "round {round}");
        }
        assert_eq!(done.pending_hooks(), 0);

        let (_tx, rx) = simple_mpmc::channel::<u8>();
        let pending = from_receiver_until(rx, done.clone());
        assert_eq!(done.pending_hooks(), 1);
        drop(pending);
        assert_eq!(done.pending_hooks(), 0);
    }

    #[test]
    fn test_from_receiver_early_stop_leaves_rest_queued() {
        let (tx, rx) = simple_mpmc::channel();
        for i in 0..5 {
            tx.send(i).unwrap();
        }
        let rx2 = rx.clone();
        assert_eq!(from_receiver(rx).take(2).collect_vec(), vec![0, 1]);
        assert_eq!(rx2.try_recv(), Ok(2));
    }
}
