//! Closable multi-producer, multi-consumer channels.
//!
//! The API follows `std::sync::mpsc` and reuses its error types, with two
//! differences: [`Receiver`] is `Clone`, and either half can [`close`] the
//! channel. Closing discards whatever is buffered and wakes every blocked
//! sender and receiver with an error. A bounded channel is the hand-off queue
//! of a parallel run; closing it is how a cancelled run releases its threads.
//!
//! [`close`]: Sender::close

use std::collections::VecDeque;
use std::sync::mpsc::{RecvError, SendError, TryRecvError, TrySendError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};

/// Creates a channel whose buffer grows without limit.
pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    Shared::pair(usize::MAX)
}

/// Creates a channel holding at most `bound` undelivered messages. Senders
/// block while the buffer is full.
///
/// # Panics
///
/// If `bound` is zero; rendezvous channels are not supported.
pub fn sync_channel<T>(bound: usize) -> (Sender<T>, Receiver<T>) {
    assert_ne!(bound, 0, "sync_channel does not support zero bound");
    Shared::pair(bound)
}

struct Slots<T> {
    buf: VecDeque<T>,
    bound: usize,
    senders: usize,
    receivers: usize,
    closed: bool,
}

impl<T> Slots<T> {
    /// No message will ever be accepted again.
    fn rejects(&self) -> bool {
        self.closed || self.receivers == 0
    }

    /// No message will ever be delivered again.
    fn exhausted(&self) -> bool {
        self.closed || (self.buf.is_empty() && self.senders == 0)
    }

    fn is_full(&self) -> bool {
        self.buf.len() >= self.bound
    }
}

struct Shared<T> {
    slots: Mutex<Slots<T>>,
    readable: Condvar,
    writable: Condvar,
}

impl<T> Shared<T> {
    fn pair(bound: usize) -> (Sender<T>, Receiver<T>) {
        let shared = Arc::new(Shared {
            slots: Mutex::new(Slots {
                buf: VecDeque::new(),
                bound,
                senders: 1,
                receivers: 1,
                closed: false,
            }),
            readable: Condvar::new(),
            writable: Condvar::new(),
        });
        (Sender(shared.clone()), Receiver(shared))
    }

    fn lock(&self) -> MutexGuard<'_, Slots<T>> {
        self.slots.lock().unwrap()
    }

    fn push(&self, mut slots: MutexGuard<'_, Slots<T>>, msg: T) {
        slots.buf.push_back(msg);
        drop(slots);
        self.readable.notify_one();
    }

    fn pop(&self, mut slots: MutexGuard<'_, Slots<T>>) -> Option<T> {
        let msg = slots.buf.pop_front()?;
        drop(slots);
        self.writable.notify_one();
        Some(msg)
    }

    fn describe(&self, f: &mut std::fmt::Formatter<'_>, name: &str) -> std::fmt::Result {
        let slots = self.lock();
        let mut s = f.debug_struct(name);
        s.field("buffered", &slots.buf.len());
        if slots.bound != usize::MAX {
            s.field("bound", &slots.bound);
        }
        s.field("closed", &slots.closed).finish()
    }

    fn close(&self) {
        let discarded = {
            let mut slots = self.lock();
            if slots.closed {
                return;
            }
            slots.closed = true;
            std::mem::take(&mut slots.buf)
        };
        self.readable.notify_all();
        self.writable.notify_all();
        // Message destructors run without the lock held.
        drop(discarded);
    }
}

/// The sending half of a channel. Clones count as additional senders.
pub struct Sender<T>(Arc<Shared<T>>);

impl<T> Sender<T> {
    /// Sends `msg`, waiting for room in a bounded channel.
    ///
    /// Fails, handing `msg` back, when the channel is closed (also while this
    /// call waits) or every receiver is gone.
    pub fn send(&self, msg: T) -> Result<(), SendError<T>> {
        let mut slots = self.0.lock();
        while !slots.rejects() && slots.is_full() {
            slots = self.0.writable.wait(slots).unwrap();
        }
        if slots.rejects() {
            return Err(SendError(msg));
        }
        self.0.push(slots, msg);
        Ok(())
    }

    pub fn try_send(&self, msg: T) -> Result<(), TrySendError<T>> {
        let slots = self.0.lock();
        if slots.rejects() {
            Err(TrySendError::Disconnected(msg))
        } else if slots.is_full() {
            Err(TrySendError::Full(msg))
        } else {
            self.0.push(slots, msg);
            Ok(())
        }
    }

    /// Closes the channel for both sides, discarding buffered messages.
    pub fn close(&self) {
        self.0.close();
    }

    pub fn is_closed(&self) -> bool {
        self.0.lock().closed
    }

    pub fn closer(&self) -> Closer<T> {
        Closer(Arc::downgrade(&self.0))
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        self.0.lock().senders += 1;
        Sender(self.0.clone())
    }
}

impl<T> std::fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.describe(f, "Sender")
    }
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        let last = {
            let mut slots = self.0.lock();
            slots.senders -= 1;
            slots.senders == 0
        };
        if last {
            self.0.readable.notify_all();
        }
    }
}

/// The receiving half of a channel. Clones share one buffer; every message
/// is delivered to exactly one of them.
pub struct Receiver<T>(Arc<Shared<T>>);

impl<T> Receiver<T> {
    /// Waits for the next message. Fails once the channel is closed, or once
    /// every sender is gone and the buffer has been drained.
    pub fn recv(&self) -> Result<T, RecvError> {
        let mut slots = self.0.lock();
        loop {
            if slots.closed {
                return Err(RecvError);
            }
            if !slots.buf.is_empty() {
                return self.0.pop(slots).ok_or(RecvError);
            }
            if slots.exhausted() {
                return Err(RecvError);
            }
            slots = self.0.readable.wait(slots).unwrap();
        }
    }

    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        let slots = self.0.lock();
        if slots.closed {
            return Err(TryRecvError::Disconnected);
        }
        let exhausted = slots.exhausted();
        match self.0.pop(slots) {
            Some(msg) => Ok(msg),
            None if exhausted => Err(TryRecvError::Disconnected),
            None => Err(TryRecvError::Empty),
        }
    }

    /// Closes the channel for both sides, discarding buffered messages.
    pub fn close(&self) {
        self.0.close();
    }

    pub fn is_closed(&self) -> bool {
        self.0.lock().closed
    }

    pub fn closer(&self) -> Closer<T> {
        Closer(Arc::downgrade(&self.0))
    }

    /// Blocking iterator over incoming messages, ending where
    /// [`recv`](Self::recv) would fail.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(|| self.recv().ok())
    }
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        self.0.lock().receivers += 1;
        Receiver(self.0.clone())
    }
}

impl<T> std::fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.describe(f, "Receiver")
    }
}

impl<T> Drop for Receiver<T> {
    fn drop(&mut self) {
        let discarded = {
            let mut slots = self.0.lock();
            slots.receivers -= 1;
            if slots.receivers > 0 {
                return;
            }
            std::mem::take(&mut slots.buf)
        };
        self.0.writable.notify_all();
        drop(discarded);
    }
}

/// Closes a channel later on, e.g. from a cancellation hook.
///
/// A closer keeps neither half alive: a channel whose senders are all gone
/// still disconnects its receivers, and closing a dropped channel is a no-op.
pub struct Closer<T>(Weak<Shared<T>>);

impl<T> Closer<T> {
    pub fn close(&self) {
        if let Some(shared) = self.0.upgrade() {
            shared.close();
        }
    }
}

impl<T> Clone for Closer<T> {
    fn clone(&self) -> Self {
        Closer(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_delivery() {
        let (tx, rx) = channel();
        for word in ["map", "filter", "fold"] {
            tx.send(word).unwrap();
        }
        assert_eq!(rx.try_recv(), Ok("map"));
        assert_eq!(rx.recv(), Ok("filter"));
        drop(tx);
        assert_eq!(rx.iter().collect::<Vec<_>>(), vec!["fold"]);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn test_bounded_sender_waits_for_room() {
        let (tx, rx) = sync_channel(1);
        tx.send(0u8).unwrap();
        assert!(matches!(tx.try_send(1), Err(TrySendError::Full(1))));

        thread::scope(|s| {
            let blocked = s.spawn(|| tx.send(1));
            thread::sleep(Duration::from_millis(30));
            assert_eq!(rx.recv(), Ok(0));
            blocked.join().unwrap().unwrap();
        });
        assert_eq!(rx.recv(), Ok(1));
    }

    #[test]
    fn test_buffer_drains_after_last_sender() {
        let (tx, rx) = sync_channel(4);
        let tx2 = tx.clone();
        tx.send(1).unwrap();
        drop(tx);
        assert_eq!(rx.try_recv(), Ok(1));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        tx2.send(2).unwrap();
        drop(tx2);
        assert_eq!(rx.recv(), Ok(2));
        assert_eq!(rx.recv(), Err(RecvError));
    }

    #[test]
    fn test_send_fails_without_receivers() {
        let (tx, rx) = channel::<String>();
        let rx2 = rx.clone();
        drop(rx);
        tx.send("kept".to_string()).unwrap();
        drop(rx2);
        let SendError(msg) = tx.send("returned".to_string()).unwrap_err();
        assert_eq!(msg, "returned");
    }

    #[test]
    fn test_close_wakes_everyone() {
        let (tx, rx) = sync_channel::<u32>(1);
        tx.send(7).unwrap();
        let (idle_tx, idle_rx) = sync_channel::<u32>(1);

        thread::scope(|s| {
            let sender = s.spawn(|| tx.send(8));
            let receivers: Vec<_> = (0..3)
                .map(|_| {
                    let rx = idle_rx.clone();
                    s.spawn(move || rx.recv())
                })
                .collect();
            thread::sleep(Duration::from_millis(30));

            rx.close();
            idle_tx.close();
            idle_tx.close();
            assert!(matches!(sender.join().unwrap(), Err(SendError(8))));
            for r in receivers {
                assert_eq!(r.join().unwrap(), Err(RecvError));
            }
        });

        assert!(tx.is_closed());
        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
        assert!(matches!(tx.try_send(9), Err(TrySendError::Disconnected(9))));
    }

    #[test]
    fn test_closer_is_not_a_party() {
        let (tx, rx) = sync_channel::<u32>(2);
        let closer = tx.closer();
        tx.send(5).unwrap();
        drop(tx);
        assert_eq!(rx.recv(), Ok(5));
        assert_eq!(rx.recv(), Err(RecvError));
        drop(rx);
        closer.close();

        let (tx, rx) = channel::<u32>();
        rx.closer().clone().close();
        assert!(tx.send(1).is_err());
    }

    #[test]
    fn test_many_senders_many_receivers() {
        const SENDERS: usize = 4;
        const PER_SENDER: usize = 500;

        let (tx, rx) = sync_channel(8);
        let mut received = thread::scope(|s| {
            for id in 0..SENDERS {
                let tx = tx.clone();
                s.spawn(move || {
                    for j in 0..PER_SENDER {
                        tx.send(id * PER_SENDER + j).unwrap();
                    }
                });
            }
            drop(tx);
            let consumers: Vec<_> = (0..3)
                .map(|_| {
                    let rx = rx.clone();
                    s.spawn(move || rx.iter().collect::<Vec<_>>())
                })
                .collect();
            consumers
                .into_iter()
                .flat_map(|c| c.join().unwrap())
                .collect::<Vec<_>>()
        });
        received.sort_unstable();
        assert_eq!(received, (0..SENDERS * PER_SENDER).collect::<Vec<_>>());
    }

    #[test]
    #[should_panic(expected = "zero bound")]
    fn test_zero_bound_panics() {
        let _ = sync_channel::<u8>(0);
    }
}
