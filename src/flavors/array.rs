//! Bounded channel based on a preallocated buffer.
//!
//! This flavor has a fixed, positive capacity.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::context::{Context, Operation, Selected};
use crate::err::{RecvTimeoutError, SendTimeoutError, TryRecvError, TrySendError};
use crate::waker::{Slot, Waker};

/// Inner representation of a bounded channel.
///
/// Two invariants tie the buffer and the wait queues together:
///
/// - Receivers are registered only while the buffer is empty, so a non-empty buffer implies no
///   waiting receivers.
/// - Senders are registered only while the buffer is full, so a non-full buffer implies no
///   waiting senders.
struct Inner<T> {
    /// Buffered messages, in FIFO order.
    buffer: VecDeque<T>,

    /// Senders waiting on a full buffer.
    senders: Waker<T>,

    /// Receivers waiting on an empty buffer.
    receivers: Waker<T>,

    /// Equals `true` when the channel is closed.
    closed: bool,
}

/// Bounded channel based on a preallocated buffer.
pub struct Channel<T> {
    /// Channel capacity.
    cap: usize,

    /// Inner representation of the channel.
    inner: Mutex<Inner<T>>,
}

impl<T> Channel<T> {
    /// Returns a new channel with capacity `cap`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity is zero.
    pub fn with_capacity(cap: usize) -> Self {
        assert!(cap > 0, "capacity must be positive");

        Channel {
            cap,
            inner: Mutex::new(Inner {
                buffer: VecDeque::with_capacity(cap),
                senders: Waker::new(),
                receivers: Waker::new(),
                closed: false,
            }),
        }
    }

    /// Attempts to send a message into the channel.
    pub fn try_send(&self, msg: T) -> Result<(), TrySendError<T>> {
        let mut inner = self.inner.lock();

        if inner.closed {
            return Err(TrySendError::Closed(msg));
        }

        // If there's a waiting receiver, the buffer is empty; hand the message over directly.
        if let Some(entry) = inner.receivers.wake_one() {
            drop(inner);
            entry.slot.put(msg);
            entry.cx.unpark();
            Ok(())
        } else if inner.buffer.len() < self.cap {
            inner.buffer.push_back(msg);
            Ok(())
        } else {
            Err(TrySendError::Full(msg))
        }
    }

    /// Sends a message into the channel.
    pub fn send(&self, msg: T, deadline: Option<Instant>) -> Result<(), SendTimeoutError<T>> {
        let mut inner = self.inner.lock();

        if inner.closed {
            return Err(SendTimeoutError::Closed(msg));
        }

        if let Some(entry) = inner.receivers.wake_one() {
            drop(inner);
            entry.slot.put(msg);
            entry.cx.unpark();
            return Ok(());
        }

        if inner.buffer.len() < self.cap {
            inner.buffer.push_back(msg);
            return Ok(());
        }

        // The buffer is full; block until a receiver frees a slot or the channel is closed.
        Context::with(|cx| {
            let slot = Arc::new(Slot::new(Some(msg)));
            let oper = Operation::hook(&*slot);
            inner.senders.register(oper, slot.clone(), cx);
            drop(inner);

            match cx.wait_until(deadline) {
                Selected::Waiting => unreachable!(),
                Selected::Aborted => {
                    self.inner.lock().senders.unregister(oper);
                    let msg = slot.take().unwrap();
                    Err(SendTimeoutError::Timeout(msg))
                }
                Selected::Closed => {
                    // `close_all` already drained the entry; the message is still ours.
                    let msg = slot.take().unwrap();
                    Err(SendTimeoutError::Closed(msg))
                }
                Selected::Operation(_) => Ok(()),
            }
        })
    }

    /// Attempts to receive a message without blocking.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        let mut inner = self.inner.lock();

        if let Some(msg) = inner.buffer.pop_front() {
            // A slot was freed; move the longest-waiting sender's message into it. This keeps
            // the combined FIFO order of buffered and blocked messages.
            if let Some(entry) = inner.senders.wake_one() {
                let queued = entry.slot.take().unwrap();
                inner.buffer.push_back(queued);
                drop(inner);
                entry.cx.unpark();
            }
            Ok(msg)
        } else if inner.closed {
            Err(TryRecvError::Closed)
        } else {
            Err(TryRecvError::Empty)
        }
    }

    /// Receives a message from the channel.
    pub fn recv(&self, deadline: Option<Instant>) -> Result<T, RecvTimeoutError> {
        let mut inner = self.inner.lock();

        if let Some(msg) = inner.buffer.pop_front() {
            if let Some(entry) = inner.senders.wake_one() {
                let queued = entry.slot.take().unwrap();
                inner.buffer.push_back(queued);
                drop(inner);
                entry.cx.unpark();
            }
            return Ok(msg);
        }

        if inner.closed {
            return Err(RecvTimeoutError::Closed);
        }

        // The buffer is empty; block until a sender provides a message or the channel is closed.
        Context::with(|cx| {
            let slot = Arc::new(Slot::new(None));
            let oper = Operation::hook(&*slot);
            inner.receivers.register(oper, slot.clone(), cx);
            drop(inner);

            match cx.wait_until(deadline) {
                Selected::Waiting => unreachable!(),
                Selected::Aborted => {
                    self.inner.lock().receivers.unregister(oper);
                    Err(RecvTimeoutError::Timeout)
                }
                Selected::Closed => Err(RecvTimeoutError::Closed),
                Selected::Operation(_) => Ok(slot.wait_take()),
            }
        })
    }

    /// Closes the channel and wakes up all blocked senders and receivers.
    ///
    /// Buffered messages remain receivable. Returns `false` if the channel was already closed.
    pub fn close(&self) -> bool {
        let mut inner = self.inner.lock();

        if inner.closed {
            false
        } else {
            inner.closed = true;
            inner.senders.close_all();
            inner.receivers.close_all();
            true
        }
    }

    /// Returns `true` if the channel is closed.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Returns the current number of messages inside the channel.
    pub fn len(&self) -> usize {
        self.inner.lock().buffer.len()
    }

    /// Returns the capacity of the channel.
    pub fn capacity(&self) -> Option<usize> {
        Some(self.cap)
    }

    /// Returns `true` if the channel is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().buffer.is_empty()
    }

    /// Returns `true` if the channel is full.
    pub fn is_full(&self) -> bool {
        self.inner.lock().buffer.len() == self.cap
    }
}
