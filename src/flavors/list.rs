//! Unbounded channel backed by a growable buffer.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::context::{Context, Operation, Selected};
use crate::err::{RecvTimeoutError, SendError, TryRecvError, TrySendError};
use crate::waker::{Slot, Waker};

/// Inner representation of an unbounded channel.
///
/// Receivers are registered only while the buffer is empty, so a non-empty buffer implies no
/// waiting receivers. Senders never block.
struct Inner<T> {
    /// Buffered messages, in FIFO order.
    buffer: VecDeque<T>,

    /// Receivers waiting on an empty buffer.
    receivers: Waker<T>,

    /// Equals `true` when the channel is closed.
    closed: bool,
}

/// Unbounded channel.
pub struct Channel<T> {
    /// Inner representation of the channel.
    inner: Mutex<Inner<T>>,
}

impl<T> Channel<T> {
    /// Constructs a new unbounded channel.
    pub fn new() -> Self {
        Channel {
            inner: Mutex::new(Inner {
                buffer: VecDeque::new(),
                receivers: Waker::new(),
                closed: false,
            }),
        }
    }

    /// Attempts to send a message into the channel.
    ///
    /// The channel is never full, so this fails only if the channel is closed.
    pub fn try_send(&self, msg: T) -> Result<(), TrySendError<T>> {
        self.send(msg).map_err(|SendError(m)| TrySendError::Closed(m))
    }

    /// Sends a message into the channel.
    ///
    /// Sending never blocks on an unbounded channel.
    pub fn send(&self, msg: T) -> Result<(), SendError<T>> {
        let mut inner = self.inner.lock();

        if inner.closed {
            return Err(SendError(msg));
        }

        // If there's a waiting receiver, the buffer is empty; hand the message over directly.
        if let Some(entry) = inner.receivers.wake_one() {
            drop(inner);
            entry.slot.put(msg);
            entry.cx.unpark();
        } else {
            inner.buffer.push_back(msg);
        }
        Ok(())
    }

    /// Attempts to receive a message without blocking.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        let mut inner = self.inner.lock();

        if let Some(msg) = inner.buffer.pop_front() {
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

    /// Closes the channel and wakes up all blocked receivers.
    ///
    /// Buffered messages remain receivable. Returns `false` if the channel was already closed.
    pub fn close(&self) -> bool {
        let mut inner = self.inner.lock();

        if inner.closed {
            false
        } else {
            inner.closed = true;
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
        None
    }

    /// Returns `true` if the channel is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().buffer.is_empty()
    }

    /// Returns `true` if the channel is full.
    pub fn is_full(&self) -> bool {
        false
    }
}
