//! Zero-capacity channel.
//!
//! This kind of channel is also known as *rendezvous* channel.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::context::{Context, Operation, Selected};
use crate::err::{RecvTimeoutError, SendTimeoutError, TryRecvError, TrySendError};
use crate::waker::{Slot, Waker};

/// Inner representation of a zero-capacity channel.
struct Inner<T> {
    /// Senders waiting to pair up with a receive operation.
    senders: Waker<T>,

    /// Receivers waiting to pair up with a send operation.
    receivers: Waker<T>,

    /// Equals `true` when the channel is closed.
    closed: bool,
}

/// Zero-capacity channel.
pub struct Channel<T> {
    /// Inner representation of the channel.
    inner: Mutex<Inner<T>>,
}

impl<T> Channel<T> {
    /// Constructs a new zero-capacity channel.
    pub fn new() -> Self {
        Channel {
            inner: Mutex::new(Inner {
                senders: Waker::new(),
                receivers: Waker::new(),
                closed: false,
            }),
        }
    }

    /// Attempts to send a message into the channel.
    pub fn try_send(&self, msg: T) -> Result<(), TrySendError<T>> {
        let mut inner = self.inner.lock();

        // If there's a waiting receiver, pair up with it.
        if let Some(entry) = inner.receivers.wake_one() {
            drop(inner);
            entry.slot.put(msg);
            entry.cx.unpark();
            Ok(())
        } else if inner.closed {
            Err(TrySendError::Closed(msg))
        } else {
            Err(TrySendError::Full(msg))
        }
    }

    /// Sends a message into the channel.
    pub fn send(&self, msg: T, deadline: Option<Instant>) -> Result<(), SendTimeoutError<T>> {
        let mut inner = self.inner.lock();

        // If there's a waiting receiver, pair up with it.
        if let Some(entry) = inner.receivers.wake_one() {
            drop(inner);
            entry.slot.put(msg);
            entry.cx.unpark();
            return Ok(());
        }

        if inner.closed {
            return Err(SendTimeoutError::Closed(msg));
        }

        Context::with(|cx| {
            // Prepare for blocking until a receiver takes the message.
            let slot = Arc::new(Slot::new(Some(msg)));
            let oper = Operation::hook(&*slot);
            inner.senders.register(oper, slot.clone(), cx);
            drop(inner);

            // Block the current thread.
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

        // If there's a waiting sender, pair up with it.
        if let Some(entry) = inner.senders.wake_one() {
            drop(inner);
            let msg = entry.slot.take().unwrap();
            entry.cx.unpark();
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

        // If there's a waiting sender, pair up with it.
        if let Some(entry) = inner.senders.wake_one() {
            drop(inner);
            let msg = entry.slot.take().unwrap();
            entry.cx.unpark();
            return Ok(msg);
        }

        if inner.closed {
            return Err(RecvTimeoutError::Closed);
        }

        Context::with(|cx| {
            // Prepare for blocking until a sender provides a message.
            let slot = Arc::new(Slot::new(None));
            let oper = Operation::hook(&*slot);
            inner.receivers.register(oper, slot.clone(), cx);
            drop(inner);

            // Block the current thread.
            match cx.wait_until(deadline) {
                Selected::Waiting => unreachable!(),
                Selected::Aborted => {
                    self.inner.lock().receivers.unregister(oper);
                    Err(RecvTimeoutError::Timeout)
                }
                Selected::Closed => Err(RecvTimeoutError::Closed),
                Selected::Operation(_) => {
                    // A sender paired up with this operation; wait for the message to land in
                    // the slot.
                    Ok(slot.wait_take())
                }
            }
        })
    }

    /// Closes the channel and wakes up all blocked senders and receivers.
    ///
    /// Returns `false` if the channel was already closed.
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
        0
    }

    /// Returns the capacity of the channel.
    pub fn capacity(&self) -> Option<usize> {
        Some(0)
    }

    /// Returns `true` if the channel is empty.
    pub fn is_empty(&self) -> bool {
        true
    }

    /// Returns `true` if the channel is full.
    pub fn is_full(&self) -> bool {
        true
    }
}
