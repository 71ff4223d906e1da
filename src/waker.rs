//! Waking mechanism for threads blocked on channel operations.

use std::collections::VecDeque;
use std::sync::Arc;

use crossbeam_utils::Backoff;
use parking_lot::Mutex;

use crate::context::{Context, Operation, Selected};

/// A slot through which a message is passed between two paired operations.
///
/// A blocked sender registers a slot holding its message; a blocked receiver registers an empty
/// one. The peer that wins the selection moves the message through the slot.
pub struct Slot<T>(Mutex<Option<T>>);

impl<T> Slot<T> {
    /// Creates a slot, optionally holding a message.
    pub fn new(msg: Option<T>) -> Slot<T> {
        Slot(Mutex::new(msg))
    }

    /// Puts a message into an empty slot.
    pub fn put(&self, msg: T) {
        let mut inner = self.0.lock();
        debug_assert!(inner.is_none());
        *inner = Some(msg);
    }

    /// Takes the message out of the slot.
    pub fn take(&self) -> Option<T> {
        self.0.lock().take()
    }

    /// Takes the message out of the slot, waiting until the peer has provided it.
    ///
    /// An operation can observe its selection before the peer finishes moving the message into
    /// the slot, so the slot may still be empty for a few more instructions.
    pub fn wait_take(&self) -> T {
        let backoff = Backoff::new();
        loop {
            if let Some(msg) = self.0.lock().take() {
                return msg;
            }
            backoff.snooze();
        }
    }
}

/// A blocked operation waiting in a channel's wait queue.
pub struct Entry<T> {
    /// The operation.
    pub oper: Operation,

    /// The slot the operation transfers its message through.
    pub slot: Arc<Slot<T>>,

    /// Context of the thread owning this operation.
    pub cx: Context,
}

/// A FIFO queue of threads blocked on channel operations.
///
/// Wakers are embedded in a channel's state and rely on the channel's own lock for
/// synchronization; they perform none of their own. The queue order is registration order, which
/// makes wake-ups first-waiter-first-served.
pub struct Waker<T> {
    entries: VecDeque<Entry<T>>,
}

impl<T> Waker<T> {
    /// Creates a new `Waker`.
    pub fn new() -> Waker<T> {
        Waker {
            entries: VecDeque::new(),
        }
    }

    /// Registers a blocked operation with the slot it transfers through.
    pub fn register(&mut self, oper: Operation, slot: Arc<Slot<T>>, cx: &Context) {
        self.entries.push_back(Entry {
            oper,
            slot,
            cx: cx.clone(),
        });
    }

    /// Unregisters a previously registered operation.
    ///
    /// Returns `None` if the entry was already removed by a peer or by `close_all`.
    pub fn unregister(&mut self, oper: Operation) -> Option<Entry<T>> {
        self.entries
            .iter()
            .position(|entry| entry.oper == oper)
            .and_then(|i| self.entries.remove(i))
    }

    /// Removes and selects the longest-waiting live operation.
    ///
    /// Entries whose threads already aborted (timed out) are discarded along the way. The caller
    /// finishes the pairing: it moves the message through the entry's slot and unparks the
    /// entry's thread.
    pub fn wake_one(&mut self) -> Option<Entry<T>> {
        while let Some(entry) = self.entries.pop_front() {
            if entry.cx.try_select(Selected::Operation(entry.oper)).is_ok() {
                return Some(entry);
            }
        }
        None
    }

    /// Notifies all registered operations that the channel is closed and drains the queue.
    pub fn close_all(&mut self) {
        for entry in self.entries.drain(..) {
            if entry.cx.try_select(Selected::Closed).is_ok() {
                entry.cx.unpark();
            }
        }
    }
}

impl<T> Drop for Waker<T> {
    fn drop(&mut self) {
        debug_assert!(self.entries.is_empty());
    }
}
