//! The channel interface.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::err::{
    RecvError, RecvTimeoutError, SendError, SendTimeoutError, TryRecvError, TrySendError,
};
use crate::flavors;

/// A channel in the form of one of the different flavors.
struct Channel<T> {
    /// The number of senders associated with this channel.
    senders: AtomicUsize,

    /// The number of receivers associated with this channel.
    receivers: AtomicUsize,

    /// This channel's flavor.
    flavor: Flavor<T>,
}

/// Channel flavors.
enum Flavor<T> {
    /// Bounded channel based on a preallocated buffer.
    Array(flavors::array::Channel<T>),

    /// Unbounded channel backed by a growable buffer.
    List(flavors::list::Channel<T>),

    /// Zero-capacity channel.
    Zero(flavors::zero::Channel<T>),
}

impl<T> Channel<T> {
    fn close(&self) -> bool {
        match self.flavor {
            Flavor::Array(ref chan) => chan.close(),
            Flavor::List(ref chan) => chan.close(),
            Flavor::Zero(ref chan) => chan.close(),
        }
    }
}

/// Creates a channel of unbounded capacity.
///
/// This channel has a growable buffer that can hold any number of messages at a time, so sending
/// never blocks.
///
/// # Examples
///
/// ```
/// use relay::unbounded;
///
/// let (s, r) = unbounded();
///
/// s.send("Hello world!").unwrap();
/// assert_eq!(r.recv(), Ok("Hello world!"));
/// ```
pub fn unbounded<T>() -> (Sender<T>, Receiver<T>) {
    let chan = Arc::new(Channel {
        senders: AtomicUsize::new(0),
        receivers: AtomicUsize::new(0),
        flavor: Flavor::List(flavors::list::Channel::new()),
    });
    (Sender::new(chan.clone()), Receiver::new(chan))
}

/// Creates a channel of bounded capacity.
///
/// This channel has a buffer that can hold at most `cap` messages at a time. A send operation
/// blocks while the buffer is full.
///
/// A rather special case is a zero-capacity channel, also known as a *rendezvous* channel. Such a
/// channel cannot hold any messages: a send operation and a receive operation have to pair up at
/// the same time for the message to pass from one thread to the other.
///
/// # Examples
///
/// ```
/// use relay::bounded;
///
/// let (s, r) = bounded(1);
///
/// // This call returns immediately because there is enough space in the channel.
/// s.send(1).unwrap();
///
/// // This call would block because the channel is full.
/// // s.send(2).unwrap();
///
/// assert_eq!(r.recv(), Ok(1));
/// ```
pub fn bounded<T>(cap: usize) -> (Sender<T>, Receiver<T>) {
    let chan = Arc::new(Channel {
        senders: AtomicUsize::new(0),
        receivers: AtomicUsize::new(0),
        flavor: if cap == 0 {
            Flavor::Zero(flavors::zero::Channel::new())
        } else {
            Flavor::Array(flavors::array::Channel::with_capacity(cap))
        },
    });
    (Sender::new(chan.clone()), Receiver::new(chan))
}

/// The sending side of a channel.
///
/// Senders can be cloned and shared among threads. When the last sender associated with a channel
/// is dropped, the channel becomes closed.
pub struct Sender<T>(Arc<Channel<T>>);

impl<T> Sender<T> {
    fn new(chan: Arc<Channel<T>>) -> Self {
        chan.senders.fetch_add(1, Ordering::SeqCst);
        Sender(chan)
    }

    /// Attempts to send a message into the channel without blocking.
    ///
    /// This method either sends the message or returns an error if the channel is full or
    /// closed. A zero-capacity channel is full unless a receiver is currently waiting.
    pub fn try_send(&self, msg: T) -> Result<(), TrySendError<T>> {
        match self.0.flavor {
            Flavor::Array(ref chan) => chan.try_send(msg),
            Flavor::List(ref chan) => chan.try_send(msg),
            Flavor::Zero(ref chan) => chan.try_send(msg),
        }
    }

    /// Sends a message into the channel, blocking while the channel is full.
    ///
    /// If the channel is (or becomes) closed, the message cannot be delivered and this call
    /// fails, returning the message back to the caller.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay::bounded;
    ///
    /// let (s, r) = bounded(1);
    /// assert_eq!(s.send(1), Ok(()));
    ///
    /// r.close();
    /// assert_eq!(s.send(2), Err(relay::SendError(2)));
    /// ```
    pub fn send(&self, msg: T) -> Result<(), SendError<T>> {
        let res = match self.0.flavor {
            Flavor::Array(ref chan) => chan.send(msg, None),
            Flavor::List(ref chan) => return chan.send(msg),
            Flavor::Zero(ref chan) => chan.send(msg, None),
        };
        match res {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Closed(msg)) => Err(SendError(msg)),
            Err(SendTimeoutError::Timeout(msg)) => Err(SendError(msg)),
        }
    }

    /// Sends a message into the channel, blocking for at most `timeout`.
    ///
    /// A timed-out send has no effect: the message is returned to the caller and the channel is
    /// left exactly as it was.
    pub fn send_timeout(&self, msg: T, timeout: Duration) -> Result<(), SendTimeoutError<T>> {
        let deadline = Instant::now() + timeout;
        match self.0.flavor {
            Flavor::Array(ref chan) => chan.send(msg, Some(deadline)),
            Flavor::List(ref chan) => chan.send(msg).map_err(SendTimeoutError::from),
            Flavor::Zero(ref chan) => chan.send(msg, Some(deadline)),
        }
    }

    /// Closes the channel.
    ///
    /// After this call no message can be sent, but messages already in the buffer remain
    /// receivable until drained. All blocked send and receive operations are woken up.
    ///
    /// This method is idempotent; it returns `true` if it was this call that closed the channel.
    pub fn close(&self) -> bool {
        self.0.close()
    }

    /// Returns `true` if the channel is closed.
    pub fn is_closed(&self) -> bool {
        match self.0.flavor {
            Flavor::Array(ref chan) => chan.is_closed(),
            Flavor::List(ref chan) => chan.is_closed(),
            Flavor::Zero(ref chan) => chan.is_closed(),
        }
    }

    /// Returns `true` if the channel is empty.
    ///
    /// Note: zero-capacity channels are always empty.
    pub fn is_empty(&self) -> bool {
        match self.0.flavor {
            Flavor::Array(ref chan) => chan.is_empty(),
            Flavor::List(ref chan) => chan.is_empty(),
            Flavor::Zero(ref chan) => chan.is_empty(),
        }
    }

    /// Returns `true` if the channel is full.
    ///
    /// Note: zero-capacity channels are always full.
    pub fn is_full(&self) -> bool {
        match self.0.flavor {
            Flavor::Array(ref chan) => chan.is_full(),
            Flavor::List(ref chan) => chan.is_full(),
            Flavor::Zero(ref chan) => chan.is_full(),
        }
    }

    /// Returns the number of messages in the channel.
    pub fn len(&self) -> usize {
        match self.0.flavor {
            Flavor::Array(ref chan) => chan.len(),
            Flavor::List(ref chan) => chan.len(),
            Flavor::Zero(ref chan) => chan.len(),
        }
    }

    /// Returns the capacity of the channel, or `None` if it is unbounded.
    pub fn capacity(&self) -> Option<usize> {
        match self.0.flavor {
            Flavor::Array(ref chan) => chan.capacity(),
            Flavor::List(ref chan) => chan.capacity(),
            Flavor::Zero(ref chan) => chan.capacity(),
        }
    }
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        if self.0.senders.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.close();
        }
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Sender::new(self.0.clone())
    }
}

impl<T> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Sender { .. }")
    }
}

/// The receiving side of a channel.
///
/// Receivers can be cloned and shared among threads. When the last receiver associated with a
/// channel is dropped, the channel becomes closed.
pub struct Receiver<T>(Arc<Channel<T>>);

impl<T> Receiver<T> {
    fn new(chan: Arc<Channel<T>>) -> Self {
        chan.receivers.fetch_add(1, Ordering::SeqCst);
        Receiver(chan)
    }

    /// Attempts to receive a message from the channel without blocking.
    ///
    /// `Err(TryRecvError::Empty)` means no message was ready; `Err(TryRecvError::Closed)` means
    /// the channel is closed and fully drained.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        match self.0.flavor {
            Flavor::Array(ref chan) => chan.try_recv(),
            Flavor::List(ref chan) => chan.try_recv(),
            Flavor::Zero(ref chan) => chan.try_recv(),
        }
    }

    /// Receives a message from the channel, blocking while it is empty.
    ///
    /// Messages are received in the order they were sent. Closing the channel does not discard
    /// buffered messages: this call keeps succeeding until the buffer is drained and only then
    /// reports the channel as closed.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay::{unbounded, RecvError};
    ///
    /// let (s, r) = unbounded();
    /// s.send(5).unwrap();
    /// s.close();
    ///
    /// assert_eq!(r.recv(), Ok(5));
    /// assert_eq!(r.recv(), Err(RecvError));
    /// ```
    pub fn recv(&self) -> Result<T, RecvError> {
        let res = match self.0.flavor {
            Flavor::Array(ref chan) => chan.recv(None),
            Flavor::List(ref chan) => chan.recv(None),
            Flavor::Zero(ref chan) => chan.recv(None),
        };
        res.map_err(|_| RecvError)
    }

    /// Receives a message from the channel, blocking for at most `timeout`.
    ///
    /// A timed-out receive has no effect: no message is consumed and the channel is left exactly
    /// as it was.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        let deadline = Instant::now() + timeout;
        match self.0.flavor {
            Flavor::Array(ref chan) => chan.recv(Some(deadline)),
            Flavor::List(ref chan) => chan.recv(Some(deadline)),
            Flavor::Zero(ref chan) => chan.recv(Some(deadline)),
        }
    }

    /// Closes the channel.
    ///
    /// After this call no message can be sent, but messages already in the buffer remain
    /// receivable until drained. All blocked send and receive operations are woken up.
    ///
    /// This method is idempotent; it returns `true` if it was this call that closed the channel.
    pub fn close(&self) -> bool {
        self.0.close()
    }

    /// Returns `true` if the channel is closed.
    pub fn is_closed(&self) -> bool {
        match self.0.flavor {
            Flavor::Array(ref chan) => chan.is_closed(),
            Flavor::List(ref chan) => chan.is_closed(),
            Flavor::Zero(ref chan) => chan.is_closed(),
        }
    }

    /// Returns `true` if the channel is empty.
    ///
    /// Note: zero-capacity channels are always empty.
    pub fn is_empty(&self) -> bool {
        match self.0.flavor {
            Flavor::Array(ref chan) => chan.is_empty(),
            Flavor::List(ref chan) => chan.is_empty(),
            Flavor::Zero(ref chan) => chan.is_empty(),
        }
    }

    /// Returns `true` if the channel is full.
    ///
    /// Note: zero-capacity channels are always full.
    pub fn is_full(&self) -> bool {
        match self.0.flavor {
            Flavor::Array(ref chan) => chan.is_full(),
            Flavor::List(ref chan) => chan.is_full(),
            Flavor::Zero(ref chan) => chan.is_full(),
        }
    }

    /// Returns the number of messages in the channel.
    pub fn len(&self) -> usize {
        match self.0.flavor {
            Flavor::Array(ref chan) => chan.len(),
            Flavor::List(ref chan) => chan.len(),
            Flavor::Zero(ref chan) => chan.len(),
        }
    }

    /// Returns the capacity of the channel, or `None` if it is unbounded.
    pub fn capacity(&self) -> Option<usize> {
        match self.0.flavor {
            Flavor::Array(ref chan) => chan.capacity(),
            Flavor::List(ref chan) => chan.capacity(),
            Flavor::Zero(ref chan) => chan.capacity(),
        }
    }

    /// A blocking iterator over messages in the channel.
    ///
    /// Each call to [`next`] blocks waiting for the next message and then returns it. The
    /// iterator ends when the channel is closed and drained. It is single-pass: messages it
    /// yields are consumed from the channel.
    ///
    /// [`next`]: Iterator::next
    ///
    /// # Examples
    ///
    /// ```
    /// use relay::unbounded;
    ///
    /// let (s, r) = unbounded();
    ///
    /// s.send(1).unwrap();
    /// s.send(2).unwrap();
    /// s.close();
    ///
    /// let v: Vec<_> = r.iter().collect();
    /// assert_eq!(v, [1, 2]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { receiver: self }
    }

    /// A non-blocking iterator over messages in the channel.
    ///
    /// Each call to [`next`] returns a message if one is immediately available, ending the
    /// iteration otherwise. The iterator never blocks.
    ///
    /// [`next`]: Iterator::next
    pub fn try_iter(&self) -> TryIter<'_, T> {
        TryIter { receiver: self }
    }
}

impl<T> Drop for Receiver<T> {
    fn drop(&mut self) {
        if self.0.receivers.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.close();
        }
    }
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        Receiver::new(self.0.clone())
    }
}

impl<T> fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Receiver { .. }")
    }
}

impl<'a, T> IntoIterator for &'a Receiver<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for Receiver<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { receiver: self }
    }
}

/// A blocking iterator over messages in a channel.
pub struct Iter<'a, T> {
    receiver: &'a Receiver<T>,
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.recv().ok()
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Iter { .. }")
    }
}

/// A non-blocking iterator over messages in a channel.
pub struct TryIter<'a, T> {
    receiver: &'a Receiver<T>,
}

impl<T> Iterator for TryIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.try_recv().ok()
    }
}

impl<T> fmt::Debug for TryIter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("TryIter { .. }")
    }
}

/// A blocking iterator that owns its receiver.
pub struct IntoIter<T> {
    receiver: Receiver<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.recv().ok()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("IntoIter { .. }")
    }
}
