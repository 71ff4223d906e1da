//! Multi-producer multi-consumer channels for message passing, with periodic tickers.
//!
//! This crate provides blocking channels that can be closed explicitly, plus tickers that
//! deliver messages on a timed cadence.
//!
//! Here's a quick example:
//!
//! ```
//! use relay::unbounded;
//!
//! // Create a channel of unbounded capacity.
//! let (s, r) = unbounded();
//!
//! // Send a message into the channel.
//! s.send("Hello world!").unwrap();
//!
//! // Receive the message from the channel.
//! assert_eq!(r.recv(), Ok("Hello world!"));
//! ```
//!
//! # Types of channels
//!
//! A channel is created by calling [`bounded`] or [`unbounded`]. The former creates a channel of
//! bounded capacity (there is a limit to how many messages it can hold at a time), while the
//! latter creates a channel of unbounded capacity.
//!
//! Both functions return two handles: a sender and a receiver. Messages are sent into the
//! channel using senders and received using receivers. Both kinds of handles can be cloned and
//! shared among any number of threads.
//!
//! A rather special case is a bounded, zero-capacity channel. This kind of channel cannot hold
//! any messages at all! In order to pass a message through, a sending thread and a receiving
//! thread have to pair up at the same time:
//!
//! ```
//! use std::thread;
//! use relay::bounded;
//!
//! // Create a zero-capacity channel.
//! let (s, r) = bounded(0);
//!
//! // Sending blocks until a receive operation appears on the other side.
//! thread::spawn(move || s.send("Hi!").unwrap());
//!
//! // Receiving blocks until a send operation appears on the other side.
//! assert_eq!(r.recv(), Ok("Hi!"));
//! ```
//!
//! # Closing channels
//!
//! A channel is closed by calling [`close`] on either of its handles, or automatically when all
//! senders or all receivers are dropped. No more messages can be sent after that, but any
//! messages already in the channel remain receivable until drained. Send and receive operations
//! blocked at the moment of closing are woken up and fail.
//!
//! ```
//! use relay::{unbounded, RecvError};
//!
//! let (s, r) = unbounded();
//! s.send(1).unwrap();
//! s.send(2).unwrap();
//!
//! // Closing is idempotent: only the first call reports having closed the channel.
//! assert!(s.close());
//! assert!(!s.close());
//!
//! // The remaining messages can still be received.
//! assert_eq!(r.recv(), Ok(1));
//! assert_eq!(r.recv(), Ok(2));
//!
//! // There are no more messages in the channel.
//! assert_eq!(r.recv(), Err(RecvError));
//! ```
//!
//! Producers can poll [`is_closed`] to stop producing early instead of running into a failed
//! send.
//!
//! # Blocking and non-blocking operations
//!
//! Sending into a full bounded channel blocks until a slot frees up; receiving from an empty
//! channel blocks until a message arrives or the channel is closed. The `try_` variants
//! ([`try_send`], [`try_recv`]) never block, and the `_timeout` variants ([`send_timeout`],
//! [`recv_timeout`]) block up to a deadline. A timed-out operation has no effect: no message is
//! consumed or left behind half-sent.
//!
//! # Iteration
//!
//! Receivers can be used as iterators. The iteration is lazy and single-pass: it blocks waiting
//! for each next message and ends once the channel is closed and drained.
//!
//! ```
//! use std::thread;
//! use relay::unbounded;
//!
//! let (s, r) = unbounded();
//!
//! thread::spawn(move || {
//!     s.send(1).unwrap();
//!     s.send(2).unwrap();
//!     s.send(3).unwrap();
//!     // `s` is dropped here, closing the channel.
//! });
//!
//! let v: Vec<_> = r.iter().collect();
//! assert_eq!(v, [1, 2, 3]);
//! ```
//!
//! # Tickers
//!
//! A [`Ticker`] delivers a message on every multiple of a fixed period. It is consumed like the
//! receiving side of a channel, except the messages are produced by the passage of time. At most
//! one tick is ever pending: a slow consumer does not build up a backlog.
//!
//! ```
//! use std::time::Duration;
//! use relay::tick;
//!
//! let t = tick(Duration::from_millis(10)).unwrap();
//!
//! // The first tick is available immediately, the rest follow the cadence.
//! for _ in 0..3 {
//!     t.recv().unwrap();
//! }
//! t.cancel();
//! assert!(t.recv().is_err());
//! ```
//!
//! [`bounded`]: fn.bounded.html
//! [`unbounded`]: fn.unbounded.html
//! [`close`]: struct.Sender.html#method.close
//! [`is_closed`]: struct.Sender.html#method.is_closed
//! [`try_send`]: struct.Sender.html#method.try_send
//! [`send_timeout`]: struct.Sender.html#method.send_timeout
//! [`try_recv`]: struct.Receiver.html#method.try_recv
//! [`recv_timeout`]: struct.Receiver.html#method.recv_timeout
//! [`Ticker`]: struct.Ticker.html

mod channel;
mod context;
mod err;
mod flavors;
mod ticker;
mod waker;

pub use crate::channel::{bounded, unbounded, IntoIter, Iter, Receiver, Sender, TryIter};
pub use crate::err::{
    InvalidPeriodError, RecvError, RecvTimeoutError, SendError, SendTimeoutError, TryRecvError,
    TrySendError,
};
pub use crate::ticker::{tick, Ticker, TickerIter, TickerMode};
