//! Channel that delivers messages periodically.
//!
//! Messages cannot be sent into this kind of channel; they are materialized on demand from the
//! tick schedule. No timer thread is involved.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::context::{Context, Operation, Selected};
use crate::err::{RecvTimeoutError, TryRecvError};
use crate::ticker::TickerMode;
use crate::waker::{Slot, Waker};

/// Channel state.
struct Inner {
    /// The instant at which the next message will be delivered.
    next_tick: Instant,

    /// Receivers waiting for the next tick, registered so `close` can wake them.
    receivers: Waker<Instant>,

    /// Equals `true` when the ticker has been cancelled.
    closed: bool,
}

/// Channel that delivers messages periodically.
pub struct Channel {
    /// The state of the channel.
    inner: Arc<Mutex<Inner>>,

    /// The time interval in which messages get delivered.
    period: Duration,

    /// Scheduling policy applied after each delivered tick.
    mode: TickerMode,
}

impl Channel {
    /// Creates a channel that delivers messages periodically.
    ///
    /// The first message is delivered `initial_delay` after creation. The caller guarantees a
    /// positive `period`.
    pub fn new(period: Duration, initial_delay: Duration, mode: TickerMode) -> Self {
        debug_assert!(period > Duration::ZERO);

        Channel {
            inner: Arc::new(Mutex::new(Inner {
                next_tick: Instant::now() + initial_delay,
                receivers: Waker::new(),
                closed: false,
            })),
            period,
            mode,
        }
    }

    /// Returns the tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Schedules the tick following a delivery at `now`.
    ///
    /// In `FixedDelay` mode the next deadline is a full period after the delivery. In
    /// `FixedPeriod` mode deadlines stay aligned to the creation-time cadence; if the consumer
    /// slipped past one or more scheduled ticks, the missed ones are dropped rather than queued
    /// and the schedule realigns to the next point on the original grid.
    fn advance(&self, inner: &mut Inner, now: Instant) {
        inner.next_tick = match self.mode {
            TickerMode::FixedDelay => now + self.period,
            TickerMode::FixedPeriod => {
                let next = inner.next_tick + self.period;
                if next > now {
                    next
                } else {
                    let behind = now.duration_since(inner.next_tick);
                    let rem = Duration::from_nanos(
                        (behind.as_nanos() % self.period.as_nanos()) as u64,
                    );
                    now + (self.period - rem)
                }
            }
        };
    }

    /// Attempts to receive a message without blocking.
    pub fn try_recv(&self) -> Result<Instant, TryRecvError> {
        let mut inner = self.inner.lock();

        if inner.closed {
            return Err(TryRecvError::Closed);
        }

        let now = Instant::now();

        // If the next tick time has been reached, we can receive the next message.
        if now >= inner.next_tick {
            let msg = inner.next_tick;
            self.advance(&mut inner, now);
            Ok(msg)
        } else {
            Err(TryRecvError::Empty)
        }
    }

    /// Receives a message from the channel.
    pub fn recv(&self, deadline: Option<Instant>) -> Result<Instant, RecvTimeoutError> {
        loop {
            let mut inner = self.inner.lock();

            if inner.closed {
                return Err(RecvTimeoutError::Closed);
            }

            let now = Instant::now();

            // Check if we can receive the next message.
            if now >= inner.next_tick {
                let msg = inner.next_tick;
                self.advance(&mut inner, now);
                return Ok(msg);
            }

            // Check if the operation deadline has been reached.
            if let Some(d) = deadline {
                if now >= d {
                    return Err(RecvTimeoutError::Timeout);
                }
            }

            let tick_at = inner.next_tick;

            // Park until the tick or the operation deadline, whichever comes first. The
            // registration only exists so that `close` can wake us early.
            let closed = Context::with(|cx| {
                let slot = Arc::new(Slot::new(None));
                let oper = Operation::hook(&*slot);
                inner.receivers.register(oper, slot, cx);
                drop(inner);

                let until = deadline.map_or(tick_at, |d| d.min(tick_at));
                match cx.wait_until(Some(until)) {
                    Selected::Aborted => {
                        // Either the tick came due or the operation deadline was reached;
                        // re-examine the schedule.
                        self.inner.lock().receivers.unregister(oper);
                        false
                    }
                    Selected::Closed => true,
                    Selected::Waiting | Selected::Operation(_) => unreachable!(),
                }
            });

            if closed {
                return Err(RecvTimeoutError::Closed);
            }
        }
    }

    /// Stops the ticker permanently and wakes up all blocked receivers.
    ///
    /// Returns `false` if the ticker was already cancelled.
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

    /// Returns `true` if the ticker has been cancelled.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Returns `true` if the channel is empty.
    pub fn is_empty(&self) -> bool {
        let inner = self.inner.lock();
        inner.closed || Instant::now() < inner.next_tick
    }

    /// Returns `true` if the channel is full.
    pub fn is_full(&self) -> bool {
        !self.is_empty()
    }

    /// Returns the number of messages in the channel.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            1
        }
    }

    /// Returns the capacity of the channel.
    pub fn capacity(&self) -> Option<usize> {
        Some(1)
    }
}

impl Clone for Channel {
    fn clone(&self) -> Channel {
        Channel {
            inner: self.inner.clone(),
            period: self.period,
            mode: self.mode,
        }
    }
}
