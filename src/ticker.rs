//! Tickers: channel-like sources that deliver on a timed cadence rather than on demand.

use std::fmt;
use std::time::{Duration, Instant};

use crate::err::{InvalidPeriodError, RecvError, RecvTimeoutError, TryRecvError};
use crate::flavors;

/// Scheduling policy applied when the consumer falls behind the tick cadence.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickerMode {
    /// Ticks stay aligned to the cadence established at creation time.
    ///
    /// The n-th tick is scheduled at `creation + initial_delay + (n - 1) * period`, no matter
    /// when earlier ticks were received. A consumer that pauses past one or more scheduled ticks
    /// finds at most one tick pending, and the tick after that one arrives at the next point on
    /// the original grid, sooner than a full period after the pause.
    FixedPeriod,

    /// Each tick is scheduled a full period after the previous one was received.
    ///
    /// Consumer delay shifts all subsequent deadlines forward by the same amount; there is no
    /// catch-up.
    FixedDelay,
}

/// Creates a ticker that delivers ticks every `period`, starting immediately.
///
/// Equivalent to `Ticker::new(period, Duration::ZERO, TickerMode::FixedPeriod)`: the first tick
/// is available right away and the schedule stays aligned to the creation-time cadence.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use relay::tick;
///
/// let t = tick(Duration::from_millis(50)).unwrap();
///
/// // The first tick is available immediately.
/// t.try_recv().unwrap();
/// assert!(t.try_recv().is_err());
/// ```
pub fn tick(period: Duration) -> Result<Ticker, InvalidPeriodError> {
    Ticker::new(period, Duration::ZERO, TickerMode::FixedPeriod)
}

/// A source of ticks delivered on a fixed cadence.
///
/// A ticker behaves like the receiving side of a channel whose messages are materialized by the
/// passage of time: at most one tick is ever pending, receive operations block until the next
/// scheduled tick, and [`cancel`] acts like closing the channel. Each tick carries the `Instant`
/// for which it was scheduled.
///
/// Tickers can be cloned; clones share the same schedule, so ticks are distributed among
/// receiving threads rather than duplicated.
///
/// [`cancel`]: Ticker::cancel
pub struct Ticker {
    flavor: flavors::tick::Channel,
}

impl Ticker {
    /// Creates a ticker with the given period, initial delay, and scheduling mode.
    ///
    /// The first tick becomes available exactly `initial_delay` after creation; a zero
    /// `initial_delay` makes it available immediately. Fails if `period` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use relay::{Ticker, TickerMode};
    ///
    /// let t = Ticker::new(
    ///     Duration::from_millis(50),
    ///     Duration::from_millis(10),
    ///     TickerMode::FixedPeriod,
    /// )
    /// .unwrap();
    ///
    /// // Not yet: the initial delay hasn't elapsed.
    /// assert!(t.try_recv().is_err());
    /// ```
    pub fn new(
        period: Duration,
        initial_delay: Duration,
        mode: TickerMode,
    ) -> Result<Ticker, InvalidPeriodError> {
        if period == Duration::ZERO {
            return Err(InvalidPeriodError);
        }

        Ok(Ticker {
            flavor: flavors::tick::Channel::new(period, initial_delay, mode),
        })
    }

    /// Attempts to receive a tick without blocking.
    pub fn try_recv(&self) -> Result<Instant, TryRecvError> {
        self.flavor.try_recv()
    }

    /// Receives a tick, blocking until the next one is scheduled.
    ///
    /// Fails only if the ticker is cancelled.
    pub fn recv(&self) -> Result<Instant, RecvError> {
        self.flavor.recv(None).map_err(|_| RecvError)
    }

    /// Receives a tick, blocking for at most `timeout`.
    ///
    /// If the next tick is scheduled after the timeout expires, this returns
    /// `Err(RecvTimeoutError::Timeout)` without consuming anything.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Instant, RecvTimeoutError> {
        self.flavor.recv(Some(Instant::now() + timeout))
    }

    /// Stops the ticker permanently.
    ///
    /// No further ticks are produced and all blocked receive operations are woken up; subsequent
    /// receives fail as on a closed, drained channel.
    ///
    /// This method is idempotent; it returns `true` if it was this call that cancelled the
    /// ticker.
    pub fn cancel(&self) -> bool {
        self.flavor.close()
    }

    /// Returns `true` if the ticker has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.flavor.is_closed()
    }

    /// Returns the tick period.
    pub fn period(&self) -> Duration {
        self.flavor.period()
    }

    /// Returns `true` if no tick is currently pending.
    pub fn is_empty(&self) -> bool {
        self.flavor.is_empty()
    }

    /// Returns `true` if a tick is pending.
    pub fn is_full(&self) -> bool {
        self.flavor.is_full()
    }

    /// Returns the number of pending ticks (at most one).
    pub fn len(&self) -> usize {
        self.flavor.len()
    }

    /// Returns the tick capacity, which is always one.
    pub fn capacity(&self) -> Option<usize> {
        self.flavor.capacity()
    }

    /// A blocking iterator over ticks.
    ///
    /// The iterator ends when the ticker is cancelled.
    pub fn iter(&self) -> TickerIter<'_> {
        TickerIter { ticker: self }
    }
}

impl Clone for Ticker {
    fn clone(&self) -> Ticker {
        Ticker {
            flavor: self.flavor.clone(),
        }
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Ticker { .. }")
    }
}

impl<'a> IntoIterator for &'a Ticker {
    type Item = Instant;
    type IntoIter = TickerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A blocking iterator over ticks.
pub struct TickerIter<'a> {
    ticker: &'a Ticker,
}

impl Iterator for TickerIter<'_> {
    type Item = Instant;

    fn next(&mut self) -> Option<Self::Item> {
        self.ticker.recv().ok()
    }
}

impl fmt::Debug for TickerIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("TickerIter { .. }")
    }
}
