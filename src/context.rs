//! Thread-parking context for blocked channel operations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, Thread};
use std::time::Instant;

use crossbeam_utils::Backoff;

/// Identifier associated with a single blocked operation by a specific thread.
///
/// The identifier is just the address of a value that is unique to the operation and alive for
/// its entire duration (the message slot it transfers through).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Operation(usize);

impl Operation {
    /// Creates an operation identifier from a reference.
    #[inline]
    pub fn hook<T>(r: &T) -> Operation {
        let val = r as *const T as usize;
        // Make sure that the address doesn't collide with the numerical representation of
        // `Selected::{Waiting, Aborted, Closed}`.
        assert!(val > 2);
        Operation(val)
    }
}

/// Current state of a blocked operation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Selected {
    /// Still waiting for a peer.
    Waiting,

    /// The attempt to block the current thread has been aborted (the deadline was reached).
    Aborted,

    /// The channel was closed while the operation was blocked.
    Closed,

    /// A peer completed the operation.
    Operation(Operation),
}

impl From<usize> for Selected {
    #[inline]
    fn from(val: usize) -> Selected {
        match val {
            0 => Selected::Waiting,
            1 => Selected::Aborted,
            2 => Selected::Closed,
            oper => Selected::Operation(Operation(oper)),
        }
    }
}

impl From<Selected> for usize {
    #[inline]
    fn from(sel: Selected) -> usize {
        match sel {
            Selected::Waiting => 0,
            Selected::Aborted => 1,
            Selected::Closed => 2,
            Selected::Operation(Operation(val)) => val,
        }
    }
}

/// Thread-local context used for blocking.
///
/// A blocked operation parks on its context. A peer completes the operation by winning the CAS
/// on the selection state and unparking the thread; the blocked side observes the outcome in
/// [`wait_until`].
///
/// [`wait_until`]: Context::wait_until
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

struct Inner {
    /// Selected operation state, encoded as in `Selected`.
    select: AtomicUsize,

    /// The thread this context belongs to.
    thread: Thread,
}

impl Context {
    /// Creates a new context for the current thread.
    fn new() -> Context {
        Context {
            inner: Arc::new(Inner {
                select: AtomicUsize::new(Selected::Waiting.into()),
                thread: thread::current(),
            }),
        }
    }

    /// Runs `f` with a reset reference to the current thread's context.
    #[inline]
    pub fn with<F, R>(f: F) -> R
    where
        F: FnOnce(&Context) -> R,
    {
        thread_local! {
            static CONTEXT: Context = Context::new();
        }

        let mut f = Some(f);
        let mut run = |cx: &Context| f.take().unwrap()(cx);

        CONTEXT
            .try_with(|cx| {
                cx.reset();
                run(cx)
            })
            // The thread-local is being destroyed; fall back to a fresh context.
            .unwrap_or_else(|_| run(&Context::new()))
    }

    /// Resets the selection state.
    #[inline]
    fn reset(&self) {
        self.inner
            .select
            .store(Selected::Waiting.into(), Ordering::Release);
    }

    /// Attempts to select an operation.
    ///
    /// On failure, the previously selected operation is returned.
    #[inline]
    pub fn try_select(&self, select: Selected) -> Result<(), Selected> {
        self.inner
            .select
            .compare_exchange(
                Selected::Waiting.into(),
                select.into(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(|e| e.into())
    }

    /// Returns the selected operation.
    #[inline]
    pub fn selected(&self) -> Selected {
        Selected::from(self.inner.select.load(Ordering::Acquire))
    }

    /// Unparks the thread this context belongs to.
    #[inline]
    pub fn unpark(&self) {
        self.inner.thread.unpark();
    }

    /// Waits until an operation is selected and returns it.
    ///
    /// If the deadline is reached, the context is aborted and `Selected::Aborted` is returned,
    /// unless a peer selected the operation first.
    pub fn wait_until(&self, deadline: Option<Instant>) -> Selected {
        // Spin for a short time, hoping a peer shows up quickly.
        let backoff = Backoff::new();
        loop {
            match self.selected() {
                Selected::Waiting => {}
                sel => return sel,
            }

            if backoff.is_completed() {
                break;
            }
            backoff.snooze();
        }

        loop {
            match self.selected() {
                Selected::Waiting => {}
                sel => return sel,
            }

            if let Some(end) = deadline {
                let now = Instant::now();

                if now < end {
                    thread::park_timeout(end - now);
                } else {
                    // The deadline was reached. Try aborting the operation; a peer may still
                    // have won the race in the meantime.
                    return match self.try_select(Selected::Aborted) {
                        Ok(()) => Selected::Aborted,
                        Err(sel) => sel,
                    };
                }
            } else {
                thread::park();
            }
        }
    }
}
