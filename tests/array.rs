//! Tests for the bounded channel flavor.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_utils::thread::scope;
use rand::Rng;
use relay::{bounded, RecvError, RecvTimeoutError, SendError, SendTimeoutError};
use relay::{TryRecvError, TrySendError};

fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[test]
fn smoke() {
    let (s, r) = bounded(1);
    s.send(7).unwrap();
    assert_eq!(r.try_recv(), Ok(7));

    s.send(8).unwrap();
    assert_eq!(r.recv(), Ok(8));

    assert_eq!(r.try_recv(), Err(TryRecvError::Empty));
    assert_eq!(r.recv_timeout(ms(50)), Err(RecvTimeoutError::Timeout));
}

#[test]
fn capacity() {
    for i in 1..10 {
        let (s, r) = bounded::<()>(i);
        assert_eq!(s.capacity(), Some(i));
        assert_eq!(r.capacity(), Some(i));
    }
}

#[test]
fn len_empty_full() {
    let (s, r) = bounded(2);

    assert_eq!(s.len(), 0);
    assert!(s.is_empty());
    assert!(!s.is_full());

    s.send(()).unwrap();
    s.send(()).unwrap();

    assert_eq!(r.len(), 2);
    assert!(!r.is_empty());
    assert!(r.is_full());

    r.recv().unwrap();

    assert_eq!(r.len(), 1);
    assert!(!r.is_full());
}

#[test]
fn try_send_full() {
    let (s, r) = bounded(2);

    assert_eq!(s.try_send(1), Ok(()));
    assert_eq!(s.try_send(2), Ok(()));
    assert_eq!(s.try_send(3), Err(TrySendError::Full(3)));

    assert_eq!(r.recv(), Ok(1));
    assert_eq!(s.try_send(3), Ok(()));
    assert_eq!(r.recv(), Ok(2));
    assert_eq!(r.recv(), Ok(3));
}

// A sender facing a full buffer suspends after the fourth message and resumes only once a
// receive frees a slot.
#[test]
fn buffering_blocks_sender() {
    let (s, r) = bounded(4);
    let sent = AtomicUsize::new(0);

    scope(|scope| {
        scope.spawn(|_| {
            for i in 0..10 {
                s.send(i).unwrap();
                sent.fetch_add(1, Ordering::SeqCst);
            }
        });

        thread::sleep(ms(200));
        assert_eq!(sent.load(Ordering::SeqCst), 4);

        assert_eq!(r.recv(), Ok(0));
        thread::sleep(ms(200));
        assert_eq!(sent.load(Ordering::SeqCst), 5);

        for i in 1..10 {
            assert_eq!(r.recv(), Ok(i));
        }
    })
    .unwrap();
}

#[test]
fn send_timeout_full_then_recover() {
    let (s, r) = bounded(1);

    s.send(1).unwrap();
    assert_eq!(s.send_timeout(2, ms(50)), Err(SendTimeoutError::Timeout(2)));

    // The expired sender left no trace; the channel still holds exactly one message.
    assert_eq!(r.len(), 1);
    assert_eq!(r.recv(), Ok(1));
    assert_eq!(s.send_timeout(3, ms(50)), Ok(()));
    assert_eq!(r.recv(), Ok(3));
}

#[test]
fn close_drains_buffer_first() {
    let (s, r) = bounded(10);

    s.send(1).unwrap();
    s.send(2).unwrap();
    s.send(3).unwrap();

    assert!(s.close());
    assert_eq!(s.try_send(4), Err(TrySendError::Closed(4)));
    assert_eq!(s.send(4), Err(SendError(4)));

    // Closing does not discard undelivered messages.
    assert_eq!(r.recv(), Ok(1));
    assert_eq!(r.recv(), Ok(2));
    assert_eq!(r.recv(), Ok(3));
    assert_eq!(r.try_recv(), Err(TryRecvError::Closed));
    assert_eq!(r.recv(), Err(RecvError));
}

#[test]
fn close_wakes_blocked_sender() {
    let (s, r) = bounded(1);
    s.send(1).unwrap();

    scope(|scope| {
        scope.spawn(|_| {
            // The blocked message is returned, not enqueued.
            assert_eq!(s.send(2), Err(SendError(2)));
        });
        thread::sleep(ms(100));
        assert!(r.close());
    })
    .unwrap();

    assert_eq!(r.recv(), Ok(1));
    assert_eq!(r.recv(), Err(RecvError));
}

#[test]
fn close_wakes_blocked_receiver() {
    let (s, r) = bounded::<i32>(4);

    scope(|scope| {
        scope.spawn(|_| {
            assert_eq!(r.recv(), Err(RecvError));
        });
        thread::sleep(ms(100));
        assert!(s.close());
    })
    .unwrap();
}

#[test]
fn recv_timeout_then_recover() {
    let (s, r) = bounded(1);

    assert_eq!(r.recv_timeout(ms(50)), Err(RecvTimeoutError::Timeout));

    s.send(7).unwrap();
    assert_eq!(r.recv_timeout(ms(50)), Ok(7));
}

#[test]
fn blocked_senders_keep_fifo_order() {
    let (s, r) = bounded(2);

    s.send(0).unwrap();
    s.send(1).unwrap();

    scope(|scope| {
        for i in 2..6 {
            let s = s.clone();
            scope.spawn(move |_| {
                s.send(i).unwrap();
            });
            // Let this sender block before the next one registers.
            thread::sleep(ms(100));
        }

        for i in 0..6 {
            assert_eq!(r.recv(), Ok(i));
        }
    })
    .unwrap();
}

#[test]
fn fifo_law() {
    const COUNT: usize = 10_000;

    for cap in [1, 4, 64] {
        let (s, r) = bounded(cap);

        scope(|scope| {
            scope.spawn(|_| {
                let mut rng = rand::thread_rng();
                for i in 0..COUNT {
                    s.send(i).unwrap();
                    if rng.gen_ratio(1, 100) {
                        thread::yield_now();
                    }
                }
            });

            let mut rng = rand::thread_rng();
            for i in 0..COUNT {
                assert_eq!(r.recv(), Ok(i));
                if rng.gen_ratio(1, 100) {
                    thread::yield_now();
                }
            }
        })
        .unwrap();
    }
}

#[test]
fn mpmc() {
    const COUNT: usize = 25_000;
    const THREADS: usize = 4;

    let (s, r) = bounded::<usize>(3);
    let v = (0..COUNT).map(|_| AtomicUsize::new(0)).collect::<Vec<_>>();

    scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|_| {
                for _ in 0..COUNT {
                    let n = r.recv().unwrap();
                    v[n].fetch_add(1, Ordering::SeqCst);
                }
            });
        }
        for _ in 0..THREADS {
            scope.spawn(|_| {
                for i in 0..COUNT {
                    s.send(i).unwrap();
                }
            });
        }
    })
    .unwrap();

    for c in v {
        assert_eq!(c.load(Ordering::SeqCst), THREADS);
    }
}
