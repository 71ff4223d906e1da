//! Tests for the unbounded channel flavor.

use std::thread;
use std::time::Duration;

use crossbeam_utils::thread::scope;
use relay::{unbounded, RecvError, RecvTimeoutError, SendError, TryRecvError};

fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[test]
fn smoke() {
    let (s, r) = unbounded();

    s.send(7).unwrap();
    assert_eq!(r.try_recv(), Ok(7));

    s.send(8).unwrap();
    assert_eq!(r.recv(), Ok(8));

    assert_eq!(r.try_recv(), Err(TryRecvError::Empty));
    assert_eq!(r.recv_timeout(ms(50)), Err(RecvTimeoutError::Timeout));
}

#[test]
fn capacity() {
    let (s, r) = unbounded::<()>();
    assert_eq!(s.capacity(), None);
    assert_eq!(r.capacity(), None);
    assert!(!s.is_full());
}

#[test]
fn send_never_blocks() {
    let (s, r) = unbounded();

    for i in 0..1000 {
        s.send(i).unwrap();
        assert_eq!(s.len(), i + 1);
    }

    for i in 0..1000 {
        assert_eq!(r.recv(), Ok(i));
    }
}

#[test]
fn recv_blocks_until_send() {
    let (s, r) = unbounded();

    scope(|scope| {
        scope.spawn(move |_| {
            assert_eq!(r.recv(), Ok(7));
        });
        thread::sleep(ms(100));
        s.send(7).unwrap();
    })
    .unwrap();
}

#[test]
fn close_drains_buffer_first() {
    let (s, r) = unbounded();

    s.send(1).unwrap();
    s.send(2).unwrap();

    assert!(r.close());
    assert_eq!(s.send(3), Err(SendError(3)));

    assert_eq!(r.recv(), Ok(1));
    assert_eq!(r.recv(), Ok(2));
    assert_eq!(r.recv(), Err(RecvError));
}

#[test]
fn close_wakes_blocked_receiver() {
    let (s, r) = unbounded::<i32>();

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
    let (s, r) = unbounded();

    assert_eq!(r.recv_timeout(ms(50)), Err(RecvTimeoutError::Timeout));

    s.send(7).unwrap();
    assert_eq!(r.recv_timeout(ms(50)), Ok(7));
}

#[test]
fn spsc_fifo() {
    const COUNT: usize = 100_000;

    let (s, r) = unbounded();

    scope(|scope| {
        scope.spawn(move |_| {
            for i in 0..COUNT {
                s.send(i).unwrap();
            }
        });
        for i in 0..COUNT {
            assert_eq!(r.recv(), Ok(i));
        }
        assert_eq!(r.recv(), Err(RecvError));
    })
    .unwrap();
}

// Messages from a single producer are never reordered, no matter how many producers share the
// channel.
#[test]
fn mpsc_preserves_per_producer_order() {
    const COUNT: usize = 10_000;
    const THREADS: usize = 4;

    let (s, r) = unbounded::<(usize, usize)>();

    scope(|scope| {
        for t in 0..THREADS {
            let s = s.clone();
            scope.spawn(move |_| {
                for i in 0..COUNT {
                    s.send((t, i)).unwrap();
                }
            });
        }
        drop(s);

        let mut next = [0; THREADS];
        for (t, i) in r.iter() {
            assert_eq!(i, next[t]);
            next[t] += 1;
        }
        assert!(next.iter().all(|&n| n == COUNT));
    })
    .unwrap();
}
