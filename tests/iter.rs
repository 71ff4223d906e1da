//! Tests for iteration over receivers.

use crossbeam_utils::thread::scope;
use relay::{bounded, unbounded};

#[test]
fn nested_recv_iter() {
    let (s, r) = unbounded::<i32>();
    let (total_s, total_r) = unbounded::<i32>();

    scope(|scope| {
        scope.spawn(move |_| {
            let mut acc = 0;
            for x in &r {
                acc += x;
            }
            total_s.send(acc).unwrap();
        });

        s.send(3).unwrap();
        s.send(1).unwrap();
        s.send(2).unwrap();
        drop(s);
        assert_eq!(total_r.recv(), Ok(6));
    })
    .unwrap();
}

#[test]
fn recv_iter_break() {
    let (s, r) = unbounded::<i32>();
    let (count_s, count_r) = unbounded();

    scope(|scope| {
        scope.spawn(move |_| {
            let mut count = 0;
            for x in &r {
                if count >= 3 {
                    break;
                } else {
                    count += x;
                }
            }
            count_s.send(count).unwrap();
        });

        s.send(2).unwrap();
        s.send(2).unwrap();
        s.send(2).unwrap();
        let _ = s.send(2);
        drop(s);
        assert_eq!(count_r.recv(), Ok(4));
    })
    .unwrap();
}

#[test]
fn recv_into_iter_owned() {
    let mut iter = {
        let (s, r) = unbounded::<i32>();
        s.send(1).unwrap();
        s.send(2).unwrap();
        r.into_iter()
    };

    assert_eq!(iter.next().unwrap(), 1);
    assert_eq!(iter.next().unwrap(), 2);
    assert!(iter.next().is_none());
}

#[test]
fn recv_into_iter_borrowed() {
    let (s, r) = unbounded::<i32>();
    s.send(1).unwrap();
    s.send(2).unwrap();
    drop(s);

    let mut iter = (&r).into_iter();
    assert_eq!(iter.next().unwrap(), 1);
    assert_eq!(iter.next().unwrap(), 2);
    assert!(iter.next().is_none());
}

#[test]
fn try_iter_never_blocks() {
    let (s, r) = bounded::<i32>(4);

    assert_eq!(r.try_iter().count(), 0);

    s.send(1).unwrap();
    s.send(2).unwrap();

    // Only the messages already in the channel are yielded.
    let v: Vec<_> = r.try_iter().collect();
    assert_eq!(v, [1, 2]);
    assert_eq!(r.try_iter().count(), 0);
}

#[test]
fn iter_ends_after_close() {
    let (s, r) = unbounded::<i32>();

    s.send(1).unwrap();
    s.send(2).unwrap();
    s.close();

    // Closing does not discard buffered messages; iteration drains them and then ends.
    let v: Vec<_> = r.iter().collect();
    assert_eq!(v, [1, 2]);

    // The iteration is single-pass: a fresh iterator observes the drained channel.
    assert_eq!(r.iter().next(), None);
}
