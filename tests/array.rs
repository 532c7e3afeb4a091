//! Tests for buffered channels.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_utils::thread::scope;
use csp_channel::Channel;

fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[test]
fn smoke() {
    let ch = Channel::new(1);
    assert!(ch.try_send(7).is_ok());
    assert_eq!(ch.try_recv(), Some(7));
    assert_eq!(ch.try_recv(), None);

    assert_eq!(ch.capacity(), 1);
    assert!(ch.is_empty());
    assert!(!ch.is_closed());
}

#[test]
fn try_ops() {
    let ch = Channel::new(2);

    assert!(ch.try_send(1).is_ok());
    assert!(ch.try_send(2).is_ok());
    assert!(ch.try_send(3).unwrap_err().is_full());
    assert!(ch.try_send(4).unwrap_err().is_full());

    assert_eq!(ch.try_recv(), Some(1));
    assert_eq!(ch.try_recv(), Some(2));
    assert_eq!(ch.try_recv(), None);
    assert_eq!(ch.try_recv(), None);
}

#[test]
fn fifo() {
    let ch = Channel::new(5);
    for i in 0..5 {
        ch.send(i).unwrap();
    }
    for i in 0..5 {
        assert_eq!(ch.recv(), Some(i));
    }
}

#[test]
fn recv_blocks_until_send() {
    let ch = Channel::new(1);

    scope(|scope| {
        scope.spawn(|_| {
            assert_eq!(ch.recv(), Some(7));
        });
        scope.spawn(|_| {
            thread::sleep(ms(500));
            ch.send(7).unwrap();
        });
    })
    .unwrap();
}

#[test]
fn send_blocks_when_full() {
    let ch = Channel::new(3);
    let parked = AtomicBool::new(true);

    scope(|scope| {
        scope.spawn(|_| {
            ch.send(1).unwrap();
            ch.send(2).unwrap();
            ch.send(3).unwrap();
            ch.send(4).unwrap();
            parked.store(false, Ordering::SeqCst);
        });

        thread::sleep(ms(500));
        assert!(parked.load(Ordering::SeqCst));

        assert_eq!(ch.recv(), Some(1));
        assert_eq!(ch.recv(), Some(2));
        assert_eq!(ch.recv(), Some(3));
        assert_eq!(ch.recv(), Some(4));
    })
    .unwrap();

    assert!(!parked.load(Ordering::SeqCst));
}

#[test]
fn send_after_close() {
    let ch = Channel::new(2);
    ch.send(1).unwrap();
    ch.close();

    let err = ch.send(2).unwrap_err();
    assert_eq!(err.into_inner(), 2);
}

#[test]
fn close_wakes_sender() {
    let ch = Channel::new(1);
    ch.send(1).unwrap();

    scope(|scope| {
        scope.spawn(|_| {
            let err = ch.send(2).unwrap_err();
            assert_eq!(err.into_inner(), 2);
        });

        thread::sleep(ms(500));
        ch.close();
    })
    .unwrap();
}

#[test]
fn close_wakes_receiver() {
    let ch = Channel::<i32>::new(1);

    scope(|scope| {
        scope.spawn(|_| {
            assert_eq!(ch.recv(), None);
        });

        thread::sleep(ms(500));
        ch.close();
    })
    .unwrap();
}

#[test]
fn drain_after_close() {
    let ch = Channel::new(2);
    ch.send(1).unwrap();
    ch.send(2).unwrap();
    ch.close();

    assert_eq!(ch.recv(), Some(1));
    assert_eq!(ch.recv(), Some(2));
    assert_eq!(ch.recv(), None);
    assert_eq!(ch.recv(), None);
}

#[test]
fn close_is_idempotent() {
    let ch = Channel::<i32>::new(1);

    assert!(!ch.is_closed());
    assert!(ch.close());
    assert!(ch.is_closed());
    assert!(!ch.close());
    assert!(ch.is_closed());
}

#[test]
fn spsc() {
    const COUNT: usize = 10_000;

    let ch = Channel::new(3);

    scope(|scope| {
        scope.spawn(|_| {
            for i in 0..COUNT {
                ch.send(i).unwrap();
            }
            ch.close();
        });

        for i in 0..COUNT {
            assert_eq!(ch.recv(), Some(i));
        }
        assert_eq!(ch.recv(), None);
    })
    .unwrap();
}

#[test]
fn mpmc() {
    const COUNT: usize = 1_000;
    const THREADS: usize = 4;

    let ch = Channel::<usize>::new(3);
    let v = (0..COUNT).map(|_| AtomicUsize::new(0)).collect::<Vec<_>>();
    let done_senders = AtomicUsize::new(0);

    scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|_| {
                while let Some(n) = ch.recv() {
                    v[n].fetch_add(1, Ordering::SeqCst);
                }
            });
        }
        for _ in 0..THREADS {
            scope.spawn(|_| {
                for i in 0..COUNT {
                    ch.send(i).unwrap();
                }
                if done_senders.fetch_add(1, Ordering::SeqCst) + 1 == THREADS {
                    ch.close();
                }
            });
        }
    })
    .unwrap();

    for c in v {
        assert_eq!(c.load(Ordering::SeqCst), THREADS);
    }
}
