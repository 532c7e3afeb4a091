//! Tests for zero-capacity channels.

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
    let ch = Channel::new(0);
    assert_eq!(ch.capacity(), 0);
    assert!(ch.is_empty());
    assert!(ch.try_send(7).unwrap_err().is_full());
    assert_eq!(ch.try_recv(), None);
}

#[test]
fn rendezvous() {
    let ch = Channel::new(0);

    scope(|scope| {
        scope.spawn(|_| {
            ch.send(100).unwrap();
        });
        scope.spawn(|_| {
            assert_eq!(ch.recv(), Some(100));
        });
    })
    .unwrap();
}

#[test]
fn send_returns_after_handoff() {
    let ch = Channel::new(0);
    let done = AtomicBool::new(false);

    scope(|scope| {
        scope.spawn(|_| {
            ch.send(7).unwrap();
            done.store(true, Ordering::SeqCst);
        });

        thread::sleep(ms(500));
        assert!(!done.load(Ordering::SeqCst));

        assert_eq!(ch.recv(), Some(7));
        thread::sleep(ms(500));
        assert!(done.load(Ordering::SeqCst));
    })
    .unwrap();
}

#[test]
fn try_send_requires_parked_receiver() {
    let ch = Channel::new(0);

    assert!(ch.try_send(7).unwrap_err().is_full());

    scope(|scope| {
        scope.spawn(|_| {
            assert_eq!(ch.recv(), Some(8));
        });

        thread::sleep(ms(500));
        assert!(ch.try_send(8).is_ok());
    })
    .unwrap();
}

#[test]
fn try_recv_takes_pending_message() {
    let ch = Channel::new(0);

    scope(|scope| {
        scope.spawn(|_| {
            ch.send(9).unwrap();
        });

        thread::sleep(ms(500));
        assert_eq!(ch.try_recv(), Some(9));
    })
    .unwrap();
}

#[test]
fn send_after_close() {
    let ch = Channel::new(0);
    ch.close();

    let err = ch.send(7).unwrap_err();
    assert_eq!(err.into_inner(), 7);
    assert!(ch.try_send(8).unwrap_err().is_closed());
}

#[test]
fn close_wakes_receiver() {
    let ch = Channel::<i32>::new(0);

    scope(|scope| {
        scope.spawn(|_| {
            assert_eq!(ch.recv(), None);
        });

        thread::sleep(ms(500));
        ch.close();
    })
    .unwrap();
}

// A sender that has published but not yet handed off completes when the
// channel closes, and the published message stays drainable afterwards.
#[test]
fn close_does_not_discard_pending_message() {
    let ch = Channel::new(0);

    scope(|scope| {
        scope.spawn(|_| {
            assert!(ch.send(7).is_ok());
        });

        thread::sleep(ms(500));
        ch.close();
    })
    .unwrap();

    assert!(ch.is_closed());
    assert_eq!(ch.recv(), Some(7));
    assert_eq!(ch.recv(), None);
}

#[test]
fn close_fails_sender_waiting_for_slot() {
    let ch = Channel::new(0);

    scope(|scope| {
        scope.spawn(|_| {
            // Publishes into the slot, then blocks awaiting handoff.
            assert!(ch.send(1).is_ok());
        });

        scope.spawn(|_| {
            thread::sleep(ms(300));
            // The slot is occupied, so this sender blocks before
            // publishing and must fail once the channel closes.
            let err = ch.send(2).unwrap_err();
            assert_eq!(err.into_inner(), 2);
        });

        thread::sleep(ms(600));
        ch.close();
    })
    .unwrap();

    assert_eq!(ch.recv(), Some(1));
    assert_eq!(ch.recv(), None);
}

#[test]
fn spsc() {
    const COUNT: usize = 10_000;

    let ch = Channel::new(0);

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

    let ch = Channel::<usize>::new(0);
    let v = (0..THREADS * COUNT)
        .map(|_| AtomicUsize::new(0))
        .collect::<Vec<_>>();
    let done_senders = AtomicUsize::new(0);

    scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|_| {
                while let Some(n) = ch.recv() {
                    v[n].fetch_add(1, Ordering::SeqCst);
                }
            });
        }
        for t in 0..THREADS {
            let ch = &ch;
            let done_senders = &done_senders;
            scope.spawn(move |_| {
                for i in 0..COUNT {
                    ch.send(t * COUNT + i).unwrap();
                }
                if done_senders.fetch_add(1, Ordering::SeqCst) + 1 == THREADS {
                    ch.close();
                }
            });
        }
    })
    .unwrap();

    for c in v {
        assert_eq!(c.load(Ordering::SeqCst), 1);
    }
}
