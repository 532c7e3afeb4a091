//! Tests for the future-returning operations.

use std::thread;
use std::time::Duration;

use futures_executor::block_on;

use csp_channel::Channel;

fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[test]
fn send_async_buffered() {
    let ch = Channel::new(1);

    let fut = ch.send_async(7);
    assert!(block_on(fut).is_ok());
    assert_eq!(ch.recv(), Some(7));
}

#[test]
fn recv_async_ready() {
    let ch = Channel::new(1);
    ch.send(7).unwrap();

    assert_eq!(block_on(ch.recv_async()), Some(7));
}

#[test]
fn send_async_after_close() {
    let ch = Channel::new(1);
    ch.close();

    let err = block_on(ch.send_async(10)).unwrap_err();
    assert_eq!(err.into_inner(), 10);
}

#[test]
fn recv_async_after_close() {
    let ch = Channel::<i32>::new(1);
    ch.close();

    assert_eq!(block_on(ch.recv_async()), None);
}

#[test]
fn send_async_blocks_until_recv() {
    let ch = Channel::new(0);

    let fut = ch.send_async(99);
    thread::sleep(ms(300));

    assert_eq!(ch.recv(), Some(99));
    assert!(block_on(fut).is_ok());
}

#[test]
fn recv_async_blocks_until_send() {
    let ch = Channel::new(0);

    let fut = ch.recv_async();
    thread::sleep(ms(300));

    ch.send(123).unwrap();
    assert_eq!(block_on(fut), Some(123));
}

#[test]
fn async_rendezvous_match() {
    let ch = Channel::new(0);

    let recv_fut = ch.recv_async();
    thread::sleep(ms(100));
    let send_fut = ch.send_async(42);

    assert!(block_on(send_fut).is_ok());
    assert_eq!(block_on(recv_fut), Some(42));
}

#[test]
fn close_unblocks_async_receiver() {
    let ch = Channel::<i32>::new(0);

    let fut = ch.recv_async();
    thread::sleep(ms(300));
    ch.close();

    assert_eq!(block_on(fut), None);
}
