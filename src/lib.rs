//! CSP-style channels with a multi-way select.
//!
//! This crate provides [`Channel`], a typed endpoint for passing messages
//! between threads, and [`Select`], which races send and receive operations
//! across any number of channels.
//!
//! # Channels
//!
//! A channel is created with a fixed capacity:
//!
//! * **Rendezvous** (capacity 0): a send blocks until a receiver takes the
//!   message, so sender and receiver meet for every exchange.
//! * **Buffered** (capacity k > 0): up to `k` messages queue in FIFO order;
//!   senders block only when the queue is full, receivers only when it is
//!   empty.
//!
//! Channels support blocking ([`send`]/[`recv`]), non-blocking
//! ([`try_send`]/[`try_recv`]), and future-returning
//! ([`send_async`]/[`recv_async`]) operations, along with an explicit
//! [`close`] protocol: once closed, sends fail, while receives drain the
//! remaining messages and then report end-of-stream as `None`.
//!
//! # Select
//!
//! [`Select`] accumulates send and receive cases, plus an optional default,
//! and executes at most one ready case per pass. When several cases are
//! ready at once, one is picked uniformly at random. The blocking form
//! waits — with optional timeout and cross-thread cancellation — by
//! subscribing a [`Notifier`] to every referenced channel.
//!
//! # Examples
//!
//! ```
//! use std::thread;
//! use csp_channel::Channel;
//!
//! let ch = Channel::new(2);
//! let producer = ch.clone();
//!
//! let t = thread::spawn(move || {
//!     for i in 0..5 {
//!         producer.send(i).unwrap();
//!     }
//!     producer.close();
//! });
//!
//! let mut received = Vec::new();
//! while let Some(i) = ch.recv() {
//!     received.push(i);
//! }
//! assert_eq!(received, [0, 1, 2, 3, 4]);
//! t.join().unwrap();
//! ```
//!
//! [`send`]: Channel::send
//! [`recv`]: Channel::recv
//! [`try_send`]: Channel::try_send
//! [`try_recv`]: Channel::try_recv
//! [`send_async`]: Channel::send_async
//! [`recv_async`]: Channel::recv_async
//! [`close`]: Channel::close

#![warn(missing_docs)]

mod channel;
mod err;
mod flavors;
mod notify;
mod select;

pub use crate::channel::{Channel, RecvFuture, SendFuture};
pub use crate::err::{SendError, TrySendError};
pub use crate::notify::Notifier;
pub use crate::select::{Canceller, Select};
