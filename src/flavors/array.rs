//! Bounded channel backed by a FIFO queue.
//!
//! Senders block while the queue is full, receivers block while it is empty.
//! FIFO order is kept among successful enqueues and among successful
//! dequeues.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::err::{SendError, TrySendError};
use crate::notify::{Notifier, Watchers};

/// Mutable state, guarded by the channel's lock.
struct Inner<T> {
    /// The queued messages. Never grows past `cap`.
    buffer: VecDeque<T>,

    /// Equals `true` once the channel is closed.
    closed: bool,

    /// Notifiers signaled on every state transition.
    watchers: Watchers,
}

/// Bounded channel.
pub(crate) struct Channel<T> {
    /// Maximum number of queued messages. Always greater than zero.
    cap: usize,

    inner: Mutex<Inner<T>>,

    /// Signaled when queue space frees up or the channel closes.
    senders: Condvar,

    /// Signaled when a message arrives or the channel closes.
    receivers: Condvar,
}

impl<T> Channel<T> {
    /// Creates a bounded channel of capacity `cap`.
    pub(crate) fn with_capacity(cap: usize) -> Self {
        assert!(cap > 0, "capacity must be positive");

        Channel {
            cap,
            inner: Mutex::new(Inner {
                buffer: VecDeque::with_capacity(cap),
                closed: false,
                watchers: Watchers::new(),
            }),
            senders: Condvar::new(),
            receivers: Condvar::new(),
        }
    }

    /// Returns the channel capacity.
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    /// Blocks until the message is enqueued, or fails if the channel is
    /// closed before that happens.
    pub(crate) fn send(&self, msg: T) -> Result<(), SendError<T>> {
        let mut inner = self.inner.lock();

        loop {
            if inner.closed {
                return Err(SendError(msg));
            }
            if inner.buffer.len() < self.cap {
                break;
            }
            self.senders.wait(&mut inner);
        }

        inner.buffer.push_back(msg);
        self.receivers.notify_one();
        inner.watchers.notify();
        Ok(())
    }

    /// Blocks until a message arrives. Returns `None` iff the channel is
    /// closed and the queue has drained.
    pub(crate) fn recv(&self) -> Option<T> {
        let mut inner = self.inner.lock();

        loop {
            if let Some(msg) = inner.buffer.pop_front() {
                self.senders.notify_one();
                inner.watchers.notify();
                return Some(msg);
            }
            if inner.closed {
                return None;
            }
            self.receivers.wait(&mut inner);
        }
    }

    /// Enqueues without blocking, failing if the queue is full or the
    /// channel is closed.
    pub(crate) fn try_send(&self, msg: T) -> Result<(), TrySendError<T>> {
        let mut inner = self.inner.lock();

        if inner.closed {
            return Err(TrySendError::Closed(msg));
        }
        if inner.buffer.len() == self.cap {
            return Err(TrySendError::Full(msg));
        }

        inner.buffer.push_back(msg);
        self.receivers.notify_one();
        inner.watchers.notify();
        Ok(())
    }

    /// Dequeues without blocking.
    pub(crate) fn try_recv(&self) -> Option<T> {
        let mut inner = self.inner.lock();

        let msg = inner.buffer.pop_front()?;
        self.senders.notify_one();
        inner.watchers.notify();
        Some(msg)
    }

    /// Closes the channel, waking all blocked senders, receivers, and
    /// watchers. Returns `true` if this call closed the channel.
    pub(crate) fn close(&self) -> bool {
        let mut inner = self.inner.lock();

        if inner.closed {
            return false;
        }
        inner.closed = true;

        self.senders.notify_all();
        self.receivers.notify_all();
        inner.watchers.notify();
        true
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.lock().buffer.is_empty()
    }

    /// Returns `true` if a receive operation would succeed without blocking.
    pub(crate) fn can_recv(&self) -> bool {
        !self.inner.lock().buffer.is_empty()
    }

    pub(crate) fn watch(&self, notifier: &Arc<Notifier>) {
        self.inner.lock().watchers.add(notifier);
    }

    pub(crate) fn unwatch(&self, notifier: &Arc<Notifier>) {
        self.inner.lock().watchers.remove(notifier);
    }
}
