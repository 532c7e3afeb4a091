//! Zero-capacity channel.
//!
//! This kind of channel is also known as *rendezvous* channel: a sender does
//! not return until a receiver has taken its message out of the exchange
//! slot, so a completed send is proof of a completed handoff.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::err::{SendError, TrySendError};
use crate::notify::{Notifier, Watchers};

/// Mutable state, guarded by the channel's lock.
struct Inner<T> {
    /// The message currently in flight, if any.
    slot: Option<T>,

    /// Equals `true` once the channel is closed.
    closed: bool,

    /// Number of receivers blocked in `recv`. `try_send` refuses to publish
    /// unless one of them is parked and committed to taking the message.
    waiting_receivers: usize,

    /// Notifiers signaled on every state transition.
    watchers: Watchers,
}

/// Zero-capacity channel.
pub(crate) struct Channel<T> {
    inner: Mutex<Inner<T>>,

    /// Signaled when the slot drains or the channel closes. Both senders
    /// racing for the empty slot and senders awaiting handoff completion
    /// wait here.
    senders: Condvar,

    /// Signaled when a message is published or the channel closes.
    receivers: Condvar,
}

impl<T> Channel<T> {
    /// Creates a zero-capacity channel.
    pub(crate) fn new() -> Self {
        Channel {
            inner: Mutex::new(Inner {
                slot: None,
                closed: false,
                waiting_receivers: 0,
                watchers: Watchers::new(),
            }),
            senders: Condvar::new(),
            receivers: Condvar::new(),
        }
    }

    /// Blocks until the message has been taken by a receiver.
    ///
    /// The send happens in two phases: first wait for the slot to be free
    /// and publish into it, then wait for a receiver to take the message.
    /// If the channel closes after publication the send still counts as
    /// completed — the message is visible to late receivers and is never
    /// dropped here.
    pub(crate) fn send(&self, msg: T) -> Result<(), SendError<T>> {
        let mut inner = self.inner.lock();

        // A message from a previous exchange must drain first.
        while inner.slot.is_some() && !inner.closed {
            self.senders.wait(&mut inner);
        }
        if inner.closed {
            return Err(SendError(msg));
        }

        inner.slot = Some(msg);
        self.receivers.notify_one();
        inner.watchers.notify();

        // Handoff: wait until the slot drains or the channel closes.
        while inner.slot.is_some() && !inner.closed {
            self.senders.wait(&mut inner);
        }
        Ok(())
    }

    /// Blocks until a message is published. Returns `None` iff the channel
    /// is closed and no message is left in the slot.
    pub(crate) fn recv(&self) -> Option<T> {
        let mut inner = self.inner.lock();

        inner.waiting_receivers += 1;
        while inner.slot.is_none() && !inner.closed {
            self.receivers.wait(&mut inner);
        }
        inner.waiting_receivers -= 1;

        // Close does not discard a published message: a closed channel with
        // a full slot still hands it to the next receiver.
        let msg = inner.slot.take()?;
        self.senders.notify_all();
        inner.watchers.notify();
        Some(msg)
    }

    /// Publishes without blocking.
    ///
    /// Unlike the blocking send, this requires a parked receiver: a message
    /// deposited with nobody committed to taking it would be orphaned, since
    /// `try_send` cannot stick around for the handoff.
    pub(crate) fn try_send(&self, msg: T) -> Result<(), TrySendError<T>> {
        let mut inner = self.inner.lock();

        if inner.closed {
            return Err(TrySendError::Closed(msg));
        }
        if inner.slot.is_some() || inner.waiting_receivers == 0 {
            return Err(TrySendError::Full(msg));
        }

        inner.slot = Some(msg);
        self.receivers.notify_one();
        inner.watchers.notify();
        Ok(())
    }

    /// Takes the in-flight message without blocking, if there is one.
    pub(crate) fn try_recv(&self) -> Option<T> {
        let mut inner = self.inner.lock();

        let msg = inner.slot.take()?;
        self.senders.notify_all();
        inner.watchers.notify();
        Some(msg)
    }

    /// Closes the channel, waking all blocked senders, receivers, and
    /// watchers. Returns `true` if this call closed the channel.
    ///
    /// A message already in the slot stays there for a late receiver to
    /// drain.
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
        self.inner.lock().slot.is_none()
    }

    /// Returns `true` if a receive operation would succeed without blocking.
    pub(crate) fn can_recv(&self) -> bool {
        self.inner.lock().slot.is_some()
    }

    pub(crate) fn watch(&self, notifier: &Arc<Notifier>) {
        self.inner.lock().watchers.add(notifier);
    }

    pub(crate) fn unwatch(&self, notifier: &Arc<Notifier>) {
        self.inner.lock().watchers.remove(notifier);
    }
}
