//! Wakeup subscriptions for threads waiting on channel state transitions.
//!
//! A [`Notifier`] is a shared wakeup object: anyone holding an `Arc` to it can
//! block until some channel it is watching changes state. Channels keep weak
//! references to their subscribed notifiers, so a notifier dropped by its
//! owner is simply pruned on the next signal instead of being signaled after
//! free.

use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

/// A shared wakeup object signaled on every state transition of the channels
/// watching it.
///
/// Waiting is epoch-based: a waiter samples [`epoch`] before probing channel
/// state and passes the sample to [`wait_until`]. If any signal arrives
/// between the sample and the wait, the epoch has already advanced and the
/// wait returns immediately, so no wakeup can be lost.
///
/// [`epoch`]: Notifier::epoch
/// [`wait_until`]: Notifier::wait_until
pub struct Notifier {
    /// Number of signals delivered so far.
    epoch: Mutex<u64>,

    /// Signaled whenever the epoch advances.
    cond: Condvar,
}

impl Notifier {
    /// Creates a new notifier.
    pub fn new() -> Notifier {
        Notifier {
            epoch: Mutex::new(0),
            cond: Condvar::new(),
        }
    }

    /// Wakes up all threads currently waiting on this notifier.
    ///
    /// This is cheap and non-blocking; channels call it while holding their
    /// own lock. Wakeup handlers must not call back into a channel from here.
    pub fn notify_all(&self) {
        let mut epoch = self.epoch.lock();
        *epoch += 1;
        self.cond.notify_all();
    }

    /// Returns the current epoch.
    pub fn epoch(&self) -> u64 {
        *self.epoch.lock()
    }

    /// Blocks until the epoch advances past `since`, the deadline expires, or
    /// a spurious wakeup occurs after an epoch change.
    ///
    /// Returns `false` iff the wait timed out without the epoch advancing.
    pub fn wait_until(&self, since: u64, deadline: Option<Instant>) -> bool {
        let mut epoch = self.epoch.lock();
        while *epoch == since {
            match deadline {
                None => self.cond.wait(&mut epoch),
                Some(d) => {
                    if self.cond.wait_until(&mut epoch, d).timed_out() {
                        return *epoch != since;
                    }
                }
            }
        }
        true
    }
}

impl Default for Notifier {
    fn default() -> Notifier {
        Notifier::new()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad("Notifier { .. }")
    }
}

/// The list of notifiers subscribed to a channel.
///
/// Lives inside the channel's `Inner` and is therefore guarded by the
/// channel's lock.
pub(crate) struct Watchers {
    list: Vec<Weak<Notifier>>,
}

impl Watchers {
    pub(crate) fn new() -> Watchers {
        Watchers { list: Vec::new() }
    }

    /// Subscribes a notifier.
    pub(crate) fn add(&mut self, notifier: &Arc<Notifier>) {
        self.list.push(Arc::downgrade(notifier));
    }

    /// Removes a notifier, along with any subscriptions whose owner is gone.
    pub(crate) fn remove(&mut self, notifier: &Arc<Notifier>) {
        self.list.retain(|w| match w.upgrade() {
            Some(n) => !Arc::ptr_eq(&n, notifier),
            None => false,
        });
    }

    /// Signals every live subscriber and prunes the dead ones.
    pub(crate) fn notify(&mut self) {
        self.list.retain(|w| match w.upgrade() {
            Some(n) => {
                n.notify_all();
                true
            }
            None => false,
        });
    }
}
