//! Waiting on multiple channel operations at once.
//!
//! [`Select`] accumulates a list of send and receive cases over any number
//! of channels, then races them: a single pass ([`run`]) probes every case
//! and commits at most one, while the blocking form ([`run_blocking`])
//! parks on a [`Notifier`] subscribed to every referenced channel until a
//! case becomes ready, the timeout expires, or the select is cancelled.
//!
//! When several cases are ready in the same pass, one is chosen uniformly
//! at random. There is no fairness guarantee across passes.
//!
//! [`run`]: Select::run
//! [`run_blocking`]: Select::run_blocking

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use smallvec::SmallVec;

use crate::channel::Channel;
use crate::notify::Notifier;

/// What a case attempts when it is probed.
enum CaseKind {
    /// Send a message into the channel.
    Send,

    /// Take a message out of the channel.
    Recv,
}

/// A registered send or receive case.
///
/// The default case is not stored here; it is a flag on the `Select`, and
/// the index reported for it equals the number of registered cases.
struct Case<T> {
    kind: CaseKind,
    chan: Channel<T>,

    /// The payload of a send case. Taken when the send commits; a send case
    /// whose message is gone is inert in later passes.
    msg: Option<T>,

    /// The message taken by a chosen receive case.
    received: Option<T>,

    /// Set iff this case was the one chosen and its operation completed.
    success: bool,
}

/// Races multiple channel operations, executing at most one ready case per
/// pass.
///
/// # Examples
///
/// ```
/// use csp_channel::{Channel, Select};
///
/// let ch1 = Channel::new(1);
/// let ch2 = Channel::new(1);
/// ch1.send(10).unwrap();
///
/// let mut sel = Select::new();
/// sel.recv(&ch1).recv(&ch2);
///
/// assert!(sel.run());
/// assert_eq!(sel.selected_index(), Some(0));
/// assert_eq!(sel.received_value(), Some(10));
/// ```
pub struct Select<T> {
    /// The registered cases, in registration order.
    cases: Vec<Case<T>>,

    /// Index of the chosen case; equals `cases.len()` when the default case
    /// fired.
    selected: Option<usize>,

    /// Equals `true` once a default case has been registered.
    has_default: bool,

    /// Equals `true` once the notifier has been subscribed to the channels.
    registered: bool,

    /// Sticky cancellation flag, shared with every `Canceller`.
    cancelled: Arc<AtomicBool>,

    /// Wakeup subscription used by `run_blocking`.
    notifier: Arc<Notifier>,
}

impl<T> Select<T> {
    /// Creates an empty select.
    pub fn new() -> Select<T> {
        Select {
            cases: Vec::new(),
            selected: None,
            has_default: false,
            registered: false,
            cancelled: Arc::new(AtomicBool::new(false)),
            notifier: Arc::new(Notifier::new()),
        }
    }

    /// Adds a case receiving from `chan`.
    pub fn recv(&mut self, chan: &Channel<T>) -> &mut Select<T> {
        self.cases.push(Case {
            kind: CaseKind::Recv,
            chan: chan.clone(),
            msg: None,
            received: None,
            success: false,
        });
        self
    }

    /// Adds a case sending `msg` into `chan`.
    pub fn send(&mut self, chan: &Channel<T>, msg: T) -> &mut Select<T> {
        self.cases.push(Case {
            kind: CaseKind::Send,
            chan: chan.clone(),
            msg: Some(msg),
            received: None,
            success: false,
        });
        self
    }

    /// Adds a default case, chosen when no other case is ready.
    ///
    /// Registering a default more than once has no further effect. The
    /// index reported when the default fires equals the number of send and
    /// receive cases.
    pub fn default(&mut self) -> &mut Select<T> {
        self.has_default = true;
        self
    }

    /// Executes a single non-blocking pass over all cases.
    ///
    /// Every receive case is probed for readiness and every send case
    /// attempts to commit via `try_send`. If any case is ready, one is
    /// chosen uniformly at random; a chosen receive case then takes its
    /// message. Returns `true` if a case (or the default) was selected.
    ///
    /// A send case commits during the probe, so when several send cases are
    /// ready in the same pass their messages all enter their channels even
    /// though only the chosen case is marked successful.
    ///
    /// Returns `false` without a selection if a racing consumer drains the
    /// chosen receive case's channel between probe and commit; callers are
    /// expected to retry.
    ///
    /// # Examples
    ///
    /// ```
    /// use csp_channel::{Channel, Select};
    ///
    /// let ch: Channel<i32> = Channel::new(1);
    ///
    /// let mut sel = Select::new();
    /// sel.recv(&ch).default();
    ///
    /// // Nothing to receive, so the default fires: its index is the number
    /// // of real cases.
    /// assert!(sel.run());
    /// assert_eq!(sel.selected_index(), Some(1));
    /// ```
    pub fn run(&mut self) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return false;
        }

        self.selected = None;
        for case in &mut self.cases {
            case.received = None;
            case.success = false;
        }

        let mut ready: SmallVec<[usize; 4]> = SmallVec::new();
        for (i, case) in self.cases.iter_mut().enumerate() {
            match case.kind {
                CaseKind::Recv => {
                    if case.chan.can_recv() {
                        ready.push(i);
                    }
                }
                CaseKind::Send => {
                    // An already-committed case has no message left to send.
                    if let Some(msg) = case.msg.take() {
                        match case.chan.try_send(msg) {
                            Ok(()) => ready.push(i),
                            Err(err) => case.msg = Some(err.into_inner()),
                        }
                    }
                }
            }
        }

        if !ready.is_empty() {
            let chosen = ready[rand::thread_rng().gen_range(0..ready.len())];
            let case = &mut self.cases[chosen];

            match case.kind {
                CaseKind::Send => {
                    case.success = true;
                    self.selected = Some(chosen);
                    true
                }
                CaseKind::Recv => match case.chan.try_recv() {
                    Some(msg) => {
                        case.received = Some(msg);
                        case.success = true;
                        self.selected = Some(chosen);
                        true
                    }
                    // Lost the race to another consumer.
                    None => false,
                },
            }
        } else if self.has_default {
            self.selected = Some(self.cases.len());
            true
        } else {
            false
        }
    }

    /// Repeatedly runs passes, parking between them, until a case is
    /// selected, the timeout expires, or the select is cancelled.
    ///
    /// `None` as timeout means wait indefinitely. Returns the selected index
    /// (the case-count for the default case), or `None` on timeout or
    /// cancellation. A select with a default case returns on the first pass.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::thread;
    /// use std::time::Duration;
    /// use csp_channel::{Channel, Select};
    ///
    /// let ch = Channel::new(1);
    /// let ch2 = ch.clone();
    ///
    /// let t = thread::spawn(move || {
    ///     thread::sleep(Duration::from_millis(100));
    ///     ch2.send(7).unwrap();
    /// });
    ///
    /// let mut sel = Select::new();
    /// sel.recv(&ch);
    /// assert_eq!(sel.run_blocking(Some(Duration::from_secs(10))), Some(0));
    /// assert_eq!(sel.received_value(), Some(7));
    /// t.join().unwrap();
    /// ```
    pub fn run_blocking(&mut self, timeout: Option<Duration>) -> Option<usize> {
        let deadline = timeout.map(|t| Instant::now() + t);
        self.register();

        loop {
            if self.cancelled.load(Ordering::SeqCst) {
                return None;
            }

            // Sample before probing so a transition arriving between the
            // probe and the wait advances the epoch and is never lost.
            let epoch = self.notifier.epoch();

            if self.run() && self.selected.is_some() {
                return self.selected;
            }

            if let Some(d) = deadline {
                if Instant::now() >= d {
                    return None;
                }
            }

            self.notifier.wait_until(epoch, deadline);
        }
    }

    /// Cancels the select.
    ///
    /// Cancellation is sticky and level-triggered: every later [`run`]
    /// returns `false` and a blocked [`run_blocking`] returns `None`
    /// promptly. Send cases already committed by earlier passes are not
    /// rolled back.
    ///
    /// [`run`]: Select::run
    /// [`run_blocking`]: Select::run_blocking
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notifier.notify_all();
    }

    /// Returns `true` if the select has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns a handle that can cancel this select from another thread.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::thread;
    /// use std::time::Duration;
    /// use csp_channel::{Channel, Select};
    ///
    /// let ch: Channel<i32> = Channel::new(1);
    /// let mut sel = Select::new();
    /// sel.recv(&ch);
    ///
    /// let canceller = sel.canceller();
    /// let t = thread::spawn(move || {
    ///     thread::sleep(Duration::from_millis(100));
    ///     canceller.cancel();
    /// });
    ///
    /// assert_eq!(sel.run_blocking(None), None);
    /// assert!(sel.is_cancelled());
    /// t.join().unwrap();
    /// ```
    pub fn canceller(&self) -> Canceller {
        Canceller {
            cancelled: self.cancelled.clone(),
            notifier: self.notifier.clone(),
        }
    }

    /// Returns the index of the case chosen by the last pass, if any.
    ///
    /// The default case reports the number of send and receive cases.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Takes the message received by the chosen receive case, if any.
    pub fn received_value(&mut self) -> Option<T> {
        let chosen = self.selected?;
        self.cases.get_mut(chosen)?.received.take()
    }

    /// Returns `true` if the case at `index` was chosen and completed.
    pub fn case_succeeded(&self, index: usize) -> bool {
        self.cases.get(index).map_or(false, |case| case.success)
    }

    /// Subscribes the notifier to every distinct referenced channel, once.
    fn register(&mut self) {
        if self.registered {
            return;
        }
        self.registered = true;

        let mut seen: SmallVec<[usize; 4]> = SmallVec::new();
        for case in &self.cases {
            let id = case.chan.id();
            if !seen.contains(&id) {
                seen.push(id);
                case.chan.watch(&self.notifier);
            }
        }
    }
}

impl<T> Drop for Select<T> {
    fn drop(&mut self) {
        if !self.registered {
            return;
        }

        let mut seen: SmallVec<[usize; 4]> = SmallVec::new();
        for case in &self.cases {
            let id = case.chan.id();
            if !seen.contains(&id) {
                seen.push(id);
                case.chan.unwatch(&self.notifier);
            }
        }
    }
}

impl<T> fmt::Debug for Select<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Select { .. }")
    }
}

/// A cloneable handle that cancels its [`Select`] from any thread.
#[derive(Clone)]
pub struct Canceller {
    cancelled: Arc<AtomicBool>,
    notifier: Arc<Notifier>,
}

impl Canceller {
    /// Cancels the select, waking it if it is blocked.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notifier.notify_all();
    }

    /// Returns `true` if the select has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Canceller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Canceller { .. }")
    }
}
