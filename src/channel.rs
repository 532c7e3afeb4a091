//! The channel interface.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread;

use futures_channel::oneshot;

use crate::err::{SendError, TrySendError};
use crate::flavors;
use crate::notify::Notifier;

/// A channel in the form of one of the two different flavors.
enum Flavor<T> {
    /// Bounded channel backed by a FIFO queue.
    Array(flavors::array::Channel<T>),

    /// Zero-capacity rendezvous channel.
    Zero(flavors::zero::Channel<T>),
}

/// A typed endpoint conveying messages from senders to receivers.
///
/// A channel created with capacity zero is a *rendezvous* channel: a send
/// blocks until a receiver takes the message. A channel created with a
/// positive capacity holds up to that many messages in a FIFO queue,
/// decoupling senders from receivers until the queue fills up.
///
/// `Channel` is a cheaply cloneable handle; all clones refer to the same
/// underlying channel and may be used concurrently from any number of
/// threads.
///
/// # Examples
///
/// ```
/// use std::thread;
/// use csp_channel::Channel;
///
/// let ch = Channel::new(0);
/// let ch2 = ch.clone();
///
/// let t = thread::spawn(move || {
///     ch2.send(100).unwrap();
/// });
///
/// assert_eq!(ch.recv(), Some(100));
/// t.join().unwrap();
/// ```
pub struct Channel<T> {
    flavor: Arc<Flavor<T>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Channel<T> {
        Channel {
            flavor: self.flavor.clone(),
        }
    }
}

impl<T> Channel<T> {
    /// Creates a channel of the given capacity.
    ///
    /// A capacity of zero yields a rendezvous channel.
    ///
    /// # Examples
    ///
    /// ```
    /// use csp_channel::Channel;
    ///
    /// let ch = Channel::new(2);
    /// assert!(ch.try_send(1).is_ok());
    /// assert!(ch.try_send(2).is_ok());
    /// assert!(ch.try_send(3).is_err());
    /// ```
    pub fn new(cap: usize) -> Channel<T> {
        let flavor = if cap == 0 {
            Flavor::Zero(flavors::zero::Channel::new())
        } else {
            Flavor::Array(flavors::array::Channel::with_capacity(cap))
        };

        Channel {
            flavor: Arc::new(flavor),
        }
    }

    /// Returns the channel capacity. Zero means rendezvous.
    pub fn capacity(&self) -> usize {
        match &*self.flavor {
            Flavor::Array(chan) => chan.capacity(),
            Flavor::Zero(_) => 0,
        }
    }

    /// Blocking send.
    ///
    /// Blocks until the message is either enqueued (buffered channel) or
    /// taken by a receiver (rendezvous channel). Fails iff the channel is
    /// closed at entry or closes while this call is waiting; the error
    /// returns the message.
    pub fn send(&self, msg: T) -> Result<(), SendError<T>> {
        match &*self.flavor {
            Flavor::Array(chan) => chan.send(msg),
            Flavor::Zero(chan) => chan.send(msg),
        }
    }

    /// Blocking receive.
    ///
    /// Blocks until a message is available. Returns `None` iff the channel
    /// is closed and every remaining message has been drained.
    pub fn recv(&self) -> Option<T> {
        match &*self.flavor {
            Flavor::Array(chan) => chan.recv(),
            Flavor::Zero(chan) => chan.recv(),
        }
    }

    /// Non-blocking send.
    ///
    /// Succeeds iff the message is accepted atomically: a buffered channel
    /// must have queue space, a rendezvous channel must have a parked
    /// receiver. The failed message is recoverable from the error.
    pub fn try_send(&self, msg: T) -> Result<(), TrySendError<T>> {
        match &*self.flavor {
            Flavor::Array(chan) => chan.try_send(msg),
            Flavor::Zero(chan) => chan.try_send(msg),
        }
    }

    /// Non-blocking receive.
    ///
    /// Returns `None` when no message is immediately available, including
    /// when the channel is closed and drained.
    pub fn try_recv(&self) -> Option<T> {
        match &*self.flavor {
            Flavor::Array(chan) => chan.try_recv(),
            Flavor::Zero(chan) => chan.try_recv(),
        }
    }

    /// Closes the channel.
    ///
    /// Every blocked sender fails with [`SendError`], every blocked receiver
    /// drains the remaining messages and then observes end-of-stream, and
    /// every watching notifier is signaled. Closing is idempotent; `true` is
    /// returned by the call that performed the transition.
    ///
    /// # Examples
    ///
    /// ```
    /// use csp_channel::Channel;
    ///
    /// let ch = Channel::new(2);
    /// ch.send(1).unwrap();
    /// assert!(ch.close());
    /// assert!(!ch.close());
    ///
    /// assert_eq!(ch.recv(), Some(1));
    /// assert_eq!(ch.recv(), None);
    /// ```
    pub fn close(&self) -> bool {
        match &*self.flavor {
            Flavor::Array(chan) => chan.close(),
            Flavor::Zero(chan) => chan.close(),
        }
    }

    /// Returns `true` if the channel is closed.
    pub fn is_closed(&self) -> bool {
        match &*self.flavor {
            Flavor::Array(chan) => chan.is_closed(),
            Flavor::Zero(chan) => chan.is_closed(),
        }
    }

    /// Returns `true` if the channel holds no message.
    pub fn is_empty(&self) -> bool {
        match &*self.flavor {
            Flavor::Array(chan) => chan.is_empty(),
            Flavor::Zero(chan) => chan.is_empty(),
        }
    }

    /// Returns `true` if a receive operation would succeed without blocking.
    pub fn can_recv(&self) -> bool {
        match &*self.flavor {
            Flavor::Array(chan) => chan.can_recv(),
            Flavor::Zero(chan) => chan.can_recv(),
        }
    }

    /// Subscribes a notifier, to be signaled on every state transition of
    /// this channel until it is unsubscribed or dropped.
    ///
    /// The channel keeps only a weak reference, so dropping the notifier's
    /// owner is enough to end the subscription.
    pub fn watch(&self, notifier: &Arc<Notifier>) {
        match &*self.flavor {
            Flavor::Array(chan) => chan.watch(notifier),
            Flavor::Zero(chan) => chan.watch(notifier),
        }
    }

    /// Removes a previously subscribed notifier.
    pub fn unwatch(&self, notifier: &Arc<Notifier>) {
        match &*self.flavor {
            Flavor::Array(chan) => chan.unwatch(notifier),
            Flavor::Zero(chan) => chan.unwatch(notifier),
        }
    }

    /// Returns `true` if the two handles refer to the same channel.
    pub fn same_channel(&self, other: &Channel<T>) -> bool {
        Arc::ptr_eq(&self.flavor, &other.flavor)
    }

    /// An address uniquely identifying the underlying channel.
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.flavor) as *const () as usize
    }
}

impl<T: Send + 'static> Channel<T> {
    /// Starts a blocking send on a worker thread and returns a future that
    /// resolves once the send completes.
    ///
    /// The future resolves to exactly what the blocking [`send`] would have
    /// returned: `Ok(())` on completion, or [`SendError`] if the channel is
    /// closed before the message is accepted.
    ///
    /// [`send`]: Channel::send
    pub fn send_async(&self, msg: T) -> SendFuture<T> {
        let chan = self.clone();
        let (tx, rx) = oneshot::channel();
        thread::spawn(move || {
            let _ = tx.send(chan.send(msg));
        });
        SendFuture { completion: rx }
    }

    /// Starts a blocking receive on a worker thread and returns a future
    /// that resolves to the received message, or `None` if the channel is
    /// closed and drained.
    pub fn recv_async(&self) -> RecvFuture<T> {
        let chan = self.clone();
        let (tx, rx) = oneshot::channel();
        thread::spawn(move || {
            let _ = tx.send(chan.recv());
        });
        RecvFuture { completion: rx }
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Channel { .. }")
    }
}

/// A future returned from [`send_async`](Channel::send_async).
pub struct SendFuture<T> {
    completion: oneshot::Receiver<Result<(), SendError<T>>>,
}

impl<T> Future for SendFuture<T> {
    type Output = Result<(), SendError<T>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.completion)
            .poll(cx)
            .map(|res| res.expect("send worker terminated without reporting"))
    }
}

impl<T> fmt::Debug for SendFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("SendFuture { .. }")
    }
}

/// A future returned from [`recv_async`](Channel::recv_async).
pub struct RecvFuture<T> {
    completion: oneshot::Receiver<Option<T>>,
}

impl<T> Future for RecvFuture<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.completion)
            .poll(cx)
            .map(|res| res.expect("recv worker terminated without reporting"))
    }
}

impl<T> fmt::Debug for RecvFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("RecvFuture { .. }")
    }
}
