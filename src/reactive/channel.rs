//! Sink that forwards notifications into a bounded channel.

use super::observer::Observer;
use crate::types::SharedError;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::warn;

/// Configuration for a channel-backed sink.
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    /// Max buffered notifications before new ones are dropped.
    /// Default: 1000
    pub buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { buffer_size: 1000 }
    }
}

/// A notification as received by a [`ChannelObserver`].
#[derive(Clone)]
pub enum Notification<T> {
    Next(T),
    Error(SharedError),
    Completed,
}

impl<T> Notification<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Next(_))
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Notification::Next(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Notification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Next(value) => f.debug_tuple("Next").field(value).finish(),
            Notification::Error(error) => write!(f, "Error({})", error),
            Notification::Completed => f.write_str("Completed"),
        }
    }
}

/// Observer that buffers every notification for a consumer to pull.
pub struct ChannelObserver<T> {
    sender: Sender<Notification<T>>,
    /// Notifications lost to a full buffer.
    dropped: AtomicU64,
}

impl<T> ChannelObserver<T> {
    /// Create an observer and the receiving end of its buffer.
    pub fn new(config: ChannelConfig) -> (Self, NotificationReceiver<T>) {
        let (sender, receiver) = bounded(config.buffer_size);
        let observer = Self {
            sender,
            dropped: AtomicU64::new(0),
        };
        (observer, NotificationReceiver { receiver })
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn forward(&self, notification: Notification<T>) {
        match self.sender.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(dropped, "notification buffer full, dropping notification");
            }
            // Receiver gone; nobody is listening.
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

impl<T: Send> Observer<T> for ChannelObserver<T> {
    fn on_next(&self, value: T) {
        self.forward(Notification::Next(value));
    }

    fn on_error(&self, error: SharedError) {
        self.forward(Notification::Error(error));
    }

    fn on_completed(&self) {
        self.forward(Notification::Completed);
    }
}

/// Receiving end of a [`ChannelObserver`].
pub struct NotificationReceiver<T> {
    receiver: Receiver<Notification<T>>,
}

impl<T> NotificationReceiver<T> {
    /// Receive the next notification (blocking).
    pub fn recv(&self) -> Result<Notification<T>, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a notification (non-blocking).
    pub fn try_recv(&self) -> Result<Notification<T>, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<Notification<T>, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Everything currently buffered, without blocking.
    pub fn drain(&self) -> Vec<Notification<T>> {
        self.receiver.try_iter().collect()
    }
}
