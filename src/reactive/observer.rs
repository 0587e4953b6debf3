//! The push-notification contract between sources and sinks.

use crate::types::{BoxError, SharedError};
use std::fmt;
use std::sync::Arc;

/// A receiver of push notifications (a sink).
pub trait Observer<T>: Send + Sync {
    fn on_next(&self, value: T);

    fn on_error(&self, error: SharedError);

    fn on_completed(&self);
}

/// A producer of push notifications (a source).
pub trait Observable<T>: Send + Sync {
    /// Start delivering notifications to `observer`.
    ///
    /// Delivery continues until the returned handle is disposed.
    fn subscribe(&self, observer: Arc<dyn Observer<T>>)
        -> Result<CancellationHandle, BoxError>;
}

type DisposeFn = Box<dyn FnOnce() -> Result<(), BoxError> + Send>;

/// One-shot token that revokes a single subscription.
///
/// `dispose` consumes the handle, so the action runs at most once.
/// Dropping a handle without disposing it leaves the subscription live.
pub struct CancellationHandle {
    action: Option<DisposeFn>,
}

impl CancellationHandle {
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() -> Result<(), BoxError> + Send + 'static,
    {
        Self {
            action: Some(Box::new(action)),
        }
    }

    /// A handle with nothing to revoke.
    pub fn noop() -> Self {
        Self { action: None }
    }

    pub fn is_noop(&self) -> bool {
        self.action.is_none()
    }

    /// Revoke the subscription.
    pub fn dispose(mut self) -> Result<(), BoxError> {
        match self.action.take() {
            Some(action) => action(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for CancellationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationHandle")
            .field("noop", &self.is_noop())
            .finish()
    }
}
