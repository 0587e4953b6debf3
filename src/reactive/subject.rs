//! Broadcasting source that is also a sink.

use super::observer::{CancellationHandle, Observable, Observer};
use crate::types::{BoxError, SharedError};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

/// Terminal notification, replayed to late subscribers.
#[derive(Clone)]
enum Terminal {
    Completed,
    Failed(SharedError),
}

impl Terminal {
    fn deliver<T>(&self, observer: &dyn Observer<T>) {
        match self {
            Terminal::Completed => observer.on_completed(),
            Terminal::Failed(error) => observer.on_error(error.clone()),
        }
    }
}

struct Inner<T> {
    /// Subscribed observers by registration ID.
    observers: RwLock<HashMap<u64, Arc<dyn Observer<T>>>>,
    /// Counter for generating registration IDs.
    next_id: AtomicU64,
    terminal: Mutex<Option<Terminal>>,
}

/// Forwards every notification it receives to every subscribed observer.
pub struct Subject<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Subject<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                observers: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                terminal: Mutex::new(None),
            }),
        }
    }

    /// Number of live subscriptions.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.read().len()
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.terminal.lock().is_some()
    }

    /// Copy of the observer list, so delivery runs without holding the lock.
    fn snapshot(&self) -> Vec<Arc<dyn Observer<T>>> {
        self.inner.observers.read().values().cloned().collect()
    }

    /// Record the terminal notification and hand back the observers to notify.
    fn terminate(&self, terminal: Terminal) -> Option<Vec<Arc<dyn Observer<T>>>> {
        let mut slot = self.inner.terminal.lock();
        if slot.is_some() {
            return None;
        }
        *slot = Some(terminal);
        drop(slot);

        let observers = self.inner.observers.write().drain().map(|(_, o)| o).collect();
        Some(observers)
    }
}

impl<T: Clone + 'static> Subject<T> {
    /// Emit a value to every observer.
    pub fn next(&self, value: T) {
        self.on_next(value);
    }
}

impl<T> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Observer<T> for Subject<T> {
    fn on_next(&self, value: T) {
        if self.is_terminated() {
            return;
        }
        for observer in self.snapshot() {
            observer.on_next(value.clone());
        }
    }

    fn on_error(&self, error: SharedError) {
        if let Some(observers) = self.terminate(Terminal::Failed(error.clone())) {
            for observer in observers {
                observer.on_error(error.clone());
            }
        }
    }

    fn on_completed(&self) {
        if let Some(observers) = self.terminate(Terminal::Completed) {
            for observer in observers {
                observer.on_completed();
            }
        }
    }
}

impl<T: 'static> Observable<T> for Subject<T> {
    fn subscribe(
        &self,
        observer: Arc<dyn Observer<T>>,
    ) -> Result<CancellationHandle, BoxError> {
        let terminal = self.inner.terminal.lock().clone();
        if let Some(terminal) = terminal {
            terminal.deliver(observer.as_ref());
            return Ok(CancellationHandle::noop());
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner.observers.write().insert(id, observer);
        trace!(id, "observer subscribed to subject");

        let weak: Weak<Inner<T>> = Arc::downgrade(&self.inner);
        Ok(CancellationHandle::new(move || {
            // Subject already gone: nothing left to revoke.
            if let Some(inner) = weak.upgrade() {
                inner.observers.write().remove(&id);
                trace!(id, "observer unsubscribed from subject");
            }
            Ok(())
        }))
    }
}
