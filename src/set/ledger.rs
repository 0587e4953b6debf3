//! Map from connected (sink, source) pairs to their cancellation handles.

use crate::reactive::CancellationHandle;
use crate::types::{BoxError, SubscriptionKey};
use std::collections::HashMap;
use tracing::warn;

/// Owns every live cancellation handle until it is disposed.
pub(crate) struct Ledger {
    entries: HashMap<SubscriptionKey, CancellationHandle>,
}

impl Ledger {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn contains(&self, key: SubscriptionKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = SubscriptionKey> + '_ {
        self.entries.keys().copied()
    }

    /// Record a connection, handing back any handle already stored for the
    /// pair. The caller owns the returned handle and must dispose it.
    pub(crate) fn insert(
        &mut self,
        key: SubscriptionKey,
        handle: CancellationHandle,
    ) -> Option<CancellationHandle> {
        self.entries.insert(key, handle)
    }

    /// Remove an entry without disposing it.
    pub(crate) fn take(&mut self, key: SubscriptionKey) -> Option<CancellationHandle> {
        self.entries.remove(&key)
    }

    /// Dispose every entry matching `pred`.
    ///
    /// All matching entries are removed and disposed even if some disposals
    /// fail; the first failure is returned.
    pub(crate) fn dispose_where<F>(&mut self, pred: F) -> (usize, Option<BoxError>)
    where
        F: Fn(&SubscriptionKey) -> bool,
    {
        let keys: Vec<SubscriptionKey> = self.entries.keys().filter(|k| pred(k)).copied().collect();
        let mut first_error = None;

        for key in &keys {
            if let Some(handle) = self.entries.remove(key) {
                if let Err(e) = handle.dispose() {
                    warn!(%key, error = %e, "failed to dispose subscription");
                    first_error.get_or_insert(e);
                }
            }
        }

        (keys.len(), first_error)
    }

    /// Dispose the given entries, logging and swallowing failures.
    pub(crate) fn dispose_quietly<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = SubscriptionKey>,
    {
        for key in keys {
            if let Some(handle) = self.entries.remove(&key) {
                if let Err(e) = handle.dispose() {
                    warn!(%key, error = %e, "failed to dispose subscription during rollback");
                }
            }
        }
    }
}
