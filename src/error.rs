//! Error types for the subscription set.

use crate::types::{BoxError, SubscriptionKey};
use thiserror::Error;

/// Main error type for subscription set operations.
#[derive(Debug, Error)]
pub enum SetError {
    /// A source's `subscribe` failed. The source's own error is the `source()`.
    #[error("Subscribe failed: {0}")]
    Subscribe(#[source] BoxError),

    /// Disposing a cancellation handle failed.
    #[error("Dispose failed: {0}")]
    Dispose(#[source] BoxError),

    #[error("Ledger corruption: no subscription for {0}")]
    LedgerCorruption(SubscriptionKey),

    #[error("Stale subscription: {0} references a participant that is not a member")]
    StaleSubscription(SubscriptionKey),
}

impl SetError {
    /// True for the variants that signal a broken internal invariant.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            SetError::LedgerCorruption(_) | SetError::StaleSubscription(_)
        )
    }
}

/// Result type for subscription set operations.
pub type Result<T> = std::result::Result<T, SetError>;
