//! Core types for the subscription set.

use std::fmt;
use std::sync::Arc;

/// Boxed error raised by a caller-supplied source or cancellation handle.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error delivered to sinks through `on_error`. Shared so one failure can
/// fan out to any number of observers.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Identity of a sink or source.
///
/// Derived from the address of the participant's `Arc` allocation, so the
/// same allocation has the same identity whichever trait object it is
/// viewed through.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(usize);

impl ParticipantId {
    /// Identity of the participant behind `participant`.
    pub fn of<P: ?Sized>(participant: &Arc<P>) -> Self {
        ParticipantId(Arc::as_ptr(participant).cast::<()>() as usize)
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Participant({:#x})", self.0)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Ledger key: one connected (sink, source) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    pub sink: ParticipantId,
    pub source: ParticipantId,
}

impl SubscriptionKey {
    pub fn new(sink: ParticipantId, source: ParticipantId) -> Self {
        Self { sink, source }
    }
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sink {} <- source {}", self.sink, self.source)
    }
}

/// Outcome of removing a participant.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// The participant was a member and all of its subscriptions were disposed.
    Removed,
    /// The participant was not a member. Nothing changed.
    NotAMember,
    /// The participant was removed, but the ledger had no entry for this
    /// pair. Indicates a broken invariant, never an ordinary outcome.
    Corrupted(SubscriptionKey),
}

impl Removal {
    pub fn is_removed(&self) -> bool {
        !matches!(self, Removal::NotAMember)
    }

    /// Collapse to `Ok(removed?)`, turning corruption into an error.
    pub fn into_result(self) -> crate::Result<bool> {
        match self {
            Removal::Removed => Ok(true),
            Removal::NotAMember => Ok(false),
            Removal::Corrupted(key) => Err(crate::SetError::LedgerCorruption(key)),
        }
    }
}

/// Membership and ledger sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetStats {
    pub sinks: usize,
    pub sources: usize,
    pub subscriptions: usize,
}
