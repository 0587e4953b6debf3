//! The subscription set: two registries plus the ledger tying them together.

use super::ledger::Ledger;
use super::registry::Registry;
use super::view::{SinkView, SourceView, View};
use crate::error::{Result, SetError};
use crate::reactive::{CancellationHandle, Observable, Observer};
use crate::types::{BoxError, ParticipantId, Removal, SetStats, SubscriptionKey};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// Upper bound on registry slots reserved up front from the config.
const MAX_PRESIZED_MEMBERS: usize = 4096;

/// Upper bound on ledger slots reserved up front from the config.
const MAX_PRESIZED_SUBSCRIPTIONS: usize = 1 << 16;

/// A registered sink.
pub type SinkRef<T> = Arc<dyn Observer<T>>;

/// A registered source.
pub type SourceRef<T> = Arc<dyn Observable<T>>;

/// What `add_*` does when a source's `subscribe` fails part-way through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubscribeFailure {
    /// Dispose the subscriptions created by the failed add and take the
    /// participant back out. The set is left as it was.
    #[default]
    Rollback,
    /// Leave the participant registered with whatever subscriptions were
    /// created before the failure.
    KeepPartial,
}

/// Configuration for a subscription set.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionSetConfig {
    /// Initial sink registry capacity.
    pub sink_capacity: usize,

    /// Initial source registry capacity.
    pub source_capacity: usize,

    /// Behavior on a failed `subscribe`.
    pub on_subscribe_error: SubscribeFailure,
}

/// Keeps every sink subscribed to every source.
///
/// Membership changes create or dispose the cross-product of subscriptions
/// inline. Sinks and sources are compared by identity (`Arc` allocation).
/// Use [`sinks`](Self::sinks) and [`sources`](Self::sources) for the full
/// set-algebra surface of each side.
pub struct SubscriptionSet<T: 'static> {
    config: SubscriptionSetConfig,
    pub(crate) sinks: Registry<SinkRef<T>>,
    pub(crate) sources: Registry<SourceRef<T>>,
    pub(crate) ledger: Ledger,
}

impl<T: 'static> SubscriptionSet<T> {
    /// Create an empty set with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SubscriptionSetConfig::default())
    }

    /// Create an empty set with a custom configuration.
    ///
    /// Capacities are hints; at most a bounded number of slots is reserved.
    pub fn with_config(config: SubscriptionSetConfig) -> Self {
        let sink_capacity = config.sink_capacity.min(MAX_PRESIZED_MEMBERS);
        let source_capacity = config.source_capacity.min(MAX_PRESIZED_MEMBERS);
        let ledger_capacity = config
            .sink_capacity
            .saturating_mul(config.source_capacity)
            .min(MAX_PRESIZED_SUBSCRIPTIONS);
        Self {
            sinks: Registry::with_capacity(sink_capacity),
            sources: Registry::with_capacity(source_capacity),
            ledger: Ledger::with_capacity(ledger_capacity),
            config,
        }
    }

    /// Get the configuration this set was created with.
    pub fn config(&self) -> &SubscriptionSetConfig {
        &self.config
    }

    /// Set view over the sinks.
    pub fn sinks(&mut self) -> SinkView<'_, T> {
        View::new(self)
    }

    /// Set view over the sources.
    pub fn sources(&mut self) -> SourceView<'_, T> {
        View::new(self)
    }

    /// Check if a sink is a member.
    pub fn contains_sink(&self, sink: &SinkRef<T>) -> bool {
        self.sinks.contains(ParticipantId::of(sink))
    }

    /// Check if a source is a member.
    pub fn contains_source(&self, source: &SourceRef<T>) -> bool {
        self.sources.contains(ParticipantId::of(source))
    }

    /// Get sink count.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Get source count.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Number of live subscriptions held in the ledger.
    pub fn subscription_count(&self) -> usize {
        self.ledger.len()
    }

    /// Whether the ledger holds a subscription of `sink` to `source`.
    pub fn is_connected(&self, sink: &SinkRef<T>, source: &SourceRef<T>) -> bool {
        self.ledger.contains(SubscriptionKey::new(
            ParticipantId::of(sink),
            ParticipantId::of(source),
        ))
    }

    /// Get membership and ledger sizes.
    pub fn stats(&self) -> SetStats {
        SetStats {
            sinks: self.sinks.len(),
            sources: self.sources.len(),
            subscriptions: self.ledger.len(),
        }
    }

    // --- Membership ---

    /// Add a sink and subscribe it to every source.
    ///
    /// Returns `Ok(false)` if the sink was already a member.
    pub fn add_sink(&mut self, sink: SinkRef<T>) -> Result<bool> {
        let sink_id = ParticipantId::of(&sink);
        if !self.sinks.insert(sink_id, Arc::clone(&sink)) {
            trace!(sink = %sink_id, "sink already a member");
            return Ok(false);
        }

        let mut created = Vec::with_capacity(self.sources.len());
        let mut failure = None;
        for (source_id, source) in self.sources.iter() {
            let key = SubscriptionKey::new(sink_id, source_id);
            match source.subscribe(Arc::clone(&sink)) {
                Ok(handle) => {
                    Self::record(&mut self.ledger, key, handle);
                    created.push(key);
                }
                Err(e) => {
                    failure = Some((key, e));
                    break;
                }
            }
        }

        if let Some((key, e)) = failure {
            if self.abandon_add(key, created, &e) {
                self.sinks.remove(sink_id);
            }
            return Err(SetError::Subscribe(e));
        }

        debug!(sink = %sink_id, subscriptions = created.len(), "sink added");
        Ok(true)
    }

    /// Add a source and subscribe every sink to it.
    ///
    /// Returns `Ok(false)` if the source was already a member.
    pub fn add_source(&mut self, source: SourceRef<T>) -> Result<bool> {
        let source_id = ParticipantId::of(&source);
        if !self.sources.insert(source_id, Arc::clone(&source)) {
            trace!(source = %source_id, "source already a member");
            return Ok(false);
        }

        let mut created = Vec::with_capacity(self.sinks.len());
        let mut failure = None;
        for (sink_id, sink) in self.sinks.iter() {
            let key = SubscriptionKey::new(sink_id, source_id);
            match source.subscribe(Arc::clone(sink)) {
                Ok(handle) => {
                    Self::record(&mut self.ledger, key, handle);
                    created.push(key);
                }
                Err(e) => {
                    failure = Some((key, e));
                    break;
                }
            }
        }

        if let Some((key, e)) = failure {
            if self.abandon_add(key, created, &e) {
                self.sources.remove(source_id);
            }
            return Err(SetError::Subscribe(e));
        }

        debug!(source = %source_id, subscriptions = created.len(), "source added");
        Ok(true)
    }

    /// Remove a sink and dispose all of its subscriptions.
    pub fn remove_sink(&mut self, sink: &SinkRef<T>) -> Result<Removal> {
        self.remove_sink_id(ParticipantId::of(sink))
    }

    /// Remove a source and dispose all of its subscriptions.
    pub fn remove_source(&mut self, source: &SourceRef<T>) -> Result<Removal> {
        self.remove_source_id(ParticipantId::of(source))
    }

    /// Remove a sink by identity.
    pub(crate) fn remove_sink_id(&mut self, sink_id: ParticipantId) -> Result<Removal> {
        if self.sinks.remove(sink_id).is_none() {
            trace!(sink = %sink_id, "sink not a member");
            return Ok(Removal::NotAMember);
        }
        let keys: Vec<SubscriptionKey> = self
            .sources
            .ids()
            .map(|source_id| SubscriptionKey::new(sink_id, source_id))
            .collect();
        let removal = self.disconnect(keys)?;
        debug!(sink = %sink_id, "sink removed");
        Ok(removal)
    }

    /// Remove a source by identity.
    pub(crate) fn remove_source_id(&mut self, source_id: ParticipantId) -> Result<Removal> {
        if self.sources.remove(source_id).is_none() {
            trace!(source = %source_id, "source not a member");
            return Ok(Removal::NotAMember);
        }
        let keys: Vec<SubscriptionKey> = self
            .sinks
            .ids()
            .map(|sink_id| SubscriptionKey::new(sink_id, source_id))
            .collect();
        let removal = self.disconnect(keys)?;
        debug!(source = %source_id, "source removed");
        Ok(removal)
    }

    // --- Clearing ---

    /// Dispose every subscription and empty both registries.
    pub fn clear(&mut self) -> Result<()> {
        let (disposed, failure) = self.ledger.dispose_where(|_| true);
        self.sinks.clear();
        self.sources.clear();
        debug!(disposed, "subscription set cleared");
        failure.map_or(Ok(()), |e| Err(SetError::Dispose(e)))
    }

    /// Dispose every subscription held by a sink and empty the sink registry.
    pub fn clear_sinks(&mut self) -> Result<()> {
        let sinks = &self.sinks;
        let (disposed, failure) = self.ledger.dispose_where(|key| sinks.contains(key.sink));
        self.sinks.clear();
        debug!(disposed, "sinks cleared");
        failure.map_or(Ok(()), |e| Err(SetError::Dispose(e)))
    }

    /// Dispose every subscription to a source and empty the source registry.
    pub fn clear_sources(&mut self) -> Result<()> {
        let sources = &self.sources;
        let (disposed, failure) = self
            .ledger
            .dispose_where(|key| sources.contains(key.source));
        self.sources.clear();
        debug!(disposed, "sources cleared");
        failure.map_or(Ok(()), |e| Err(SetError::Dispose(e)))
    }

    // --- Integrity ---

    /// Check that the ledger holds exactly one entry per (sink, source) pair.
    pub fn verify(&self) -> Result<()> {
        for key in self.ledger.keys() {
            if !self.sinks.contains(key.sink) || !self.sources.contains(key.source) {
                return Err(SetError::StaleSubscription(key));
            }
        }
        for sink_id in self.sinks.ids() {
            for source_id in self.sources.ids() {
                let key = SubscriptionKey::new(sink_id, source_id);
                if !self.ledger.contains(key) {
                    return Err(SetError::LedgerCorruption(key));
                }
            }
        }
        Ok(())
    }

    // --- Internals ---

    /// Store a fresh handle for `key`.
    ///
    /// A handle already stored for the pair is left over from a removal that
    /// failed part-way, and its participant's address has since been reused.
    /// It no longer belongs to any member, so it is disposed and replaced.
    fn record(ledger: &mut Ledger, key: SubscriptionKey, handle: CancellationHandle) {
        if let Some(stale) = ledger.insert(key, handle) {
            warn!(%key, "replacing stale subscription left by an earlier removal");
            if let Err(e) = stale.dispose() {
                warn!(%key, error = %e, "failed to dispose stale subscription");
            }
        }
    }

    /// Dispose the given pairs.
    ///
    /// Missing entries are found before anything is disposed, so corruption
    /// is reported even when a disposal error cuts the removal short.
    fn disconnect(&mut self, keys: Vec<SubscriptionKey>) -> Result<Removal> {
        let missing = keys.iter().copied().find(|key| !self.ledger.contains(*key));
        for key in keys.iter().filter(|key| !self.ledger.contains(**key)) {
            error!(%key, "ledger corruption: subscription missing on removal");
        }

        for key in keys {
            if let Some(handle) = self.ledger.take(key) {
                if let Err(e) = handle.dispose() {
                    if let Some(missing) = missing {
                        error!(
                            key = %missing,
                            "removal aborted by dispose failure with ledger corruption pending"
                        );
                    }
                    return Err(SetError::Dispose(e));
                }
            }
        }
        Ok(missing.map_or(Removal::Removed, Removal::Corrupted))
    }

    /// Apply the configured policy after a failed subscribe. Returns true if
    /// the caller must take the new participant back out of its registry.
    fn abandon_add(
        &mut self,
        failed: SubscriptionKey,
        created: Vec<SubscriptionKey>,
        cause: &BoxError,
    ) -> bool {
        match self.config.on_subscribe_error {
            SubscribeFailure::Rollback => {
                warn!(
                    key = %failed,
                    error = %cause,
                    rolled_back = created.len(),
                    "subscribe failed, rolling back add"
                );
                self.ledger.dispose_quietly(created);
                true
            }
            SubscribeFailure::KeepPartial => {
                warn!(
                    key = %failed,
                    error = %cause,
                    kept = created.len(),
                    "subscribe failed, keeping partial subscriptions"
                );
                false
            }
        }
    }
}

impl<T: 'static> Default for SubscriptionSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for SubscriptionSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionSet")
            .field("sinks", &self.sinks.len())
            .field("sources", &self.sources.len())
            .field("subscriptions", &self.ledger.len())
            .finish()
    }
}

impl<T: 'static> Drop for SubscriptionSet<T> {
    fn drop(&mut self) {
        let (disposed, failure) = self.ledger.dispose_where(|_| true);
        if let Some(e) = failure {
            warn!(disposed, error = %e, "failed to dispose subscription on drop");
        }
    }
}
