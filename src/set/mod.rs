//! The bipartite subscription set.
//!
//! A [`SubscriptionSet`] holds a set of sinks and a set of sources and keeps
//! every sink subscribed to every source. It is made of three pieces:
//!
//! - two [`Registry`]s, one per side, keyed by participant identity
//! - a ledger mapping each (sink, source) pair to its cancellation handle
//!
//! Membership is changed through `add_*`/`remove_*` or through the typed
//! views returned by [`SubscriptionSet::sinks`] and [`SubscriptionSet::sources`],
//! which offer the full set-algebra surface. There is deliberately no way to
//! iterate a `SubscriptionSet` without first choosing a side.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use subscription_set::{ChannelConfig, ChannelObserver, Notification, Subject, SubscriptionSet};
//!
//! let mut set = SubscriptionSet::<u32>::new();
//!
//! let (sink, rx) = ChannelObserver::<u32>::new(ChannelConfig::default());
//! let source = Arc::new(Subject::<u32>::new());
//!
//! set.add_sink(Arc::new(sink)).unwrap();
//! set.add_source(source.clone()).unwrap();
//! assert_eq!(set.subscription_count(), 1);
//!
//! source.next(5);
//! assert!(matches!(rx.try_recv(), Ok(Notification::Next(5))));
//!
//! set.sources().clear().unwrap();
//! assert_eq!(set.subscription_count(), 0);
//! assert_eq!(source.observer_count(), 0);
//! ```

mod ledger;
mod registry;
mod subscription_set;
mod view;

pub use registry::Registry;
pub use subscription_set::{
    SinkRef, SourceRef, SubscribeFailure, SubscriptionSet, SubscriptionSetConfig,
};
pub use view::{Side, SinkView, Sinks, SourceView, Sources, View};
