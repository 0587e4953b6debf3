//! # Subscription Set
//!
//! A container holding a dynamic set of notification sinks and a dynamic set
//! of notification sources, which guarantees that every sink is subscribed to
//! every source currently in the set.
//!
//! ## Core Concepts
//!
//! - **Sinks**: [`Observer`]s that receive `on_next`/`on_error`/`on_completed`
//! - **Sources**: [`Observable`]s that hand out a [`CancellationHandle`] per subscription
//! - **Ledger**: one live handle per (sink, source) pair, disposed when either leaves
//! - **Views**: [`SinkView`] and [`SourceView`] expose set algebra on one side at a time
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use subscription_set::{SinkRef, SourceRef, Subject, SubscriptionSet};
//!
//! let mut set = SubscriptionSet::<i32>::new();
//! let a: SinkRef<i32> = Arc::new(Subject::<i32>::new());
//! let b: SinkRef<i32> = Arc::new(Subject::<i32>::new());
//! let x: SourceRef<i32> = Arc::new(Subject::<i32>::new());
//!
//! set.sinks().union_with([&a, &b]).unwrap();
//! set.add_source(x.clone()).unwrap();
//! assert_eq!(set.subscription_count(), 2);
//!
//! // Remove every sink except `a`.
//! set.sinks().intersect_with([&a]).unwrap();
//! assert_eq!(set.subscription_count(), 1);
//! assert!(set.is_connected(&a, &x));
//! ```

pub mod error;
pub mod reactive;
pub mod set;
pub mod types;

// Re-exports
pub use error::{Result, SetError};
pub use reactive::{
    CancellationHandle, ChannelConfig, ChannelObserver, Notification, NotificationReceiver,
    Observable, Observer, Subject,
};
pub use set::{
    Registry, Side, SinkRef, SinkView, Sinks, SourceRef, SourceView, Sources, SubscribeFailure,
    SubscriptionSet, SubscriptionSetConfig, View,
};
pub use types::*;
