//! Push-notification contract and two ready-made participants.
//!
//! A source ([`Observable`]) hands out a [`CancellationHandle`] for every
//! sink ([`Observer`]) it starts delivering to. Disposing the handle stops
//! delivery to that one sink.
//!
//! - [`Subject`] is both: it re-broadcasts whatever it receives.
//! - [`ChannelObserver`] buffers notifications in a bounded channel.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use subscription_set::{ChannelConfig, ChannelObserver, Notification, Observable, Subject};
//!
//! let subject = Subject::<u32>::new();
//! let (observer, rx) = ChannelObserver::<u32>::new(ChannelConfig::default());
//!
//! let handle = subject.subscribe(Arc::new(observer)).unwrap();
//! subject.next(42);
//! handle.dispose().unwrap();
//! subject.next(43);
//!
//! let values: Vec<u32> = rx.drain().into_iter().filter_map(Notification::into_value).collect();
//! assert_eq!(values, vec![42]);
//! ```

mod channel;
mod observer;
mod subject;

pub use channel::{ChannelConfig, ChannelObserver, Notification, NotificationReceiver};
pub use observer::{CancellationHandle, Observable, Observer};
pub use subject::Subject;
