//! End-to-end behavior of the subscription set with live sources and sinks.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use subscription_set::{
    BoxError, CancellationHandle, ChannelConfig, ChannelObserver, Notification, Observable,
    Observer, Removal, SetStats, SharedError, SinkRef, SourceRef, Subject, SubscriptionSet,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Sink that records every value it receives.
#[derive(Default)]
struct RecordingSink {
    values: Mutex<Vec<i32>>,
}

impl Observer<i32> for RecordingSink {
    fn on_next(&self, value: i32) {
        self.values.lock().push(value);
    }

    fn on_error(&self, _error: SharedError) {}

    fn on_completed(&self) {}
}

/// Source wrapping a subject that counts how often each handle is disposed.
#[derive(Default)]
struct TrackedSource {
    subject: Subject<i32>,
    subscribes: AtomicUsize,
    disposals: Arc<Mutex<Vec<usize>>>,
}

impl TrackedSource {
    fn emit(&self, value: i32) {
        self.subject.next(value);
    }

    /// Dispose count for each handle ever returned, in subscribe order.
    fn disposals(&self) -> Vec<usize> {
        self.disposals.lock().clone()
    }

    fn live(&self) -> usize {
        self.subject.observer_count()
    }
}

impl Observable<i32> for TrackedSource {
    fn subscribe(&self, observer: Arc<dyn Observer<i32>>) -> Result<CancellationHandle, BoxError> {
        let inner = self.subject.subscribe(observer)?;
        let slot = self.subscribes.fetch_add(1, Ordering::SeqCst);
        self.disposals.lock().push(0);

        let disposals = self.disposals.clone();
        Ok(CancellationHandle::new(move || {
            disposals.lock()[slot] += 1;
            inner.dispose()
        }))
    }
}

fn recording_sink() -> (Arc<RecordingSink>, SinkRef<i32>) {
    let sink = Arc::new(RecordingSink::default());
    (sink.clone(), sink)
}

fn tracked_source() -> (Arc<TrackedSource>, SourceRef<i32>) {
    let source = Arc::new(TrackedSource::default());
    (source.clone(), source)
}

// --- Scenarios ---

#[test]
fn test_sources_deliver_to_every_sink() {
    init_tracing();
    let mut set = SubscriptionSet::<i32>::new();
    let (a, a_ref) = recording_sink();
    let (b, b_ref) = recording_sink();
    let (x, x_ref) = tracked_source();

    set.add_sink(a_ref.clone()).unwrap();
    set.add_sink(b_ref.clone()).unwrap();
    set.add_source(x_ref.clone()).unwrap();

    assert_eq!(set.subscription_count(), 2);
    assert!(set.is_connected(&a_ref, &x_ref));
    assert!(set.is_connected(&b_ref, &x_ref));

    x.emit(10);
    assert_eq!(*a.values.lock(), vec![10]);
    assert_eq!(*b.values.lock(), vec![10]);
}

#[test]
fn test_removing_source_disposes_each_handle_once() {
    init_tracing();
    let mut set = SubscriptionSet::<i32>::new();
    let (a, a_ref) = recording_sink();
    let (_, b_ref) = recording_sink();
    let (x, x_ref) = tracked_source();
    set.add_sink(a_ref).unwrap();
    set.add_sink(b_ref).unwrap();
    set.add_source(x_ref.clone()).unwrap();

    assert_eq!(set.remove_source(&x_ref).unwrap(), Removal::Removed);

    assert_eq!(set.subscription_count(), 0);
    assert_eq!(x.disposals(), vec![1, 1]);
    assert_eq!(x.live(), 0);

    x.emit(11);
    assert!(a.values.lock().is_empty());
}

#[test]
fn test_except_with_absent_member_is_silent() {
    let mut set = SubscriptionSet::<i32>::new();
    let (_, a_ref) = recording_sink();
    let (_, c_ref) = recording_sink();
    let (_, x_ref) = tracked_source();
    set.add_sink(a_ref.clone()).unwrap();
    set.add_source(x_ref).unwrap();
    let before = set.stats();

    set.sinks().except_with([&c_ref]).unwrap();

    assert_eq!(set.stats(), before);
    assert!(set.contains_sink(&a_ref));
}

#[test]
fn test_intersect_sources_keeps_only_listed() {
    let mut set = SubscriptionSet::<i32>::new();
    let (_, a_ref) = recording_sink();
    let (_, b_ref) = recording_sink();
    let (x, x_ref) = tracked_source();
    let (y, y_ref) = tracked_source();
    set.sinks().union_with([&a_ref, &b_ref]).unwrap();
    set.sources().union_with([&x_ref, &y_ref]).unwrap();
    assert_eq!(set.subscription_count(), 4);

    set.sources().intersect_with([&x_ref]).unwrap();

    assert!(!set.contains_source(&y_ref));
    assert_eq!(y.disposals(), vec![1, 1]);
    assert_eq!(x.disposals(), vec![0, 0]);
    assert!(set.is_connected(&a_ref, &x_ref));
    assert!(set.is_connected(&b_ref, &x_ref));
    assert_eq!(set.subscription_count(), 2);
    set.verify().unwrap();
}

#[test]
fn test_symmetric_except_sinks_toggles_membership() {
    let mut set = SubscriptionSet::<i32>::new();
    let (_, a_ref) = recording_sink();
    let (_, b_ref) = recording_sink();
    let (c, c_ref) = recording_sink();
    let (x, x_ref) = tracked_source();
    let (y, y_ref) = tracked_source();
    set.sinks().union_with([&a_ref, &b_ref]).unwrap();
    set.sources().union_with([&x_ref, &y_ref]).unwrap();

    set.sinks().symmetric_except_with([&b_ref, &c_ref]).unwrap();

    assert!(set.sinks().set_equals([&a_ref, &c_ref]));
    assert!(!set.is_connected(&b_ref, &x_ref));
    assert!(!set.is_connected(&b_ref, &y_ref));
    assert!(set.is_connected(&c_ref, &x_ref));
    assert!(set.is_connected(&c_ref, &y_ref));
    assert_eq!(set.subscription_count(), 4);

    x.emit(1);
    y.emit(2);
    assert_eq!(*c.values.lock(), vec![1, 2]);
}

// --- Round trips and queries ---

#[test]
fn test_add_remove_round_trip_restores_ledger() {
    let mut set = SubscriptionSet::<i32>::new();
    let (_, a_ref) = recording_sink();
    let (x, x_ref) = tracked_source();
    let (_, y_ref) = tracked_source();
    set.add_sink(a_ref).unwrap();
    set.add_source(x_ref).unwrap();
    let before = set.stats();

    set.add_source(y_ref.clone()).unwrap();
    assert_eq!(set.subscription_count(), 2);
    assert!(set.remove_source(&y_ref).unwrap().is_removed());
    assert_eq!(set.stats(), before);

    let (_, d_ref) = recording_sink();
    set.sinks().insert(d_ref.clone()).unwrap();
    assert_eq!(set.sinks().remove(&d_ref).unwrap(), Removal::Removed);
    assert_eq!(set.stats(), before);
    assert_eq!(x.disposals(), vec![0, 1]);
}

#[test]
fn test_queries_leave_ledger_untouched() {
    let mut set = SubscriptionSet::<i32>::new();
    let (_, a_ref) = recording_sink();
    let (_, b_ref) = recording_sink();
    let (x, x_ref) = tracked_source();
    set.sinks().union_with([&a_ref, &b_ref]).unwrap();
    set.add_source(x_ref).unwrap();
    let before = set.stats();

    for _ in 0..3 {
        let view = set.sinks();
        assert!(view.is_subset_of([&a_ref, &b_ref]));
        assert!(!view.is_proper_subset_of([&a_ref, &b_ref]));
        assert!(view.is_superset_of([&a_ref]));
        assert!(view.is_proper_superset_of([&b_ref]));
        assert!(view.overlaps([&b_ref]));
        assert!(view.set_equals([&b_ref, &a_ref]));
    }

    assert_eq!(set.stats(), before);
    assert_eq!(x.disposals(), vec![0, 0]);
}

#[test]
fn test_full_clear() {
    let mut set = SubscriptionSet::<i32>::new();
    let (_, a_ref) = recording_sink();
    let (x, x_ref) = tracked_source();
    let (y, y_ref) = tracked_source();
    set.add_sink(a_ref).unwrap();
    set.sources().union_with([x_ref, y_ref]).unwrap();

    set.clear().unwrap();

    assert_eq!(set.stats(), SetStats::default());
    assert_eq!(x.disposals(), vec![1]);
    assert_eq!(y.disposals(), vec![1]);
}

#[test]
fn test_subject_as_sink_and_source() {
    // A subject in the sink registry relays everything it hears.
    let mut set = SubscriptionSet::<i32>::new();
    let relay = Arc::new(Subject::<i32>::new());
    let (x, x_ref) = tracked_source();
    let (downstream, downstream_ref) = recording_sink();
    let _downstream_handle = relay.subscribe(downstream_ref).unwrap();

    set.add_sink(relay.clone()).unwrap();
    set.add_source(x_ref).unwrap();
    x.emit(5);

    assert_eq!(*downstream.values.lock(), vec![5]);
}

#[test]
fn test_channel_sinks_receive_from_every_source() {
    let mut set = SubscriptionSet::<i32>::new();
    let (observer, rx) = ChannelObserver::<i32>::new(ChannelConfig { buffer_size: 16 });
    let (x, x_ref) = tracked_source();
    let (y, y_ref) = tracked_source();

    set.add_sink(Arc::new(observer)).unwrap();
    set.sources().union_with([x_ref, y_ref]).unwrap();
    x.emit(1);
    y.emit(2);

    let mut values: Vec<i32> = rx.drain().into_iter().filter_map(Notification::into_value).collect();
    values.sort();
    assert_eq!(values, vec![1, 2]);
    assert!(rx.recv_timeout(Duration::from_millis(20)).is_err());
}
