use super::EventClass;
use crate::infrastructure::{lock, now_millis};
use crate::stats::{StatsCollector, StatsSnapshot};
use crate::types::Frame;
use serde::Serialize;
use serde_json::Value;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// A push event republished to local listeners.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub class: EventClass,
    pub event_type: String,
    pub data: Value,
    /// `received_at - origin timestamp` in milliseconds, when the payload carried one
    pub latency: Option<i64>,
    /// Local receipt time, epoch milliseconds
    pub received_at: u64,
}

/// Listener registration
struct Listener {
    class: Option<EventClass>,
    sender: mpsc::UnboundedSender<Notification>,
}

impl Listener {
    fn wants(&self, class: EventClass) -> bool {
        self.class.is_none_or(|wanted| wanted == class)
    }
}

/// Classifies inbound frames, updates stats, and fans them out to listeners.
///
/// Every frame yields exactly one notification on exactly one class. Listener
/// queues are unbounded, so nothing is dropped or coalesced and per-class
/// arrival order is kept.
#[derive(Default)]
pub struct EventDispatcher {
    stats: Mutex<StatsCollector>,
    listeners: Mutex<Vec<Listener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for one notification class.
    pub fn on(&self, class: EventClass) -> mpsc::UnboundedReceiver<Notification> {
        self.register(Some(class))
    }

    /// Registers a listener for every class.
    pub fn on_any(&self) -> mpsc::UnboundedReceiver<Notification> {
        self.register(None)
    }

    fn register(&self, class: Option<EventClass>) -> mpsc::UnboundedReceiver<Notification> {
        let (sender, receiver) = mpsc::unbounded_channel();
        lock(&self.listeners).push(Listener { class, sender });
        receiver
    }

    pub fn dispatch(&self, frame: Frame) -> EventClass {
        self.dispatch_at(frame, now_millis())
    }

    /// Dispatches a frame as if it arrived at `received_at_ms`.
    pub fn dispatch_at(&self, frame: Frame, received_at_ms: u64) -> EventClass {
        let class = EventClass::classify(&frame.event);

        // Counters move before any listener can observe the notification.
        let latency = lock(&self.stats).record(class, &frame.data, received_at_ms);

        tracing::debug!(
            "Dispatching event={} class={} latency={:?}",
            frame.event,
            class,
            latency
        );

        let notification = Notification {
            class,
            event_type: frame.event,
            data: frame.data,
            latency,
            received_at: received_at_ms,
        };

        let mut listeners = lock(&self.listeners);
        listeners.retain(|listener| {
            if !listener.wants(class) {
                return !listener.sender.is_closed();
            }
            if listener.sender.send(notification.clone()).is_err() {
                tracing::debug!("Dropping closed {:?} listener", listener.class);
                return false;
            }
            true
        });

        class
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    pub fn snapshot(
        &self,
        is_connected: bool,
        connected_since: Option<Instant>,
        now: Instant,
    ) -> StatsSnapshot {
        lock(&self.stats).snapshot(is_connected, connected_since, now)
    }

    /// Copy of every latency sample seen so far.
    pub fn latency_samples(&self) -> Vec<i64> {
        lock(&self.stats).latency().samples().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(event: &str, data: Value) -> Frame {
        Frame::new(event, data)
    }

    #[test]
    fn test_each_frame_reaches_only_its_class() {
        let dispatcher = EventDispatcher::new();
        let mut matches = dispatcher.on(EventClass::Match);
        let mut questions = dispatcher.on(EventClass::Question);
        let mut generic = dispatcher.on(EventClass::Generic);

        dispatcher.dispatch(frame("matches:update", json!({ "id": "m1" })));
        dispatcher.dispatch(frame("questions:new", json!({ "matchId": "m1" })));
        dispatcher.dispatch(frame("server:notice", json!("hello")));

        let m = matches.try_recv().unwrap();
        assert_eq!(m.event_type, "matches:update");
        assert!(matches.try_recv().is_err());

        let q = questions.try_recv().unwrap();
        assert_eq!(q.event_type, "questions:new");
        assert!(questions.try_recv().is_err());

        let g = generic.try_recv().unwrap();
        assert_eq!(g.event_type, "server:notice");
        assert_eq!(g.class, EventClass::Generic);
        assert!(generic.try_recv().is_err());
    }

    #[test]
    fn test_order_is_preserved_without_coalescing() {
        let dispatcher = EventDispatcher::new();
        let mut matches = dispatcher.on(EventClass::Match);

        for i in 0..50 {
            dispatcher.dispatch(frame("matches:update", json!({ "seq": i })));
        }
        // Identical payloads are still delivered individually
        dispatcher.dispatch(frame("matches:update", json!({ "seq": 49 })));

        for i in 0..50 {
            assert_eq!(matches.try_recv().unwrap().data["seq"], i);
        }
        assert_eq!(matches.try_recv().unwrap().data["seq"], 49);
        assert!(matches.try_recv().is_err());
    }

    #[test]
    fn test_counters_are_updated_before_delivery() {
        let dispatcher = EventDispatcher::new();
        let mut questions = dispatcher.on(EventClass::Question);

        dispatcher.dispatch_at(frame("questions:generated", json!({})), 1_000);

        questions.try_recv().unwrap();
        let snapshot = dispatcher.snapshot(true, None, Instant::now());
        assert_eq!(snapshot.events_received, 1);
        assert_eq!(snapshot.questions_received, 1);
        assert_eq!(snapshot.last_event_time, Some(1_000));
    }

    #[test]
    fn test_latency_is_attached_when_present() {
        let dispatcher = EventDispatcher::new();
        let mut any = dispatcher.on_any();

        dispatcher.dispatch_at(frame("matches:live", json!({ "timestamp": 900 })), 1_000);
        dispatcher.dispatch_at(frame("matches:live", json!({ "id": "m2" })), 1_100);

        assert_eq!(any.try_recv().unwrap().latency, Some(100));
        assert_eq!(any.try_recv().unwrap().latency, None);
        assert_eq!(dispatcher.latency_samples(), vec![100]);
    }

    #[test]
    fn test_pushes_without_timestamps_leave_latency_unset() {
        let dispatcher = EventDispatcher::new();
        for i in 0..100 {
            dispatcher.dispatch(frame("matches:update", json!({ "id": i })));
        }
        let snapshot = dispatcher.snapshot(false, None, Instant::now());
        assert_eq!(snapshot.events_received, 100);
        assert_eq!(snapshot.latency_samples, 0);
        assert_eq!(snapshot.average_latency_ms, 0.0);
    }

    #[test]
    fn test_closed_listeners_are_pruned() {
        let dispatcher = EventDispatcher::new();
        let kept = dispatcher.on(EventClass::Match);
        drop(dispatcher.on(EventClass::Match));
        drop(dispatcher.on(EventClass::Question));
        assert_eq!(dispatcher.listener_count(), 3);

        dispatcher.dispatch(frame("matches:new", Value::Null));
        assert_eq!(dispatcher.listener_count(), 1);
        drop(kept);
    }

    #[test]
    fn test_dispatch_without_listeners_still_counts() {
        let dispatcher = EventDispatcher::new();
        assert_eq!(
            dispatcher.dispatch(frame("questions:new", Value::Null)),
            EventClass::Question
        );
        let snapshot = dispatcher.snapshot(false, None, Instant::now());
        assert_eq!(snapshot.questions_received, 1);
    }
}
