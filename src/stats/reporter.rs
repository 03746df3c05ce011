use super::LatencyTracker;
use crate::messaging::EventClass;
use serde::Serialize;
use tokio::time::Instant;

/// Live counters fed by the dispatcher.
#[derive(Debug, Default)]
pub struct StatsCollector {
    events_received: u64,
    questions_received: u64,
    last_event_time: Option<u64>,
    latency: LatencyTracker,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one inbound event and records its latency sample, if any.
    pub fn record(
        &mut self,
        class: EventClass,
        payload: &serde_json::Value,
        received_at_ms: u64,
    ) -> Option<i64> {
        let latency = self.latency.record_if_possible(payload, received_at_ms);
        self.events_received += 1;
        if class == EventClass::Question {
            self.questions_received += 1;
        }
        self.last_event_time = Some(received_at_ms);
        latency
    }

    pub fn latency(&self) -> &LatencyTracker {
        &self.latency
    }

    pub fn snapshot(
        &self,
        is_connected: bool,
        connected_since: Option<Instant>,
        now: Instant,
    ) -> StatsSnapshot {
        StatsSnapshot {
            events_received: self.events_received,
            questions_received: self.questions_received,
            average_latency_ms: self.latency.average().unwrap_or(0.0),
            latency_samples: self.latency.len(),
            is_connected,
            uptime_seconds: connected_since
                .map(|since| now.saturating_duration_since(since).as_secs())
                .unwrap_or(0),
            last_event_time: self.last_event_time,
        }
    }
}

/// Point-in-time view of connection health, rebuilt on every read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub events_received: u64,
    pub questions_received: u64,
    /// Mean latency over every sample, `0.0` before the first one
    pub average_latency_ms: f64,
    pub latency_samples: usize,
    pub is_connected: bool,
    /// Whole seconds since the most recent successful connect, `0` if none
    pub uptime_seconds: u64,
    /// Receipt time of the last event, epoch milliseconds
    pub last_event_time: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_question_events_bump_both_counters() {
        let mut stats = StatsCollector::new();
        stats.record(EventClass::Question, &json!({}), 10);
        stats.record(EventClass::Match, &json!({}), 20);
        stats.record(EventClass::Generic, &json!({}), 30);

        let snapshot = stats.snapshot(true, None, Instant::now());
        assert_eq!(snapshot.events_received, 3);
        assert_eq!(snapshot.questions_received, 1);
        assert_eq!(snapshot.last_event_time, Some(30));
    }

    #[test]
    fn test_uptime_is_floored_to_whole_seconds() {
        let stats = StatsCollector::new();
        let since = Instant::now();
        let snapshot = stats.snapshot(true, Some(since), since + Duration::from_millis(2_999));
        assert_eq!(snapshot.uptime_seconds, 2);
    }

    #[test]
    fn test_uptime_is_zero_without_a_connection() {
        let stats = StatsCollector::new();
        let snapshot = stats.snapshot(false, None, Instant::now());
        assert_eq!(snapshot.uptime_seconds, 0);
        assert!(!snapshot.is_connected);
        assert_eq!(snapshot.average_latency_ms, 0.0);
        assert_eq!(snapshot.last_event_time, None);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let stats = StatsCollector::new();
        let json = serde_json::to_value(stats.snapshot(false, None, Instant::now())).unwrap();
        assert!(json.get("eventsReceived").is_some());
        assert!(json.get("averageLatencyMs").is_some());
        assert!(json.get("uptimeSeconds").is_some());
    }
}
