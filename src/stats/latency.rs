use crate::types::constants::ORIGIN_TIMESTAMP_FIELD;
use serde_json::Value;

/// Transport latency samples and their running mean.
///
/// Every sample is retained; the mean is taken over the whole history.
#[derive(Debug, Default, Clone)]
pub struct LatencyTracker {
    samples: Vec<i64>,
    // Wide enough that summing any number of i64 samples cannot overflow
    sum: i128,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `received_at - origin` when the payload carries an origin timestamp.
    ///
    /// Negative values are kept as-is so clock skew stays visible. Returns the
    /// sample, or `None` when the payload has no usable timestamp or the
    /// difference does not fit in an `i64`.
    pub fn record_if_possible(&mut self, payload: &Value, received_at_ms: u64) -> Option<i64> {
        let origin = origin_timestamp(payload)?;
        let received_at = i64::try_from(received_at_ms).ok()?;
        let Some(sample) = received_at.checked_sub(origin) else {
            tracing::debug!("Skipping latency for out-of-range timestamp {}", origin);
            return None;
        };
        self.samples.push(sample);
        self.sum += i128::from(sample);
        Some(sample)
    }

    /// Arithmetic mean over all samples, `None` before the first one.
    pub fn average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.sum as f64 / self.samples.len() as f64)
        }
    }

    pub fn samples(&self) -> &[i64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Origin timestamp in epoch milliseconds, if the payload is an object carrying a numeric one.
fn origin_timestamp(payload: &Value) -> Option<i64> {
    let field = payload.get(ORIGIN_TIMESTAMP_FIELD)?;
    field
        .as_i64()
        .or_else(|| field.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_difference_from_origin() {
        let mut tracker = LatencyTracker::new();
        let sample = tracker.record_if_possible(&json!({ "timestamp": 1_000 }), 1_250);
        assert_eq!(sample, Some(250));
        assert_eq!(tracker.average(), Some(250.0));
    }

    #[test]
    fn test_average_matches_full_history() {
        let mut tracker = LatencyTracker::new();
        for (origin, received) in [(100, 130), (200, 205), (300, 390), (400, 401)] {
            tracker.record_if_possible(&json!({ "timestamp": origin }), received);
        }
        let expected =
            tracker.samples().iter().sum::<i64>() as f64 / tracker.samples().len() as f64;
        assert_eq!(tracker.average(), Some(expected));
        assert_eq!(tracker.samples(), &[30, 5, 90, 1]);
    }

    #[test]
    fn test_negative_latency_is_not_clamped() {
        let mut tracker = LatencyTracker::new();
        assert_eq!(
            tracker.record_if_possible(&json!({ "timestamp": 2_000 }), 1_500),
            Some(-500)
        );
        assert_eq!(tracker.average(), Some(-500.0));
    }

    #[test]
    fn test_missing_or_malformed_timestamp_is_skipped() {
        let mut tracker = LatencyTracker::new();
        assert_eq!(tracker.record_if_possible(&json!({ "matchId": "m1" }), 10), None);
        assert_eq!(tracker.record_if_possible(&json!({ "timestamp": "soon" }), 10), None);
        assert_eq!(tracker.record_if_possible(&json!([1, 2, 3]), 10), None);
        assert_eq!(tracker.record_if_possible(&Value::Null, 10), None);
        assert!(tracker.is_empty());
        assert_eq!(tracker.average(), None);
    }

    #[test]
    fn test_fractional_timestamp_is_truncated() {
        let mut tracker = LatencyTracker::new();
        assert_eq!(
            tracker.record_if_possible(&json!({ "timestamp": 1_000.9 }), 1_010),
            Some(10)
        );
    }

    #[test]
    fn test_out_of_range_timestamp_is_skipped() {
        let mut tracker = LatencyTracker::new();
        let now = 1_700_000_000_000;
        assert_eq!(tracker.record_if_possible(&json!({ "timestamp": i64::MIN }), now), None);
        // Saturates to i64::MIN on conversion
        assert_eq!(tracker.record_if_possible(&json!({ "timestamp": -1e300 }), now), None);
        assert!(tracker.is_empty());
        assert_eq!(tracker.average(), None);
    }

    #[test]
    fn test_extreme_samples_do_not_overflow_the_mean() {
        let mut tracker = LatencyTracker::new();
        let now = 1_700_000_000_000;
        for _ in 0..3 {
            assert!(tracker
                .record_if_possible(&json!({ "timestamp": -9.0e18 }), now)
                .is_some());
        }
        let expected = (now as f64 + 9.0e18).round();
        let average = tracker.average().unwrap();
        assert!((average - expected).abs() < 1e6, "average {average}");
    }
}
