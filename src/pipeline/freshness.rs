//! Read-time freshness evaluation.
//!
//! The store never expires anything; an observation "goes stale" only when a
//! reader compares its timestamp against the reader's own clock.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::types::GazeObservation;

/// Outcome of judging a store snapshot at a given instant.
#[derive(Debug, Clone, PartialEq)]
pub enum GazeStatus {
    /// Nothing has ever been published
    NeverDetected,
    /// Last detection is older than the staleness window
    Stale { age_secs: f64 },
    /// Last detection is still current
    Fresh {
        observation: Arc<GazeObservation>,
        age_secs: f64,
    },
}

impl GazeStatus {
    pub fn is_detected(&self) -> bool {
        matches!(self, GazeStatus::Fresh { .. })
    }
}

/// Judge `snapshot` at instant `now` against a staleness window of
/// `max_age_secs`.
///
/// An observation exactly `max_age_secs` old is still fresh. A timestamp
/// ahead of `now` (clock step) reports an age of zero.
pub fn evaluate(
    snapshot: Option<Arc<GazeObservation>>,
    now: DateTime<Utc>,
    max_age_secs: f64,
) -> GazeStatus {
    let Some(observation) = snapshot else {
        return GazeStatus::NeverDetected;
    };

    let age_secs = age_secs(observation.timestamp, now);
    if age_secs > max_age_secs {
        GazeStatus::Stale { age_secs }
    } else {
        GazeStatus::Fresh {
            observation,
            age_secs,
        }
    }
}

/// Elapsed seconds from `then` to `now`, clamped at zero.
pub fn age_secs(then: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed = now.signed_duration_since(then);
    let micros = elapsed
        .num_microseconds()
        .unwrap_or_else(|| elapsed.num_milliseconds().saturating_mul(1_000));
    (micros as f64 / 1_000_000.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GazeLabel, PixelPoint};
    use chrono::Duration;

    const MAX_AGE: f64 = 2.0;

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn observation_at(ts: DateTime<Utc>) -> Arc<GazeObservation> {
        Arc::new(GazeObservation {
            timestamp: ts,
            label: GazeLabel::Right,
            left_center: PixelPoint::new(400, 240),
            right_center: PixelPoint::new(460, 240),
            cx: 430,
            frame_width: 640,
        })
    }

    #[test]
    fn test_empty_store_is_never_detected() {
        assert_eq!(evaluate(None, t0(), MAX_AGE), GazeStatus::NeverDetected);
    }

    #[test]
    fn test_just_inside_window_is_fresh() {
        let now = t0() + Duration::milliseconds(1_900);
        match evaluate(Some(observation_at(t0())), now, MAX_AGE) {
            GazeStatus::Fresh { observation, age_secs } => {
                assert!((age_secs - 1.9).abs() < 1e-9);
                assert_eq!(observation.label, GazeLabel::Right);
            }
            other => panic!("expected fresh, got {other:?}"),
        }
    }

    #[test]
    fn test_just_outside_window_is_stale() {
        let now = t0() + Duration::milliseconds(2_100);
        match evaluate(Some(observation_at(t0())), now, MAX_AGE) {
            GazeStatus::Stale { age_secs } => assert!((age_secs - 2.1).abs() < 1e-9),
            other => panic!("expected stale, got {other:?}"),
        }
    }

    #[test]
    fn test_exact_boundary_is_fresh() {
        let now = t0() + Duration::seconds(2);
        assert!(evaluate(Some(observation_at(t0())), now, MAX_AGE).is_detected());
    }

    #[test]
    fn test_future_timestamp_clamps_age() {
        let now = t0() - Duration::milliseconds(300);
        match evaluate(Some(observation_at(t0())), now, MAX_AGE) {
            GazeStatus::Fresh { age_secs, .. } => assert_eq!(age_secs, 0.0),
            other => panic!("expected fresh, got {other:?}"),
        }
    }
}
