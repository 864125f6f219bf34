//! Shared State: Status Store and Acquisition Monitor
//!
//! Both are constructed once at startup, wrapped in `Arc`, and handed to the
//! acquisition loop (sole writer) and the HTTP handlers (readers).
//!
//! The latest observation lives behind an `ArcSwapOption`: `publish` swaps in
//! a fresh `Arc<GazeObservation>` and `read` clones the current pointer, so a
//! reader holds either the previous or the new observation in full and never
//! waits on the writer.

use arc_swap::ArcSwapOption;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::types::GazeObservation;

// ============================================================================
// Status Store
// ============================================================================

/// Single-cell store holding the most recent gaze observation.
///
/// Starts Empty; holds the latest observation after the first publish.
/// Freshness is judged by the reader, not the store.
#[derive(Debug, Default)]
pub struct StatusStore {
    latest: ArcSwapOption<GazeObservation>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the current record with `observation`.
    pub fn publish(&self, observation: GazeObservation) {
        self.latest.store(Some(Arc::new(observation)));
    }

    /// Consistent snapshot of the current record; `None` if never published.
    pub fn read(&self) -> Option<Arc<GazeObservation>> {
        self.latest.load_full()
    }

    /// Whether any observation has ever been published.
    pub fn is_empty(&self) -> bool {
        self.latest.load().is_none()
    }
}

// ============================================================================
// Acquisition Monitor
// ============================================================================

/// Acquisition loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionState {
    /// No frame available yet, or the last retrieval failed
    Idle,
    /// Frames are arriving from the landmark source
    Detecting,
    /// Loop has exited (shutdown or source exhausted)
    Stopped,
}

impl AcquisitionState {
    fn as_u8(self) -> u8 {
        match self {
            AcquisitionState::Idle => 0,
            AcquisitionState::Detecting => 1,
            AcquisitionState::Stopped => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => AcquisitionState::Detecting,
            2 => AcquisitionState::Stopped,
            _ => AcquisitionState::Idle,
        }
    }
}

impl std::fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquisitionState::Idle => write!(f, "Idle"),
            AcquisitionState::Detecting => write!(f, "Detecting"),
            AcquisitionState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Lock-free counters describing the acquisition loop, readable from handlers.
#[derive(Debug)]
pub struct AcquisitionMonitor {
    state: AtomicU8,
    frames_captured: AtomicU64,
    capture_failures: AtomicU64,
    no_face_frames: AtomicU64,
    observations_published: AtomicU64,
    started: Instant,
}

impl Default for AcquisitionMonitor {
    fn default() -> Self {
        Self {
            state: AtomicU8::new(AcquisitionState::Idle.as_u8()),
            frames_captured: AtomicU64::new(0),
            capture_failures: AtomicU64::new(0),
            no_face_frames: AtomicU64::new(0),
            observations_published: AtomicU64::new(0),
            started: Instant::now(),
        }
    }
}

impl AcquisitionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AcquisitionState {
        AcquisitionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Set the loop state, returning the previous one.
    pub fn set_state(&self, state: AcquisitionState) -> AcquisitionState {
        AcquisitionState::from_u8(self.state.swap(state.as_u8(), Ordering::AcqRel))
    }

    pub fn record_frame(&self) {
        self.frames_captured.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.capture_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_no_face(&self) {
        self.no_face_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_published(&self) {
        self.observations_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> LoopStats {
        LoopStats {
            state: self.state(),
            frames_captured: self.frames_captured.load(Ordering::Relaxed),
            capture_failures: self.capture_failures.load(Ordering::Relaxed),
            no_face_frames: self.no_face_frames.load(Ordering::Relaxed),
            observations_published: self.observations_published.load(Ordering::Relaxed),
            uptime_secs: self.started.elapsed().as_secs(),
        }
    }
}

/// Acquisition loop statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoopStats {
    pub state: AcquisitionState,
    pub frames_captured: u64,
    pub capture_failures: u64,
    pub no_face_frames: u64,
    pub observations_published: u64,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GazeLabel, PixelPoint};
    use chrono::{DateTime, Utc};

    fn observation(secs: i64, x: i32) -> GazeObservation {
        GazeObservation {
            timestamp: DateTime::<Utc>::from_timestamp(secs, 0).unwrap(),
            label: GazeLabel::Center,
            left_center: PixelPoint::new(x, 10),
            right_center: PixelPoint::new(x, 10),
            cx: x,
            frame_width: 640,
        }
    }

    #[test]
    fn test_store_starts_empty() {
        let store = StatusStore::new();
        assert!(store.is_empty());
        assert!(store.read().is_none());
    }

    #[test]
    fn test_latest_publish_wins() {
        let store = StatusStore::new();
        store.publish(observation(100, 1));
        store.publish(observation(101, 2));
        let snap = store.read().unwrap();
        assert_eq!(snap.timestamp.timestamp(), 101);
        assert_eq!(snap.cx, 2);
        assert!(!store.is_empty());
    }

    #[test]
    fn test_snapshot_survives_later_publish() {
        let store = StatusStore::new();
        store.publish(observation(100, 1));
        let held = store.read().unwrap();
        store.publish(observation(101, 2));
        // The reader's snapshot is unaffected by the swap
        assert_eq!(held.cx, 1);
        assert_eq!(store.read().unwrap().cx, 2);
    }

    #[test]
    fn test_monitor_counters_and_state() {
        let monitor = AcquisitionMonitor::new();
        assert_eq!(monitor.state(), AcquisitionState::Idle);

        assert_eq!(monitor.set_state(AcquisitionState::Detecting), AcquisitionState::Idle);
        monitor.record_frame();
        monitor.record_frame();
        monitor.record_no_face();
        monitor.record_published();
        monitor.record_failure();

        let stats = monitor.snapshot();
        assert_eq!(stats.state, AcquisitionState::Detecting);
        assert_eq!(stats.frames_captured, 2);
        assert_eq!(stats.no_face_frames, 1);
        assert_eq!(stats.observations_published, 1);
        assert_eq!(stats.capture_failures, 1);
    }

    #[test]
    fn test_state_serializes_lowercase() {
        let v = serde_json::to_value(AcquisitionState::Stopped).unwrap();
        assert_eq!(v, "stopped");
    }
}
