//! Frame acquisition loop shared across all landmark sources.
//!
//! One long-lived task: frame -> extract -> classify -> publish, paced by the
//! configured poll interval. The loop is the only writer of the
//! [`StatusStore`]; handlers observe it only through that store and the
//! [`AcquisitionMonitor`].

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::source::{FrameEvent, LandmarkSource};
use super::{AcquisitionMonitor, AcquisitionState, LoopStats, StatusStore};
use crate::classifier::{classify_landmarks, Classification};
use crate::config::{AcquisitionConfig, ClassifierConfig};
use crate::types::GazeObservation;

/// Owns everything the acquisition task needs.
///
/// Built with [`new()`](AcquisitionLoop::new), then consumed by
/// [`run()`](AcquisitionLoop::run).
pub struct AcquisitionLoop {
    store: Arc<StatusStore>,
    monitor: Arc<AcquisitionMonitor>,
    acquisition: AcquisitionConfig,
    classifier: ClassifierConfig,
    cancel_token: CancellationToken,
    /// Stamp of the last publish; new stamps never go below it
    last_stamp: Option<DateTime<Utc>>,
}

impl AcquisitionLoop {
    pub fn new(
        store: Arc<StatusStore>,
        monitor: Arc<AcquisitionMonitor>,
        acquisition: AcquisitionConfig,
        classifier: ClassifierConfig,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            store,
            monitor,
            acquisition,
            classifier,
            cancel_token,
            last_stamp: None,
        }
    }

    /// Run until cancellation or until the source is exhausted.
    ///
    /// The source is opened once on entry and released once on exit, whichever
    /// way the loop ends. Returns the final loop statistics.
    pub async fn run<S: LandmarkSource + ?Sized>(mut self, source: &mut S) -> LoopStats {
        let name = source.source_name().to_string();
        info!("[Acquisition] Starting frame acquisition from {}", name);

        let opened = tokio::select! {
            _ = self.cancel_token.cancelled() => None,
            result = source.open() => Some(result),
        };
        if let Some(Err(e)) = opened {
            warn!("[Acquisition] Could not open {} source: {} (will keep retrying)", name, e);
        }

        let mut failing = false;

        while !self.cancel_token.is_cancelled() {
            let result = tokio::select! {
                _ = self.cancel_token.cancelled() => break,
                result = source.next_frame() => result,
            };

            let frame = match result {
                Ok(FrameEvent::Frame(frame)) => frame,
                Ok(FrameEvent::Exhausted) => {
                    info!("[Acquisition] {} source exhausted", name);
                    break;
                }
                Err(e) => {
                    self.monitor.record_failure();
                    if failing {
                        debug!("[Acquisition] Frame unavailable: {}", e);
                    } else {
                        warn!("[Acquisition] Frame unavailable from {}: {}", name, e);
                        failing = true;
                    }
                    self.transition(AcquisitionState::Idle);
                    if self.pause(self.acquisition.backoff()).await {
                        break;
                    }
                    continue;
                }
            };

            if failing {
                info!("[Acquisition] {} source recovered", name);
                failing = false;
            }
            self.monitor.record_frame();
            self.transition(AcquisitionState::Detecting);

            match source.extract(&frame) {
                Some(iris) => {
                    let classification = classify_landmarks(&iris, &self.classifier);
                    self.publish(classification);
                }
                None => {
                    // Keep the previous observation; staleness handles absence
                    self.monitor.record_no_face();
                }
            }

            let every = self.acquisition.progress_log_every;
            if every > 0 {
                let stats = self.monitor.snapshot();
                if stats.frames_captured % every == 0 {
                    info!(
                        "[Acquisition] Progress: {} frames | {} published | {} no-face | {} failures",
                        stats.frames_captured,
                        stats.observations_published,
                        stats.no_face_frames,
                        stats.capture_failures
                    );
                }
            }

            if self.pause(self.acquisition.poll_interval()).await {
                break;
            }
        }

        if self.cancel_token.is_cancelled() {
            info!("[Acquisition] Shutdown signal received");
        }

        source.release().await;
        self.monitor.set_state(AcquisitionState::Stopped);

        let stats = self.monitor.snapshot();
        info!(
            "[Acquisition] Stopped: {} frames, {} observations published, {} no-face, {} failures",
            stats.frames_captured,
            stats.observations_published,
            stats.no_face_frames,
            stats.capture_failures
        );
        stats
    }

    /// Stamp a classification and swap it into the store.
    fn publish(&mut self, c: Classification) {
        let now = Utc::now();
        let timestamp = match self.last_stamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_stamp = Some(timestamp);

        self.store.publish(GazeObservation {
            timestamp,
            label: c.label,
            left_center: c.left_center,
            right_center: c.right_center,
            cx: c.cx,
            frame_width: c.frame_width,
        });
        self.monitor.record_published();
        debug!(label = %c.label, cx = c.cx, w = c.frame_width, "Published gaze observation");
    }

    fn transition(&self, next: AcquisitionState) {
        let previous = self.monitor.set_state(next);
        if previous != next {
            info!("[Acquisition] {} -> {}", previous, next);
        }
    }

    /// Sleep for `duration`; returns true if cancelled meanwhile.
    async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            tokio::task::yield_now().await;
            return self.cancel_token.is_cancelled();
        }
        tokio::select! {
            _ = self.cancel_token.cancelled() => true,
            _ = tokio::time::sleep(duration) => false,
        }
    }
}
