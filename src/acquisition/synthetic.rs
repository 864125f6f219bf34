//! Synthetic gaze sweep generator.
//!
//! Produces frame records for a virtual subject whose eyes sweep
//! left -> center -> right -> center on a sine wave, with small landmark
//! jitter and periodic stretches where the face leaves the frame. Used when
//! no extractor is configured and for demos of the staleness window.

use rand::prelude::*;
use std::f64::consts::TAU;

use crate::types::{FaceRecord, Frame, NormalizedPoint};

/// Synthetic subject parameters.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub width: u32,
    pub height: u32,
    /// Frames per full left-right-left sweep
    pub sweep_period_frames: u64,
    /// Peak horizontal excursion from frame center (normalized)
    pub amplitude: f64,
    /// Distance between the two iris centers (normalized)
    pub eye_separation: f64,
    /// Iris outline radius (normalized)
    pub iris_radius: f64,
    /// Max landmark jitter (normalized)
    pub jitter: f64,
    /// Every this many frames, the face disappears (0 disables)
    pub gap_every_frames: u64,
    /// Frames without a face per gap
    pub gap_len_frames: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            width: crate::config::defaults::SYNTHETIC_FRAME_WIDTH,
            height: crate::config::defaults::SYNTHETIC_FRAME_HEIGHT,
            sweep_period_frames: 300,
            amplitude: 0.3,
            eye_separation: 0.12,
            iris_radius: 0.01,
            jitter: 0.002,
            gap_every_frames: 600,
            gap_len_frames: 120,
        }
    }
}

/// Stateful frame generator.
pub struct SweepGenerator {
    config: SweepConfig,
    frame_index: u64,
    rng: StdRng,
}

impl SweepGenerator {
    pub fn new(config: SweepConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            frame_index: 0,
            rng,
        }
    }

    /// Index of the next frame to be generated.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Whether frame `index` falls inside a no-face gap.
    fn in_gap(&self, index: u64) -> bool {
        let c = &self.config;
        c.gap_every_frames > 0
            && c.gap_len_frames > 0
            && index % c.gap_every_frames >= c.gap_every_frames.saturating_sub(c.gap_len_frames)
    }

    /// Normalized horizontal gaze midpoint for frame `index`.
    pub fn midpoint_at(&self, index: u64) -> f64 {
        let c = &self.config;
        let period = c.sweep_period_frames.max(1) as f64;
        let phase = (index % c.sweep_period_frames.max(1)) as f64 / period;
        0.5 + c.amplitude * (TAU * phase).sin()
    }

    /// Generate the next frame record.
    pub fn next_frame(&mut self) -> Frame {
        let index = self.frame_index;
        self.frame_index += 1;

        let faces = if self.in_gap(index) {
            Vec::new()
        } else {
            let mid = self.midpoint_at(index);
            let half_sep = self.config.eye_separation / 2.0;
            vec![FaceRecord::Iris {
                // Subject's left eye appears on the image right
                left_iris: self.iris_outline(mid + half_sep, 0.45),
                right_iris: self.iris_outline(mid - half_sep, 0.45),
            }]
        };

        Frame {
            width: self.config.width,
            height: self.config.height,
            faces,
        }
    }

    /// Four outline points (right, top, left, bottom) around a center.
    fn iris_outline(&mut self, cx: f64, cy: f64) -> Vec<NormalizedPoint> {
        let r = self.config.iris_radius;
        let j = self.config.jitter;
        [(r, 0.0), (0.0, -r), (-r, 0.0), (0.0, r)]
            .into_iter()
            .map(|(dx, dy)| {
                let jx = if j > 0.0 { self.rng.gen_range(-j..j) } else { 0.0 };
                let jy = if j > 0.0 { self.rng.gen_range(-j..j) } else { 0.0 };
                [
                    (cx + dx + jx).clamp(0.0, 1.0) as f32,
                    (cy + dy + jy).clamp(0.0, 1.0) as f32,
                ]
            })
            .collect()
    }
}
