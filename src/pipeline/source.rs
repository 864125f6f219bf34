//! Landmark source abstraction for frame acquisition.
//!
//! Provides a unified trait for reading frame records from different inputs:
//! stdin (JSON lines), recorded files (replay), a TCP extractor sidecar, and
//! the built-in synthetic sweep.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::acquisition::{
    parse_frame_line, read_frame_file, CaptureError, LandmarkClient, SweepConfig, SweepGenerator,
};
use crate::config::defaults::SYNTHETIC_FRAME_PERIOD_MS;
use crate::types::{Frame, IrisLandmarks};

/// Events produced by a landmark source.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    /// A frame record was read.
    Frame(Frame),
    /// No more data will ever arrive (EOF on stdin, end of a non-looping replay).
    Exhausted,
}

/// Trait abstracting where frame records come from.
///
/// `Err` from [`next_frame`](LandmarkSource::next_frame) means "no frame this
/// cycle": the acquisition loop backs off and asks again. Sources never sleep
/// on failure themselves.
#[async_trait]
pub trait LandmarkSource: Send + 'static {
    /// Acquire the underlying resource. Failure is not fatal.
    async fn open(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    /// Read the next frame record.
    async fn next_frame(&mut self) -> Result<FrameEvent, CaptureError>;

    /// Pull iris landmarks for the first face out of a frame.
    fn extract(&self, frame: &Frame) -> Option<IrisLandmarks> {
        IrisLandmarks::from_frame(frame)
    }

    /// Release the underlying resource. Called once when the loop exits.
    async fn release(&mut self) {}

    /// Human-readable name for logging (e.g. "stdin", "replay", "tcp").
    fn source_name(&self) -> &str;
}

// ============================================================================
// Stdin Source (JSON frame records, one per line)
// ============================================================================

/// Reads JSON frame records from stdin.
///
/// `extractor.py --camera 0 | gaze-serve --stdin`
pub struct StdinSource {
    reader: tokio::io::BufReader<tokio::io::Stdin>,
    line_buffer: String,
}

impl StdinSource {
    pub fn new() -> Self {
        Self {
            reader: tokio::io::BufReader::new(tokio::io::stdin()),
            line_buffer: String::with_capacity(16 * 1024),
        }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LandmarkSource for StdinSource {
    async fn next_frame(&mut self) -> Result<FrameEvent, CaptureError> {
        use tokio::io::AsyncBufReadExt;
        loop {
            self.line_buffer.clear();
            let bytes = self.reader.read_line(&mut self.line_buffer).await?;
            if bytes == 0 {
                return Ok(FrameEvent::Exhausted);
            }
            match parse_frame_line(&self.line_buffer) {
                Ok(Some(frame)) => return Ok(FrameEvent::Frame(frame)),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("[StdinSource] Skipping malformed record: {}", e);
                }
            }
        }
    }

    fn source_name(&self) -> &str {
        "stdin"
    }
}

// ============================================================================
// Replay Source (recorded JSON-lines file)
// ============================================================================

/// Replays pre-loaded frame records with a fixed inter-frame delay.
pub struct ReplaySource {
    frames: Vec<Frame>,
    position: usize,
    delay: Duration,
    looping: bool,
    yielded_first: bool,
}

impl ReplaySource {
    pub fn new(frames: Vec<Frame>, delay: Duration, looping: bool) -> Self {
        Self {
            frames,
            position: 0,
            delay,
            looping,
            yielded_first: false,
        }
    }

    /// Load a recording and pace it at `fps` frames per second (0 = no pacing).
    pub fn load(path: &Path, fps: u32, looping: bool) -> Result<Self, CaptureError> {
        let frames = read_frame_file(path)?;
        let delay = if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / f64::from(fps))
        };
        tracing::info!(
            path = %path.display(),
            frames = frames.len(),
            fps,
            looping,
            "Loaded frame recording"
        );
        Ok(Self::new(frames, delay, looping))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[async_trait]
impl LandmarkSource for ReplaySource {
    async fn next_frame(&mut self) -> Result<FrameEvent, CaptureError> {
        if self.position >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return Ok(FrameEvent::Exhausted);
            }
            self.position = 0;
        }

        // No delay before the first frame
        if self.yielded_first && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let frame = self.frames[self.position].clone();
        self.position += 1;
        self.yielded_first = true;
        Ok(FrameEvent::Frame(frame))
    }

    fn source_name(&self) -> &str {
        "replay"
    }
}

// ============================================================================
// TCP Source (extractor sidecar)
// ============================================================================

/// Reads frame records from a landmark extractor over TCP.
///
/// Wraps [`LandmarkClient`], which connects lazily and drops the stream on
/// any I/O failure; the loop's backoff paces reconnection.
pub struct TcpSource {
    client: LandmarkClient,
}

impl TcpSource {
    pub fn new(host: &str, port: u16, connect_timeout: Duration) -> Self {
        Self {
            client: LandmarkClient::new(host, port, connect_timeout),
        }
    }

    pub fn client(&self) -> &LandmarkClient {
        &self.client
    }
}

#[async_trait]
impl LandmarkSource for TcpSource {
    async fn open(&mut self) -> Result<(), CaptureError> {
        self.client.connect().await
    }

    async fn next_frame(&mut self) -> Result<FrameEvent, CaptureError> {
        self.client.read_frame().await.map(FrameEvent::Frame)
    }

    async fn release(&mut self) {
        let stats = self.client.stats();
        tracing::info!(
            "[TcpSource] {} frames received, {} reconnections, {} timeouts",
            stats.frames_received,
            stats.reconnections,
            stats.timeouts
        );
        self.client.disconnect().await;
    }

    fn source_name(&self) -> &str {
        "tcp"
    }
}

// ============================================================================
// Synthetic Source (built-in gaze sweep)
// ============================================================================

/// Generates a sweeping gaze at roughly 30 fps. Never exhausts.
pub struct SyntheticSource {
    generator: SweepGenerator,
    frame_period: Duration,
}

impl SyntheticSource {
    pub fn new(config: SweepConfig, seed: Option<u64>) -> Self {
        Self {
            generator: SweepGenerator::new(config, seed),
            frame_period: Duration::from_millis(SYNTHETIC_FRAME_PERIOD_MS),
        }
    }

    pub fn with_frame_period(mut self, period: Duration) -> Self {
        self.frame_period = period;
        self
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(SweepConfig::default(), None)
    }
}

#[async_trait]
impl LandmarkSource for SyntheticSource {
    async fn next_frame(&mut self) -> Result<FrameEvent, CaptureError> {
        if !self.frame_period.is_zero() {
            tokio::time::sleep(self.frame_period).await;
        }
        Ok(FrameEvent::Frame(self.generator.next_frame()))
    }

    fn source_name(&self) -> &str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32) -> Frame {
        Frame {
            width,
            height: 480,
            faces: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_replay_exhausts_without_looping() {
        let mut source = ReplaySource::new(vec![frame(1), frame(2)], Duration::ZERO, false);
        assert_eq!(source.next_frame().await.unwrap(), FrameEvent::Frame(frame(1)));
        assert_eq!(source.next_frame().await.unwrap(), FrameEvent::Frame(frame(2)));
        assert_eq!(source.next_frame().await.unwrap(), FrameEvent::Exhausted);
        assert_eq!(source.next_frame().await.unwrap(), FrameEvent::Exhausted);
    }

    #[tokio::test]
    async fn test_replay_loops() {
        let mut source = ReplaySource::new(vec![frame(1), frame(2)], Duration::ZERO, true);
        let widths: Vec<u32> = {
            let mut out = Vec::new();
            for _ in 0..5 {
                match source.next_frame().await.unwrap() {
                    FrameEvent::Frame(f) => out.push(f.width),
                    FrameEvent::Exhausted => panic!("looping replay exhausted"),
                }
            }
            out
        };
        assert_eq!(widths, vec![1, 2, 1, 2, 1]);
    }

    #[tokio::test]
    async fn test_empty_looping_replay_exhausts() {
        let mut source = ReplaySource::new(Vec::new(), Duration::ZERO, true);
        assert!(source.is_empty());
        assert_eq!(source.next_frame().await.unwrap(), FrameEvent::Exhausted);
    }

    #[tokio::test]
    async fn test_replay_load_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"width":640,"height":480,"faces":[]}}"#).unwrap();
        writeln!(file, r#"{{"width":320,"height":240,"faces":[]}}"#).unwrap();

        let source = ReplaySource::load(file.path(), 0, false).unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.source_name(), "replay");
    }

    #[tokio::test]
    async fn test_synthetic_produces_frames() {
        let mut source = SyntheticSource::new(SweepConfig::default(), Some(42))
            .with_frame_period(Duration::ZERO);
        for _ in 0..10 {
            match source.next_frame().await.unwrap() {
                FrameEvent::Frame(f) => {
                    assert_eq!(f.width, 640);
                    assert!(source.extract(&f).is_some());
                }
                FrameEvent::Exhausted => panic!("synthetic source exhausted"),
            }
        }
    }

    #[tokio::test]
    async fn test_tcp_source_unavailable_when_nothing_listens() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut source = TcpSource::new("127.0.0.1", port, Duration::from_secs(1));
        assert!(source.open().await.is_err());
        assert!(source.next_frame().await.is_err());
        source.release().await;
        assert!(!source.client().is_connected());
    }
}
