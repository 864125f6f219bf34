//! Landmark Extractor TCP Client
//!
//! Connects to an external landmark extractor (e.g. a MediaPipe face-mesh
//! sidecar reading the webcam) that streams one JSON frame record per line.
//!
//! The client never retries internally. A failed connect or a dropped stream
//! surfaces as a [`CaptureError`] and leaves the client disconnected; the
//! next [`read_frame`](LandmarkClient::read_frame) call reconnects. The
//! acquisition loop's backoff therefore paces reconnection attempts.
//!
//! A read timeout keeps whatever part of the current record already arrived;
//! the next call continues the same line instead of starting mid-record.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use super::records::{parse_frame_line, CaptureError};
use crate::config::defaults::{TCP_KEEPALIVE_SECS, TCP_READ_TIMEOUT_SECS};
use crate::types::Frame;

/// JSON-lines TCP client for landmark frame records.
pub struct LandmarkClient {
    host: String,
    port: u16,
    stream: Option<BufReader<TcpStream>>,
    /// Bytes of the record being read, kept across read timeouts
    pending: Vec<u8>,
    connect_timeout: Duration,
    read_timeout: Duration,
    /// Total frames received since creation
    frames_received: u64,
    /// Successful connections after the first
    reconnections: u64,
    /// Whether a connection has ever succeeded
    ever_connected: bool,
    /// Total read timeouts encountered
    timeouts: u64,
}

/// Connection health statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandmarkClientStats {
    pub connected: bool,
    pub frames_received: u64,
    pub reconnections: u64,
    pub timeouts: u64,
}

impl LandmarkClient {
    /// Create a disconnected client.
    pub fn new(host: &str, port: u16, connect_timeout: Duration) -> Self {
        Self {
            host: host.to_string(),
            port,
            stream: None,
            pending: Vec::with_capacity(16 * 1024),
            connect_timeout,
            read_timeout: Duration::from_secs(TCP_READ_TIMEOUT_SECS),
            frames_received: 0,
            reconnections: 0,
            ever_connected: false,
            timeouts: 0,
        }
    }

    /// Set the per-record read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Connect to the extractor with timeout. No-op if already connected.
    pub async fn connect(&mut self) -> Result<(), CaptureError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let addr = self.address();
        tracing::debug!(address = %addr, "Connecting to landmark extractor");

        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| CaptureError::Timeout)?
            .map_err(|e| CaptureError::ConnectionFailed(format!("{addr}: {e}")))?;

        // Keepalive detects an extractor that vanished without closing
        let sock_ref = socket2::SockRef::from(&stream);
        let keepalive =
            socket2::TcpKeepalive::new().with_time(Duration::from_secs(TCP_KEEPALIVE_SECS));
        if let Err(e) = sock_ref.set_tcp_keepalive(&keepalive) {
            tracing::debug!(error = %e, "Failed to enable TCP keepalive");
        }

        self.stream = Some(BufReader::new(stream));
        self.pending.clear();
        if self.ever_connected {
            self.reconnections += 1;
        }
        self.ever_connected = true;

        tracing::info!(address = %addr, reconnections = self.reconnections, "Landmark extractor connected");
        Ok(())
    }

    /// Shut down the connection, if any.
    pub async fn disconnect(&mut self) {
        if let Some(mut reader) = self.stream.take() {
            if let Err(e) = reader.get_mut().shutdown().await {
                tracing::debug!(error = %e, "Error shutting down extractor connection");
            }
            tracing::info!(address = %self.address(), "Landmark extractor connection closed");
        }
    }

    /// Read the next frame record, connecting first if needed.
    ///
    /// Malformed records are skipped. Connection loss drops the stream and
    /// returns an error; a read timeout keeps the connection and any partial
    /// record.
    pub async fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        self.connect().await?;

        loop {
            let Some(reader) = self.stream.as_mut() else {
                return Err(CaptureError::NotReady("not connected".to_string()));
            };

            // read_until appends partial input to `pending` before a timeout
            // drops it, so the record survives into the next call
            let read_result = tokio::time::timeout(
                self.read_timeout,
                reader.read_until(b'\n', &mut self.pending),
            )
            .await;

            let bytes = match read_result {
                Ok(Ok(b)) => b,
                Ok(Err(e)) => {
                    self.stream = None;
                    self.pending.clear();
                    return Err(CaptureError::Io(e));
                }
                Err(_) => {
                    self.timeouts += 1;
                    return Err(CaptureError::Timeout);
                }
            };

            if bytes == 0 {
                self.stream = None;
                self.pending.clear();
                return Err(CaptureError::ConnectionClosed);
            }

            let parsed = parse_frame_line(&String::from_utf8_lossy(&self.pending));
            self.pending.clear();

            match parsed {
                Ok(Some(frame)) => {
                    self.frames_received += 1;
                    return Ok(frame);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed record from extractor");
                }
            }
        }
    }

    pub fn stats(&self) -> LandmarkClientStats {
        LandmarkClientStats {
            connected: self.is_connected(),
            frames_received: self.frames_received,
            reconnections: self.reconnections,
            timeouts: self.timeouts,
        }
    }
}
