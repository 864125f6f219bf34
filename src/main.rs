//! GazeServe - horizontal gaze status service
//!
//! Classifies gaze direction from facial landmark frames and serves the most
//! recent fresh observation over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Run with the built-in synthetic gaze sweep
//! cargo run --release
//!
//! # Landmark frames (JSON lines) from an extractor on stdin
//! python extractor.py --camera 0 | ./gaze-serve --stdin
//!
//! # Connect to an extractor sidecar over TCP
//! ./gaze-serve --tcp 127.0.0.1:7000
//!
//! # Replay a recording at 30 fps, looping
//! ./gaze-serve --replay session.jsonl --fps 30 --loop-replay
//! ```
//!
//! # Environment Variables
//!
//! - `GAZE_CONFIG`: Path to a TOML config file
//! - `GAZE_SERVER_ADDR`: HTTP bind address (overridden by `--addr`)
//! - `GAZE_CORS_ORIGINS`: Comma-separated allowed cross-origin callers
//! - `GAZE_LOG_JSON`: Set to "true" for JSON log lines
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use gaze_serve::api::{create_app, ApiState};
use gaze_serve::config::{defaults, GazeConfig};
use gaze_serve::pipeline::{
    AcquisitionLoop, AcquisitionMonitor, LandmarkSource, LoopStats, ReplaySource, StatusStore,
    StdinSource, SyntheticSource, TcpSource,
};

/// Env var overriding `server.addr`.
const SERVER_ADDR_ENV_VAR: &str = "GAZE_SERVER_ADDR";

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "gaze-serve")]
#[command(about = "Real-time horizontal gaze status service")]
#[command(version)]
struct CliArgs {
    /// Read landmark frame records (JSON lines) from stdin
    #[arg(long, conflicts_with_all = ["tcp", "replay"])]
    stdin: bool,

    /// Connect to a landmark extractor sidecar streaming JSON lines
    /// Example: ./gaze-serve --tcp 127.0.0.1:7000
    #[arg(long, value_name = "HOST:PORT", conflicts_with = "replay")]
    tcp: Option<String>,

    /// Replay a recorded JSON-lines frame file
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Replay pace in frames per second (0 = as fast as possible)
    #[arg(long, default_value_t = defaults::REPLAY_FPS, requires = "replay")]
    fps: u32,

    /// Restart the replay from the top when it ends
    #[arg(long, requires = "replay")]
    loop_replay: bool,

    /// Override the server address (default: "0.0.0.0:5000")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to a TOML config file (load failure is fatal)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "GAZE_LOG_JSON")]
    log_json: bool,
}

// ============================================================================
// Supervised Tasks
// ============================================================================

/// What a supervised task hands back when it ends cleanly.
#[derive(Debug)]
enum TaskExit {
    HttpServer,
    Acquisition(LoopStats),
}

impl std::fmt::Display for TaskExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskExit::HttpServer => write!(f, "HttpServer"),
            TaskExit::Acquisition(_) => write!(f, "Acquisition"),
        }
    }
}

/// Spawn the HTTP server task into the JoinSet.
fn spawn_http_server(
    task_set: &mut JoinSet<Result<TaskExit>>,
    listener: tokio::net::TcpListener,
    app: axum::Router,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                info!("[HttpServer] Draining in-flight requests");
            })
            .await
            .context("HTTP server error")?;
        Ok(TaskExit::HttpServer)
    });
}

/// Spawn the acquisition loop task into the JoinSet.
fn spawn_acquisition(
    task_set: &mut JoinSet<Result<TaskExit>>,
    mut source: Box<dyn LandmarkSource>,
    acquisition_loop: AcquisitionLoop,
) {
    task_set.spawn(async move {
        let stats = acquisition_loop.run(source.as_mut()).await;
        Ok(TaskExit::Acquisition(stats))
    });
}

/// Watch the tasks until shutdown is requested or one of them fails.
///
/// Acquisition ending on its own (`POST /stop`, exhausted replay) is not a
/// failure: the server keeps answering from the last observation. The server
/// returning before the root token fires is. Either way every remaining task
/// is joined before this returns.
async fn run_supervisor(
    task_set: &mut JoinSet<Result<TaskExit>>,
    cancel_token: CancellationToken,
) -> Result<()> {
    debug!("[Supervisor] Watching {} tasks", task_set.len());

    let outcome = loop {
        let joined = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break Ok(()),
            joined = task_set.join_next() => joined,
        };

        match joined {
            None => break Ok(()),
            Some(Ok(Ok(TaskExit::Acquisition(stats)))) => {
                info!(
                    "[Supervisor] Acquisition ended after {} frames ({} published); still serving",
                    stats.frames_captured, stats.observations_published
                );
            }
            Some(Ok(Ok(TaskExit::HttpServer))) if cancel_token.is_cancelled() => break Ok(()),
            Some(Ok(Ok(TaskExit::HttpServer))) => {
                break Err(anyhow::anyhow!("HTTP server exited before shutdown"));
            }
            Some(Ok(Err(e))) => break Err(e),
            Some(Err(e)) => break Err(anyhow::anyhow!("Task panicked: {}", e)),
        }
    };

    if let Err(e) = &outcome {
        error!("[Supervisor] {:#}; shutting down", e);
    }
    cancel_token.cancel();

    while let Some(joined) = task_set.join_next().await {
        match joined {
            Ok(Ok(exit)) => debug!("[Supervisor] {} stopped", exit),
            Ok(Err(e)) => warn!("[Supervisor] Task error during shutdown: {:#}", e),
            Err(e) => warn!("[Supervisor] Task panicked during shutdown: {}", e),
        }
    }

    outcome
}

// ============================================================================
// Source Selection
// ============================================================================

/// Split `HOST:PORT` (the port is taken after the last colon).
fn parse_host_port(addr: &str) -> Result<(String, u16)> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| anyhow::anyhow!("Invalid extractor address '{}'. Expected HOST:PORT", addr))?;
    if host.is_empty() {
        return Err(anyhow::anyhow!("Invalid extractor address '{}': empty host", addr));
    }
    let port: u16 = port.parse().context("Invalid port number")?;
    Ok((host.to_string(), port))
}

/// Build the landmark source selected on the command line.
fn build_source(args: &CliArgs, config: &GazeConfig) -> Result<Box<dyn LandmarkSource>> {
    if let Some(addr) = &args.tcp {
        let (host, port) = parse_host_port(addr)?;
        info!("Input: landmark extractor over TCP ({}:{})", host, port);
        return Ok(Box::new(TcpSource::new(
            &host,
            port,
            config.acquisition.connect_timeout(),
        )));
    }

    if args.stdin {
        info!("Input: stdin (JSON-lines frame records)");
        return Ok(Box::new(StdinSource::new()));
    }

    if let Some(path) = &args.replay {
        let source = ReplaySource::load(path, args.fps, args.loop_replay)
            .with_context(|| format!("Failed to load replay file {}", path.display()))?;
        if source.is_empty() {
            warn!("Replay file {} contains no frame records", path.display());
        }
        info!("Input: replay of {} ({} frames)", path.display(), source.len());
        return Ok(Box::new(source));
    }

    info!("Input: synthetic gaze sweep (no extractor configured)");
    Ok(Box::new(SyntheticSource::default()))
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Initialize logging; `RUST_LOG` overrides the default `info` filter.
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_json);

    // Load configuration
    let mut config = match &args.config {
        Some(path) => GazeConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GazeConfig::load(),
    };
    if let Ok(addr) = std::env::var(SERVER_ADDR_ENV_VAR) {
        config.server.addr = addr;
    }
    if let Some(addr) = &args.addr {
        config.server.addr = addr.clone();
    }

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!("GazeServe v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Staleness window: {:.1}s | Thresholds: LEFT < {:.2}w, RIGHT > {:.2}w",
        config.freshness.max_age_secs,
        config.classifier.left_fraction,
        config.classifier.right_fraction
    );

    let source = build_source(&args, &config)?;
    let source_name = source.source_name().to_string();

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    // POST /stop cancels only this child; Ctrl+C cancels both
    let acquisition_cancel = cancel_token.child_token();

    let store = Arc::new(StatusStore::new());
    let monitor = Arc::new(AcquisitionMonitor::new());

    let state = ApiState::new(
        Arc::clone(&store),
        Arc::clone(&monitor),
        config.freshness,
        acquisition_cancel.clone(),
        &source_name,
    );
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;
    info!("HTTP server listening on http://{}", config.server.addr);

    let acquisition_loop = AcquisitionLoop::new(
        store,
        monitor,
        config.acquisition.clone(),
        config.classifier,
        acquisition_cancel,
    );

    let mut task_set: JoinSet<Result<TaskExit>> = JoinSet::new();
    spawn_http_server(&mut task_set, listener, app, cancel_token.clone());
    spawn_acquisition(&mut task_set, source, acquisition_loop);

    run_supervisor(&mut task_set, cancel_token).await?;

    info!("GazeServe shutdown complete");
    Ok(())
}
