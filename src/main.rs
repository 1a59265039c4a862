//! LookAhead Playback Simulator
//!
//! Drives a look-ahead cache the way a media player would: a playhead moves
//! over a frame range and republishes a job at every step, while a worker pool
//! renders frames ahead of it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Playback Simulator                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────┐       │
//! │  │   Playhead   │───▶│  LookAhead   │───▶│ Worker Pool  │       │
//! │  │   (tokio)    │    │    Cache     │◀───│  (threads)   │       │
//! │  └──────────────┘    └──────────────┘    └──────────────┘       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use clap::Parser;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lookahead::{
    Direction, Error, LookAheadCache, PrefetchConfig, PriorityCache, QueueAdapter, RangeCursor,
    Result, WorkerPool,
};

type FrameCache = LookAheadCache<PriorityCache<u64, u64, Bytes>, RangeCursor>;

// =============================================================================
// CLI Arguments
// =============================================================================

/// LookAhead - playback simulator for the look-ahead frame cache
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file (overridden by explicit flags)
    #[arg(long, env = "LOOKAHEAD_CONFIG")]
    config: Option<PathBuf>,

    /// Cache capacity in bytes
    #[arg(long, env = "CACHE_CAPACITY")]
    capacity: Option<u64>,

    /// Number of render workers
    #[arg(long, env = "WORKERS")]
    workers: Option<usize>,

    /// Number of frames in the sequence
    #[arg(long, env = "FRAMES", default_value = "600")]
    frames: u64,

    /// Size of one rendered frame in bytes
    #[arg(long, env = "FRAME_SIZE", default_value = "1048576")]
    frame_size: u64,

    /// Time to render one frame, in milliseconds
    #[arg(long, env = "RENDER_MS", default_value = "5")]
    render_ms: u64,

    /// Playhead step interval, in milliseconds
    #[arg(long, env = "STEP_MS", default_value = "40")]
    step_ms: u64,

    /// Look-ahead direction (forward, reverse, balanced)
    #[arg(long, env = "DIRECTION", default_value = "forward")]
    direction: Direction,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Args {
    /// Resolve the worker pool configuration: file first, then flags
    fn prefetch_config(&self) -> Result<PrefetchConfig> {
        let mut config = match &self.config {
            Some(path) => PrefetchConfig::from_file(path)?,
            None => PrefetchConfig::default(),
        };

        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args);

    let config = args.prefetch_config()?;

    info!("Starting LookAhead playback simulator v{}", lookahead::VERSION);
    info!("  Capacity: {} bytes", config.capacity);
    info!("  Workers: {}", config.workers);
    info!("  Frames: {} x {} bytes", args.frames, args.frame_size);
    info!("  Direction: {}", args.direction);

    let cache: Arc<FrameCache> = Arc::new(LookAheadCache::new(config.capacity));

    // Rendered frames are reported back through a channel
    let (rendered_tx, rendered_rx) = crossbeam::channel::unbounded::<u64>();
    let frame_size = args.frame_size;
    let render_time = Duration::from_millis(args.render_ms);

    let pool = WorkerPool::spawn(Arc::clone(&cache), &config, move |frame: &u64| {
        std::thread::sleep(render_time);
        QueueAdapter::new(&rendered_tx).push_back(*frame);
        Some((frame_size, Bytes::copy_from_slice(&frame.to_le_bytes())))
    })?;

    let playback = {
        let cache = Arc::clone(&cache);
        let step = Duration::from_millis(args.step_ms.max(1));
        tokio::spawn(play(cache, args.frames, step, args.direction))
    };

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    match await_playback(playback, interrupt).await? {
        Some(missed) => info!(missed, "Playback finished"),
        None => warn!("Interrupted, shutting down"),
    }

    let produced = tokio::task::spawn_blocking(move || pool.shutdown())
        .await
        .map_err(|e| Error::Internal(format!("Shutdown task failed: {}", e)))??;
    let rendered = rendered_rx.try_iter().count();

    let (keys, weight) = cache.dump_keys();
    info!(
        produced,
        rendered,
        cached = keys.len(),
        weight,
        "Simulation complete"
    );

    let snapshot = cache.metrics().snapshot();
    let report = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| Error::Internal(format!("Failed to encode metrics: {}", e)))?;
    println!("{}", report);

    Ok(())
}

// =============================================================================
// Playback
// =============================================================================

/// Move the playhead over every frame, republishing the look-ahead job at
/// each step. Returns the number of frames that were not ready on display.
async fn play(cache: Arc<FrameCache>, frames: u64, step: Duration, direction: Direction) -> u64 {
    let positions: Box<dyn Iterator<Item = u64> + Send> = match direction {
        Direction::Reverse => Box::new((0..frames).rev()),
        Direction::Forward | Direction::Balanced => Box::new(0..frames),
    };

    let mut ticker = tokio::time::interval(step);
    let mut missed = 0;

    for playhead in positions {
        ticker.tick().await;
        cache.push_job(RangeCursor::new(0, frames, playhead, direction));

        if cache.get(&playhead).is_none() {
            missed += 1;
            debug!(playhead, "Frame not ready for display");
        }
    }

    missed
}

/// Wait for playback to finish or for `interrupt` to resolve, whichever comes
/// first. An interrupted playback task is aborted.
///
/// Returns the number of missed frames, or `None` when interrupted.
async fn await_playback(
    mut playback: JoinHandle<u64>,
    interrupt: impl Future<Output = ()>,
) -> Result<Option<u64>> {
    tokio::select! {
        result = &mut playback => {
            let missed = result
                .map_err(|e| Error::Internal(format!("Playback task failed: {}", e)))?;
            Ok(Some(missed))
        }
        _ = interrupt => {
            playback.abort();
            Ok(None)
        }
    }
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}

// =============================================================================
// Tests
// =============================================================================
