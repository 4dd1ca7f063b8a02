//! AirPointer - touchless mouse and virtual keyboard
//!
//! Replays hand-landmark frames through the gesture pipeline and hands the
//! resulting actions to a sink.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airpointer::config::{AppConfig, ConfigWatcher};
use airpointer::replay::{self, ReplayFrame};
use airpointer::sinks::{self, ActionSink, ConsoleSink, JsonSink};
use airpointer::{cli, GesturePipeline, Mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    /// Log actions to the console
    Console,
    /// Write actions as JSON lines to stdout
    Json,
}

/// AirPointer - drive mouse and keyboard with hand gestures
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "airpointer.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Landmark frames as JSON lines (stdin when omitted)
    #[arg(short, long)]
    input: Option<String>,

    /// Where actions go
    #[arg(long, value_enum, default_value_t = SinkKind::Console)]
    sink: SinkKind,

    /// Print the gesture cheat-sheet and exit
    #[arg(long)]
    gestures: bool,

    /// Write a default configuration file and exit
    #[arg(long, value_name = "PATH")]
    write_default_config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.log_json)?;

    if let Some(path) = &args.write_default_config {
        AppConfig::default().save(path).await?;
        info!("Default configuration written to {}", path);
        return Ok(());
    }

    info!("Starting AirPointer...");
    info!("Configuration file: {}", args.config);

    let config = AppConfig::load_or_default(&args.config).await?;

    if args.gestures {
        cli::print_gesture_summary(&config);
        return Ok(());
    }

    // Hot reload only makes sense for a file that exists
    let watcher = if Path::new(&args.config).exists() {
        match ConfigWatcher::new(args.config.clone()) {
            Ok(w) => Some(w),
            Err(e) => {
                warn!("Config hot-reload disabled: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    let sink: Box<dyn ActionSink> = match args.sink {
        SinkKind::Console => Box::new(ConsoleSink::new("console")),
        SinkKind::Json => Box::new(JsonSink::stdout()),
    };

    run_app(GesturePipeline::new(&config), sink, args.input, watcher, shutdown_signal()).await?;

    info!("AirPointer shutdown complete");
    Ok(())
}

async fn run_app(
    mut pipeline: GesturePipeline,
    mut sink: Box<dyn ActionSink>,
    input: Option<String>,
    mut watcher: Option<ConfigWatcher>,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    let (frame_tx, mut frame_rx) = mpsc::channel::<ReplayFrame>(256);
    let reader = replay::spawn_reader(input, frame_tx);

    info!("Starting main loop (sink: {})...", sink.name());
    tokio::pin!(shutdown);

    let mut mode = pipeline.mode();
    let mut malformed = 0u64;
    let mut input_done = false;

    loop {
        tokio::select! {
            frame = frame_rx.recv() => {
                let Some(frame) = frame else {
                    info!("Input exhausted");
                    input_done = true;
                    break;
                };

                match pipeline.process(frame.landmarks.as_deref(), frame.size, frame.timestamp) {
                    Ok(output) => {
                        sinks::dispatch(sink.as_mut(), &output.actions);
                        if output.snapshot.mode != mode {
                            mode = output.snapshot.mode;
                            if mode == Mode::Keyboard {
                                info!("⌨️  Keyboard mode: hover a key and pinch to type");
                            }
                        }
                        debug!(
                            gesture = output.snapshot.gesture.as_str(),
                            hovered = ?output.snapshot.hovered_key,
                            "frame at {:?}",
                            frame.timestamp
                        );
                    }
                    Err(e) => {
                        malformed += 1;
                        warn!("⚠️  Dropped frame at {:?}: {}", frame.timestamp, e);
                    }
                }
            }

            Some(new_config) = next_reload(&mut watcher) => {
                info!("🔄 Applying reloaded configuration");
                pipeline.apply_config(&new_config);
            }

            _ = &mut shutdown => {
                info!("Shutting down...");
                reader.abort();
                break;
            }
        }
    }

    let reader_result = if input_done {
        match reader.await {
            Ok(result) => result.map(|stats| debug!("Replay stats: {:?}", stats)),
            Err(e) => Err(anyhow::anyhow!("Input reader panicked: {}", e)),
        }
    } else {
        Ok(())
    };

    info!(
        "Processed {} frames ({} malformed)",
        pipeline.frames_processed(),
        malformed
    );
    sink.shutdown().context("Failed to shut down sink")?;
    reader_result
}

/// Next validated config from the watcher, or never when hot reload is off
async fn next_reload(watcher: &mut Option<ConfigWatcher>) -> Option<AppConfig> {
    match watcher {
        Some(w) => w.next_config().await,
        None => std::future::pending().await,
    }
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Logs go to stderr so stdout stays clean for the JSON sink
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to install JSON logger")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to install logger")?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
