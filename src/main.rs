//! `logpipe` — feed stdin lines through a configured log pipeline.
//!
//! ```text
//! stdin line ──▶ Logger::log(line, level) ──▶ buffer ──▶ batch ──▶ sinks
//!                                                  ▲
//!                      EOF / Ctrl-C ── flush() ────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use logpipe::config::{load_config, AppConfig};
use logpipe::observability::{logging, metrics};
use logpipe::{app, get_logger, DispatchError, Level, Logger, SinkRegistry};

#[derive(Parser)]
#[command(name = "logpipe", version)]
#[command(about = "Batch log lines into the sinks of a log configuration", long_about = None)]
struct Cli {
    /// Application configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and show the sinks it produces
    Check,
    /// Log every line read from stdin, flushing on EOF or Ctrl-C
    Pipe {
        /// Level attached to every line
        #[arg(short, long, default_value = "info")]
        level: Level,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_tracing(&config.observability.log_level);
    tracing::info!("logpipe v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            if let Err(e) = metrics::init_metrics(addr) {
                tracing::error!(error = %e, "Failed to start metrics endpoint");
            }
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    if app::install(config).is_err() {
        tracing::warn!("Application configuration was already installed");
    }

    let logger = get_logger()?;
    tracing::info!(
        sinks = ?logger.sink_names(),
        flush_interval = logger.flush_interval(),
        "Log pipeline ready"
    );

    match cli.command {
        Commands::Check => check(&logger),
        Commands::Pipe { level } => pipe(&logger, level).await?,
    }

    Ok(())
}

fn check(logger: &Logger) {
    let registry = SinkRegistry::global();
    let targets = app::config().log.as_ref().and_then(|log| log.targets.as_ref());

    for (name, target) in targets.into_iter().flatten() {
        match target.kind.as_deref() {
            None => println!("{:<16} skipped (no type)", name),
            Some(kind) if !registry.contains(kind) => {
                println!("{:<16} skipped (unknown type `{}`)", name, kind)
            }
            Some(kind) => println!("{:<16} {}", name, kind),
        }
    }
    println!("flush_interval   {}", logger.flush_interval());
    println!("trace            {}", if app::is_debug() { "enabled" } else { "disabled" });
}

async fn pipe(logger: &Logger, level: Level) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut read = 0usize;
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    read += 1;
                    if let Err(e) = logger.log(line, level) {
                        report(&e);
                    }
                }
                None => break,
            },
            _ = &mut shutdown => {
                tracing::info!("Interrupted, flushing pending entries");
                break;
            }
        }
    }

    match logger.flush() {
        Ok(flushed) => tracing::info!(lines = read, flushed, "Input finished"),
        Err(e) => report(&e),
    }
    Ok(())
}

fn report(err: &DispatchError) {
    for failure in &err.failures {
        tracing::error!(
            sink = %failure.sink,
            batch_id = %err.batch_id,
            error = %failure.error,
            "Batch not delivered"
        );
    }
}
