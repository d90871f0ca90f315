//! CLI entry point for the Wiener Linien departure ingestion step.
//!
//! Provides subcommands for transforming a saved monitor response, running a
//! single live poll cycle, and polling repeatedly at a fixed sample rate.

mod infra;
mod services;

use crate::infra::wienerlinien::client::WienerLinienClient;
use crate::services::monitor_api::MonitorApi;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::Instrument;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use wl_departures::{
    FlatTable,
    config::PipelineConfig,
    output::{append_table, print_json},
    pipeline::run_with_config,
    response::HttpResponse,
};

#[derive(Parser)]
#[command(name = "wl_departures")]
#[command(about = "Ingest next departures from the Wiener Linien monitor API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// JSON config file (falls back to $WL_CONFIG, then built-in defaults)
    #[arg(short, long)]
    config: Option<String>,

    /// RBL stop number to query; repeat for several stops. Overrides the config.
    #[arg(long = "stop", value_name = "RBL")]
    stops: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the transform on a saved monitor response body
    Transform {
        /// Path to a JSON response body
        #[arg(value_name = "FILE")]
        source: String,

        /// HTTP status the body was received with
        #[arg(short, long, default_value_t = 200)]
        status: u16,

        /// CSV staging file to append to; logs the table as JSON if omitted
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Run one live poll cycle and append the result to a CSV staging file
    Fetch {
        #[arg(short, long, default_value = "departures.csv")]
        output: String,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Poll the monitor API repeatedly, one request per cycle
    Poll {
        #[arg(short, long, default_value = "departures.csv")]
        output: String,

        /// Sample rate: poll every X seconds
        #[arg(short = 'r', long, default_value_t = 60)]
        sample_rate: u64,

        /// Number of poll cycles (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 1)]
        num_samples: usize,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/wl_departures.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("wl_departures.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transform {
            source,
            status,
            output,
            config,
        } => {
            let config = load_config(&config)?;
            let body = std::fs::read(&source)
                .with_context(|| format!("failed to read response body '{source}'"))?;
            let table = run_with_config(&HttpResponse::new(status, body), &config)?;

            match output {
                Some(path) => append_table(&path, &table)?,
                None => print_json(&table)?,
            }
        }
        Commands::Fetch { output, config } => {
            let config = load_config(&config)?;
            let client = WienerLinienClient::new(&config.base_url)?;
            let table = poll_once(&client, &config).await?;
            append_table(&output, &table)?;
            info!(rows = table.len(), output = %output, "Departures staged");
        }
        Commands::Poll {
            output,
            sample_rate,
            num_samples,
            config,
        } => {
            let config = load_config(&config)?;
            let client = WienerLinienClient::new(&config.base_url)?;
            poll(&client, &config, &output, sample_rate, num_samples).await?;
        }
    }

    Ok(())
}

/// Resolves the config file from the CLI or `$WL_CONFIG` and applies stop overrides.
fn load_config(args: &ConfigArgs) -> Result<PipelineConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| std::env::var("WL_CONFIG").ok());

    let mut config = match path {
        Some(path) => PipelineConfig::load(&path)?,
        None => {
            info!("No config file given, using defaults");
            PipelineConfig::default()
        }
    };

    if !args.stops.is_empty() {
        config.stops = args.stops.clone();
    }

    Ok(config)
}

/// Fetches the monitor once and runs the transform on the response.
#[tracing::instrument(skip_all, fields(stops = config.stops.len()))]
async fn poll_once<A: MonitorApi>(api: &A, config: &PipelineConfig) -> Result<FlatTable> {
    let response = api.monitor(&config.stops).await?;
    Ok(run_with_config(&response, config)?)
}

/// Runs poll cycles sequentially. A failed cycle is logged and skipped; it
/// is never retried.
#[tracing::instrument(skip(api, config), fields(output, sample_rate, num_samples))]
async fn poll<A: MonitorApi>(
    api: &A,
    config: &PipelineConfig,
    output: &str,
    sample_rate: u64,
    num_samples: usize,
) -> Result<()> {
    if num_samples == 0 {
        info!(sample_rate, "Polling infinitely. Press Ctrl+C to stop.");
    } else {
        info!(num_samples, sample_rate, "Starting poll cycles");
    }

    let mut sample_count = 0;
    let mut failures = 0;

    loop {
        // Check if we've reached the sample limit (0 = infinite)
        if num_samples > 0 && sample_count >= num_samples {
            break;
        }
        sample_count += 1;

        let cycle_span = tracing::info_span!("poll_cycle", sample = sample_count);

        let result = async {
            let table = poll_once(api, config).await?;
            append_table(output, &table)?;
            Ok::<usize, anyhow::Error>(table.len())
        }
        .instrument(cycle_span)
        .await;

        match result {
            Ok(rows) => info!(sample = sample_count, rows, "Poll cycle staged"),
            Err(e) => {
                failures += 1;
                error!(sample = sample_count, error = %e, "Poll cycle failed, skipping");
            }
        }

        // If not the last sample, wait before next iteration
        if num_samples == 0 || sample_count < num_samples {
            info!(sample_rate, "Waiting before next poll");
            tokio::time::sleep(tokio::time::Duration::from_secs(sample_rate)).await;
        }
    }

    if failures > 0 {
        warn!(failures, sample_count, "Some poll cycles failed");
    }
    info!(output, "Finished polling");
    Ok(())
}
