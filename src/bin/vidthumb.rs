//! vidthumb: cached video thumbnail CLI
//!
//! Creates thumbnails into the configured cache directory and inspects or
//! maintains that directory. Every command prints one JSON document to
//! stdout; failures print an error report and exit non-zero.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use vidthumb::cli::Config;
use vidthumb::{
    ErrorReport, OutputFormat, SourceKind, ThumbnailError, ThumbnailGateway, ThumbnailRequest,
};

/// Cached video thumbnail extraction
#[derive(Parser)]
#[command(name = "vidthumb")]
#[command(version = vidthumb::PKG_VERSION)]
#[command(about = "Extract and cache video thumbnails")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "VIDTHUMB_CONFIG")]
    config: Option<PathBuf>,

    /// Override the cache directory.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create (or reuse) a thumbnail
    Create {
        /// Video path or URL
        #[arg(required_unless_present = "json")]
        url: Option<String>,
        /// Treat the locator as a local file
        #[arg(long)]
        local: bool,
        /// Capture instant in seconds
        #[arg(short = 't', long, default_value_t = 1)]
        time: u64,
        /// Output format (jpeg or png)
        #[arg(short, long, default_value = "jpeg")]
        format: OutputFormat,
        /// Raw host request, e.g. '{"url":"...","type":"local","timeStamp":3}'
        #[arg(long, conflicts_with_all = ["url", "local", "time", "format"])]
        json: Option<String>,
    },

    /// Show entry count and size of the cache
    Stats,

    /// Run the eviction sweep now
    Evict,

    /// Delete every cached thumbnail and abandoned staging file
    Clear,
}

#[derive(Serialize)]
struct StatsOutput {
    version: String,
    root: PathBuf,
    entries: usize,
    total_bytes: u64,
    staging_files: usize,
    staging_bytes: u64,
    max_bytes: u64,
}

#[derive(Serialize)]
struct SweepOutput {
    size_before: u64,
    entries_removed: usize,
    bytes_freed: u64,
    failures: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let report = ErrorReport::from(&e);
            println!(
                "{}",
                serde_json::to_string(&report).unwrap_or_else(|_| e.to_string())
            );
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<String, ThumbnailError> {
    let config = Config::load(args.config.as_deref())?;
    let mut builder = config.builder();
    if let Some(dir) = args.cache_dir {
        builder = builder.cache_dir(dir);
    }
    let service = builder.build()?;

    info!(
        root = %service.cache_root().display(),
        "{} starting",
        vidthumb::banner()
    );

    let output = match args.command {
        Command::Create {
            url,
            local,
            time,
            format,
            json,
        } => {
            let result = match json {
                Some(json) => service.create_json(&json).await?,
                None => {
                    let kind = if local {
                        SourceKind::Local
                    } else {
                        SourceKind::Remote
                    };
                    let request = ThumbnailRequest::new(url.unwrap_or_default())
                        .kind(kind)
                        .at_secs(time)
                        .format(format);
                    service.create(request).await?
                }
            };
            serde_json::to_string_pretty(&result)?
        }

        Command::Stats => {
            let stats = service.stats().await?;
            serde_json::to_string_pretty(&StatsOutput {
                version: vidthumb::banner(),
                root: service.cache_root().to_path_buf(),
                entries: stats.entries,
                total_bytes: stats.total_bytes,
                staging_files: stats.staging_files,
                staging_bytes: stats.staging_bytes,
                max_bytes: service.store().max_bytes(),
            })?
        }

        Command::Evict => serde_json::to_string_pretty(&sweep(service.evict().await?))?,

        Command::Clear => serde_json::to_string_pretty(&sweep(service.clear().await?))?,
    };

    Ok(output)
}

fn sweep(report: vidthumb::cache::EvictionReport) -> SweepOutput {
    SweepOutput {
        size_before: report.size_before,
        entries_removed: report.entries_removed,
        bytes_freed: report.bytes_freed,
        failures: report.failures,
    }
}
