use clap::{Parser, ValueEnum};
use quote_reflow::{Cleaner, Config, DEFAULT_CONFIG_FILE, KeepInput, Prompt, normalize};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "quote-reflow")]
#[command(about = "Reflow quoted email text into clean plain text", long_about = None)]
#[command(version)]
#[command(after_help = "Examples:
  quote-reflow                     # run with config.toml
  quote-reflow --config my.toml    # use another config file
  quote-reflow --log-level DEBUG   # verbose logging
  quote-reflow --stdin < mail.txt  # clean one text from stdin")]
struct Cli {
    /// Config file path (created with defaults if missing)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log file, written in addition to stderr
    #[arg(long, default_value = "quote_reflow.log")]
    log_file: PathBuf,

    /// Keep input files without asking
    #[arg(long)]
    keep_input: bool,

    /// Normalize stdin to stdout instead of running the batch
    #[arg(long)]
    stdin: bool,

    /// Print the batch report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
enum LogLevel {
    Debug,
    Info,
    #[value(alias = "WARN")]
    Warning,
    Error,
}

impl LogLevel {
    const fn directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

fn init_logging(level: LogLevel, log_file: &Path) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    let stderr_layer = fmt::layer().with_writer(io::stderr).with_target(false);

    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let (file_layer, guard) = match log_file.file_name() {
        Some(name) => {
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

fn run_stdin(config: &Config) -> ExitCode {
    let mut raw = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut raw) {
        error!("Failed to read stdin: {e}");
        return ExitCode::FAILURE;
    }

    let normalized = normalize(&raw, config.keywords());
    println!("{normalized}");

    if normalized.is_fallback() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_level, &cli.log_file);

    info!("Starting quote-reflow v{}", env!("CARGO_PKG_VERSION"));

    let config = match Config::load_or_create(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.stdin {
        return run_stdin(&config);
    }

    let cleaner = match Cleaner::new(config) {
        Ok(cleaner) => cleaner,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let report = if cli.keep_input {
        cleaner.process_all_files(&mut KeepInput)
    } else {
        cleaner.process_all_files(&mut Prompt::stdio())
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => error!("Failed to serialize report: {e}"),
        }
    }

    if report.is_clean() {
        info!("All processing completed successfully");
        ExitCode::SUCCESS
    } else {
        warn!("Errors occurred during processing (errors: {})", report.errors);
        ExitCode::FAILURE
    }
}
