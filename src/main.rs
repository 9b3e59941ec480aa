//! CLI entry point for uncut-edges.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info};
use uncut_edges_core::config::{
    API_URL_ENV, FileConfig, VerbositySetting, load_default_file_config, load_file_config,
    resolve_api_url,
};
use uncut_edges_core::transfer::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use uncut_edges_core::{
    DirectorySinkFactory, HttpClient, PageRanges, ParserClient, TransferError, TransferReport,
};

mod cli;

use cli::Args;

/// Exit code for a transfer interrupted with Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => Some(load_file_config(path)?),
        None => load_default_file_config()?.config,
    };

    init_tracing(&args, file_config.as_ref());
    debug!(?args, "CLI arguments parsed");

    let env_api_url = std::env::var(API_URL_ENV).ok();
    let api_url = resolve_api_url(
        args.api_url.as_deref(),
        env_api_url.as_deref(),
        file_config.as_ref(),
    );
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("."));
    let strategy = args
        .strategy
        .or_else(|| file_config.as_ref().and_then(|c| c.strategy))
        .unwrap_or_default();
    let connect_timeout = file_config
        .as_ref()
        .and_then(|c| c.connect_timeout_secs)
        .unwrap_or(CONNECT_TIMEOUT_SECS);
    let read_timeout = file_config
        .as_ref()
        .and_then(|c| c.read_timeout_secs)
        .unwrap_or(READ_TIMEOUT_SECS);

    let http = HttpClient::with_timeouts(connect_timeout, read_timeout)
        .context("Failed to build HTTP client")?;
    let client = ParserClient::new(
        api_url,
        Arc::new(http),
        Arc::new(DirectorySinkFactory::new(&output_dir)),
        strategy,
    );

    let request = client.request(
        args.kind,
        &args.input,
        args.pages.as_ref().map(PageRanges::as_str),
    )?;
    info!(
        kind = %args.kind,
        url = %request.target_url(),
        strategy = client.strategy_name(),
        output_dir = %output_dir.display(),
        "Requesting parse"
    );

    let spinner = waiting_spinner(&args);
    let outcome = client
        .pipeline()
        .run_until(&request, interrupted())
        .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match outcome {
        Ok(report) => {
            print_report(&report, args.json)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(TransferError::Cancelled) => {
            error!("Interrupted; the output file may be incomplete");
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
        Err(e) => {
            error!(stage = %e.stage(), "{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_tracing(args: &Args, file_config: Option<&FileConfig>) {
    // Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => match file_config.and_then(|c| c.verbosity) {
                Some(VerbositySetting::Quiet) => "error",
                Some(VerbositySetting::Verbose) => "debug",
                Some(VerbositySetting::Debug) => "trace",
                Some(VerbositySetting::Default) | None => "info",
            },
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Resolves on Ctrl-C. Never resolves if the signal handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn waiting_spinner(args: &Args) -> Option<ProgressBar> {
    if args.quiet || args.json || !io::stderr().is_terminal() {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(format!(
        "Waiting for the service to render {} ({})",
        args.input,
        args.kind.title()
    ));
    spinner.enable_steady_tick(Duration::from_millis(120));
    Some(spinner)
}

fn print_report(report: &TransferReport, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(report).context("Failed to serialize transfer report")?;
        println!("{rendered}");
    } else {
        info!(
            filename = %report.filename,
            bytes = report.bytes_written,
            "Saved {}",
            report.path.display()
        );
    }
    Ok(())
}
