//! CLI entry point for idm-queue.

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use idm_queue::config::load_config;
use idm_queue::logging::{LogSettings, console_level, init_logging};
use idm_queue::pipeline::Pipeline;
use tracing::{debug, error, info, warn};

mod cli;

use cli::Args;

/// Conventional exit status after SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %format!("{err:#}"), "Run failed");
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let mut config = match load_config(&args.config) {
        Ok(config) => config,
        Err(err) if err.is_template_created() => {
            eprintln!("INFO: {err}");
            return Ok(ExitCode::SUCCESS);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("invalid config '{}'", args.config.display()));
        }
    };
    config.apply_cli_overrides(args.dry_run, args.no_resume);

    init_logging(&LogSettings {
        console_level: console_level(args.verbose, args.quiet),
        log_file: Some(config.log_file.clone()),
        log_max_mb: config.log_max_mb,
    })?;

    debug!(?args, "CLI arguments parsed");
    info!(
        config = %args.config.display(),
        mode = %config.input.mode,
        dry_run = config.dry_run,
        resume = config.resume_mode,
        "idm-queue starting"
    );

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_signal = Arc::clone(&interrupted);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupted_signal.store(true, Ordering::SeqCst);
        }
    });

    let summary = Pipeline::new(config).run(Arc::clone(&interrupted)).await?;
    println!("\n{summary}");

    if summary.interrupted || interrupted.load(Ordering::SeqCst) {
        warn!("Interrupted. Run again to resume.");
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    }
    Ok(ExitCode::SUCCESS)
}
