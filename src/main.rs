//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `centinela` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Ctrl-C handling for the worker
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

use centinela::analysis::validate_job_url;
use centinela::initialization::init_logger_with;
use centinela::{
    analyze_once, list_history, run_worker, submit_url, AnalysisResult, AnalysisStatus, Cli,
    Command, Config, PipelineError,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env from the current directory, then from next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let Cli { config, command } = Cli::parse();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = dispatch(config, command).await {
        eprintln!("centinela error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn dispatch(config: Config, command: Command) -> Result<()> {
    match command {
        Command::Worker { concurrency } => {
            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Interrupt received, finishing in-flight jobs");
                    on_signal.cancel();
                }
            });

            let report = run_worker(config, concurrency, cancel).await?;
            println!(
                "✅ Worker stopped: {} job{} acked, {} nacked, {} dead-lettered in queue ({:.1}s)",
                report.completed,
                if report.completed == 1 { "" } else { "s" },
                report.failed,
                report.dead_lettered,
                report.elapsed_seconds
            );
        }
        Command::Submit { url } => {
            let receipt = submit_url(&config, &url).await?;
            println!(
                "Enqueued job {} on '{}': {}",
                receipt.job_id, receipt.queue, receipt.url
            );
        }
        Command::Analyze {
            url,
            summary,
            no_store,
        } => {
            let result = analyze_once(&config, &url, !no_store).await?;
            let json = if summary {
                serde_json::to_string_pretty(&result.summary())
            } else {
                serde_json::to_string_pretty(&result)
            }
            .context("Failed to serialize analysis result")?;
            println!("{}", json);

            if let Some(problem) = analysis_problem(&result) {
                eprintln!(
                    "note: {} (HTTP-equivalent {})",
                    problem,
                    problem.http_status()
                );
            }
        }
        Command::History { url, limit } => {
            let records = list_history(&config, url.as_deref(), limit).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&records).context("Failed to serialize history")?
            );
        }
    }
    Ok(())
}

/// The error a gateway would have answered with for a non-`analyzed` result.
fn analysis_problem(result: &AnalysisResult) -> Option<PipelineError> {
    match result.status {
        AnalysisStatus::Analyzed => None,
        AnalysisStatus::Invalid => validate_job_url(&result.url).err(),
        AnalysisStatus::Error => result
            .site_info
            .error
            .as_ref()
            .map(|e| e.to_pipeline_error(&result.url)),
    }
}
