//! Entry points behind the CLI subcommands.
//!
//! - `run_worker`: consume the queue until cancelled
//! - `submit_url`: normalize a URL and enqueue it
//! - `analyze_once`: synchronous one-shot analysis
//! - `list_history`: read persisted analyses back

mod finalize;
mod init;
mod resources;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;
use tokio_util::sync::CancellationToken;

use crate::analysis::AnalysisResult;
use crate::app::{normalize_submission, spawn_progress_logger};
use crate::config::{Config, LOGGING_INTERVAL_SECS};
use crate::queue::JobQueue;
use crate::storage::{AnalysisRecord, ResultStore};
use crate::worker::Worker;

pub use finalize::finalize_worker;
pub use init::{init_analyzer, init_queue, init_store, init_worker_resources};
pub use resources::{WorkerLoopResult, WorkerResources};

/// Results of a worker run.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    /// Jobs analysed, persisted and acked
    pub completed: usize,
    /// Jobs nacked (requeued or dead-lettered)
    pub failed: usize,
    /// Dead-lettered jobs in the queue at shutdown
    pub dead_lettered: i64,
    pub elapsed_seconds: f64,
}

/// A job accepted by the broker.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub job_id: i64,
    /// URL as enqueued, after normalization
    pub url: String,
    pub queue: String,
}

/// Runs `concurrency` consumers until `cancel` fires, then drains and shuts
/// down.
///
/// # Errors
///
/// Returns an error if the broker, store or analysis pipeline cannot be
/// initialized. Failures of individual jobs never end the run.
pub async fn run_worker(
    config: Config,
    concurrency: usize,
    cancel: CancellationToken,
) -> Result<WorkerReport> {
    let resources = init_worker_resources(&config).await?;

    let worker = Arc::new(Worker::new(
        resources.queue.clone(),
        resources.store.clone(),
        Arc::clone(&resources.analyzer),
        Arc::clone(&resources.stats),
        resources.queue_name.clone(),
    ));

    let cancel_logging = CancellationToken::new();
    let logging_task = spawn_progress_logger(
        resources.queue.clone(),
        resources.queue_name.clone(),
        Arc::clone(&resources.stats),
        Duration::from_secs(LOGGING_INTERVAL_SECS),
        cancel_logging.clone(),
    );

    worker.run(concurrency, cancel).await;

    Ok(finalize_worker(
        resources,
        WorkerLoopResult {
            cancel: cancel_logging,
            logging_task: Some(logging_task),
        },
    )
    .await)
}

/// Normalizes `url` and publishes it to the configured queue.
///
/// Returns once the broker has durably stored the job.
///
/// # Errors
///
/// Returns an error for an invalid URL (before touching the broker) or when
/// the broker is unavailable.
pub async fn submit_url(config: &Config, url: &str) -> Result<SubmitReceipt> {
    let normalized = normalize_submission(url)?;
    let queue = init_queue(config).await?;
    let enqueued = queue
        .enqueue(&config.queue_name, normalized.as_bytes())
        .await
        .with_context(|| format!("Failed to enqueue {}", normalized));
    queue.close().await;
    let job_id = enqueued?;

    info!("Enqueued {} as job {} on '{}'", normalized, job_id, config.queue_name);
    Ok(SubmitReceipt {
        job_id,
        url: normalized,
        queue: config.queue_name.clone(),
    })
}

/// Analyses `url` in-process, persisting the result unless `persist` is false.
///
/// Fetch failures and invalid input are part of the returned result, not
/// errors.
///
/// # Errors
///
/// Returns an error if initialization fails or the result cannot be stored.
pub async fn analyze_once(config: &Config, url: &str, persist: bool) -> Result<AnalysisResult> {
    let analyzer = init_analyzer(config).await?;
    let result = analyzer.analyze(url).await;

    if persist {
        let store = init_store(config).await?;
        let stored = store.persist(&result).await;
        store.close().await;
        let id = stored.with_context(|| format!("Failed to persist analysis of {}", result.url))?;
        info!("Stored analysis {} for {}", id, result.url);
    }
    Ok(result)
}

/// Lists persisted analyses, newest first; only those of `url` when given.
///
/// # Errors
///
/// Returns an error if the result store cannot be opened or queried.
pub async fn list_history(
    config: &Config,
    url: Option<&str>,
    limit: i64,
) -> Result<Vec<AnalysisRecord>> {
    let store = init_store(config).await?;
    let records = match url {
        Some(url) => store.history(url, limit).await,
        None => store.list(limit).await,
    };
    store.close().await;
    records.context("Failed to query analysis history")
}
