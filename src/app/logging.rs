//! Progress logging for a running worker.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error_handling::ProcessingStats;
use crate::queue::{JobQueue, QueueDepth};

/// Logs throughput since `start_time` and, when known, the queue backlog.
pub fn log_progress(start_time: Instant, stats: &ProcessingStats, depth: Option<&QueueDepth>) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let completed = stats.jobs_completed();
    let rate = if elapsed_secs > 0.0 {
        completed as f64 / elapsed_secs
    } else {
        0.0
    };
    match depth {
        Some(depth) => info!(
            "Processed {} jobs ({} failed) in {:.1}s (~{:.2} jobs/sec); queue: {} ready, {} leased, {} dead-lettered",
            completed,
            stats.jobs_failed(),
            elapsed_secs,
            rate,
            depth.ready,
            depth.leased,
            depth.dead_lettered
        ),
        None => info!(
            "Processed {} jobs ({} failed) in {:.1}s (~{:.2} jobs/sec)",
            completed,
            stats.jobs_failed(),
            elapsed_secs,
            rate
        ),
    }
}

/// Spawns a task that logs progress every `interval` until `cancel` fires.
pub fn spawn_progress_logger(
    queue: Arc<dyn JobQueue>,
    queue_name: String,
    stats: Arc<ProcessingStats>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let start_time = Instant::now();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick fires immediately; skip it
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let depth = match queue.depth(&queue_name).await {
                        Ok(depth) => Some(depth),
                        Err(e) => {
                            warn!("Could not read depth of '{}': {}", queue_name, e);
                            None
                        }
                    };
                    log_progress(start_time, &stats, depth.as_ref());
                }
                _ = cancel.cancelled() => break,
            }
        }
    })
}
