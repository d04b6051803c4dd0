//! Worker finalization and cleanup.

use log::warn;

use crate::app::{log_progress, print_worker_statistics, shutdown_gracefully};
use crate::queue::JobQueue;

use super::{WorkerLoopResult, WorkerReport, WorkerResources};

/// Stops background tasks, closes connections and prints final statistics.
///
/// Must be called after every consumer has returned.
pub async fn finalize_worker(
    resources: WorkerResources,
    loop_result: WorkerLoopResult,
) -> WorkerReport {
    let WorkerLoopResult {
        cancel,
        logging_task,
    } = loop_result;

    // Read the backlog before the broker connection goes away
    let depth = match resources.queue.depth(&resources.queue_name).await {
        Ok(depth) => Some(depth),
        Err(e) => {
            warn!("Could not read final queue depth: {}", e);
            None
        }
    };
    log_progress(resources.start_time, &resources.stats, depth.as_ref());

    shutdown_gracefully(
        cancel,
        logging_task,
        resources.queue.as_ref(),
        resources.store.as_ref(),
    )
    .await;

    let elapsed_seconds = resources.start_time.elapsed().as_secs_f64();
    print_worker_statistics(&resources.stats, elapsed_seconds);

    WorkerReport {
        completed: resources.stats.jobs_completed(),
        failed: resources.stats.jobs_failed(),
        dead_lettered: depth.map_or(0, |d| d.dead_lettered),
        elapsed_seconds,
    }
}
