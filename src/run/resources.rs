//! Worker resources.
//!
//! Everything a worker process owns for its lifetime, built once at startup
//! and torn down in `finalize_worker`.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::analysis::Analyzer;
use crate::error_handling::ProcessingStats;
use crate::queue::SqliteQueue;
use crate::storage::SqliteResultStore;

/// All resources initialized for a worker run.
pub struct WorkerResources {
    /// Broker connection
    pub queue: Arc<SqliteQueue>,
    /// Result store
    pub store: Arc<SqliteResultStore>,
    /// Fetch + analysis pipeline shared by all consumers
    pub analyzer: Arc<Analyzer>,
    /// Counters shared by consumers and the progress logger
    pub stats: Arc<ProcessingStats>,
    /// Queue consumed by this worker
    pub queue_name: String,
    pub start_time: Instant,
}

/// State left behind by the consumer loop for finalization.
pub struct WorkerLoopResult {
    /// Cancels the progress logger
    pub cancel: CancellationToken,
    pub logging_task: Option<JoinHandle<()>>,
}
