//! Graceful shutdown handling.

use log::debug;
use tokio_util::sync::CancellationToken;

use crate::queue::JobQueue;
use crate::storage::ResultStore;

/// Stops the progress logger and closes the broker and store connections.
///
/// Call only after the consumers have returned; nothing is in flight by then.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    logging_task: Option<tokio::task::JoinHandle<()>>,
    queue: &dyn JobQueue,
    store: &dyn ResultStore,
) {
    cancel.cancel();
    if let Some(logging_task) = logging_task {
        let _ = logging_task.await;
    }

    queue.close().await;
    store.close().await;
    debug!("Broker and result store connections closed");
}
