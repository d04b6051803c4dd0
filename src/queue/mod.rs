//! Durable job queue.
//!
//! `JobQueue` is the broker capability the worker and the producer depend on:
//! idempotent declaration, durable enqueue, one-at-a-time leased delivery and
//! explicit ack/nack. Nothing is ever acknowledged implicitly.

mod sqlite;
mod types;


use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use tokio_retry::Retry;
use tokio_util::sync::CancellationToken;

use crate::config::QUEUE_POLL_INTERVAL;
use crate::error_handling::{broker_connect_strategy, QueueError};
use crate::storage::init_pool;

pub use sqlite::SqliteQueue;
pub use types::{DeadLetter, Delivery, NackOutcome, QueueDepth};

/// Producer/consumer operations on named queues.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Creates `queue` if it does not exist. Safe to call repeatedly.
    async fn declare(&self, queue: &str) -> Result<(), QueueError>;

    /// Durably stores `payload`; returns once the broker has accepted it.
    ///
    /// Fails with `QueueError::UnknownQueue` if `queue` was never declared.
    async fn enqueue(&self, queue: &str, payload: &[u8]) -> Result<i64, QueueError>;

    /// Leases the oldest deliverable job to `consumer`, if any.
    async fn receive(&self, queue: &str, consumer: &str) -> Result<Option<Delivery>, QueueError>;

    /// Removes a successfully handled job.
    ///
    /// Fails with `QueueError::LeaseLost` if the lease expired and the job was
    /// handed to another consumer.
    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError>;

    /// Pushes the lease of a delivery still being handled one full lease
    /// period into the future.
    ///
    /// Fails with `QueueError::LeaseLost` if the lease already expired and the
    /// job was handed to another consumer.
    async fn renew_lease(&self, delivery: &Delivery) -> Result<(), QueueError>;

    /// How long a delivery stays leased without renewal.
    fn lease_duration(&self) -> Duration;

    /// Returns a failed job: requeued with backoff, or dead-lettered once it
    /// has been delivered the maximum number of times.
    async fn nack(&self, delivery: &Delivery, error: &str) -> Result<NackOutcome, QueueError>;

    async fn depth(&self, queue: &str) -> Result<QueueDepth, QueueError>;

    async fn dead_letters(&self, queue: &str) -> Result<Vec<DeadLetter>, QueueError>;

    /// Releases the broker connection.
    async fn close(&self);
}

/// Opens the broker at `queue_url`, retrying on a fixed interval.
///
/// # Errors
///
/// Returns `QueueError::Unavailable` with the last connection error once all
/// `attempts` have failed.
pub async fn connect_with_retry(
    queue_url: &str,
    attempts: usize,
    delay: Duration,
) -> Result<SqliteQueue, QueueError> {
    let attempt = AtomicUsize::new(0);
    let pool = Retry::spawn(broker_connect_strategy(attempts, delay), || {
        let n = attempt.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            init_pool(queue_url).await.map_err(|e| {
                warn!("Broker connection attempt {}/{} failed: {}", n, attempts.max(1), e);
                e
            })
        }
    })
    .await
    .map_err(|source| QueueError::Unavailable {
        attempts: attempt.load(Ordering::SeqCst),
        source,
    })?;

    info!("Connected to broker at {}", queue_url);
    Ok(SqliteQueue::new(pool))
}

/// Waits for the next delivery on `queue`, polling while it is empty.
///
/// Returns `None` once `cancel` fires. Broker errors are logged and retried
/// after the poll interval.
pub async fn next_delivery(
    queue: &dyn JobQueue,
    queue_name: &str,
    consumer: &str,
    cancel: &CancellationToken,
) -> Option<Delivery> {
    loop {
        if cancel.is_cancelled() {
            return None;
        }
        match queue.receive(queue_name, consumer).await {
            Ok(Some(delivery)) => return Some(delivery),
            Ok(None) => {}
            Err(e) => warn!("{} failed to poll '{}': {}", consumer, queue_name, e),
        }
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(QUEUE_POLL_INTERVAL) => {}
        }
    }
}
