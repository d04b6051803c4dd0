//! Queue consumers.
//!
//! A `Worker` runs N competing consumers. Each holds at most one lease at a
//! time, handles the job in its own task so a panic is contained, renews the
//! lease while that task runs, and settles the delivery explicitly. On cancellation consumers finish the job in hand
//! and stop polling.

mod handler;


use std::sync::Arc;
use std::time::Duration;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{error, info, warn};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::analysis::{AnalysisResult, Analyzer};
use crate::config::LEASE_RENEWALS_PER_PERIOD;
use crate::error_handling::{ErrorType, PipelineError, ProcessingStats};
use crate::queue::{next_delivery, Delivery, JobQueue};
use crate::storage::ResultStore;

type HandleOutcome = Result<Result<AnalysisResult, PipelineError>, JoinError>;

/// Shared state of all consumers in one process.
pub struct Worker {
    queue: Arc<dyn JobQueue>,
    store: Arc<dyn ResultStore>,
    analyzer: Arc<Analyzer>,
    stats: Arc<ProcessingStats>,
    queue_name: String,
}

impl Worker {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        store: Arc<dyn ResultStore>,
        analyzer: Arc<Analyzer>,
        stats: Arc<ProcessingStats>,
        queue_name: impl Into<String>,
    ) -> Self {
        Self {
            queue,
            store,
            analyzer,
            stats,
            queue_name: queue_name.into(),
        }
    }

    pub fn stats(&self) -> &Arc<ProcessingStats> {
        &self.stats
    }

    /// Runs `concurrency` consumers until `cancel` fires and all of them have
    /// settled their current job.
    pub async fn run(self: Arc<Self>, concurrency: usize, cancel: CancellationToken) {
        let concurrency = concurrency.max(1);
        info!(
            "Starting {} consumer(s) on '{}' (scoring: {})",
            concurrency,
            self.queue_name,
            self.analyzer.scoring_version()
        );

        let process = std::process::id();
        let mut consumers = FuturesUnordered::new();
        for i in 0..concurrency {
            let consumer = format!("consumer-{}-{}", process, i);
            consumers.push(tokio::spawn(
                Arc::clone(&self).consume(consumer, cancel.clone()),
            ));
        }

        while let Some(joined) = consumers.next().await {
            if let Err(e) = joined {
                error!("Consumer task ended abnormally: {}", e);
            }
        }
        info!("All consumers stopped");
    }

    async fn consume(self: Arc<Self>, consumer: String, cancel: CancellationToken) {
        while let Some(delivery) =
            next_delivery(self.queue.as_ref(), &self.queue_name, &consumer, &cancel).await
        {
            let worker = Arc::clone(&self);
            let job = delivery.clone();
            let handling = tokio::spawn(async move { worker.handle(&job).await });
            let outcome = self.hold_lease(&delivery, handling).await;
            self.settle(&delivery, outcome).await;
        }
        log::debug!("{} stopped", consumer);
    }

    /// Waits for the handler task, renewing the lease on `delivery` until it
    /// finishes so no other consumer is handed the job meanwhile.
    pub(crate) async fn hold_lease(
        &self,
        delivery: &Delivery,
        mut handling: JoinHandle<Result<AnalysisResult, PipelineError>>,
    ) -> HandleOutcome {
        let period = (self.queue.lease_duration() / LEASE_RENEWALS_PER_PERIOD)
            .max(Duration::from_millis(10));
        let mut renewals = interval_at(Instant::now() + period, period);
        renewals.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                outcome = &mut handling => return outcome,
                _ = renewals.tick() => {
                    if let Err(e) = self.queue.renew_lease(delivery).await {
                        self.stats.increment_error(ErrorType::LeaseRenewalFailure);
                        warn!(
                            "{} could not renew lease on job {}: {}",
                            delivery.consumer, delivery.id, e
                        );
                    }
                }
            }
        }
    }
}
