//! Per-job processing: analyse, persist, then settle with the broker.

use log::{debug, error, info, warn};
use tokio::task::JoinError;

use crate::analysis::{AnalysisResult, AnalysisStatus, ThreatLevel};
use crate::error_handling::{update_error_stats, ErrorType, InfoType, PipelineError};
use crate::queue::{Delivery, NackOutcome};

use super::{HandleOutcome, Worker};

impl Worker {
    /// Analyses one delivery and persists the result.
    ///
    /// Analysis itself never fails; the only error is a persistence failure,
    /// in which case the full result is logged so it can be replayed.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Persistence` if the store rejected the result.
    pub async fn handle(&self, delivery: &Delivery) -> Result<AnalysisResult, PipelineError> {
        let result = match std::str::from_utf8(&delivery.payload) {
            Ok(url) => self.analyzer.analyze(url).await,
            Err(e) => self.analyzer.reject(
                &delivery.payload_lossy(),
                &format!("payload is not valid UTF-8 ({})", e),
            ),
        };
        self.record_stats(&result);

        match self.store.persist(&result).await {
            Ok(id) => {
                debug!("Stored analysis {} for job {}", id, delivery.id);
                Ok(result)
            }
            Err(source) => {
                self.stats.increment_error(ErrorType::PersistenceFailure);
                let json = serde_json::to_string(&result)
                    .unwrap_or_else(|e| format!("<unserializable result: {}>", e));
                error!(
                    "Failed to persist analysis of {} (job {}): {}; result: {}",
                    result.url, delivery.id, source, json
                );
                Err(PipelineError::Persistence {
                    url: result.url,
                    source,
                })
            }
        }
    }

    /// Acks on success, nacks on failure or panic.
    pub(super) async fn settle(
        &self,
        delivery: &Delivery,
        outcome: HandleOutcome,
    ) {
        let failure = match outcome {
            Ok(Ok(result)) => {
                match self.queue.ack(delivery).await {
                    Ok(()) => {
                        self.stats.record_completed();
                        info!(
                            "{} job {} {} -> {} ({}, score {})",
                            delivery.consumer,
                            delivery.id,
                            result.url,
                            result.threat_level,
                            result.status.as_str(),
                            result.risk_score
                        );
                    }
                    Err(e) => {
                        self.stats.increment_error(ErrorType::AckFailure);
                        warn!("{} could not ack job {}: {}", delivery.consumer, delivery.id, e);
                    }
                }
                return;
            }
            Ok(Err(e)) => e.to_string(),
            Err(join_error) => {
                self.stats.increment_error(ErrorType::HandlerPanic);
                if join_error.is_panic() {
                    format!("handler panicked: {}", panic_message(join_error))
                } else {
                    "handler task was cancelled".to_string()
                }
            }
        };

        self.stats.record_failed();
        match self.queue.nack(delivery, &failure).await {
            Ok(NackOutcome::Requeued { delay }) => {
                self.stats.increment_info(InfoType::JobRequeued);
                warn!(
                    "Job {} failed on attempt {} ({}); redelivering in {:?}",
                    delivery.id, delivery.attempt, failure, delay
                );
            }
            Ok(NackOutcome::DeadLettered) => {
                self.stats.increment_info(InfoType::JobDeadLettered);
                error!(
                    "Job {} dead-lettered after {} deliveries: {}",
                    delivery.id, delivery.attempt, failure
                );
            }
            Err(e) => {
                self.stats.increment_error(ErrorType::AckFailure);
                warn!("{} could not nack job {}: {}", delivery.consumer, delivery.id, e);
            }
        }
    }

    fn record_stats(&self, result: &AnalysisResult) {
        if result.status == AnalysisStatus::Invalid {
            self.stats.increment_error(ErrorType::InvalidUrl);
        }
        if let Some(error) = &result.site_info.error {
            update_error_stats(&self.stats, error.kind);
        }
        if result.site_info.redirected {
            self.stats.increment_info(InfoType::HttpRedirect);
        }
        if result.blacklist.is_blacklisted {
            self.stats.increment_info(InfoType::Blacklisted);
        }
        self.stats.increment_info(match result.threat_level {
            ThreatLevel::High => InfoType::ThreatHigh,
            ThreatLevel::Medium => InfoType::ThreatMedium,
            ThreatLevel::Low => InfoType::ThreatLow,
        });
    }
}

fn panic_message(join_error: JoinError) -> String {
    let payload = join_error.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
