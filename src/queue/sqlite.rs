//! SQLite-backed job queue.
//!
//! Delivery leases a row atomically (`UPDATE … RETURNING`), so competing
//! consumers, in one process or several, never hold the same job at once.
//! Ack deletes the row. A lease that runs out without ack or nack makes the
//! job deliverable again, which gives at-least-once delivery across crashes.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, warn};
use sqlx::{Row, SqlitePool};

use super::types::{DeadLetter, Delivery, NackOutcome, QueueDepth};
use super::JobQueue;
use crate::config::{DEFAULT_MAX_DELIVERIES, LEASE_DURATION};
use crate::error_handling::{redelivery_delay, QueueError};

/// `JobQueue` over the `queues` / `queue_jobs` tables.
#[derive(Debug, Clone)]
pub struct SqliteQueue {
    pool: SqlitePool,
    max_deliveries: u32,
    lease_duration: Duration,
    redelivery: fn(u32) -> Duration,
}

impl SqliteQueue {
    /// Wraps a migrated pool with default delivery settings.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            max_deliveries: DEFAULT_MAX_DELIVERIES,
            lease_duration: LEASE_DURATION,
            redelivery: redelivery_delay,
        }
    }

    /// Deliveries after which a nacked job is dead-lettered (at least 1).
    pub fn with_max_deliveries(mut self, max_deliveries: u32) -> Self {
        self.max_deliveries = max_deliveries.max(1);
        self
    }

    pub fn with_lease_duration(mut self, lease_duration: Duration) -> Self {
        self.lease_duration = lease_duration;
        self
    }

    /// Replaces the redelivery backoff (delay as a function of the attempt).
    pub fn with_redelivery(mut self, redelivery: fn(u32) -> Duration) -> Self {
        self.redelivery = redelivery;
        self
    }

    pub fn max_deliveries(&self) -> u32 {
        self.max_deliveries
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Dead-letters jobs whose final delivery's lease ran out unacknowledged.
    async fn sweep_exhausted(&self, queue: &str, now: i64) -> Result<(), QueueError> {
        let swept = sqlx::query(
            "UPDATE queue_jobs
             SET dead_lettered = 1, leased_until = NULL, lease_owner = NULL,
                 last_error = COALESCE(last_error, 'lease expired on final delivery')
             WHERE queue = ? AND dead_lettered = 0 AND attempts >= ?
               AND leased_until IS NOT NULL AND leased_until <= ?",
        )
        .bind(queue)
        .bind(i64::from(self.max_deliveries))
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();
        if swept > 0 {
            warn!("Dead-lettered {} job(s) in '{}' whose last lease expired", swept, queue);
        }
        Ok(())
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

fn datetime_from_ms(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

#[async_trait]
impl JobQueue for SqliteQueue {
    async fn declare(&self, queue: &str) -> Result<(), QueueError> {
        sqlx::query("INSERT INTO queues (name, declared_at) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
            .bind(queue)
            .bind(now_ms())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn enqueue(&self, queue: &str, payload: &[u8]) -> Result<i64, QueueError> {
        let now = now_ms();
        let id: Option<i64> = sqlx::query_scalar(
            "INSERT INTO queue_jobs (queue, payload, enqueued_at, available_at)
             SELECT name, ?, ?, ? FROM queues WHERE name = ?
             RETURNING id",
        )
        .bind(payload)
        .bind(now)
        .bind(now)
        .bind(queue)
        .fetch_optional(&self.pool)
        .await?;
        let id = id.ok_or_else(|| QueueError::UnknownQueue(queue.to_string()))?;
        debug!("Enqueued job {} on '{}'", id, queue);
        Ok(id)
    }

    async fn receive(&self, queue: &str, consumer: &str) -> Result<Option<Delivery>, QueueError> {
        let now = now_ms();
        self.sweep_exhausted(queue, now).await?;

        let row = sqlx::query(
            "UPDATE queue_jobs
             SET attempts = attempts + 1, leased_until = ?, lease_owner = ?
             WHERE id = (
                 SELECT id FROM queue_jobs
                 WHERE queue = ? AND dead_lettered = 0 AND available_at <= ?
                   AND (leased_until IS NULL OR leased_until <= ?)
                 ORDER BY id
                 LIMIT 1
             )
             RETURNING id, queue, payload, enqueued_at, attempts",
        )
        .bind(now.saturating_add(duration_ms(self.lease_duration)))
        .bind(consumer)
        .bind(queue)
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let attempts: i64 = row.get("attempts");
            Delivery {
                id: row.get("id"),
                queue: row.get("queue"),
                payload: row.get("payload"),
                enqueued_at: datetime_from_ms(row.get("enqueued_at")),
                attempt: u32::try_from(attempts).unwrap_or(u32::MAX),
                consumer: consumer.to_string(),
            }
        }))
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let deleted = sqlx::query(
            "DELETE FROM queue_jobs WHERE id = ? AND lease_owner = ? AND attempts = ?",
        )
        .bind(delivery.id)
        .bind(&delivery.consumer)
        .bind(i64::from(delivery.attempt))
        .execute(&self.pool)
        .await?
        .rows_affected();

        if deleted == 0 {
            return Err(QueueError::LeaseLost {
                delivery_id: delivery.id,
            });
        }
        Ok(())
    }

    async fn renew_lease(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let renewed = sqlx::query(
            "UPDATE queue_jobs SET leased_until = ?
             WHERE id = ? AND lease_owner = ? AND attempts = ?",
        )
        .bind(now_ms().saturating_add(duration_ms(self.lease_duration)))
        .bind(delivery.id)
        .bind(&delivery.consumer)
        .bind(i64::from(delivery.attempt))
        .execute(&self.pool)
        .await?
        .rows_affected();

        if renewed == 0 {
            return Err(QueueError::LeaseLost {
                delivery_id: delivery.id,
            });
        }
        Ok(())
    }

    fn lease_duration(&self) -> Duration {
        self.lease_duration
    }

    async fn nack(&self, delivery: &Delivery, error: &str) -> Result<NackOutcome, QueueError> {
        let (query, outcome) = if delivery.attempt >= self.max_deliveries {
            (
                sqlx::query(
                    "UPDATE queue_jobs
                     SET dead_lettered = 1, leased_until = NULL, lease_owner = NULL, last_error = ?
                     WHERE id = ? AND lease_owner = ? AND attempts = ?",
                )
                .bind(error),
                NackOutcome::DeadLettered,
            )
        } else {
            let delay = (self.redelivery)(delivery.attempt);
            (
                sqlx::query(
                    "UPDATE queue_jobs
                     SET available_at = ?, leased_until = NULL, lease_owner = NULL, last_error = ?
                     WHERE id = ? AND lease_owner = ? AND attempts = ?",
                )
                .bind(now_ms().saturating_add(duration_ms(delay)))
                .bind(error),
                NackOutcome::Requeued { delay },
            )
        };

        let updated = query
            .bind(delivery.id)
            .bind(&delivery.consumer)
            .bind(i64::from(delivery.attempt))
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(QueueError::LeaseLost {
                delivery_id: delivery.id,
            });
        }
        Ok(outcome)
    }

    async fn depth(&self, queue: &str) -> Result<QueueDepth, QueueError> {
        let row = sqlx::query(
            "SELECT
                 COALESCE(SUM(CASE WHEN dead_lettered = 0 AND (leased_until IS NULL OR leased_until <= ?1) THEN 1 ELSE 0 END), 0) AS ready,
                 COALESCE(SUM(CASE WHEN dead_lettered = 0 AND leased_until > ?1 THEN 1 ELSE 0 END), 0) AS leased,
                 COALESCE(SUM(dead_lettered), 0) AS dead_lettered
             FROM queue_jobs WHERE queue = ?2",
        )
        .bind(now_ms())
        .bind(queue)
        .fetch_one(&self.pool)
        .await?;

        Ok(QueueDepth {
            ready: row.get("ready"),
            leased: row.get("leased"),
            dead_lettered: row.get("dead_lettered"),
        })
    }

    async fn dead_letters(&self, queue: &str) -> Result<Vec<DeadLetter>, QueueError> {
        let rows = sqlx::query(
            "SELECT id, payload, attempts, last_error FROM queue_jobs
             WHERE queue = ? AND dead_lettered = 1 ORDER BY id",
        )
        .bind(queue)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let attempts: i64 = row.get("attempts");
                DeadLetter {
                    id: row.get("id"),
                    payload: row.get("payload"),
                    attempts: u32::try_from(attempts).unwrap_or(u32::MAX),
                    last_error: row.get("last_error"),
                }
            })
            .collect())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
