//! Queue data structures.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// A job handed to one consumer under a lease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Queue row identifier
    pub id: i64,
    pub queue: String,
    pub payload: Vec<u8>,
    pub enqueued_at: DateTime<Utc>,
    /// 1-based count of deliveries of this job, including this one
    pub attempt: u32,
    /// Consumer holding the lease
    pub consumer: String,
}

impl Delivery {
    /// Payload as text, replacing invalid UTF-8 sequences.
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// What a nack did with the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NackOutcome {
    /// Visible again after `delay`
    Requeued { delay: Duration },
    /// Delivered `max_deliveries` times; kept but never delivered again
    DeadLettered,
}

/// Row counts for one queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueDepth {
    /// Waiting for delivery, including jobs in redelivery backoff
    pub ready: i64,
    /// Currently leased by a consumer
    pub leased: i64,
    pub dead_lettered: i64,
}

/// A job that exhausted its deliveries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetter {
    pub id: i64,
    pub payload: Vec<u8>,
    pub attempts: u32,
    pub last_error: Option<String>,
}
