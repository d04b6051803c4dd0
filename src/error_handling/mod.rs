//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions (initialization, database, queue, pipeline)
//! - Fetch failure categorization
//! - Retry strategies for broker connection and job redelivery
//! - Processing statistics tracking (errors and notable events)

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{
    broker_connect_strategy, categorize_reqwest_error, error_type_for, redelivery_delay,
    update_error_stats,
};
pub use stats::ProcessingStats;
pub use types::{DatabaseError, ErrorType, InfoType, InitializationError, PipelineError, QueueError};
