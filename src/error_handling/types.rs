//! Error type definitions.
//!
//! This module defines the error enums used across the crate, plus the
//! counters categories tracked by `ProcessingStats`.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// A static configuration file (deny-list, scoring policy) could not be loaded.
    #[error("Configuration file error ({path}): {message}")]
    ConfigFileError {
        /// Path of the offending file
        path: String,
        /// What went wrong
        message: String,
    },
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The connection string could not be parsed.
    #[error("Invalid database URL '{0}'")]
    InvalidUrl(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A stored JSON document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Error types for job queue operations.
#[derive(Error, Debug)]
pub enum QueueError {
    /// The broker could not be reached after all connection attempts.
    #[error("Broker unavailable after {attempts} attempts: {source}")]
    Unavailable {
        /// Number of attempts made
        attempts: usize,
        /// Last connection error
        #[source]
        source: DatabaseError,
    },

    /// A broker operation failed at runtime.
    #[error("Broker operation failed: {0}")]
    Sql(#[from] sqlx::Error),

    /// The delivery was acked or nacked after its lease had been taken over by
    /// another consumer (lease expired, job redelivered elsewhere).
    #[error("Lease lost for delivery {delivery_id}")]
    LeaseLost {
        /// Queue row identifier
        delivery_id: i64,
    },

    /// The named queue was never declared.
    #[error("Queue '{0}' has not been declared")]
    UnknownQueue(String),
}

/// Errors surfaced to synchronous callers of the analysis pipeline.
///
/// Inside the worker these are captured into the `AnalysisResult` rather than
/// raised; `http_status` gives the status a gateway would answer with.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The submitted URL is not an absolute http(s) URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidInput {
        /// Submitted value
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The fetch exceeded its timeout.
    #[error("Timed out fetching {url}")]
    TransportTimeout {
        /// Target URL
        url: String,
    },

    /// The target could not be reached (DNS, TCP, TLS, or protocol failure).
    #[error("Could not reach {url}: {message}")]
    TransportConnection {
        /// Target URL
        url: String,
        /// Underlying failure
        message: String,
    },

    /// The target answered with a status >= 400.
    #[error("{url} responded with HTTP {status}")]
    UpstreamHttp {
        /// Target URL
        url: String,
        /// Terminal status code
        status: u16,
    },

    /// The job queue could not be reached.
    #[error("Job queue unavailable: {0}")]
    BrokerUnavailable(#[from] QueueError),

    /// The computed result could not be written.
    #[error("Failed to persist analysis of {url}: {source}")]
    Persistence {
        /// Analyzed URL
        url: String,
        /// Store error
        #[source]
        source: DatabaseError,
    },
}

impl PipelineError {
    /// HTTP status a gateway maps this error to.
    pub fn http_status(&self) -> u16 {
        match self {
            PipelineError::InvalidInput { .. } => 400,
            PipelineError::TransportTimeout { .. }
            | PipelineError::TransportConnection { .. }
            | PipelineError::UpstreamHttp { .. } => 502,
            PipelineError::BrokerUnavailable(_) => 503,
            PipelineError::Persistence { .. } => 500,
        }
    }
}

/// Failure categories counted while the worker runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    FetchTimeout,
    FetchConnectionError,
    FetchHttpError,
    FetchOtherError,
    InvalidUrl,
    PersistenceFailure,
    HandlerPanic,
    AckFailure,
    LeaseRenewalFailure,
}

/// Notable non-error events counted while the worker runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    HttpRedirect,
    Blacklisted,
    ThreatHigh,
    ThreatMedium,
    ThreatLow,
    JobRequeued,
    JobDeadLettered,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::FetchTimeout => "Fetch timeout",
            ErrorType::FetchConnectionError => "Fetch connection error",
            ErrorType::FetchHttpError => "Upstream HTTP error (>= 400)",
            ErrorType::FetchOtherError => "Fetch other error",
            ErrorType::InvalidUrl => "Invalid URL payload",
            ErrorType::PersistenceFailure => "Result persistence failure",
            ErrorType::HandlerPanic => "Job handler panic",
            ErrorType::AckFailure => "Ack/nack failure",
            ErrorType::LeaseRenewalFailure => "Lease renewal failure",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::HttpRedirect => "HTTP redirect",
            InfoType::Blacklisted => "Blacklisted URL",
            InfoType::ThreatHigh => "Threat level high",
            InfoType::ThreatMedium => "Threat level medium",
            InfoType::ThreatLow => "Threat level low",
            InfoType::JobRequeued => "Job requeued",
            InfoType::JobDeadLettered => "Job dead-lettered",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_error_type_as_str() {
        assert_eq!(ErrorType::FetchTimeout.as_str(), "Fetch timeout");
        assert_eq!(
            ErrorType::FetchHttpError.to_string(),
            "Upstream HTTP error (>= 400)"
        );
    }

    #[test]
    fn test_all_types_have_string_representation() {
        for error_type in ErrorType::iter() {
            assert!(
                !error_type.as_str().is_empty(),
                "{:?} should have non-empty string",
                error_type
            );
        }
        for info_type in InfoType::iter() {
            assert!(
                !info_type.as_str().is_empty(),
                "{:?} should have non-empty string",
                info_type
            );
        }
    }

    #[test]
    fn test_pipeline_error_http_status_mapping() {
        let invalid = PipelineError::InvalidInput {
            url: "nope".into(),
            reason: "relative URL without a base".into(),
        };
        assert_eq!(invalid.http_status(), 400);

        let timeout = PipelineError::TransportTimeout {
            url: "https://example.com".into(),
        };
        assert_eq!(timeout.http_status(), 502);

        let connect = PipelineError::TransportConnection {
            url: "https://example.com".into(),
            message: "connection refused".into(),
        };
        assert_eq!(connect.http_status(), 502);

        let broker = PipelineError::BrokerUnavailable(QueueError::Sql(sqlx::Error::PoolClosed));
        assert_eq!(broker.http_status(), 503);

        let persistence = PipelineError::Persistence {
            url: "https://example.com".into(),
            source: DatabaseError::SqlError(sqlx::Error::PoolClosed),
        };
        assert_eq!(persistence.http_status(), 500);
    }

    #[test]
    fn test_pipeline_error_messages_name_the_url() {
        let err = PipelineError::UpstreamHttp {
            url: "https://example.com/x".into(),
            status: 404,
        };
        assert_eq!(err.to_string(), "https://example.com/x responded with HTTP 404");
    }
}
