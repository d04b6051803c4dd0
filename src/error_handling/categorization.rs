//! Error categorization and retry strategies.

use std::time::Duration;
use tokio_retry::strategy::{ExponentialBackoff, FixedInterval};

use super::stats::ProcessingStats;
use super::types::ErrorType;
use crate::fetch::FetchErrorKind;

/// Creates the fixed-interval strategy used while connecting to the broker.
///
/// `attempts` counts the initial try, so the iterator yields `attempts - 1`
/// delays.
pub fn broker_connect_strategy(attempts: usize, delay: Duration) -> impl Iterator<Item = Duration> {
    FixedInterval::new(delay).take(attempts.saturating_sub(1))
}

/// Delay before a failed job becomes visible again.
///
/// Exponential in the number of deliveries so far (1-based), capped at
/// `REDELIVERY_MAX_DELAY_SECS`.
pub fn redelivery_delay(attempt: u32) -> Duration {
    ExponentialBackoff::from_millis(crate::config::REDELIVERY_BACKOFF_BASE)
        .factor(crate::config::REDELIVERY_BACKOFF_UNIT_MS)
        .max_delay(Duration::from_secs(crate::config::REDELIVERY_MAX_DELAY_SECS))
        .nth(attempt.saturating_sub(1) as usize)
        .unwrap_or(Duration::from_secs(crate::config::REDELIVERY_MAX_DELAY_SECS))
}

/// Categorizes a `reqwest::Error` into a `FetchErrorKind`.
///
/// Timeouts are checked before connection failures because a connect phase
/// that exceeds the deadline reports both.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> FetchErrorKind {
    if let Some(status) = error.status() {
        if status.is_client_error() || status.is_server_error() {
            return FetchErrorKind::HttpError;
        }
    }

    if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if error.is_connect() || error.is_request() {
        FetchErrorKind::ConnectionError
    } else {
        FetchErrorKind::Other
    }
}

/// Maps a fetch failure kind to its statistics counter.
pub fn error_type_for(kind: FetchErrorKind) -> ErrorType {
    match kind {
        FetchErrorKind::Timeout => ErrorType::FetchTimeout,
        FetchErrorKind::ConnectionError => ErrorType::FetchConnectionError,
        FetchErrorKind::HttpError => ErrorType::FetchHttpError,
        FetchErrorKind::Other => ErrorType::FetchOtherError,
    }
}

/// Updates processing statistics for a fetch failure.
pub fn update_error_stats(stats: &ProcessingStats, kind: FetchErrorKind) {
    stats.increment_error(error_type_for(kind));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_connect_strategy_is_fixed() {
        let delays: Vec<Duration> =
            broker_connect_strategy(30, Duration::from_secs(2)).collect();
        // 30 attempts means 29 waits in between
        assert_eq!(delays.len(), 29);
        assert!(delays.iter().all(|d| *d == Duration::from_secs(2)));
    }

    #[test]
    fn test_broker_connect_strategy_single_attempt_has_no_delay() {
        assert_eq!(broker_connect_strategy(1, Duration::from_secs(2)).count(), 0);
        assert_eq!(broker_connect_strategy(0, Duration::from_secs(2)).count(), 0);
    }

    #[test]
    fn test_redelivery_delay_grows_and_caps() {
        let first = redelivery_delay(1);
        let second = redelivery_delay(2);
        let late = redelivery_delay(40);

        assert_eq!(first, Duration::from_millis(500));
        assert_eq!(second, Duration::from_secs(1));
        assert_eq!(redelivery_delay(3), Duration::from_secs(2));
        assert!(late <= Duration::from_secs(crate::config::REDELIVERY_MAX_DELAY_SECS));
    }

    #[test]
    fn test_error_type_for_each_kind() {
        assert_eq!(error_type_for(FetchErrorKind::Timeout), ErrorType::FetchTimeout);
        assert_eq!(
            error_type_for(FetchErrorKind::ConnectionError),
            ErrorType::FetchConnectionError
        );
        assert_eq!(error_type_for(FetchErrorKind::HttpError), ErrorType::FetchHttpError);
        assert_eq!(error_type_for(FetchErrorKind::Other), ErrorType::FetchOtherError);
    }

    // Categorizing real reqwest errors needs live sockets; see the fetch tests,
    // which drive connection refusals and timeouts through HttpFetcher.
}
