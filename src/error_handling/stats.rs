//! Processing statistics tracking.
//!
//! Thread-safe counters for failures and notable events, shared by every
//! consumer task of a worker through an `Arc`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{ErrorType, InfoType};

/// Thread-safe processing statistics tracker.
///
/// All categories are initialized to zero on creation, so lookups never miss
/// for a properly constructed tracker.
pub struct ProcessingStats {
    errors: HashMap<ErrorType, AtomicUsize>,
    info: HashMap<InfoType, AtomicUsize>,
    jobs_completed: AtomicUsize,
    jobs_failed: AtomicUsize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        let errors = ErrorType::iter()
            .map(|error| (error, AtomicUsize::new(0)))
            .collect();
        let info = InfoType::iter()
            .map(|info_type| (info_type, AtomicUsize::new(0)))
            .collect();

        ProcessingStats {
            errors,
            info,
            jobs_completed: AtomicUsize::new(0),
            jobs_failed: AtomicUsize::new(0),
        }
    }

    /// Increment an error counter.
    pub fn increment_error(&self, error: ErrorType) {
        if let Some(counter) = self.errors.get(&error) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map",
                error
            );
        }
    }

    /// Increment an info counter.
    pub fn increment_info(&self, info_type: InfoType) {
        if let Some(counter) = self.info.get(&info_type) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment info counter for {:?} which is not in the map",
                info_type
            );
        }
    }

    /// Records a job that reached a terminal, acknowledged outcome.
    pub fn record_completed(&self) {
        self.jobs_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a job whose handler failed (requeued or dead-lettered).
    pub fn record_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn get_info_count(&self, info_type: InfoType) -> usize {
        self.info
            .get(&info_type)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn jobs_completed(&self) -> usize {
        self.jobs_completed.load(Ordering::SeqCst)
    }

    pub fn jobs_failed(&self) -> usize {
        self.jobs_failed.load(Ordering::SeqCst)
    }

    /// Get total error count across all error types.
    pub fn total_errors(&self) -> usize {
        ErrorType::iter().map(|e| self.get_error_count(e)).sum()
    }

    /// Get total info count across all info types.
    pub fn total_info(&self) -> usize {
        InfoType::iter().map(|i| self.get_info_count(i)).sum()
    }
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}
