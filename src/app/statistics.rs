//! Final statistics printed when a worker stops.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats};

/// Prints a one-line summary followed by the non-zero error and info counts.
pub fn print_worker_statistics(stats: &ProcessingStats, elapsed_seconds: f64) {
    let completed = stats.jobs_completed();
    let failed = stats.jobs_failed();
    info!(
        "✅ Settled {} job{} ({} acked, {} nacked) in {:.1}s",
        completed + failed,
        if completed + failed == 1 { "" } else { "s" },
        completed,
        failed,
        elapsed_seconds
    );
    print_error_statistics(stats);
}

/// Prints error and info counters to the log, skipping zero entries.
pub fn print_error_statistics(stats: &ProcessingStats) {
    let total_errors = stats.total_errors();
    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    let total_info = stats.total_info();
    if total_info > 0 {
        info!("Info Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}
