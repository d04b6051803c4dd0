//! Main application modules.
//!
//! Producer URL normalization, periodic progress logging, shutdown handling
//! and statistics printing used by the CLI.

pub mod logging;
pub mod shutdown;
pub mod statistics;
pub mod url;

// Re-export public API
pub use logging::{log_progress, spawn_progress_logger};
pub use shutdown::shutdown_gracefully;
pub use statistics::print_worker_statistics;
pub use url::normalize_submission;
