//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, queue defaults, limits)
//! - CLI option types and parsing, with environment variable fallbacks

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Cli, Command, Config, LogFormat, LogLevel, ScoringModel};
