//! centinela library: queue-driven URL threat analysis
//!
//! A producer enqueues URLs on a durable queue; workers lease them one at a
//! time, fetch the target, combine structural, pattern and deny-list signals
//! into a risk score and threat level, persist the result and only then
//! acknowledge the job.
//!
//! # Example
//!
//! ```no_run
//! use centinela::{analyze_once, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     database_url: "sqlite://centinela.db".to_string(),
//!     ..Default::default()
//! };
//!
//! let result = analyze_once(&config, "http://192.168.1.10/login", true).await?;
//! println!("{} -> {} ({})", result.url, result.threat_level, result.risk_score);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

pub mod analysis;
mod app;
pub mod config;
pub mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod queue;
mod run;
pub mod storage;
pub mod worker;

// Re-export public API
pub use analysis::{AnalysisResult, AnalysisStatus, AnalysisSummary, Analyzer, ThreatLevel};
pub use app::normalize_submission;
pub use config::{Cli, Command, Config, LogFormat, LogLevel, ScoringModel};
pub use error_handling::PipelineError;
pub use run::{
    analyze_once, list_history, run_worker, submit_url, SubmitReceipt, WorkerReport,
};
pub use storage::AnalysisRecord;
