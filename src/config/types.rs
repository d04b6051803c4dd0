//! Configuration types and CLI options.
//!
//! `Config` is the library-facing configuration. It can be built
//! programmatically (`Config::default()` plus overrides) or parsed from the
//! command line through `Cli`, where every option also falls back to an
//! environment variable so containers can be configured without flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    BROKER_CONNECT_ATTEMPTS, BROKER_CONNECT_DELAY_SECS, DEFAULT_DATABASE_URL,
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_DELIVERIES, DEFAULT_QUEUE_NAME, DEFAULT_QUEUE_URL,
    DEFAULT_USER_AGENT, LEASE_DURATION, LEASE_MARGIN,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: One JSON object per line for log shippers
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Which scoring strategy classifies a URL.
///
/// The blacklist override applies on top of either strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScoringModel {
    /// Blacklist, pattern, and structural signals (default)
    Structural,
    /// URL-only heuristic: scheme, host depth, and lure keywords
    UrlHeuristic,
}

/// Library configuration.
///
/// # Examples
///
/// ```no_run
/// use centinela::Config;
///
/// let config = Config {
///     queue_name: "analysis.priority".to_string(),
///     fetch_timeout_secs: 5,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, env = "LOG_LEVEL", default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, env = "LOG_FORMAT", default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// Broker connection string (SQLite database holding the durable queue)
    #[arg(long, env = "QUEUE_URL", default_value = DEFAULT_QUEUE_URL, global = true)]
    pub queue_url: String,

    /// Name of the queue jobs are published to and consumed from
    #[arg(long, env = "QUEUE_NAME", default_value = DEFAULT_QUEUE_NAME, global = true)]
    pub queue_name: String,

    /// Result store connection string
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL, global = true)]
    pub database_url: String,

    /// Per-fetch timeout in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS, global = true)]
    pub fetch_timeout_secs: u64,

    /// HTTP User-Agent header value
    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT, global = true)]
    pub user_agent: String,

    /// Broker connection attempts before startup fails
    #[arg(long, env = "BROKER_CONNECT_ATTEMPTS", default_value_t = BROKER_CONNECT_ATTEMPTS, global = true)]
    pub broker_connect_attempts: usize,

    /// Fixed delay between broker connection attempts, in seconds
    #[arg(long, env = "BROKER_CONNECT_DELAY_SECS", default_value_t = BROKER_CONNECT_DELAY_SECS, global = true)]
    pub broker_connect_delay_secs: u64,

    /// Deliveries allowed before a failing job is dead-lettered
    #[arg(long, env = "MAX_DELIVERIES", default_value_t = DEFAULT_MAX_DELIVERIES, global = true)]
    pub max_deliveries: u32,

    /// Extra deny-list entries, one per line (`#` starts a comment)
    #[arg(long, env = "BLACKLIST_FILE", global = true)]
    pub blacklist_file: Option<PathBuf>,

    /// JSON file overriding scoring weights and thresholds
    #[arg(long, env = "SCORING_POLICY", global = true)]
    pub scoring_policy: Option<PathBuf>,

    /// Scoring strategy: structural|url-heuristic
    #[arg(long, value_enum, env = "SCORING_MODEL", default_value_t = ScoringModel::Structural, global = true)]
    pub scoring_model: ScoringModel,
}

impl Config {
    /// Fetch timeout as a `Duration`.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Fixed delay between broker connection attempts.
    pub fn broker_connect_delay(&self) -> Duration {
        Duration::from_secs(self.broker_connect_delay_secs)
    }

    /// Lease held on a delivered job before it counts as abandoned.
    ///
    /// Never shorter than twice the fetch timeout plus a margin, so a slow
    /// fetch cannot outlive the lease between two renewals.
    pub fn lease_duration(&self) -> Duration {
        LEASE_DURATION.max(
            self.fetch_timeout()
                .saturating_mul(2)
                .saturating_add(LEASE_MARGIN),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            queue_url: DEFAULT_QUEUE_URL.to_string(),
            queue_name: DEFAULT_QUEUE_NAME.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            broker_connect_attempts: BROKER_CONNECT_ATTEMPTS,
            broker_connect_delay_secs: BROKER_CONNECT_DELAY_SECS,
            max_deliveries: DEFAULT_MAX_DELIVERIES,
            blacklist_file: None,
            scoring_policy: None,
            scoring_model: ScoringModel::Structural,
        }
    }
}

/// Command-line interface.
///
/// # Examples
///
/// ```bash
/// # Run two competing consumers
/// centinela worker --concurrency 2
///
/// # Enqueue a URL for asynchronous analysis
/// centinela submit https://example.com/login
///
/// # Analyze synchronously and print the summary projection
/// centinela analyze https://example.com --summary
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "centinela",
    about = "Triage URLs for phishing risk through a durable analysis queue."
)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Consume jobs from the queue until interrupted
    Worker {
        /// Number of competing consumers in this process (each with prefetch = 1)
        #[arg(long, env = "WORKER_CONCURRENCY", default_value_t = 1)]
        concurrency: usize,
    },
    /// Validate a URL and enqueue it for analysis
    Submit {
        /// URL to analyze
        url: String,
    },
    /// Analyze a URL synchronously and print the result as JSON
    Analyze {
        /// URL to analyze
        url: String,
        /// Print the `{url, title, summary, score, label}` projection instead of the full result
        #[arg(long)]
        summary: bool,
        /// Skip persisting the result
        #[arg(long)]
        no_store: bool,
    },
    /// List persisted analyses, newest first
    History {
        /// Only show analyses of this exact URL
        #[arg(long)]
        url: Option<String>,
        /// Maximum number of rows
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}
