//! Configuration constants.
//!
//! Defaults for timeouts, queue behavior, and size limits. Every value here can
//! be overridden through the CLI or the matching environment variable, except
//! the limits that protect the worker from hostile responses.

use std::time::Duration;

/// Default queue name, shared by producers and consumers.
pub const DEFAULT_QUEUE_NAME: &str = "analysis.jobs";
/// Default broker location (a SQLite file holding the durable queue).
pub const DEFAULT_QUEUE_URL: &str = "sqlite://centinela_queue.db";
/// Default result store location.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://centinela.db";

/// Per-fetch timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Default User-Agent string for HTTP requests.
///
/// Mimics a desktop Chrome on Windows. Phishing kits frequently cloak their
/// pages from obvious crawlers, so the worker presents itself as a browser.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// Broker connection
/// Number of connection attempts before giving up at startup.
/// Absorbs broker startup races in multi-service deployments.
pub const BROKER_CONNECT_ATTEMPTS: usize = 30;
/// Fixed delay between broker connection attempts, in seconds.
pub const BROKER_CONNECT_DELAY_SECS: u64 = 2;

// Delivery semantics
/// Maximum number of deliveries before a job is dead-lettered.
pub const DEFAULT_MAX_DELIVERIES: u32 = 5;
/// Minimum time a delivered job stays invisible to other consumers.
/// A lease that expires is treated as a crashed consumer and the job is
/// redelivered, so a live consumer renews it while the job is in hand.
pub const LEASE_DURATION: Duration = Duration::from_secs(120);
/// Added to twice the fetch timeout when sizing the lease for long timeouts.
pub const LEASE_MARGIN: Duration = Duration::from_secs(30);
/// Lease renewals per lease period while a job is being handled.
pub const LEASE_RENEWALS_PER_PERIOD: u32 = 3;
/// Idle wait between polls when the queue is empty.
pub const QUEUE_POLL_INTERVAL: Duration = Duration::from_millis(500);

// Redelivery backoff
/// Growth base of the redelivery delay (the delay after attempt n is
/// `REDELIVERY_BACKOFF_BASE^n * REDELIVERY_BACKOFF_UNIT_MS` milliseconds)
pub const REDELIVERY_BACKOFF_BASE: u64 = 2;
/// Unit of the redelivery delay in milliseconds; the first delay is 500 ms
pub const REDELIVERY_BACKOFF_UNIT_MS: u64 = 250;
/// Maximum redelivery delay in seconds
pub const REDELIVERY_MAX_DELAY_SECS: u64 = 60;

// Redirect handling
/// Maximum number of redirect hops to follow
/// Prevents infinite redirect loops and excessive request chains
pub const MAX_REDIRECT_HOPS: usize = 10;

// Response and body size limits
/// Maximum response body size in bytes (2MB).
/// Larger bodies are truncated before HTML extraction.
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;
/// Maximum summary length in characters extracted from page paragraphs.
pub const MAX_SUMMARY_CHARS: usize = 800;

/// Maximum URL length accepted by the producer.
pub const MAX_URL_LENGTH: usize = 2048;

/// Progress logging interval for the worker, in seconds.
pub const LOGGING_INTERVAL_SECS: u64 = 30;
