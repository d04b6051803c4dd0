//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::Config;

/// Initializes the shared HTTP client used by `HttpFetcher`.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the configuration
/// - Redirects disabled, so the fetcher can record the chain hop by hop
/// - A per-request timeout and a connect timeout derived from the fetch
///   timeout (the fetcher also bounds the whole fetch, including redirects)
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub async fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let timeout = config.fetch_timeout();
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
