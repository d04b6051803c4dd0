//! Fetching the target page.
//!
//! The `Fetcher` capability turns a URL into a `SiteInfo`. It never fails:
//! timeouts, connection problems and error statuses are classified and
//! recorded, because an unreachable or error-returning page is itself a risk
//! signal.

mod html;
mod redirects;
mod request;
mod types;


use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{MAX_REDIRECT_HOPS, MAX_RESPONSE_BODY_SIZE};
use crate::error_handling::categorize_reqwest_error;

pub use types::{FetchError, FetchErrorKind, SiteInfo};

/// Retrieves a URL's content within a bounded time.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, giving up after `timeout`. Always returns a `SiteInfo`.
    async fn fetch(&self, url: &str, timeout: Duration) -> SiteInfo;
}

/// `Fetcher` backed by a shared `reqwest::Client` with redirects disabled.
pub struct HttpFetcher {
    client: Arc<reqwest::Client>,
}

impl HttpFetcher {
    /// Wraps a client built by `initialization::init_client`.
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> SiteInfo {
        let mut chain = Vec::new();
        let outcome =
            tokio::time::timeout(timeout, fetch_site(&self.client, url, &mut chain)).await;

        match outcome {
            Ok(Ok(info)) => info,
            Ok(Err(error)) => {
                log::debug!("Fetch of {} failed ({}): {}", url, error.kind.as_str(), error.message);
                SiteInfo::failed(url, chain, error)
            }
            Err(_) => {
                log::debug!("Fetch of {} timed out after {:?}", url, timeout);
                SiteInfo::failed(
                    url,
                    chain,
                    FetchError::new(
                        FetchErrorKind::Timeout,
                        format!("No complete response within {}s", timeout.as_secs_f64()),
                    ),
                )
            }
        }
    }
}

async fn fetch_site(
    client: &reqwest::Client,
    url: &str,
    chain: &mut Vec<String>,
) -> Result<SiteInfo, FetchError> {
    let mut response = redirects::follow_redirects(client, url, MAX_REDIRECT_HOPS, chain).await?;

    let status_code = response.status().as_u16();
    let headers = response.headers();
    let content_type = request::header_value(headers, reqwest::header::CONTENT_TYPE);
    let server = request::header_value(headers, reqwest::header::SERVER);

    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| FetchError::new(categorize_reqwest_error(&e), e.to_string()))?
    {
        let remaining = MAX_RESPONSE_BODY_SIZE.saturating_sub(body.len());
        body.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
        if body.len() >= MAX_RESPONSE_BODY_SIZE {
            log::debug!("Body of {} truncated at {} bytes", url, MAX_RESPONSE_BODY_SIZE);
            break;
        }
    }

    let is_html = content_type
        .as_deref()
        .map(|ct| ct.to_ascii_lowercase().contains("html"))
        .unwrap_or(false);
    let (title, summary) = if is_html {
        html::extract_title_and_summary(&String::from_utf8_lossy(&body))
    } else {
        (None, None)
    };

    let error = (status_code >= 400).then(|| FetchError::http(status_code));

    Ok(SiteInfo {
        reachable: status_code < 400,
        status_code: Some(status_code),
        redirected: chain.len() > 1,
        final_url: chain.last().cloned().unwrap_or_else(|| url.to_string()),
        redirect_chain: chain.clone(),
        content_type,
        server,
        title,
        summary,
        error,
    })
}
