//! HTTP redirect chain resolution.
//!
//! Redirects are followed by hand (the client has redirects disabled) so the
//! full chain is recorded, including the hops of a fetch that later fails.

use reqwest::Url;

use crate::error_handling::categorize_reqwest_error;
use crate::fetch::request::RequestHeaders;
use crate::fetch::types::{FetchError, FetchErrorKind};

fn is_redirect_status(status_code: u16) -> bool {
    matches!(status_code, 301 | 302 | 303 | 307 | 308)
}

/// Follows redirects from `start_url` and returns the terminal response.
///
/// Every URL requested is pushed onto `chain` before it is requested, so the
/// caller still sees the hops taken when this future fails or is cancelled by
/// a timeout.
///
/// # Errors
///
/// Returns a classified `FetchError` when a request fails, a `Location` header
/// cannot be resolved, or more than `max_hops` redirects are seen.
pub(crate) async fn follow_redirects(
    client: &reqwest::Client,
    start_url: &str,
    max_hops: usize,
    chain: &mut Vec<String>,
) -> Result<reqwest::Response, FetchError> {
    let mut current = start_url.to_string();

    for _ in 0..=max_hops {
        chain.push(current.clone());
        let resp = RequestHeaders::apply_to_request_builder(client.get(&current))
            .send()
            .await
            .map_err(|e| FetchError::new(categorize_reqwest_error(&e), e.to_string()))?;

        let status_code = resp.status().as_u16();
        if !is_redirect_status(status_code) {
            return Ok(resp);
        }

        let Some(loc) = resp.headers().get(reqwest::header::LOCATION) else {
            // Redirect status without a target is the terminal response
            log::warn!(
                "Redirect status {} for {} but no Location header",
                status_code,
                current
            );
            return Ok(resp);
        };
        let loc = loc.to_str().unwrap_or("").to_string();
        let next = Url::parse(&loc)
            .or_else(|_| Url::parse(&current).and_then(|base| base.join(&loc)))
            .map_err(|e| {
                FetchError::new(
                    FetchErrorKind::Other,
                    format!("Invalid redirect target '{}' from {}: {}", loc, current, e),
                )
            })?;
        current = next.to_string();
    }

    Err(FetchError::new(
        FetchErrorKind::Other,
        format!("Too many redirects (more than {})", max_hops),
    ))
}
