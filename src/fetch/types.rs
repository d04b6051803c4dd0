//! Fetch result data structures.

use serde::{Deserialize, Serialize};

use crate::error_handling::PipelineError;

/// Classified transport-level outcome of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The fetch did not complete within its timeout
    Timeout,
    /// DNS, TCP, TLS, or protocol failure before a response arrived
    ConnectionError,
    /// The terminal response had a status >= 400
    HttpError,
    /// Anything else (malformed redirect, body read failure, ...)
    Other,
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::ConnectionError => "connection_error",
            FetchErrorKind::HttpError => "http_error",
            FetchErrorKind::Other => "other",
        }
    }

    /// Whether the target never produced a usable HTTP response.
    pub fn is_transport_failure(&self) -> bool {
        !matches!(self, FetchErrorKind::HttpError)
    }
}

/// A classified fetch failure, recorded as a signal rather than raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchError {
    pub kind: FetchErrorKind,
    /// Terminal status code, set for `http_error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn http(status: u16) -> Self {
        Self {
            kind: FetchErrorKind::HttpError,
            status: Some(status),
            message: format!("Upstream responded with HTTP {}", status),
        }
    }

    /// Converts the failure into the error a synchronous caller sees.
    pub fn to_pipeline_error(&self, url: &str) -> PipelineError {
        match self.kind {
            FetchErrorKind::Timeout => PipelineError::TransportTimeout {
                url: url.to_string(),
            },
            FetchErrorKind::HttpError => PipelineError::UpstreamHttp {
                url: url.to_string(),
                status: self.status.unwrap_or_default(),
            },
            FetchErrorKind::ConnectionError | FetchErrorKind::Other => {
                PipelineError::TransportConnection {
                    url: url.to_string(),
                    message: self.message.clone(),
                }
            }
        }
    }
}

/// What the fetcher learned about a URL. Produced once per job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    /// A response arrived and its status was below 400
    pub reachable: bool,
    pub status_code: Option<u16>,
    pub redirected: bool,
    /// Last URL requested; the submitted URL when nothing was fetched
    pub final_url: String,
    /// Every URL requested, in order, starting with the submitted one
    #[serde(default)]
    pub redirect_chain: Vec<String>,
    pub content_type: Option<String>,
    pub server: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub error: Option<FetchError>,
}

impl SiteInfo {
    /// A `SiteInfo` for a fetch that never produced a response.
    pub fn failed(url: &str, chain: Vec<String>, error: FetchError) -> Self {
        let final_url = chain.last().cloned().unwrap_or_else(|| url.to_string());
        Self {
            reachable: false,
            redirected: chain.len() > 1,
            final_url,
            redirect_chain: chain,
            error: Some(error),
            ..Default::default()
        }
    }

    /// The transport failure that prevented analysis of the page, if any.
    pub fn transport_failure(&self) -> Option<&FetchError> {
        self.error
            .as_ref()
            .filter(|error| error.kind.is_transport_failure())
    }
}
