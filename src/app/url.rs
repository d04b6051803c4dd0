//! Producer-side URL normalization.

use crate::analysis::validate_job_url;
use crate::config::MAX_URL_LENGTH;
use crate::error_handling::PipelineError;

/// Normalizes a submitted URL before it is enqueued.
///
/// Surrounding whitespace is trimmed and `https://` is prepended when the value
/// carries no scheme at all. The result must then pass the same validation the
/// worker applies, so a job that leaves the producer is always analysable.
///
/// # Errors
///
/// Returns `PipelineError::InvalidInput` for empty, overlong, unparsable or
/// non-http(s) values.
pub fn normalize_submission(url: &str) -> Result<String, PipelineError> {
    let trimmed = url.trim();
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(PipelineError::InvalidInput {
            url: trimmed.chars().take(50).collect(),
            reason: format!(
                "URL exceeds maximum length ({} > {})",
                trimmed.len(),
                MAX_URL_LENGTH
            ),
        });
    }

    let normalized = if trimmed.is_empty() || trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    validate_job_url(&normalized)?;
    Ok(normalized)
}
