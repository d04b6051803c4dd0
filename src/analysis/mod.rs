//! URL threat analysis.
//!
//! The pure parts (structure, patterns, blacklist, scoring, recommendations)
//! work on the raw URL string and never touch the network. `Analyzer` wires
//! them to a `Fetcher` and always produces a terminal `AnalysisResult`.

mod blacklist;
mod models;
mod patterns;
mod recommendations;
mod scoring;
mod structure;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::config::MAX_URL_LENGTH;
use crate::error_handling::PipelineError;
use crate::fetch::{Fetcher, SiteInfo};

pub use blacklist::{Blacklist, DEFAULT_BLACKLIST};
pub use models::{
    normalized_score, AnalysisResult, AnalysisStatus, AnalysisSummary, BlacklistVerdict,
    PatternFinding, PatternFindings, StructuralSignals, ThreatLevel,
};
pub use patterns::match_patterns;
pub use recommendations::{recommend, ALL_CLEAR, BLACKLIST_ALERT_PREFIX, DO_NOT_VISIT};
pub use scoring::{Scorer, ScoringPolicy, Signals, ThreatAssessment, BLACKLIST_SCORE};
pub use structure::analyze_structure;

/// Checks that `url` can be fetched: absolute, http(s), with a host, and no
/// longer than `MAX_URL_LENGTH`.
///
/// # Errors
///
/// Returns `PipelineError::InvalidInput` describing the first problem found.
pub fn validate_job_url(url: &str) -> Result<url::Url, PipelineError> {
    let invalid = |reason: String| PipelineError::InvalidInput {
        url: url.to_string(),
        reason,
    };
    if url.is_empty() {
        return Err(invalid("empty URL".to_string()));
    }
    if url.len() > MAX_URL_LENGTH {
        return Err(invalid(format!(
            "URL exceeds maximum length ({} > {})",
            url.len(),
            MAX_URL_LENGTH
        )));
    }
    let parsed = url::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(parsed)
}

/// Runs the full pipeline for one URL.
pub struct Analyzer {
    fetcher: Arc<dyn Fetcher>,
    blacklist: Blacklist,
    scorer: Scorer,
    fetch_timeout: Duration,
}

impl Analyzer {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        blacklist: Blacklist,
        scorer: Scorer,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            blacklist,
            scorer,
            fetch_timeout,
        }
    }

    pub fn scoring_version(&self) -> &str {
        self.scorer.version()
    }

    /// Fetches and scores `url`. Never fails: an invalid URL yields an
    /// `invalid` result without fetching, a transport failure an `error` result.
    pub async fn analyze(&self, url: &str) -> AnalysisResult {
        let url = url.trim();
        if let Err(e) = validate_job_url(url) {
            log::warn!("{}", e);
            return self.reject(url, &e.to_string());
        }

        let site_info = self.fetcher.fetch(url, self.fetch_timeout).await;
        let status = if site_info.transport_failure().is_some() {
            AnalysisStatus::Error
        } else {
            AnalysisStatus::Analyzed
        };
        self.assess(url, site_info, status)
    }

    /// Builds the `invalid` result for a payload that cannot be fetched.
    ///
    /// The URL-only signals are still computed, so a deny-listed value is
    /// classified `high` even when it is malformed.
    pub fn reject(&self, url: &str, reason: &str) -> AnalysisResult {
        let site_info = SiteInfo {
            final_url: url.to_string(),
            ..Default::default()
        };
        let mut result = self.assess(url, site_info, AnalysisStatus::Invalid);
        result
            .recommendations
            .push(format!("The submitted value was not analysed: {}", reason));
        result
    }

    fn assess(&self, url: &str, site_info: SiteInfo, status: AnalysisStatus) -> AnalysisResult {
        let (weight, cap) = self.scorer.pattern_weights();
        let structural = analyze_structure(url);
        let patterns = match_patterns(url, weight, cap);
        let blacklist = self.blacklist.check(url);

        let assessment = self.scorer.assess(&Signals {
            url,
            structural: &structural,
            patterns: &patterns,
            blacklist: &blacklist,
            site_info: &site_info,
        });
        let recommendations =
            recommend(assessment.threat_level, &blacklist, &patterns, &site_info);

        AnalysisResult {
            url: url.to_string(),
            status,
            threat_level: assessment.threat_level,
            risk_score: assessment.risk_score,
            structural,
            blacklist,
            patterns,
            site_info,
            recommendations,
            timestamp: Utc::now(),
            scoring_policy: self.scorer.version().to_string(),
        }
    }
}
