//! Analysis data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fetch::SiteInfo;

/// Terminal outcome of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// The page was fetched (any status code) and scored
    Analyzed,
    /// The submitted value was not an absolute http(s) URL; nothing was fetched
    Invalid,
    /// The fetch failed at the transport level; scored on the URL alone
    Error,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Analyzed => "analyzed",
            AnalysisStatus::Invalid => "invalid",
            AnalysisStatus::Error => "error",
        }
    }
}

/// Discrete threat classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
}

impl ThreatLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "low",
            ThreatLevel::Medium => "medium",
            ThreatLevel::High => "high",
        }
    }

    /// Upper-cased form used by the summary projection and the `label` column.
    pub fn label(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "LOW",
            ThreatLevel::Medium => "MEDIUM",
            ThreatLevel::High => "HIGH",
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URL-shape signals derived from the raw string without network access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralSignals {
    /// Scheme, lower-cased; empty when absent
    pub protocol: String,
    /// Network location as written (may include userinfo and port)
    pub domain: String,
    pub path: String,
    pub has_https: bool,
    pub subdomain_count: u32,
    pub path_depth: u32,
}

/// One suspicious-pattern rule that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternFinding {
    pub rule_id: String,
    pub message: String,
}

/// Ordered findings plus their capped score contribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternFindings {
    pub findings: Vec<PatternFinding>,
    pub risk_contribution: u32,
}

impl PatternFindings {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.findings.iter().map(|f| f.message.as_str())
    }
}

/// Outcome of the deny-list check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistVerdict {
    pub is_blacklisted: bool,
    pub reason: Option<String>,
}

impl BlacklistVerdict {
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn matched(entry: &str) -> Self {
        Self {
            is_blacklisted: true,
            reason: Some(format!("Domain matches blacklist entry: {}", entry)),
        }
    }
}

/// The full record produced for every consumed job.
///
/// Created once per job and never modified afterwards; re-analysing a URL
/// produces a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub url: String,
    pub status: AnalysisStatus,
    pub threat_level: ThreatLevel,
    pub risk_score: u32,
    pub structural: StructuralSignals,
    pub blacklist: BlacklistVerdict,
    pub patterns: PatternFindings,
    pub site_info: SiteInfo,
    pub recommendations: Vec<String>,
    pub timestamp: DateTime<Utc>,
    /// Version tag of the scoring policy that produced `risk_score`
    pub scoring_policy: String,
}

impl AnalysisResult {
    /// The compact `{url, title, summary, score, label}` projection.
    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary::from(self)
    }
}

/// Compact projection: score normalised to `[0, 1]`, upper-cased label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub url: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub score: f64,
    pub label: String,
}

impl From<&AnalysisResult> for AnalysisSummary {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            url: result.url.clone(),
            title: result.site_info.title.clone(),
            summary: result.site_info.summary.clone(),
            score: normalized_score(result.risk_score),
            label: result.threat_level.label().to_string(),
        }
    }
}

/// Maps a risk score onto `[0, 1]`.
pub fn normalized_score(risk_score: u32) -> f64 {
    f64::from(risk_score.min(100)) / 100.0
}
