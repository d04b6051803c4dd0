//! Threat aggregation.
//!
//! Two strategies are available. `Structural` combines the pattern findings
//! with URL-shape signals under a versioned, file-configurable policy.
//! `UrlHeuristic` is the older keyword heuristic that looks at the URL alone.
//! Both apply the blacklist override first, so a deny-listed URL is always
//! `(100, high)`.

use serde::{Deserialize, Serialize};

use super::models::{BlacklistVerdict, PatternFindings, StructuralSignals, ThreatLevel};
use crate::config::ScoringModel;
use crate::fetch::SiteInfo;

/// Score assigned to deny-listed URLs.
pub const BLACKLIST_SCORE: u32 = 100;

/// Weights and thresholds of the structural strategy.
///
/// Missing fields in a policy file keep these defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Tag stored with every result scored by this policy
    pub version: String,
    /// Points per pattern finding
    pub pattern_weight: u32,
    /// Maximum total points from pattern findings
    pub pattern_cap: u32,
    /// Points when the scheme is not https
    pub no_https_weight: u32,
    /// Points when `subdomain_count` exceeds `subdomain_threshold`
    pub subdomain_weight: u32,
    pub subdomain_threshold: u32,
    /// Points when the fetch failed at the transport level
    pub unreachable_weight: u32,
    pub high_threshold: u32,
    pub medium_threshold: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            version: "structural-v1".to_string(),
            pattern_weight: 20,
            pattern_cap: 100,
            no_https_weight: 20,
            subdomain_weight: 15,
            subdomain_threshold: 2,
            unreachable_weight: 0,
            high_threshold: 60,
            medium_threshold: 30,
        }
    }
}

impl ScoringPolicy {
    pub fn classify(&self, score: u32) -> ThreatLevel {
        classify(score, self.high_threshold, self.medium_threshold)
    }
}

/// Keywords the URL heuristic looks for.
const HEURISTIC_KEYWORDS: &[&str] = &["free", "promo", "win", "prize", "click"];
const HEURISTIC_VERSION: &str = "url-heuristic-v1";

/// Everything the aggregator looks at for one URL.
pub struct Signals<'a> {
    pub url: &'a str,
    pub structural: &'a StructuralSignals,
    pub patterns: &'a PatternFindings,
    pub blacklist: &'a BlacklistVerdict,
    pub site_info: &'a SiteInfo,
}

/// Aggregated score and level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreatAssessment {
    pub risk_score: u32,
    pub threat_level: ThreatLevel,
}

/// The selected scoring strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Scorer {
    Structural(ScoringPolicy),
    UrlHeuristic,
}

impl Scorer {
    pub fn new(model: ScoringModel, policy: ScoringPolicy) -> Self {
        match model {
            ScoringModel::Structural => Scorer::Structural(policy),
            ScoringModel::UrlHeuristic => Scorer::UrlHeuristic,
        }
    }

    /// Version tag recorded on each result.
    pub fn version(&self) -> &str {
        match self {
            Scorer::Structural(policy) => &policy.version,
            Scorer::UrlHeuristic => HEURISTIC_VERSION,
        }
    }

    /// Per-finding weight and cap used when matching patterns.
    pub fn pattern_weights(&self) -> (u32, u32) {
        match self {
            Scorer::Structural(policy) => (policy.pattern_weight, policy.pattern_cap),
            Scorer::UrlHeuristic => {
                let defaults = ScoringPolicy::default();
                (defaults.pattern_weight, defaults.pattern_cap)
            }
        }
    }

    pub fn assess(&self, signals: &Signals<'_>) -> ThreatAssessment {
        if signals.blacklist.is_blacklisted {
            return ThreatAssessment {
                risk_score: BLACKLIST_SCORE,
                threat_level: ThreatLevel::High,
            };
        }
        match self {
            Scorer::Structural(policy) => structural_score(policy, signals),
            Scorer::UrlHeuristic => url_heuristic_score(signals),
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Scorer::Structural(ScoringPolicy::default())
    }
}

fn classify(score: u32, high: u32, medium: u32) -> ThreatLevel {
    if score >= high {
        ThreatLevel::High
    } else if score >= medium {
        ThreatLevel::Medium
    } else {
        ThreatLevel::Low
    }
}

fn structural_score(policy: &ScoringPolicy, signals: &Signals<'_>) -> ThreatAssessment {
    let mut score = signals.patterns.risk_contribution;
    if !signals.structural.has_https {
        score = score.saturating_add(policy.no_https_weight);
    }
    if signals.structural.subdomain_count > policy.subdomain_threshold {
        score = score.saturating_add(policy.subdomain_weight);
    }
    if signals.site_info.transport_failure().is_some() {
        score = score.saturating_add(policy.unreachable_weight);
    }
    ThreatAssessment {
        risk_score: score,
        threat_level: policy.classify(score),
    }
}

fn url_heuristic_score(signals: &Signals<'_>) -> ThreatAssessment {
    let mut score: u32 = 0;
    if !signals.structural.has_https {
        score += 40;
    }
    let host = url::Url::parse(signals.url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();
    if host.matches('.').count() > 2 {
        score += 20;
    }
    let lowered = signals.url.to_lowercase();
    if HEURISTIC_KEYWORDS.iter().any(|word| lowered.contains(word)) {
        score += 20;
    }
    let score = score.min(100);
    ThreatAssessment {
        risk_score: score,
        threat_level: classify(score, 67, 34),
    }
}
