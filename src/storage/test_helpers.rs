//! Shared test helpers for storage and queue tests.

#[cfg(test)]
use sqlx::SqlitePool;

#[cfg(test)]
use crate::analysis::{
    analyze_structure, match_patterns, recommend, AnalysisResult, AnalysisStatus, Blacklist,
    Scorer, Signals,
};
#[cfg(test)]
use crate::fetch::SiteInfo;

/// Creates a migrated single-connection in-memory pool.
#[cfg(test)]
pub async fn create_test_pool() -> SqlitePool {
    crate::storage::init_pool("sqlite::memory:")
        .await
        .expect("Failed to create test database pool")
}

/// Builds a scored, reachable `analyzed` result for `url` without fetching.
#[cfg(test)]
pub fn sample_result(url: &str) -> AnalysisResult {
    let scorer = Scorer::default();
    let (weight, cap) = scorer.pattern_weights();
    let structural = analyze_structure(url);
    let patterns = match_patterns(url, weight, cap);
    let blacklist = Blacklist::default().check(url);
    let site_info = SiteInfo {
        reachable: true,
        status_code: Some(200),
        final_url: url.to_string(),
        redirect_chain: vec![url.to_string()],
        title: Some("Sample page".to_string()),
        summary: Some("Sample paragraph.".to_string()),
        ..Default::default()
    };
    let assessment = scorer.assess(&Signals {
        url,
        structural: &structural,
        patterns: &patterns,
        blacklist: &blacklist,
        site_info: &site_info,
    });

    AnalysisResult {
        url: url.to_string(),
        status: AnalysisStatus::Analyzed,
        threat_level: assessment.threat_level,
        risk_score: assessment.risk_score,
        recommendations: recommend(assessment.threat_level, &blacklist, &patterns, &site_info),
        structural,
        blacklist,
        patterns,
        site_info,
        timestamp: chrono::Utc::now(),
        scoring_policy: scorer.version().to_string(),
    }
}
