// Analyzer tests with a canned fetcher; no network access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::fetch::{FetchError, FetchErrorKind, Fetcher, SiteInfo};

/// Returns a fixed `SiteInfo` and counts calls.
struct StubFetcher {
    response: SiteInfo,
    calls: AtomicUsize,
}

impl StubFetcher {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            response: SiteInfo {
                reachable: true,
                status_code: Some(200),
                title: Some("Example".to_string()),
                summary: Some("Example body".to_string()),
                ..Default::default()
            },
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(kind: FetchErrorKind) -> Arc<Self> {
        Arc::new(Self {
            response: SiteInfo::failed("", Vec::new(), FetchError::new(kind, "simulated")),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> SiteInfo {
        self.calls.fetch_add(1, Ordering::SeqCst);
        SiteInfo {
            final_url: url.to_string(),
            redirect_chain: vec![url.to_string()],
            ..self.response.clone()
        }
    }
}

fn analyzer(fetcher: Arc<StubFetcher>) -> Analyzer {
    Analyzer::new(
        fetcher,
        Blacklist::default(),
        Scorer::default(),
        Duration::from_secs(1),
    )
}

#[tokio::test]
async fn test_ip_login_scenario_is_medium() {
    let result = analyzer(StubFetcher::ok()).analyze("http://192.168.1.10/login").await;

    assert_eq!(result.status, AnalysisStatus::Analyzed);
    assert!(!result.structural.has_https);
    assert!(result
        .patterns
        .messages()
        .any(|m| m == "URL uses IP address instead of domain name"));
    assert!(result.risk_score >= 40);
    assert_eq!(result.threat_level, ThreatLevel::Medium);
    assert_eq!(result.scoring_policy, "structural-v1");
}

#[tokio::test]
async fn test_blacklisted_scenario_is_high_with_alert() {
    let result = analyzer(StubFetcher::ok()).analyze("https://fake-bank.com").await;

    assert!(result.blacklist.is_blacklisted);
    assert_eq!(result.threat_level, ThreatLevel::High);
    assert_eq!(result.risk_score, BLACKLIST_SCORE);
    assert!(result
        .recommendations
        .iter()
        .any(|r| r.starts_with(BLACKLIST_ALERT_PREFIX)));

    let summary = result.summary();
    assert_eq!(summary.score, 1.0);
    assert_eq!(summary.label, "HIGH");
}

#[tokio::test]
async fn test_clean_https_scenario_is_all_clear() {
    let result = analyzer(StubFetcher::ok()).analyze("https://www.example.com/").await;

    assert_eq!(result.structural.subdomain_count, 1);
    assert_eq!(result.risk_score, 0);
    assert_eq!(result.threat_level, ThreatLevel::Low);
    assert!(!result.recommendations.is_empty());
    assert!(result.recommendations.iter().any(|r| r == ALL_CLEAR));

    let summary = result.summary();
    assert_eq!(summary.title.as_deref(), Some("Example"));
    assert_eq!(summary.score, 0.0);
    assert_eq!(summary.label, "LOW");
}

#[tokio::test]
async fn test_timeout_yields_terminal_error_result() {
    let result = analyzer(StubFetcher::failing(FetchErrorKind::Timeout))
        .analyze("https://www.example.com/")
        .await;

    assert_eq!(result.status, AnalysisStatus::Error);
    let error = result.site_info.error.as_ref().expect("error recorded");
    assert_eq!(error.kind, FetchErrorKind::Timeout);
    assert_eq!(result.threat_level, ThreatLevel::Low);
    assert!(result
        .recommendations
        .last()
        .is_some_and(|r| r.contains("could not be reached (timeout)")));
}

#[tokio::test]
async fn test_http_error_status_is_still_analyzed() {
    let fetcher = Arc::new(StubFetcher {
        response: SiteInfo {
            status_code: Some(404),
            error: Some(FetchError::http(404)),
            ..Default::default()
        },
        calls: AtomicUsize::new(0),
    });
    let result = analyzer(fetcher).analyze("https://www.example.com/gone").await;

    assert_eq!(result.status, AnalysisStatus::Analyzed);
    assert_eq!(result.site_info.status_code, Some(404));
}

#[tokio::test]
async fn test_invalid_url_is_rejected_without_fetching() {
    let fetcher = StubFetcher::ok();
    let analyzer = analyzer(Arc::clone(&fetcher));

    for bad in ["", "not a url", "ftp://example.com/file", "javascript:alert(1)"] {
        let result = analyzer.analyze(bad).await;
        assert_eq!(result.status, AnalysisStatus::Invalid, "input {:?}", bad);
        assert!(result
            .recommendations
            .last()
            .is_some_and(|r| r.starts_with("The submitted value was not analysed")));
    }
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_but_blacklisted_is_still_high() {
    let result = analyzer(StubFetcher::ok()).analyze("phishing-site.com/login").await;
    assert_eq!(result.status, AnalysisStatus::Invalid);
    assert!(result.blacklist.is_blacklisted);
    assert_eq!(result.threat_level, ThreatLevel::High);
}

#[tokio::test]
async fn test_url_heuristic_strategy_is_tagged() {
    let analyzer = Analyzer::new(
        StubFetcher::ok(),
        Blacklist::default(),
        Scorer::UrlHeuristic,
        Duration::from_secs(1),
    );
    let result = analyzer.analyze("http://free-prizes.example.com/").await;
    assert_eq!(result.scoring_policy, "url-heuristic-v1");
    assert_eq!(result.risk_score, 60);
    assert_eq!(result.threat_level, ThreatLevel::Medium);
}

#[test]
fn test_validate_job_url() {
    assert!(validate_job_url("https://example.com/path?q=1").is_ok());
    assert!(validate_job_url("http://192.168.1.10/login").is_ok());

    let err = validate_job_url("example.com").unwrap_err();
    assert_eq!(err.http_status(), 400);
    assert!(validate_job_url("file:///etc/passwd").is_err());

    let long = format!("https://example.com/{}", "a".repeat(crate::config::MAX_URL_LENGTH));
    let err = validate_job_url(&long).unwrap_err();
    assert!(err.to_string().contains("maximum length"));
}

#[test]
fn test_result_json_roundtrips_both_projections() {
    let analyzer = analyzer(StubFetcher::ok());
    let result = analyzer.reject("http://10.0.0.1---x", "test");
    let json = serde_json::to_value(&result).expect("serializes");
    for key in [
        "url",
        "status",
        "threat_level",
        "structural",
        "blacklist",
        "patterns",
        "site_info",
        "recommendations",
        "timestamp",
    ] {
        assert!(json.get(key).is_some(), "missing key {}", key);
    }
    let back: AnalysisResult = serde_json::from_value(json).expect("deserializes");
    assert_eq!(back.summary(), result.summary());
}
