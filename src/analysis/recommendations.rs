//! Advisory messages attached to each result.

use super::models::{BlacklistVerdict, PatternFindings, ThreatLevel};
use crate::fetch::SiteInfo;

pub const DO_NOT_VISIT: &str =
    "Do not visit this site: it shows strong indicators of fraud or phishing.";
pub const BLACKLIST_ALERT_PREFIX: &str = "Blacklist alert:";
pub const PROCEED_WITH_CAUTION: &str =
    "Proceed with caution: this site shows some suspicious characteristics.";
pub const SANDBOX_SUGGESTION: &str =
    "If you must open it, use an isolated environment such as a sandboxed browser or virtual machine.";
pub const ALL_CLEAR: &str = "All clear: no significant threat indicators were found.";
pub const SAFETY_REMINDER: &str =
    "Stay alert anyway: never enter passwords or payment details on a site you did not navigate to yourself.";

/// Maps the classification and findings to an ordered, non-empty advisory list.
///
/// The level message(s) come first, then one line per pattern finding in rule
/// order, then a reachability note when the fetch never got a response.
pub fn recommend(
    threat_level: ThreatLevel,
    blacklist: &BlacklistVerdict,
    patterns: &PatternFindings,
    site_info: &SiteInfo,
) -> Vec<String> {
    let mut out = Vec::new();

    match threat_level {
        ThreatLevel::High => {
            out.push(DO_NOT_VISIT.to_string());
            if blacklist.is_blacklisted {
                let reason = blacklist
                    .reason
                    .as_deref()
                    .unwrap_or("URL is on the deny-list");
                out.push(format!("{} {}", BLACKLIST_ALERT_PREFIX, reason));
            }
        }
        ThreatLevel::Medium => {
            out.push(PROCEED_WITH_CAUTION.to_string());
            out.push(SANDBOX_SUGGESTION.to_string());
        }
        ThreatLevel::Low => {
            out.push(ALL_CLEAR.to_string());
            out.push(SAFETY_REMINDER.to_string());
        }
    }

    out.extend(patterns.messages().map(|m| format!("Suspicious pattern: {}", m)));

    if let Some(failure) = site_info.transport_failure() {
        out.push(format!(
            "The site could not be reached ({}); this assessment is based on the URL alone.",
            failure.kind.as_str()
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::PatternFinding;
    use crate::fetch::{FetchError, FetchErrorKind};

    fn findings(messages: &[&str]) -> PatternFindings {
        PatternFindings {
            findings: messages
                .iter()
                .map(|m| PatternFinding {
                    rule_id: "r".to_string(),
                    message: m.to_string(),
                })
                .collect(),
            risk_contribution: 0,
        }
    }

    #[test]
    fn test_low_is_all_clear() {
        let recs = recommend(
            ThreatLevel::Low,
            &BlacklistVerdict::clean(),
            &PatternFindings::default(),
            &SiteInfo::default(),
        );
        assert_eq!(recs, vec![ALL_CLEAR.to_string(), SAFETY_REMINDER.to_string()]);
    }

    #[test]
    fn test_high_blacklisted_has_alert() {
        let recs = recommend(
            ThreatLevel::High,
            &BlacklistVerdict::matched("scam-site.org"),
            &PatternFindings::default(),
            &SiteInfo::default(),
        );
        assert_eq!(recs[0], DO_NOT_VISIT);
        assert_eq!(
            recs[1],
            "Blacklist alert: Domain matches blacklist entry: scam-site.org"
        );
    }

    #[test]
    fn test_high_without_blacklist_has_no_alert() {
        let recs = recommend(
            ThreatLevel::High,
            &BlacklistVerdict::clean(),
            &findings(&["a", "b", "c"]),
            &SiteInfo::default(),
        );
        assert!(!recs.iter().any(|r| r.starts_with(BLACKLIST_ALERT_PREFIX)));
        assert_eq!(recs.len(), 4);
    }

    #[test]
    fn test_medium_findings_appended_in_order() {
        let recs = recommend(
            ThreatLevel::Medium,
            &BlacklistVerdict::clean(),
            &findings(&["first", "second"]),
            &SiteInfo::default(),
        );
        assert_eq!(
            recs,
            vec![
                PROCEED_WITH_CAUTION.to_string(),
                SANDBOX_SUGGESTION.to_string(),
                "Suspicious pattern: first".to_string(),
                "Suspicious pattern: second".to_string(),
            ]
        );
    }

    #[test]
    fn test_unreachable_note_is_last() {
        let site = SiteInfo::failed(
            "http://x.example",
            Vec::new(),
            FetchError::new(FetchErrorKind::ConnectionError, "refused"),
        );
        let recs = recommend(
            ThreatLevel::Low,
            &BlacklistVerdict::clean(),
            &findings(&["only"]),
            &site,
        );
        let last = recs.last().expect("non-empty");
        assert!(last.contains("could not be reached (connection_error)"));
    }

    #[test]
    fn test_http_error_gets_no_unreachable_note() {
        let site = SiteInfo {
            status_code: Some(500),
            error: Some(FetchError::http(500)),
            ..Default::default()
        };
        let recs = recommend(
            ThreatLevel::Low,
            &BlacklistVerdict::clean(),
            &PatternFindings::default(),
            &site,
        );
        assert_eq!(recs.len(), 2);
    }
}
