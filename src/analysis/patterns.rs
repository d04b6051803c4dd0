//! Suspicious-pattern rules evaluated against the raw URL.

use std::sync::LazyLock;

use regex::Regex;

use super::models::{PatternFinding, PatternFindings};

/// Percent-encoded sequences tolerated before `excessive_encoding` fires.
const MAX_ENCODED_SEQUENCES: usize = 5;

const IPV4_LITERAL_PATTERN: &str = r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}";
const ENCODED_SEQUENCE_PATTERN: &str = r"%[0-9a-fA-F]{2}";
const DASH_RUN_PATTERN: &str = r"-{3,}";
const LOWERCASE_RUN_PATTERN: &str = r"[a-z]{30,}";

/// Compiles a built-in pattern. Panics on an invalid pattern, which is a
/// programming error caught by the tests below.
fn compile_rule(pattern: &str, rule_id: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile pattern '{}' for rule {}: {}",
            pattern, rule_id, e
        )
    })
}

static IPV4_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| compile_rule(IPV4_LITERAL_PATTERN, "ip_address"));
static ENCODED_SEQUENCE: LazyLock<Regex> =
    LazyLock::new(|| compile_rule(ENCODED_SEQUENCE_PATTERN, "excessive_encoding"));
static DASH_RUN: LazyLock<Regex> = LazyLock::new(|| compile_rule(DASH_RUN_PATTERN, "dash_sequence"));
static LOWERCASE_RUN: LazyLock<Regex> =
    LazyLock::new(|| compile_rule(LOWERCASE_RUN_PATTERN, "long_token"));

struct PatternRule {
    id: &'static str,
    message: &'static str,
    matches: fn(&str) -> bool,
}

/// Rules in evaluation order; the order fixes the order of findings.
static RULES: [PatternRule; 5] = [
    PatternRule {
        id: "ip_address",
        message: "URL uses IP address instead of domain name",
        matches: |url| IPV4_LITERAL.is_match(url),
    },
    PatternRule {
        id: "at_symbol",
        message: "URL contains @ symbol (potential phishing)",
        matches: |url| url.contains('@'),
    },
    PatternRule {
        id: "excessive_encoding",
        message: "URL contains excessive encoded characters",
        matches: |url| ENCODED_SEQUENCE.find_iter(url).count() > MAX_ENCODED_SEQUENCES,
    },
    PatternRule {
        id: "dash_sequence",
        message: "URL contains unusual dash patterns",
        matches: |url| DASH_RUN.is_match(url),
    },
    PatternRule {
        id: "long_token",
        message: "URL contains unusually long string sequences",
        matches: |url| LOWERCASE_RUN.is_match(url),
    },
];

/// Evaluates every rule against `url`.
///
/// Each finding adds `weight` to the contribution, which is capped at `cap`.
pub fn match_patterns(url: &str, weight: u32, cap: u32) -> PatternFindings {
    let findings: Vec<PatternFinding> = RULES
        .iter()
        .filter(|rule| (rule.matches)(url))
        .map(|rule| PatternFinding {
            rule_id: rule.id.to_string(),
            message: rule.message.to_string(),
        })
        .collect();

    let count = u32::try_from(findings.len()).unwrap_or(u32::MAX);
    PatternFindings {
        risk_contribution: count.saturating_mul(weight).min(cap),
        findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(findings: &PatternFindings) -> Vec<&str> {
        findings.findings.iter().map(|f| f.rule_id.as_str()).collect()
    }

    #[test]
    fn test_builtin_patterns_compile() {
        for pattern in [
            IPV4_LITERAL_PATTERN,
            ENCODED_SEQUENCE_PATTERN,
            DASH_RUN_PATTERN,
            LOWERCASE_RUN_PATTERN,
        ] {
            assert!(Regex::new(pattern).is_ok(), "pattern {} should compile", pattern);
        }
    }

    #[test]
    fn test_clean_url_has_no_findings() {
        let f = match_patterns("https://www.example.com/about", 20, 100);
        assert!(f.is_empty());
        assert_eq!(f.risk_contribution, 0);
    }

    #[test]
    fn test_ip_literal() {
        let f = match_patterns("http://192.168.1.10/login", 20, 100);
        assert_eq!(ids(&f), vec!["ip_address"]);
        assert_eq!(
            f.messages().next(),
            Some("URL uses IP address instead of domain name")
        );
        assert_eq!(f.risk_contribution, 20);
    }

    #[test]
    fn test_encoding_threshold_is_strict() {
        let five = "http://example.com/%41%42%43%44%45";
        let six = "http://example.com/%41%42%43%44%45%46";
        assert!(match_patterns(five, 20, 100).is_empty());
        assert_eq!(ids(&match_patterns(six, 20, 100)), vec!["excessive_encoding"]);
    }

    #[test]
    fn test_dash_and_long_token() {
        assert_eq!(
            ids(&match_patterns("http://secure---login.example.com", 20, 100)),
            vec!["dash_sequence"]
        );
        assert!(match_patterns("http://secure--login.example.com", 20, 100).is_empty());

        let long = format!("http://{}.example.com", "a".repeat(30));
        assert_eq!(ids(&match_patterns(&long, 20, 100)), vec!["long_token"]);
        let short = format!("http://{}.example.com", "a".repeat(29));
        assert!(match_patterns(&short, 20, 100).is_empty());
    }

    #[test]
    fn test_findings_follow_rule_order() {
        let url = format!(
            "http://user@10.0.0.1/{}/a---b/%20%20%20%20%20%20",
            "x".repeat(40)
        );
        let f = match_patterns(&url, 20, 100);
        assert_eq!(
            ids(&f),
            vec![
                "ip_address",
                "at_symbol",
                "excessive_encoding",
                "dash_sequence",
                "long_token"
            ]
        );
        assert_eq!(f.risk_contribution, 100);
    }

    #[test]
    fn test_contribution_is_capped() {
        let url = "http://user@10.0.0.1/a---b";
        assert_eq!(match_patterns(url, 20, 100).risk_contribution, 60);
        assert_eq!(match_patterns(url, 50, 100).risk_contribution, 100);
        assert_eq!(match_patterns(url, 20, 30).risk_contribution, 30);
    }

    #[test]
    fn test_uppercase_run_is_not_a_long_token() {
        let url = format!("http://example.com/{}", "A".repeat(40));
        assert!(match_patterns(&url, 20, 100).is_empty());
    }
}
