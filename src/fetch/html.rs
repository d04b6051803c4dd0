//! Page title and summary extraction.

use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::config::MAX_SUMMARY_CHARS;

static TITLE_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| parse_selector("title"));
static PARAGRAPH_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| parse_selector("p"));

fn parse_selector(css: &str) -> Option<Selector> {
    Selector::parse(css)
        .map_err(|e| log::error!("Failed to parse selector '{}': {}", css, e))
        .ok()
}

/// Extracts the `<title>` text and a short summary built from `<p>` elements.
///
/// The summary joins the trimmed text of every paragraph with single spaces and
/// is cut at `MAX_SUMMARY_CHARS` characters. Either part is `None` when the page
/// has nothing to offer.
pub(crate) fn extract_title_and_summary(html: &str) -> (Option<String>, Option<String>) {
    let document = Html::parse_document(html);

    let title = TITLE_SELECTOR.as_ref().and_then(|selector| {
        document
            .select(selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty())
    });

    let summary = PARAGRAPH_SELECTOR.as_ref().and_then(|selector| {
        let text = document
            .select(selector)
            .map(|p| p.text().collect::<String>().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            None
        } else {
            Some(text.chars().take(MAX_SUMMARY_CHARS).collect())
        }
    });

    (title, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_title_and_paragraphs() {
        let html = r#"<html><head><title>  Sign in to your bank </title></head>
            <body><p>Your account is locked.</p><div>ignored</div><p> Verify now. </p></body></html>"#;
        let (title, summary) = extract_title_and_summary(html);
        assert_eq!(title.as_deref(), Some("Sign in to your bank"));
        assert_eq!(
            summary.as_deref(),
            Some("Your account is locked. Verify now.")
        );
    }

    #[test]
    fn test_missing_parts_are_none() {
        let (title, summary) = extract_title_and_summary("<html><body><div>x</div></body></html>");
        assert!(title.is_none());
        assert!(summary.is_none());

        let (title, _) = extract_title_and_summary("<title>   </title>");
        assert!(title.is_none(), "whitespace-only title should be None");
    }

    #[test]
    fn test_summary_is_truncated() {
        let long = "a".repeat(MAX_SUMMARY_CHARS * 2);
        let html = format!("<p>{}</p>", long);
        let (_, summary) = extract_title_and_summary(&html);
        assert_eq!(summary.map(|s| s.chars().count()), Some(MAX_SUMMARY_CHARS));
    }
}
