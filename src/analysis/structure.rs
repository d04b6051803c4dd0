//! Structural analysis of the raw URL string.
//!
//! Splitting is lenient on purpose: the input may be anything a producer put
//! on the queue, so every component falls back to an empty string instead of
//! failing. No normalisation is applied beyond lower-casing the scheme.

use super::models::StructuralSignals;

/// Derives URL-shape signals from `url`. Total and deterministic.
///
/// `subdomain_count` is the number of dot-separated labels in the network
/// location minus two, floored at zero; `path_depth` counts non-empty `/`
/// segments of the path.
pub fn analyze_structure(url: &str) -> StructuralSignals {
    let parts = split_url(url);
    let labels = parts.netloc.split('.').count();
    let subdomain_count = labels.saturating_sub(2);
    let path_depth = parts.path.split('/').filter(|s| !s.is_empty()).count();

    StructuralSignals {
        has_https: parts.scheme == "https",
        protocol: parts.scheme,
        domain: parts.netloc.to_string(),
        path: parts.path.to_string(),
        subdomain_count: u32::try_from(subdomain_count).unwrap_or(u32::MAX),
        path_depth: u32::try_from(path_depth).unwrap_or(u32::MAX),
    }
}

/// Raw network location of `url`, as written.
pub fn netloc(url: &str) -> String {
    split_url(url).netloc.to_string()
}

struct UrlParts<'a> {
    scheme: String,
    netloc: &'a str,
    path: &'a str,
}

fn split_url(url: &str) -> UrlParts<'_> {
    let rest = url.trim_matches(|c: char| c <= ' ');

    let (scheme, rest) = match rest.find(':') {
        Some(i) if i > 0 && is_scheme(&rest[..i]) => (rest[..i].to_ascii_lowercase(), &rest[i + 1..]),
        _ => (String::new(), rest),
    };

    let (netloc, rest) = match rest.strip_prefix("//") {
        Some(after) => {
            let end = after.find(['/', '?', '#']).unwrap_or(after.len());
            (&after[..end], &after[end..])
        }
        None => ("", rest),
    };

    let rest = rest.split('#').next().unwrap_or_default();
    let rest = rest.split('?').next().unwrap_or_default();

    // `;params` on the last segment are not part of the path
    let path = match rest.rfind('/') {
        Some(slash) => match rest[slash..].find(';') {
            Some(i) => &rest[..slash + i],
            None => rest,
        },
        None => rest.split(';').next().unwrap_or_default(),
    };

    UrlParts {
        scheme,
        netloc,
        path,
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
