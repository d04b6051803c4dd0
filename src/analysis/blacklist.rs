//! Deny-list checking.

use super::models::BlacklistVerdict;
use super::structure::netloc;

/// Entries every deny-list starts with.
pub const DEFAULT_BLACKLIST: &[&str] = &[
    "bit.ly/malware",
    "phishing-site.com",
    "malware-download.net",
    "fake-bank.com",
    "scam-site.org",
];

/// Ordered, case-insensitive substring deny-list.
///
/// An entry matches when it occurs in the URL's network location or anywhere
/// in the full URL. The first matching entry wins.
#[derive(Debug, Clone)]
pub struct Blacklist {
    /// Lower-cased entries in insertion order
    entries: Vec<String>,
}

impl Default for Blacklist {
    fn default() -> Self {
        Self::from_entries(DEFAULT_BLACKLIST.iter().copied())
    }
}

impl Blacklist {
    /// A deny-list holding exactly `entries` (blank entries are skipped).
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a str>) -> Self {
        let mut blacklist = Self {
            entries: Vec::new(),
        };
        for entry in entries {
            blacklist.push(entry);
        }
        blacklist
    }

    /// Appends entries from a text file body, one per line; `#` starts a
    /// comment line. Returns how many entries were added.
    pub fn extend_from_lines(&mut self, contents: &str) -> usize {
        let before = self.entries.len();
        for line in contents.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            self.push(line);
        }
        self.entries.len() - before
    }

    fn push(&mut self, entry: &str) {
        let entry = entry.trim().to_lowercase();
        if !entry.is_empty() && !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks `url` against every entry in order.
    pub fn check(&self, url: &str) -> BlacklistVerdict {
        let domain = netloc(url).to_lowercase();
        let url = url.to_lowercase();
        self.entries
            .iter()
            .find(|entry| domain.contains(entry.as_str()) || url.contains(entry.as_str()))
            .map(|entry| BlacklistVerdict::matched(entry))
            .unwrap_or_else(BlacklistVerdict::clean)
    }
}
