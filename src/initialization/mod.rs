//! Application initialization and resource setup.
//!
//! Functions that build the long-lived resources a process owns:
//! - the logger
//! - the shared HTTP client
//! - the static threat-intelligence configuration (deny-list, scoring policy)
//!
//! Database pools and the broker connection live in `storage` and `queue`.

mod client;
mod logger;

use std::path::Path;

use crate::analysis::{Blacklist, ScoringPolicy};
use crate::error_handling::InitializationError;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;

/// Loads the deny-list: the built-in entries plus those in `path`, if given.
///
/// The file holds one entry per line; blank lines and lines starting with `#`
/// are skipped.
///
/// # Errors
///
/// Returns `InitializationError::ConfigFileError` if the file cannot be read.
pub fn init_blacklist(path: Option<&Path>) -> Result<Blacklist, InitializationError> {
    let mut blacklist = Blacklist::default();
    if let Some(path) = path {
        let contents =
            std::fs::read_to_string(path).map_err(|e| InitializationError::ConfigFileError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let added = blacklist.extend_from_lines(&contents);
        log::info!(
            "Loaded {} deny-list entries from {} ({} total)",
            added,
            path.display(),
            blacklist.len()
        );
    }
    Ok(blacklist)
}

/// Loads the scoring policy from a JSON file, or returns the default policy.
///
/// Fields missing from the file keep their default values.
///
/// # Errors
///
/// Returns `InitializationError::ConfigFileError` if the file cannot be read,
/// is not a valid policy document, or sets the medium threshold above the
/// high one.
pub fn init_scoring_policy(path: Option<&Path>) -> Result<ScoringPolicy, InitializationError> {
    let Some(path) = path else {
        return Ok(ScoringPolicy::default());
    };
    let config_error = |message: String| InitializationError::ConfigFileError {
        path: path.display().to_string(),
        message,
    };
    let contents = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
    let policy: ScoringPolicy =
        serde_json::from_str(&contents).map_err(|e| config_error(e.to_string()))?;
    if policy.medium_threshold > policy.high_threshold {
        return Err(config_error(format!(
            "medium_threshold ({}) must not exceed high_threshold ({})",
            policy.medium_threshold, policy.high_threshold
        )));
    }
    log::info!("Loaded scoring policy '{}' from {}", policy.version, path.display());
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_init_blacklist_defaults_without_file() {
        let blacklist = init_blacklist(None).expect("defaults should load");
        assert!(blacklist.len() >= 5);
        assert!(blacklist.check("https://phishing-site.com/").is_blacklisted);
    }

    #[test]
    fn test_init_blacklist_appends_file_entries() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "# local additions").unwrap();
        writeln!(file, "evil-login.example").unwrap();
        writeln!(file).unwrap();

        let blacklist = init_blacklist(Some(file.path())).expect("file should load");
        let verdict = blacklist.check("https://evil-login.example/account");
        assert!(verdict.is_blacklisted);
        assert!(blacklist.check("https://fake-bank.com").is_blacklisted);
    }

    #[test]
    fn test_init_blacklist_missing_file_is_error() {
        let err = init_blacklist(Some(Path::new("/nonexistent/deny.txt"))).unwrap_err();
        assert!(matches!(err, InitializationError::ConfigFileError { .. }));
    }

    #[test]
    fn test_init_scoring_policy_partial_override() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"version": "strict-v2", "high_threshold": 40}}"#).unwrap();

        let policy = init_scoring_policy(Some(file.path())).expect("policy should parse");
        assert_eq!(policy.version, "strict-v2");
        assert_eq!(policy.high_threshold, 40);
        assert_eq!(policy.medium_threshold, ScoringPolicy::default().medium_threshold);
    }

    #[test]
    fn test_init_scoring_policy_rejects_inverted_thresholds() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"high_threshold": 20, "medium_threshold": 50}}"#).unwrap();

        let err = init_scoring_policy(Some(file.path())).unwrap_err();
        match err {
            InitializationError::ConfigFileError { message, .. } => {
                assert!(message.contains("medium_threshold"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_init_scoring_policy_accepts_equal_thresholds() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"high_threshold": 50, "medium_threshold": 50}}"#).unwrap();
        assert!(init_scoring_policy(Some(file.path())).is_ok());
    }

    #[test]
    fn test_init_scoring_policy_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").unwrap();
        assert!(init_scoring_policy(Some(file.path())).is_err());
    }
}
