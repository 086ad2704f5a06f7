//! Utilities shared by the casegrid engine and CLI: workbook persistence,
//! user preferences, path handling, and redaction of credentials for display.

pub mod path_processing;
pub mod preferences;
pub mod store;

use once_cell::sync::Lazy;
use regex::Regex;

pub use path_processing::{expand_tilde, workbook_extension};
pub use preferences::{DefaultHeader, PreferencesError, RecentWorkbook, UserPreferences};
pub use store::{CsvStore, InMemoryStore, StoreError, TabularStore, WorkbookFormat, XlsxStore, store_for_path};

static SENSITIVE_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(authorization|token|secret|password|passwd|api[-_]?key|cookie)").expect("sensitive key regex should compile")
});

/// Returns `true` when a header, parameter, or field name usually carries a credential.
pub fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEY_REGEX.is_match(key)
}

/// Mask a credential for display, keeping only its last four characters.
pub fn redact_sensitive(value: &str) -> String {
    let count = value.chars().count();
    if count == 0 {
        return String::new();
    }
    if count <= 4 {
        return "<redacted>".to_string();
    }
    let tail: String = value.chars().skip(count - 4).collect();
    format!("<redacted>{tail}")
}
