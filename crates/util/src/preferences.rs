//! User preference persistence for casegrid.
//!
//! A small JSON file under the standard configuration directory
//! (`~/.config/casegrid/preferences.json` on most platforms) records the
//! header pair applied to new test cases, the worksheet name used when writing
//! workbooks, and the most recently opened workbooks.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable allowing callers to override the preferences file path.
pub const PREFERENCES_PATH_ENV: &str = "CASEGRID_PREFERENCES_PATH";

/// Default filename for the JSON payload.
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Number of workbooks remembered in the recent list.
pub const RECENT_WORKBOOK_LIMIT: usize = 10;

pub const DEFAULT_HEADER_KEY: &str = "Content-Type";
pub const DEFAULT_HEADER_VALUE: &str = "application/json";
pub const DEFAULT_SHEET_NAME: &str = "TestCases";

/// Error surfaced when reading or writing preferences fails.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("preferences I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("preferences serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Header pair written into a row when it becomes the first row of a test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultHeader {
    pub key: String,
    pub value: String,
}

impl Default for DefaultHeader {
    fn default() -> Self {
        Self {
            key: DEFAULT_HEADER_KEY.to_string(),
            value: DEFAULT_HEADER_VALUE.to_string(),
        }
    }
}

/// A workbook the user opened or saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentWorkbook {
    pub path: PathBuf,
    pub last_used_at: DateTime<Utc>,
}

/// Persisted preference values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesPayload {
    pub default_header: DefaultHeader,
    /// Worksheet name used when writing `.xlsx` workbooks.
    pub sheet_name: String,
    /// Most recent first.
    pub recent_workbooks: Vec<RecentWorkbook>,
}

impl Default for PreferencesPayload {
    fn default() -> Self {
        Self {
            default_header: DefaultHeader::default(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            recent_workbooks: Vec::new(),
        }
    }
}

/// Thread-safe preferences store backed by a JSON file.
#[derive(Debug, Default)]
pub struct UserPreferences {
    path: PathBuf,
    payload: Mutex<PreferencesPayload>,
    persist_to_disk: bool,
}

impl UserPreferences {
    /// Load preferences from the default location, honoring [`PREFERENCES_PATH_ENV`].
    pub fn new() -> Result<Self, PreferencesError> {
        Self::with_path(default_preferences_path())
    }

    /// Load preferences from an explicit file.
    pub fn with_path(path: PathBuf) -> Result<Self, PreferencesError> {
        let payload = load_payload(&path)?;
        Ok(Self {
            path,
            payload: Mutex::new(payload),
            persist_to_disk: true,
        })
    }

    /// Build an in-memory store used as a fallback when the config directory cannot be accessed.
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            payload: Mutex::new(PreferencesPayload::default()),
            persist_to_disk: false,
        }
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_header(&self) -> DefaultHeader {
        self.payload.lock().expect("preferences lock poisoned").default_header.clone()
    }

    pub fn set_default_header(&self, header: DefaultHeader) -> Result<(), PreferencesError> {
        self.update(|payload| payload.default_header = header)
    }

    pub fn sheet_name(&self) -> String {
        self.payload.lock().expect("preferences lock poisoned").sheet_name.clone()
    }

    /// Recently used workbooks, most recent first.
    pub fn recent_workbooks(&self) -> Vec<RecentWorkbook> {
        self.payload.lock().expect("preferences lock poisoned").recent_workbooks.clone()
    }

    /// Move `path` to the front of the recent list, dropping the oldest entries past the limit.
    pub fn record_workbook(&self, path: &Path) -> Result<(), PreferencesError> {
        let entry = RecentWorkbook {
            path: path.to_path_buf(),
            last_used_at: Utc::now(),
        };
        self.update(|payload| {
            payload.recent_workbooks.retain(|recent| recent.path != entry.path);
            payload.recent_workbooks.insert(0, entry);
            payload.recent_workbooks.truncate(RECENT_WORKBOOK_LIMIT);
        })
    }

    fn update(&self, apply: impl FnOnce(&mut PreferencesPayload)) -> Result<(), PreferencesError> {
        let mut payload = self.payload.lock().expect("preferences lock poisoned");
        apply(&mut payload);
        if self.persist_to_disk {
            self.save_locked(&payload)?;
        }
        Ok(())
    }

    fn save_locked(&self, payload: &PreferencesPayload) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(payload)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

fn default_preferences_path() -> PathBuf {
    if let Ok(path) = env::var(PREFERENCES_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("casegrid")
        .join(PREFERENCES_FILE_NAME)
}

fn load_payload(path: &Path) -> Result<PreferencesPayload, PreferencesError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(payload) => Ok(payload),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse preferences file; using defaults"
                );
                Ok(PreferencesPayload::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(PreferencesPayload::default()),
        Err(error) => Err(PreferencesError::Io(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let preferences = UserPreferences::with_path(dir.path().join("preferences.json")).unwrap();
        assert_eq!(preferences.default_header(), DefaultHeader::default());
        assert_eq!(preferences.sheet_name(), DEFAULT_SHEET_NAME);
        assert!(preferences.recent_workbooks().is_empty());
    }

    #[test]
    fn default_header_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");
        let preferences = UserPreferences::with_path(path.clone()).unwrap();
        preferences
            .set_default_header(DefaultHeader {
                key: "Accept".to_string(),
                value: "text/plain".to_string(),
            })
            .unwrap();

        drop(preferences);
        let reloaded = UserPreferences::with_path(path).unwrap();
        assert_eq!(reloaded.default_header().key, "Accept");
        assert_eq!(reloaded.default_header().value, "text/plain");
    }

    #[test]
    fn recent_workbooks_are_deduplicated_and_bounded() {
        let preferences = UserPreferences::ephemeral();
        for index in 0..(RECENT_WORKBOOK_LIMIT + 3) {
            preferences.record_workbook(Path::new(&format!("suite{index}.xlsx"))).unwrap();
        }
        preferences.record_workbook(Path::new("suite5.xlsx")).unwrap();

        let recent = preferences.recent_workbooks();
        assert_eq!(recent.len(), RECENT_WORKBOOK_LIMIT);
        assert_eq!(recent[0].path, PathBuf::from("suite5.xlsx"));
        assert_eq!(recent.iter().filter(|entry| entry.path == PathBuf::from("suite5.xlsx")).count(), 1);
    }

    #[test]
    fn unparseable_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ not json").unwrap();
        let preferences = UserPreferences::with_path(path).unwrap();
        assert_eq!(preferences.sheet_name(), DEFAULT_SHEET_NAME);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"sheet_name": "Smoke"}"#).unwrap();
        let preferences = UserPreferences::with_path(path).unwrap();
        assert_eq!(preferences.sheet_name(), "Smoke");
        assert_eq!(preferences.default_header(), DefaultHeader::default());
    }

    #[test]
    fn default_path_honors_env_override() {
        let override_path = "~/custom/casegrid/preferences.json";
        temp_env::with_var(PREFERENCES_PATH_ENV, Some(override_path), || {
            assert_eq!(default_preferences_path(), expand_tilde(override_path));
        });
    }
}
