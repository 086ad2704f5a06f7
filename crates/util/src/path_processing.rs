use std::path::{Path, PathBuf};

use dirs_next::home_dir;

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    if trimmed == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    let rest = trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\"));
    match rest {
        Some(rest) => home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest),
        None => PathBuf::from(trimmed),
    }
}

/// Lower-cased file extension of a workbook path, if any.
pub fn workbook_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase())
}
