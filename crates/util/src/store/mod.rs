//! Tabular persistence for step tables.
//!
//! A [`TabularStore`] moves a [`Sheet`] (header line plus data lines, all text)
//! between memory and a file. The table model never touches files directly;
//! it validates whatever sheet a store hands back.

mod csv_store;
mod memory;
mod xlsx;

use std::path::{Path, PathBuf};

use casegrid_types::Sheet;
use thiserror::Error;

pub use csv_store::CsvStore;
pub use memory::InMemoryStore;
pub use xlsx::XlsxStore;

use crate::workbook_extension;

/// Errors surfaced by store operations. Every variant names the file involved.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read workbook {}: {source}", .path.display())]
    XlsxRead {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("cannot write workbook {}: {source}", .path.display())]
    XlsxWrite {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("invalid CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("workbook {} has no worksheet", .path.display())]
    NoWorksheet { path: PathBuf },

    #[error("no stored table at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("{} is read-only", .path.display())]
    ReadOnly { path: PathBuf },

    #[error("unsupported workbook format for {} (expected .xlsx or .csv)", .path.display())]
    UnsupportedFormat { path: PathBuf },
}

impl StoreError {
    /// File the failed operation was working on.
    pub fn path(&self) -> &Path {
        match self {
            StoreError::Io { path, .. }
            | StoreError::XlsxRead { path, .. }
            | StoreError::XlsxWrite { path, .. }
            | StoreError::Csv { path, .. }
            | StoreError::NoWorksheet { path }
            | StoreError::NotFound { path }
            | StoreError::ReadOnly { path }
            | StoreError::UnsupportedFormat { path } => path,
        }
    }
}

/// Load and save whole sheets.
pub trait TabularStore: Send + Sync {
    /// Read the first table found at `path`.
    fn load(&self, path: &Path) -> Result<Sheet, StoreError>;

    /// Replace whatever is stored at `path` with `sheet`.
    fn save(&self, path: &Path, sheet: &Sheet) -> Result<(), StoreError>;
}

/// File formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    Xlsx,
    Csv,
}

impl WorkbookFormat {
    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        match workbook_extension(path).as_deref() {
            Some("xlsx") => Ok(WorkbookFormat::Xlsx),
            Some("csv") => Ok(WorkbookFormat::Csv),
            _ => Err(StoreError::UnsupportedFormat { path: path.to_path_buf() }),
        }
    }
}

/// Pick the store matching the extension of `path`.
///
/// `sheet_name` names the worksheet written to `.xlsx` files.
pub fn store_for_path(path: &Path, sheet_name: &str) -> Result<Box<dyn TabularStore>, StoreError> {
    Ok(match WorkbookFormat::from_path(path)? {
        WorkbookFormat::Xlsx => Box::new(XlsxStore::new(sheet_name)),
        WorkbookFormat::Csv => Box::new(CsvStore),
    })
}
