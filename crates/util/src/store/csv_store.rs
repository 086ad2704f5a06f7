use std::path::Path;

use casegrid_types::Sheet;
use tracing::debug;

use super::{StoreError, TabularStore};

/// Comma-separated store. Unlike `.xlsx`, blank lines survive a round trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvStore;

impl TabularStore for CsvStore {
    fn load(&self, path: &Path) -> Result<Sheet, StoreError> {
        let csv_error = |source| StoreError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;

        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            lines.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let mut lines = lines.into_iter();
        let header = lines.next().unwrap_or_default();
        let rows: Vec<Vec<String>> = lines.collect();
        debug!(path = %path.display(), rows = rows.len(), "loaded csv table");
        Ok(Sheet { header, rows })
    }

    fn save(&self, path: &Path, sheet: &Sheet) -> Result<(), StoreError> {
        let csv_error = |source| StoreError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;
        writer.write_record(&sheet.header).map_err(csv_error)?;
        for row in &sheet.rows {
            writer.write_record(row).map_err(csv_error)?;
        }
        writer.flush().map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), rows = sheet.rows.len(), "saved csv table");
        Ok(())
    }
}
