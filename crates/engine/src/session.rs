//! Editor session: one table, its backing workbook, and the current selection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use casegrid_types::Column;
use casegrid_util::preferences::DEFAULT_SHEET_NAME;
use casegrid_util::{DefaultHeader, TabularStore, UserPreferences, store_for_path};
use tracing::{info, warn};

use crate::detail::{DetailEdit, GroupView};
use crate::error::TableError;
use crate::table::TestCaseTable;

/// How the session picks a store for a workbook path.
#[derive(Clone)]
enum StoreSelection {
    /// Choose from the file extension on every open/save.
    ByExtension { sheet_name: String },
    /// Always use the given store, whatever the path looks like.
    Fixed(Arc<dyn TabularStore>),
}

impl StoreSelection {
    fn resolve(&self, path: &Path) -> Result<Arc<dyn TabularStore>, TableError> {
        match self {
            StoreSelection::ByExtension { sheet_name } => Ok(Arc::from(store_for_path(path, sheet_name)?)),
            StoreSelection::Fixed(store) => Ok(Arc::clone(store)),
        }
    }
}

pub struct EditorSession {
    table: TestCaseTable,
    path: Option<PathBuf>,
    selection: Option<usize>,
    stores: StoreSelection,
    preferences: Option<Arc<UserPreferences>>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    /// Empty, clean session with no backing path.
    pub fn new() -> Self {
        Self {
            table: TestCaseTable::new(),
            path: None,
            selection: None,
            stores: StoreSelection::ByExtension {
                sheet_name: DEFAULT_SHEET_NAME.to_string(),
            },
            preferences: None,
        }
    }

    /// Session that reads and writes every workbook through `store`.
    pub fn with_store(store: Arc<dyn TabularStore>) -> Self {
        Self {
            stores: StoreSelection::Fixed(store),
            ..Self::new()
        }
    }

    /// Attach user preferences: default header pair, sheet name, and recent workbook tracking.
    pub fn with_preferences(mut self, preferences: Arc<UserPreferences>) -> Self {
        if let StoreSelection::ByExtension { sheet_name } = &mut self.stores {
            *sheet_name = preferences.sheet_name();
        }
        self.table = TestCaseTable::with_default_header(preferences.default_header());
        self.preferences = Some(preferences);
        self
    }

    pub fn table(&self) -> &TestCaseTable {
        &self.table
    }

    /// Mutable access for structural edits. Clears the selection.
    pub fn table_mut(&mut self) -> &mut TestCaseTable {
        self.selection = None;
        &mut self.table
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection.filter(|index| *index < self.table.len())
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.table.is_modified()
    }

    /// Open `path`, replacing the current table.
    ///
    /// Any failure leaves the previous table, path, and dirty flag untouched.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), TableError> {
        let path = path.as_ref();
        let store = self.stores.resolve(path)?;
        let sheet = store.load(path).inspect_err(|error| warn!(path = %path.display(), %error, "failed to read workbook"))?;

        let mut table = TestCaseTable::with_default_header(self.default_header());
        table
            .load_table(sheet)
            .inspect_err(|error| warn!(path = %path.display(), %error, "workbook rejected"))?;

        let issues = table.validate();
        if !issues.is_empty() {
            warn!(path = %path.display(), issues = issues.len(), "workbook loaded with invariant violations");
        }
        info!(path = %path.display(), rows = table.len(), cases = table.cases().len(), "opened workbook");

        self.table = table;
        self.path = Some(path.to_path_buf());
        self.selection = None;
        self.remember(path);
        Ok(())
    }

    /// Write the table back to its current path.
    pub fn save(&mut self) -> Result<(), TableError> {
        let path = self.path.clone().ok_or(TableError::NoWorkbookPath)?;
        self.write(&path)
    }

    /// Write the table to `path` and make it the session's path.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), TableError> {
        let path = path.as_ref();
        self.write(path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Select the row at `index` and return the view of its group.
    pub fn select(&mut self, index: usize) -> Result<GroupView, TableError> {
        let view = GroupView::for_row(&self.table, index)?;
        self.selection = Some(index);
        Ok(view)
    }

    /// View of the group containing the current selection.
    pub fn selected_group(&self) -> Option<GroupView> {
        self.selection().and_then(|index| GroupView::for_row(&self.table, index).ok())
    }

    pub fn commit_cell(&mut self, index: usize, column: Column, value: &str) -> Result<(), TableError> {
        self.table.commit_cell(index, column, value)
    }

    /// Commit an edit made in the detail panel and return the refreshed view.
    pub fn apply_detail_edit(&mut self, edit: &DetailEdit) -> Result<GroupView, TableError> {
        edit.apply(&mut self.table)?;
        GroupView::for_row(&self.table, self.selection().unwrap_or(edit.index))
    }

    fn write(&mut self, path: &Path) -> Result<(), TableError> {
        let store = self.stores.resolve(path)?;
        let sheet = self.table.save_table();
        store
            .save(path, &sheet)
            .inspect_err(|error| warn!(path = %path.display(), %error, "failed to write workbook"))?;
        self.table.mark_saved();
        info!(path = %path.display(), rows = sheet.rows.len(), "saved workbook");
        self.remember(path);
        Ok(())
    }

    fn default_header(&self) -> DefaultHeader {
        self.preferences
            .as_ref()
            .map(|preferences| preferences.default_header())
            .unwrap_or_default()
    }

    fn remember(&self, path: &Path) {
        if let Some(preferences) = &self.preferences
            && let Err(error) = preferences.record_workbook(path)
        {
            warn!(path = %path.display(), %error, "failed to record recent workbook");
        }
    }
}
