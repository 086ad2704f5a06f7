//! The test case table model.
//!
//! Rows are stored already grouped: an optional leading run of rows that
//! belong to no test case (only possible in loaded workbooks), followed by an
//! ordered list of [`TestCase`] aggregates. Flat row indices address rows
//! across those groups in display order.
//!
//! A row starts a new test case when its identifier is non-blank and differs
//! from the identifier of the case being built; blank rows and rows repeating
//! the current identifier continue that case. Positional edits (moves,
//! deletions, identifier changes) re-derive groups from the new row order in a
//! single pass so the stored grouping always matches what a reader of the flat
//! sheet would see.

use std::fmt;
use std::ops::Range;

use casegrid_types::{
    COLUMN_COUNT, Column, Sheet, StepRow, check_test_case_id, check_test_case_id_shape, expected_header, is_blank,
    suggest_unique_test_case_id,
};
use casegrid_util::DefaultHeader;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{TableError, ValidationError};

/// One test case: its first step carries the identifier, later steps are continuations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    steps: Vec<StepRow>,
}

impl TestCase {
    /// Identifier taken from the first step.
    pub fn id(&self) -> &str {
        self.steps.first().and_then(StepRow::test_case_id).unwrap_or_default()
    }

    pub fn steps(&self) -> &[StepRow] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Where a flat row index lands inside the grouped storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Orphan(usize),
    Case { case: usize, step: usize },
}

/// Invariant violations found in loaded data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableIssue {
    /// Rows before the first identified row.
    OrphanRows { count: usize },
    InvalidTestCaseId { row: usize, id: String, reason: String },
    /// Loaded line carried non-blank cells past the last column; `row` is its position at load time.
    DroppedCells { row: usize },
    DuplicateTestCaseId { id: String, rows: Vec<usize> },
    NonNumericStatus { row: usize, value: String },
}

impl fmt::Display for TableIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableIssue::OrphanRows { count } => write!(f, "{count} leading row(s) belong to no test case"),
            TableIssue::InvalidTestCaseId { row, id, reason } => write!(f, "row {row}: invalid test case id '{id}': {reason}"),
            TableIssue::DroppedCells { row } => write!(f, "row {row}: cells past the last column were dropped on load"),
            TableIssue::DuplicateTestCaseId { id, rows } => {
                let rows: Vec<String> = rows.iter().map(usize::to_string).collect();
                write!(f, "test case id '{id}' starts more than one test case (rows {})", rows.join(", "))
            }
            TableIssue::NonNumericStatus { row, value } => write!(f, "row {row}: expected status '{value}' is not numeric"),
        }
    }
}

/// Ordered, grouped table of step rows owned by one editor session.
#[derive(Debug, Clone, Default)]
pub struct TestCaseTable {
    orphans: Vec<StepRow>,
    cases: Vec<TestCase>,
    modified: bool,
    default_header: DefaultHeader,
    /// Load-time positions of lines that lost non-blank cells.
    dropped_cells: Vec<usize>,
}

impl TestCaseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table applying `default_header` to rows that gain an identifier.
    pub fn with_default_header(default_header: DefaultHeader) -> Self {
        Self {
            default_header,
            ..Self::default()
        }
    }

    /// Table holding `rows` in order, grouped and marked unmodified.
    pub fn from_rows(rows: Vec<StepRow>) -> Self {
        let mut table = Self::default();
        table.regroup(rows);
        table
    }

    pub fn len(&self) -> usize {
        self.orphans.len() + self.cases.iter().map(TestCase::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` when the table changed since it was created, loaded, or last saved.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Record that the current rows were written out.
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = &StepRow> + '_ {
        self.orphans.iter().chain(self.cases.iter().flat_map(|case| case.steps.iter()))
    }

    pub fn row(&self, index: usize) -> Option<&StepRow> {
        match self.locate(index)? {
            Slot::Orphan(position) => self.orphans.get(position),
            Slot::Case { case, step } => self.cases[case].steps.get(step),
        }
    }

    /// Identifiers of every test case, in table order.
    pub fn test_case_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.cases.iter().map(TestCase::id)
    }

    /// Append a blank row at the end of the table.
    pub fn add_step(&mut self) {
        match self.cases.last_mut() {
            Some(case) => case.steps.push(StepRow::blank()),
            None => self.orphans.push(StepRow::blank()),
        }
        self.touch("add_step");
    }

    /// Insert a blank row so that it ends up at `index`.
    ///
    /// Inserting above the first row of a test case makes the blank row a
    /// continuation of the previous test case.
    pub fn add_above(&mut self, index: usize) -> Result<(), TableError> {
        match self.require(index)? {
            Slot::Orphan(position) => self.orphans.insert(position, StepRow::blank()),
            Slot::Case { case, step: 0 } => match case.checked_sub(1) {
                Some(previous) => self.cases[previous].steps.push(StepRow::blank()),
                None => self.orphans.push(StepRow::blank()),
            },
            Slot::Case { case, step } => self.cases[case].steps.insert(step, StepRow::blank()),
        }
        self.touch("add_above");
        Ok(())
    }

    /// Insert a blank row right after `index`, inside the same group.
    pub fn add_below(&mut self, index: usize) -> Result<(), TableError> {
        match self.require(index)? {
            Slot::Orphan(position) => self.orphans.insert(position + 1, StepRow::blank()),
            Slot::Case { case, step } => self.cases[case].steps.insert(step + 1, StepRow::blank()),
        }
        self.touch("add_below");
        Ok(())
    }

    /// Swap `index` with the row above. Returns `false` for the first row.
    pub fn move_up(&mut self, index: usize) -> Result<bool, TableError> {
        self.require(index)?;
        if index == 0 {
            return Ok(false);
        }
        self.edit_rows(|rows| rows.swap(index - 1, index));
        self.touch("move_up");
        Ok(true)
    }

    /// Swap `index` with the row below. Returns `false` for the last row.
    pub fn move_down(&mut self, index: usize) -> Result<bool, TableError> {
        self.require(index)?;
        if index + 1 >= self.len() {
            return Ok(false);
        }
        self.edit_rows(|rows| rows.swap(index, index + 1));
        self.touch("move_down");
        Ok(true)
    }

    /// Remove a single row.
    ///
    /// Rows carrying an identifier head a test case; removing one needs
    /// `confirmed`, otherwise [`ValidationError::ConfirmationRequired`] is returned.
    pub fn delete_step(&mut self, index: usize, confirmed: bool) -> Result<StepRow, TableError> {
        self.require(index)?;
        if let Some(id) = self.row(index).and_then(StepRow::test_case_id)
            && !confirmed
        {
            return Err(ValidationError::ConfirmationRequired {
                index,
                id: id.to_string(),
            }
            .into());
        }
        let removed = self.edit_rows(|rows| rows.remove(index));
        self.touch("delete_step");
        Ok(removed)
    }

    /// Remove the whole test case containing `index`.
    pub fn delete_test_case(&mut self, index: usize) -> Result<TestCase, TableError> {
        let (slot, span) = self.group_span(index)?;
        let Slot::Case { case, .. } = slot else {
            return Err(ValidationError::NotInTestCase { index }.into());
        };
        let removed = self.cases[case].clone();
        self.edit_rows(|rows| {
            rows.drain(span);
        });
        self.touch("delete_test_case");
        Ok(removed)
    }

    /// Flat indices of every row in the group containing `index`, ascending.
    ///
    /// Rows of the unidentified leading run form a group of their own.
    pub fn select_group(&self, index: usize) -> Result<Vec<usize>, TableError> {
        let (_, span) = self.group_span(index)?;
        Ok(span.collect())
    }

    /// Write `value` into a single cell.
    ///
    /// Identifier and expected-status cells are validated first; a rejected
    /// value leaves the previous one in place.
    pub fn commit_cell(&mut self, index: usize, column: Column, value: &str) -> Result<(), TableError> {
        let slot = self.require(index)?;
        match column {
            Column::TestCaseId => {
                if !self.commit_test_case_id(index, value)? {
                    return Ok(());
                }
            }
            Column::ExpectedStatus => {
                if !is_numeric_status(value) {
                    return Err(ValidationError::NonNumericStatus { value: value.to_string() }.into());
                }
                self.slot_mut(slot).set(column, value);
            }
            _ => {
                self.slot_mut(slot).set(column, value);
            }
        }
        self.touch("commit_cell");
        Ok(())
    }

    /// Returns `true` when `candidate` could be committed as the identifier of a
    /// row currently holding `current_value`.
    pub fn validate_test_id(&self, candidate: &str, current_value: &str) -> bool {
        self.check_test_id(candidate, current_value).is_ok()
    }

    /// Structured form of [`validate_test_id`](Self::validate_test_id).
    pub fn check_test_id(&self, candidate: &str, current_value: &str) -> Result<(), ValidationError> {
        check_test_case_id(candidate, self.test_case_ids(), current_value).map_err(ValidationError::from)
    }

    /// Suggest an identifier derived from `input` that no test case uses yet.
    pub fn suggest_unique_id(&self, input: &str) -> String {
        suggest_unique_test_case_id(input, |candidate| self.test_case_ids().any(|id| id == candidate))
    }

    /// Replace every row with the content of `sheet`.
    ///
    /// The header must match the persisted column names in order; extra
    /// trailing blank header cells are tolerated. On mismatch the table is left
    /// untouched. A successful load leaves the table unmodified.
    pub fn load_table(&mut self, sheet: Sheet) -> Result<(), TableError> {
        check_header(&sheet.header)?;
        let dropped_cells: Vec<usize> = sheet
            .rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| cells.iter().skip(COLUMN_COUNT).any(|cell| !is_blank(cell)))
            .map(|(index, _)| index)
            .collect();
        if !dropped_cells.is_empty() {
            warn!(rows = ?dropped_cells, "cells past the last column were dropped");
        }
        let rows = sheet.rows.into_iter().map(StepRow::from_cells).collect();
        self.regroup(rows);
        self.dropped_cells = dropped_cells;
        self.modified = false;
        debug!(rows = self.len(), cases = self.cases.len(), "loaded table");
        Ok(())
    }

    /// Export the header and every row verbatim, in stored order.
    pub fn save_table(&self) -> Sheet {
        Sheet::from_step_rows(self.rows())
    }

    /// Report invariant violations without changing anything.
    pub fn validate(&self) -> Vec<TableIssue> {
        let mut issues = Vec::new();
        if !self.orphans.is_empty() {
            issues.push(TableIssue::OrphanRows {
                count: self.orphans.len(),
            });
        }
        issues.extend(self.dropped_cells.iter().map(|row| TableIssue::DroppedCells { row: *row }));

        let mut starts: IndexMap<&str, Vec<usize>> = IndexMap::new();
        for (index, row) in self.rows().enumerate() {
            if let Some(id) = row.test_case_id()
                && let Err(error) = check_test_case_id_shape(id)
            {
                issues.push(TableIssue::InvalidTestCaseId {
                    row: index,
                    id: id.to_string(),
                    reason: error.to_string(),
                });
            }
            let status = row.get(Column::ExpectedStatus);
            if !is_numeric_status(status) {
                issues.push(TableIssue::NonNumericStatus {
                    row: index,
                    value: status.to_string(),
                });
            }
        }

        let mut offset = self.orphans.len();
        for case in &self.cases {
            starts.entry(case.id()).or_default().push(offset);
            offset += case.len();
        }
        for (id, rows) in starts {
            if rows.len() > 1 {
                issues.push(TableIssue::DuplicateTestCaseId { id: id.to_string(), rows });
            }
        }
        issues
    }

    /// Returns `false` when `value` is already the row's identifier.
    fn commit_test_case_id(&mut self, index: usize, value: &str) -> Result<bool, TableError> {
        let current = self.row(index).map(|row| row.get(Column::TestCaseId).to_string()).unwrap_or_default();
        self.check_test_id(value, &current)?;
        if value == current {
            return Ok(false);
        }

        let default_header = self.default_header.clone();
        self.edit_rows(|rows| {
            let row = &mut rows[index];
            row.set(Column::TestCaseId, value);
            if is_blank(row.get(Column::HeaderKey)) && is_blank(row.get(Column::HeaderValue)) {
                row.set(Column::HeaderKey, default_header.key);
                row.set(Column::HeaderValue, default_header.value);
            }
        });
        Ok(true)
    }

    fn require(&self, index: usize) -> Result<Slot, TableError> {
        self.locate(index).ok_or(TableError::IndexOutOfRange { index, len: self.len() })
    }

    fn locate(&self, index: usize) -> Option<Slot> {
        if index < self.orphans.len() {
            return Some(Slot::Orphan(index));
        }
        let mut remaining = index - self.orphans.len();
        for (case, test_case) in self.cases.iter().enumerate() {
            if remaining < test_case.len() {
                return Some(Slot::Case { case, step: remaining });
            }
            remaining -= test_case.len();
        }
        None
    }

    fn group_span(&self, index: usize) -> Result<(Slot, Range<usize>), TableError> {
        let slot = self.require(index)?;
        let span = match slot {
            Slot::Orphan(_) => 0..self.orphans.len(),
            Slot::Case { case, .. } => {
                let start = self.orphans.len() + self.cases[..case].iter().map(TestCase::len).sum::<usize>();
                start..start + self.cases[case].len()
            }
        };
        Ok((slot, span))
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut StepRow {
        match slot {
            Slot::Orphan(position) => &mut self.orphans[position],
            Slot::Case { case, step } => &mut self.cases[case].steps[step],
        }
    }

    /// Apply a positional edit to the flat row order, then rebuild the groups.
    fn edit_rows<R>(&mut self, edit: impl FnOnce(&mut Vec<StepRow>) -> R) -> R {
        let mut rows = self.take_rows();
        let result = edit(&mut rows);
        self.regroup(rows);
        result
    }

    fn take_rows(&mut self) -> Vec<StepRow> {
        let mut rows = std::mem::take(&mut self.orphans);
        for case in std::mem::take(&mut self.cases) {
            rows.extend(case.steps);
        }
        rows
    }

    fn regroup(&mut self, rows: Vec<StepRow>) {
        let mut orphans = Vec::new();
        let mut cases: Vec<TestCase> = Vec::new();
        for row in rows {
            let starts_case = match (row.test_case_id(), cases.last()) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(id), Some(current)) => id != current.id(),
            };
            if starts_case {
                cases.push(TestCase { steps: vec![row] });
            } else if let Some(current) = cases.last_mut() {
                current.steps.push(row);
            } else {
                orphans.push(row);
            }
        }
        self.orphans = orphans;
        self.cases = cases;
    }

    fn touch(&mut self, operation: &'static str) {
        self.modified = true;
        debug!(operation, rows = self.len(), cases = self.cases.len(), "table modified");
    }
}

fn is_numeric_status(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.chars().all(|c| c.is_ascii_digit())
}

/// Compare a loaded header with the persisted column names.
fn check_header(header: &[String]) -> Result<(), TableError> {
    let expected = expected_header();
    for (position, expected_name) in expected.iter().enumerate() {
        let found = header.get(position).map(String::as_str);
        if found != Some(expected_name.as_str()) {
            return Err(TableError::HeaderMismatch {
                position,
                expected: expected_name.clone(),
                found: found.unwrap_or("<missing>").to_string(),
            });
        }
    }
    if let Some((offset, extra)) = header[expected.len()..].iter().enumerate().find(|(_, cell)| !is_blank(cell)) {
        return Err(TableError::HeaderMismatch {
            position: expected.len() + offset,
            expected: "<none>".to_string(),
            found: extra.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str, endpoint: &str) -> StepRow {
        let mut row = StepRow::blank();
        row.set(Column::TestCaseId, id);
        row.set(Column::Endpoint, endpoint);
        row
    }

    /// Two test cases: `1` with three continuations, then `2` with one.
    fn sample_table() -> TestCaseTable {
        TestCaseTable::from_rows(vec![
            step("1", "/login"),
            step("", "a"),
            step("", "b"),
            step("", "c"),
            step("2", "/logout"),
            step("", "d"),
        ])
    }

    fn endpoints(table: &TestCaseTable) -> Vec<String> {
        table.rows().map(|row| row.get(Column::Endpoint).to_string()).collect()
    }

    #[test]
    fn rows_are_grouped_into_test_cases() {
        let table = sample_table();
        assert_eq!(table.len(), 6);
        assert_eq!(table.cases().len(), 2);
        assert_eq!(table.cases()[0].len(), 4);
        assert_eq!(table.test_case_ids().collect::<Vec<_>>(), vec!["1", "2"]);
        assert!(!table.is_modified());
    }

    #[test]
    fn add_step_appends_blank_row_and_marks_modified() {
        let mut table = TestCaseTable::new();
        table.add_step();
        table.add_step();
        assert_eq!(table.len(), 2);
        assert!(table.rows().all(StepRow::is_blank));
        assert!(table.is_modified());

        let mut table = sample_table();
        table.add_step();
        assert_eq!(table.cases()[1].len(), 3);
    }

    #[test]
    fn add_above_first_row_of_case_extends_previous_case() {
        let mut table = sample_table();
        table.add_above(4).unwrap();
        assert_eq!(table.len(), 7);
        assert!(table.row(4).unwrap().is_blank());
        assert_eq!(table.row(5).unwrap().test_case_id(), Some("2"));
        assert_eq!(table.cases()[0].len(), 5);
        assert!(table.is_modified());
    }

    #[test]
    fn add_below_inserts_after_index() {
        let mut table = sample_table();
        table.add_below(0).unwrap();
        assert!(table.row(1).unwrap().is_blank());
        assert_eq!(table.row(2).unwrap().get(Column::Endpoint), "a");
        assert!(table.is_modified());
    }

    #[test]
    fn insert_outside_table_is_rejected() {
        let mut table = sample_table();
        assert!(matches!(
            table.add_above(6),
            Err(TableError::IndexOutOfRange { index: 6, len: 6 })
        ));
        assert!(table.add_below(99).is_err());
        assert!(!table.is_modified());
    }

    #[test]
    fn boundary_moves_are_ignored() {
        let mut table = sample_table();
        let before = endpoints(&table);
        assert!(!table.move_up(0).unwrap());
        assert!(!table.move_down(5).unwrap());
        assert_eq!(endpoints(&table), before);
        assert!(!table.is_modified());
        assert!(table.move_down(6).is_err());
    }

    #[test]
    fn moves_swap_neighbours_and_regroup() {
        let mut table = sample_table();
        assert!(table.move_up(4).unwrap());
        assert_eq!(endpoints(&table), vec!["/login", "a", "b", "/logout", "c", "d"]);
        assert_eq!(table.select_group(3).unwrap(), vec![3, 4, 5]);
        assert!(table.is_modified());

        assert!(table.move_down(3).unwrap());
        assert_eq!(endpoints(&table), vec!["/login", "a", "b", "c", "/logout", "d"]);
    }

    #[test]
    fn moving_identified_row_down_can_leave_leading_orphans() {
        let mut table = TestCaseTable::from_rows(vec![step("1", "/a"), step("", "x")]);
        assert!(table.move_down(0).unwrap());
        assert_eq!(table.select_group(0).unwrap(), vec![0]);
        table.mark_saved();
        assert!(matches!(
            table.delete_test_case(0),
            Err(TableError::Validation(ValidationError::NotInTestCase { index: 0 }))
        ));
        assert_eq!(table.len(), 2);
        assert!(!table.is_modified());
    }

    #[test]
    fn delete_identified_step_requires_confirmation() {
        let mut table = sample_table();
        let error = table.delete_step(4, false).unwrap_err();
        assert!(matches!(
            error,
            TableError::Validation(ValidationError::ConfirmationRequired { index: 4, .. })
        ));
        assert_eq!(table.len(), 6);
        assert!(!table.is_modified());

        let removed = table.delete_step(4, true).unwrap();
        assert_eq!(removed.test_case_id(), Some("2"));
        assert_eq!(table.cases().len(), 1);
        assert_eq!(table.cases()[0].len(), 5);
        assert!(table.is_modified());
    }

    #[test]
    fn delete_continuation_step_needs_no_confirmation() {
        let mut table = sample_table();
        let removed = table.delete_step(2, false).unwrap();
        assert_eq!(removed.get(Column::Endpoint), "b");
        assert_eq!(endpoints(&table), vec!["/login", "a", "c", "/logout", "d"]);
        assert!(table.is_modified());
    }

    #[test]
    fn delete_test_case_removes_whole_run_only() {
        for index in 0..4 {
            let mut table = sample_table();
            let removed = table.delete_test_case(index).unwrap();
            assert_eq!(removed.id(), "1");
            assert_eq!(removed.len(), 4);
            assert_eq!(endpoints(&table), vec!["/logout", "d"]);
            assert!(table.is_modified());
        }
    }

    #[test]
    fn delete_test_case_merges_neighbours_with_same_id() {
        let mut table = TestCaseTable::from_rows(vec![step("1", "a"), step("2", "b"), step("1", "c")]);
        table.delete_test_case(1).unwrap();
        assert_eq!(table.cases().len(), 1);
        assert_eq!(table.select_group(1).unwrap(), vec![0, 1]);
    }

    #[test]
    fn select_group_is_contiguous_from_any_member() {
        let table = sample_table();
        for index in 0..4 {
            assert_eq!(table.select_group(index).unwrap(), vec![0, 1, 2, 3]);
        }
        assert_eq!(table.select_group(5).unwrap(), vec![4, 5]);
        assert!(table.select_group(6).is_err());
    }

    #[test]
    fn committed_id_is_unique_and_self_commit_is_idempotent() {
        let mut table = TestCaseTable::from_rows(vec![StepRow::blank(), StepRow::blank()]);
        table.commit_cell(0, Column::TestCaseId, "123").unwrap();

        let error = table.commit_cell(1, Column::TestCaseId, "123").unwrap_err();
        assert!(matches!(
            error,
            TableError::Validation(ValidationError::DuplicateOrInvalidId(_))
        ));
        assert_eq!(table.row(1).unwrap().get(Column::TestCaseId), "");
        assert_eq!(table.row(0).unwrap().test_case_id(), Some("123"));

        table.commit_cell(0, Column::TestCaseId, "123").unwrap();
        assert!(table.validate_test_id("123", "123"));
        assert!(!table.validate_test_id("123", ""));
    }

    #[test]
    fn invalid_ids_keep_previous_value() {
        let mut table = sample_table();
        for candidate in ["#1", "1#", "123456", "", "a1"] {
            assert!(table.commit_cell(4, Column::TestCaseId, candidate).is_err(), "{candidate}");
            assert_eq!(table.row(4).unwrap().test_case_id(), Some("2"));
        }
        assert!(!table.is_modified());
    }

    #[test]
    fn committing_id_applies_default_header_only_when_blank() {
        let mut table = TestCaseTable::from_rows(vec![step("1", "/a"), StepRow::blank(), StepRow::blank()]);
        table.commit_cell(1, Column::TestCaseId, "2").unwrap();
        assert_eq!(table.row(1).unwrap().get(Column::HeaderKey), "Content-Type");
        assert_eq!(table.row(1).unwrap().get(Column::HeaderValue), "application/json");
        assert_eq!(table.cases().len(), 2);

        table.commit_cell(2, Column::HeaderKey, "Accept").unwrap();
        table.commit_cell(2, Column::TestCaseId, "3").unwrap();
        assert_eq!(table.row(2).unwrap().get(Column::HeaderKey), "Accept");
        assert_eq!(table.row(2).unwrap().get(Column::HeaderValue), "");
    }

    #[test]
    fn configured_default_header_is_used() {
        let mut table = TestCaseTable::with_default_header(DefaultHeader {
            key: "Accept".to_string(),
            value: "text/csv".to_string(),
        });
        table.add_step();
        table.commit_cell(0, Column::TestCaseId, "#").unwrap();
        assert_eq!(table.row(0).unwrap().get(Column::HeaderValue), "text/csv");
    }

    #[test]
    fn expected_status_must_be_numeric() {
        let mut table = sample_table();
        assert!(table.commit_cell(0, Column::ExpectedStatus, "OK").is_err());
        table.commit_cell(0, Column::ExpectedStatus, "201").unwrap();
        table.commit_cell(0, Column::ExpectedStatus, "").unwrap();
        assert_eq!(table.row(0).unwrap().get(Column::ExpectedStatus), "");
    }

    #[test]
    fn suggestion_avoids_existing_ids() {
        let table = TestCaseTable::from_rows(vec![step("12#3", ""), step("12#31", "")]);
        assert_eq!(table.suggest_unique_id("12a#3"), "12#32");
        assert_eq!(table.suggest_unique_id("zzz"), "1");
    }

    #[test]
    fn save_then_load_round_trips_rows() {
        let mut table = sample_table();
        table.add_step();
        table.commit_cell(1, Column::Payload, "{\"x\": 1}").unwrap();
        let sheet = table.save_table();
        assert_eq!(sheet.header, expected_header());
        assert!(sheet.rows.iter().all(|row| row.len() == COLUMN_COUNT));

        let mut reloaded = TestCaseTable::new();
        reloaded.load_table(sheet.clone()).unwrap();
        assert_eq!(reloaded.save_table(), sheet);
        assert!(!reloaded.is_modified());
    }

    #[test]
    fn header_missing_a_column_is_rejected_without_changes() {
        let mut table = sample_table();
        table.add_step();
        let before = table.save_table();

        let mut header = expected_header();
        header.remove(1);
        let error = table.load_table(Sheet::new(header, vec![vec!["9".to_string()]])).unwrap_err();
        assert!(matches!(error, TableError::HeaderMismatch { position: 1, .. }));
        assert_eq!(table.save_table(), before);
        assert!(table.is_modified());
    }

    #[test]
    fn header_with_trailing_blank_cells_is_accepted() {
        let mut header = expected_header();
        header.push(String::new());
        let mut table = TestCaseTable::new();
        table.load_table(Sheet::new(header.clone(), Vec::new())).unwrap();

        header.push("Extra".to_string());
        assert!(matches!(
            table.load_table(Sheet::new(header, Vec::new())),
            Err(TableError::HeaderMismatch { position: 22, .. })
        ));
    }

    #[test]
    fn validate_reports_loaded_violations() {
        let mut bad_status = step("1", "/a");
        bad_status.set(Column::ExpectedStatus, "two hundred");
        let table = TestCaseTable::from_rows(vec![
            step("", "orphan"),
            bad_status,
            step("#1", "/b"),
            step("1", "/c"),
        ]);
        let issues = table.validate();
        assert!(issues.contains(&TableIssue::OrphanRows { count: 1 }));
        assert!(issues.iter().any(|issue| matches!(issue, TableIssue::InvalidTestCaseId { row: 2, .. })));
        assert!(issues.iter().any(|issue| matches!(issue, TableIssue::NonNumericStatus { row: 1, .. })));
        assert!(issues.contains(&TableIssue::DuplicateTestCaseId {
            id: "1".to_string(),
            rows: vec![1, 3],
        }));
        assert!(TestCaseTable::new().validate().is_empty());
    }

    #[test]
    fn load_reports_lines_with_cells_past_the_last_column() {
        let mut wide = step("1", "/a").to_cells();
        wide.push("stray".to_string());
        let mut padded = step("", "b").to_cells();
        padded.push("  ".to_string());
        let mut table = TestCaseTable::new();
        table.load_table(Sheet::new(expected_header(), vec![wide, padded])).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.validate(), vec![TableIssue::DroppedCells { row: 0 }]);
        assert!(table.save_table().rows.iter().all(|row| row.len() == COLUMN_COUNT));

        table.load_table(Sheet::new(expected_header(), Vec::new())).unwrap();
        assert!(table.validate().is_empty());
    }
}
