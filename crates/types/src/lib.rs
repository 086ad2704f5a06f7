//! Shared type definitions for casegrid workbooks.
//!
//! Everything here is plain data plus the pure rules that govern it: the
//! fixed step-row layout, the persisted header, test case identifier rules,
//! and the contract of the UI automation driver.

pub mod automation;
pub mod step;
pub mod test_case_id;

use serde::{Deserialize, Serialize};

pub use automation::{AutomationError, AutomationSession, Locator, LocatorStrategy};
pub use step::{COLUMN_COUNT, Column, ParseColumnError, StepRow, expected_header, is_blank};
pub use test_case_id::{
    MAX_TEST_CASE_ID_LEN, TestCaseIdError, check_test_case_id, check_test_case_id_shape, suggest_unique_test_case_id,
    validate_test_case_id,
};

/// Raw tabular content exchanged with a store: a header line followed by data
/// lines, every cell as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    /// Cells of the first line.
    pub header: Vec<String>,
    /// Remaining lines in stored order.
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Sheet carrying the expected header and the given step rows.
    pub fn from_step_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a StepRow>,
    {
        Self {
            header: expected_header(),
            rows: rows.into_iter().map(StepRow::to_cells).collect(),
        }
    }
}
