//! # casegrid engine
//!
//! The in-memory model behind the casegrid editor: a grouped table of API
//! test steps, the detail view derived from a selected row, and the editor
//! session that ties a table to a workbook on disk.
//!
//! ```rust
//! use casegrid_engine::{Column, TestCaseTable};
//!
//! let mut table = TestCaseTable::new();
//! table.add_step();
//! table.commit_cell(0, Column::TestCaseId, "1")?;
//! table.add_below(0)?;
//! assert_eq!(table.select_group(1)?, vec![0, 1]);
//! # Ok::<(), casegrid_engine::TableError>(())
//! ```
//!
//! Rows are grouped into test cases by their identifier: a row with a
//! non-blank id starts a case and the blank-id rows after it belong to that
//! case. Positional edits regroup the table so the grouping always matches the
//! flat row order.

pub mod detail;
pub mod error;
pub mod session;
pub mod table;

pub use casegrid_types::{Column, Sheet, StepRow};
pub use detail::{DetailEdit, DetailRow, GroupView, KeyValue, PairField};
pub use error::{ErrorKind, TableError, ValidationError};
pub use session::EditorSession;
pub use table::{TableIssue, TestCase, TestCaseTable};
