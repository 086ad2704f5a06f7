//! Error taxonomy for table edits and workbook sessions.

use casegrid_types::TestCaseIdError;
use casegrid_util::StoreError;
use thiserror::Error;

/// An edit that was refused. The table is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    DuplicateOrInvalidId(#[from] TestCaseIdError),

    #[error("expected status '{value}' must be numeric")]
    NonNumericStatus { value: String },

    #[error("row {index} does not belong to a test case")]
    NotInTestCase { index: usize },

    #[error("row {index} starts test case '{id}'; deleting it needs confirmation")]
    ConfirmationRequired { index: usize, id: String },
}

/// Coarse classification used by front ends to decide how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local, inline rejection of a single edit.
    Validation,
    /// Blocking problem with the shape of the request or the data.
    Structural,
    /// Store read/write failure.
    Io,
}

/// Errors returned by [`TestCaseTable`](crate::TestCaseTable) and
/// [`EditorSession`](crate::EditorSession).
#[derive(Debug, Error)]
pub enum TableError {
    #[error("invalid edit: {0}")]
    Validation(#[from] ValidationError),

    #[error("row {index} is out of range (table has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("header mismatch at column {position}: expected '{expected}', found '{found}'")]
    HeaderMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("workbook has no path yet; save it under a file name first")]
    NoWorkbookPath,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TableError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TableError::Validation(_) => ErrorKind::Validation,
            TableError::IndexOutOfRange { .. } | TableError::HeaderMismatch { .. } => ErrorKind::Structural,
            TableError::NoWorkbookPath | TableError::Store(_) => ErrorKind::Io,
        }
    }
}

impl From<TestCaseIdError> for TableError {
    fn from(error: TestCaseIdError) -> Self {
        TableError::Validation(ValidationError::DuplicateOrInvalidId(error))
    }
}
