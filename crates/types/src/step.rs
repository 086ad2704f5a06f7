//! Step rows and the fixed column layout shared by every workbook.
//!
//! A workbook is a flat table: each line is a [`StepRow`] with exactly
//! [`COLUMN_COUNT`] text cells. The column order below is the persisted order and
//! must not change, otherwise previously saved workbooks stop loading.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of cells in every step row.
pub const COLUMN_COUNT: usize = 21;

/// Semantic role of each cell in a step row, in persisted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Column {
    /// Identity of the test case started by this row; blank on continuation rows.
    TestCaseId,
    /// HTTP method (GET, POST, ...).
    Method,
    /// Request endpoint or path.
    Endpoint,
    HeaderKey,
    HeaderValue,
    ParamKey,
    ParamValue,
    /// Request body template.
    Payload,
    /// Body encoding, for example `json` or `form`.
    PayloadType,
    ModifyPayloadKey,
    ModifyPayloadValue,
    /// Response field captured after the step runs.
    ResponseKeyName,
    /// Environment variable receiving the captured response field.
    CaptureEnvVar,
    AuthType,
    AuthField1,
    AuthField2,
    Reserved1,
    Reserved2,
    /// Expected HTTP status; numeric when present.
    ExpectedStatus,
    TestDescription,
    VerifyResponse,
}

impl Column {
    /// Every column in persisted order.
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::TestCaseId,
        Column::Method,
        Column::Endpoint,
        Column::HeaderKey,
        Column::HeaderValue,
        Column::ParamKey,
        Column::ParamValue,
        Column::Payload,
        Column::PayloadType,
        Column::ModifyPayloadKey,
        Column::ModifyPayloadValue,
        Column::ResponseKeyName,
        Column::CaptureEnvVar,
        Column::AuthType,
        Column::AuthField1,
        Column::AuthField2,
        Column::Reserved1,
        Column::Reserved2,
        Column::ExpectedStatus,
        Column::TestDescription,
        Column::VerifyResponse,
    ];

    /// Zero-based position of the column within a row.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column at the given zero-based position.
    pub fn from_index(index: usize) -> Option<Column> {
        Self::ALL.get(index).copied()
    }

    /// Header text written to the first row of a workbook.
    ///
    /// The two reserved columns are persisted with empty header cells.
    pub fn header(self) -> &'static str {
        match self {
            Column::TestCaseId => "TestCaseID",
            Column::Method => "Method",
            Column::Endpoint => "Endpoint",
            Column::HeaderKey => "HeaderKey",
            Column::HeaderValue => "HeaderValue",
            Column::ParamKey => "ParamKey",
            Column::ParamValue => "ParamValue",
            Column::Payload => "Payload",
            Column::PayloadType => "PayloadType",
            Column::ModifyPayloadKey => "ModifyPayloadKey",
            Column::ModifyPayloadValue => "ModifyPayloadValue",
            Column::ResponseKeyName => "ResponseKeyName",
            Column::CaptureEnvVar => "CaptureEnvVar",
            Column::AuthType => "AuthType",
            Column::AuthField1 => "AuthField1",
            Column::AuthField2 => "AuthField2",
            Column::Reserved1 | Column::Reserved2 => "",
            Column::ExpectedStatus => "ExpectedStatus",
            Column::TestDescription => "TestDescription",
            Column::VerifyResponse => "VerifyResponse",
        }
    }

    /// Field name used on the command line and in JSON output.
    pub fn field_name(self) -> &'static str {
        match self {
            Column::TestCaseId => "testCaseId",
            Column::Method => "method",
            Column::Endpoint => "endpoint",
            Column::HeaderKey => "headerKey",
            Column::HeaderValue => "headerValue",
            Column::ParamKey => "paramKey",
            Column::ParamValue => "paramValue",
            Column::Payload => "payload",
            Column::PayloadType => "payloadType",
            Column::ModifyPayloadKey => "modifyPayloadKey",
            Column::ModifyPayloadValue => "modifyPayloadValue",
            Column::ResponseKeyName => "responseKeyName",
            Column::CaptureEnvVar => "captureEnvVar",
            Column::AuthType => "authType",
            Column::AuthField1 => "authField1",
            Column::AuthField2 => "authField2",
            Column::Reserved1 => "reserved1",
            Column::Reserved2 => "reserved2",
            Column::ExpectedStatus => "expectedStatus",
            Column::TestDescription => "testDescription",
            Column::VerifyResponse => "verifyResponse",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Returned when a column name or position does not identify a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColumnError(pub String);

impl fmt::Display for ParseColumnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown column '{}'", self.0)
    }
}

impl std::error::Error for ParseColumnError {}

impl FromStr for Column {
    type Err = ParseColumnError;

    /// Accepts a field name (`headerKey`), a header (`HeaderKey`), either
    /// case-insensitively, or a zero-based column position.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(position) = trimmed.parse::<usize>() {
            return Column::from_index(position).ok_or_else(|| ParseColumnError(s.to_string()));
        }
        Column::ALL
            .iter()
            .copied()
            .find(|column| {
                column.field_name().eq_ignore_ascii_case(trimmed)
                    || (!column.header().is_empty() && column.header().eq_ignore_ascii_case(trimmed))
            })
            .ok_or_else(|| ParseColumnError(s.to_string()))
    }
}

/// Header row expected at the top of every persisted workbook.
pub fn expected_header() -> Vec<String> {
    Column::ALL.iter().map(|column| column.header().to_string()).collect()
}

/// Returns `true` when the text is empty or whitespace only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// One line of the test table.
///
/// The first row of a test case carries its identifier in
/// [`Column::TestCaseId`]; continuation rows leave it blank and carry extra
/// header, parameter, payload-modification, or capture pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRow {
    cells: [String; COLUMN_COUNT],
}

impl StepRow {
    /// A row with every cell blank.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Build a row from raw cells, padding missing cells with blanks and
    /// dropping cells past [`COLUMN_COUNT`].
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row = Self::blank();
        for (slot, value) in row.cells.iter_mut().zip(cells) {
            *slot = value.into();
        }
        row
    }

    /// Cells in persisted order.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn to_cells(&self) -> Vec<String> {
        self.cells.to_vec()
    }

    pub fn get(&self, column: Column) -> &str {
        &self.cells[column.index()]
    }

    /// Replace a cell, returning the previous value.
    pub fn set(&mut self, column: Column, value: impl Into<String>) -> String {
        std::mem::replace(&mut self.cells[column.index()], value.into())
    }

    /// Test case identifier carried by this row, when non-blank.
    pub fn test_case_id(&self) -> Option<&str> {
        let id = self.get(Column::TestCaseId).trim();
        if id.is_empty() { None } else { Some(id) }
    }

    /// Returns `true` when this row has no identifier and continues the preceding case.
    pub fn is_continuation(&self) -> bool {
        self.test_case_id().is_none()
    }

    /// Returns `true` when every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| is_blank(cell))
    }
}

impl Index<Column> for StepRow {
    type Output = String;

    fn index(&self, column: Column) -> &Self::Output {
        &self.cells[column.index()]
    }
}

impl IndexMut<Column> for StepRow {
    fn index_mut(&mut self, column: Column) -> &mut Self::Output {
        &mut self.cells[column.index()]
    }
}
