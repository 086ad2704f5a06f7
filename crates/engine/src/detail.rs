//! Detail panel view-model.
//!
//! Selecting a row produces a [`GroupView`]: the case-level fields from the
//! group's first row plus one [`DetailRow`] per row in the group, each
//! holding the key/value pairs a detail panel edits. The view is a snapshot;
//! edits go back through [`TestCaseTable::commit_cell`] and the view is
//! derived again.

use casegrid_types::{Column, StepRow};
use serde::Serialize;

use crate::error::TableError;
use crate::table::TestCaseTable;

/// Key/value pairs that a single row can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairField {
    Header,
    Param,
    ModifyPayload,
    ResponseCapture,
}

impl PairField {
    pub const ALL: [PairField; 4] = [
        PairField::Header,
        PairField::Param,
        PairField::ModifyPayload,
        PairField::ResponseCapture,
    ];

    pub fn key_column(self) -> Column {
        match self {
            PairField::Header => Column::HeaderKey,
            PairField::Param => Column::ParamKey,
            PairField::ModifyPayload => Column::ModifyPayloadKey,
            PairField::ResponseCapture => Column::ResponseKeyName,
        }
    }

    pub fn value_column(self) -> Column {
        match self {
            PairField::Header => Column::HeaderValue,
            PairField::Param => Column::ParamValue,
            PairField::ModifyPayload => Column::ModifyPayloadValue,
            PairField::ResponseCapture => Column::CaptureEnvVar,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    fn from_row(row: &StepRow, field: PairField) -> Self {
        Self {
            key: row.get(field.key_column()).to_string(),
            value: row.get(field.value_column()).to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.key.trim().is_empty() && self.value.trim().is_empty()
    }
}

/// Pairs carried by one row of the selected group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    /// Flat table index of the row.
    pub index: usize,
    pub header: KeyValue,
    pub param: KeyValue,
    pub modify_payload: KeyValue,
    pub response_capture: KeyValue,
}

impl DetailRow {
    pub fn pair(&self, field: PairField) -> &KeyValue {
        match field {
            PairField::Header => &self.header,
            PairField::Param => &self.param,
            PairField::ModifyPayload => &self.modify_payload,
            PairField::ResponseCapture => &self.response_capture,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthView {
    pub auth_type: String,
    pub field1: String,
    pub field2: String,
}

/// Snapshot of the group containing the selected row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupView {
    /// `None` for the unidentified leading run of a loaded workbook.
    pub test_case_id: Option<String>,
    /// Index of the row the view was derived from.
    pub selected: usize,
    pub method: String,
    pub endpoint: String,
    pub payload: String,
    pub payload_type: String,
    pub auth: AuthView,
    pub expected_status: String,
    pub description: String,
    pub verify_response: String,
    /// One entry per row in the group, in row order.
    pub rows: Vec<DetailRow>,
}

impl GroupView {
    /// Derive the view for the group containing `index`.
    pub fn for_row(table: &TestCaseTable, index: usize) -> Result<Self, TableError> {
        let indices = table.select_group(index)?;
        let mut rows = Vec::with_capacity(indices.len());
        for row_index in &indices {
            let row = table.row(*row_index).ok_or(TableError::IndexOutOfRange {
                index: *row_index,
                len: table.len(),
            })?;
            rows.push(DetailRow {
                index: *row_index,
                header: KeyValue::from_row(row, PairField::Header),
                param: KeyValue::from_row(row, PairField::Param),
                modify_payload: KeyValue::from_row(row, PairField::ModifyPayload),
                response_capture: KeyValue::from_row(row, PairField::ResponseCapture),
            });
        }

        let first = indices
            .first()
            .and_then(|first| table.row(*first))
            .cloned()
            .unwrap_or_default();
        let text = |column: Column| first.get(column).to_string();
        Ok(Self {
            test_case_id: first.test_case_id().map(str::to_string),
            selected: index,
            method: text(Column::Method),
            endpoint: text(Column::Endpoint),
            payload: text(Column::Payload),
            payload_type: text(Column::PayloadType),
            auth: AuthView {
                auth_type: text(Column::AuthType),
                field1: text(Column::AuthField1),
                field2: text(Column::AuthField2),
            },
            expected_status: text(Column::ExpectedStatus),
            description: text(Column::TestDescription),
            verify_response: text(Column::VerifyResponse),
            rows,
        })
    }

    /// Flat index of the group's first row; case-level edits target this row.
    pub fn first_index(&self) -> Option<usize> {
        self.rows.first().map(|row| row.index)
    }

    /// Non-blank pairs of one kind, in row order.
    pub fn pairs(&self, field: PairField) -> Vec<&KeyValue> {
        self.rows
            .iter()
            .map(|row| row.pair(field))
            .filter(|pair| !pair.is_blank())
            .collect()
    }
}

/// A single edit made in the detail panel, ready to be committed to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailEdit {
    pub index: usize,
    pub column: Column,
    pub value: String,
}

impl DetailEdit {
    /// Edit of the key or value half of a pair on a given row.
    pub fn pair(index: usize, field: PairField, key: bool, value: impl Into<String>) -> Self {
        let column = if key { field.key_column() } else { field.value_column() };
        Self {
            index,
            column,
            value: value.into(),
        }
    }

    /// Edit of a case-level field, applied to the first row of `view`.
    pub fn case_field(view: &GroupView, column: Column, value: impl Into<String>) -> Self {
        Self {
            index: view.first_index().unwrap_or(view.selected),
            column,
            value: value.into(),
        }
    }

    pub fn apply(&self, table: &mut TestCaseTable) -> Result<(), TableError> {
        table.commit_cell(self.index, self.column, &self.value)
    }
}
