//! Terminal and JSON rendering of tables and group views.

use casegrid_engine::{Column, GroupView, KeyValue, StepRow, TestCaseTable};
use casegrid_util::{is_sensitive_key, redact_sensitive};
use indexmap::IndexMap;
use serde_json::Value;

/// Value of `column` as it should be displayed.
fn display_cell(row: &StepRow, column: Column, reveal: bool) -> String {
    let value = row.get(column);
    if reveal || !is_credential(row, column) {
        return value.to_string();
    }
    redact_sensitive(value)
}

fn is_credential(row: &StepRow, column: Column) -> bool {
    match column {
        Column::AuthField1 | Column::AuthField2 => true,
        Column::HeaderValue => is_sensitive_key(row.get(Column::HeaderKey)),
        Column::ParamValue => is_sensitive_key(row.get(Column::ParamKey)),
        Column::ModifyPayloadValue => is_sensitive_key(row.get(Column::ModifyPayloadKey)),
        _ => false,
    }
}

/// One JSON object per row, keyed by field name, omitting blank cells.
pub fn rows_json(table: &TestCaseTable, reveal: bool) -> Vec<IndexMap<&'static str, Value>> {
    table
        .rows()
        .enumerate()
        .map(|(index, row)| {
            let mut fields = IndexMap::new();
            fields.insert("row", Value::from(index));
            for column in Column::ALL {
                if row.get(column).trim().is_empty() {
                    continue;
                }
                fields.insert(column.field_name(), Value::String(display_cell(row, column, reveal)));
            }
            fields
        })
        .collect()
}

/// Fixed-width listing: row, id, method, endpoint, expected status, and any key/value pairs.
pub fn rows_text(table: &TestCaseTable, reveal: bool) -> String {
    let mut out = format!("{:>4}  {:<5}  {:<7}  {:<32}  {:<6}  {}\n", "ROW", "ID", "METHOD", "ENDPOINT", "STATUS", "PAIRS");
    for (index, row) in table.rows().enumerate() {
        let pairs = [
            (Column::HeaderKey, Column::HeaderValue),
            (Column::ParamKey, Column::ParamValue),
            (Column::ModifyPayloadKey, Column::ModifyPayloadValue),
            (Column::ResponseKeyName, Column::CaptureEnvVar),
        ]
        .into_iter()
        .filter(|(key, value)| !row.get(*key).trim().is_empty() || !row.get(*value).trim().is_empty())
        .map(|(key, value)| format!("{}={}", row.get(key), display_cell(row, value, reveal)))
        .collect::<Vec<_>>()
        .join(" ");
        out.push_str(&format!(
            "{:>4}  {:<5}  {:<7}  {:<32}  {:<6}  {}\n",
            index,
            row.get(Column::TestCaseId),
            row.get(Column::Method),
            row.get(Column::Endpoint),
            row.get(Column::ExpectedStatus),
            pairs
        ));
    }
    out
}

/// `" (test case 'ID')"` when the removed row carried an identifier.
pub fn id_suffix(row: &StepRow) -> String {
    row.test_case_id()
        .map(|id| format!(" (test case '{id}')"))
        .unwrap_or_default()
}

/// Replace credentials in a group view with their redacted form.
pub fn mask_view(view: &mut GroupView) {
    view.auth.field1 = redact_sensitive(&view.auth.field1);
    view.auth.field2 = redact_sensitive(&view.auth.field2);
    for row in &mut view.rows {
        mask_pair(&mut row.header);
        mask_pair(&mut row.param);
        mask_pair(&mut row.modify_payload);
    }
}

fn mask_pair(pair: &mut KeyValue) {
    if is_sensitive_key(&pair.key) {
        pair.value = redact_sensitive(&pair.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TestCaseTable {
        let mut first = StepRow::blank();
        first.set(Column::TestCaseId, "1");
        first.set(Column::Method, "GET");
        first.set(Column::HeaderKey, "Authorization");
        first.set(Column::HeaderValue, "Bearer abcdef123456");
        first.set(Column::AuthField2, "hunter22");
        let mut second = StepRow::blank();
        second.set(Column::ParamKey, "page");
        second.set(Column::ParamValue, "2");
        TestCaseTable::from_rows(vec![first, second])
    }

    #[test]
    fn json_rows_mask_credentials_unless_revealed() {
        let masked = rows_json(&table(), false);
        assert_eq!(masked[0]["headerValue"], "<redacted>3456");
        assert_eq!(masked[0]["authField2"], "<redacted>er22");
        assert_eq!(masked[1]["paramValue"], "2");
        assert!(masked[1].get("testCaseId").is_none());

        let revealed = rows_json(&table(), true);
        assert_eq!(revealed[0]["headerValue"], "Bearer abcdef123456");
    }

    #[test]
    fn text_listing_has_a_line_per_row() {
        let text = rows_text(&table(), false);
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("Authorization=<redacted>3456"));
        assert!(text.contains("page=2"));
    }

    #[test]
    fn group_view_is_masked_in_place() {
        let mut view = GroupView::for_row(&table(), 1).unwrap();
        mask_view(&mut view);
        assert_eq!(view.rows[0].header.value, "<redacted>3456");
        assert_eq!(view.rows[1].param.value, "2");
        assert_eq!(view.auth.field2, "<redacted>er22");
    }
}
