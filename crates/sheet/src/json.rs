//! JSON record output for tables
//!
//! Tables serialize as an array of objects `[{"name": "Alice", "age": 30}, ...]`
//! with keys in column order. Values that JSON cannot carry natively are
//! normalized: nulls and non-finite floats become `null`, date-times become
//! ISO-8601 strings.

use crate::cell::CellValue;
use crate::table::Table;
use indexmap::IndexMap;
use serde_json::{Number, Value};

/// One output row, keyed by column name in column order.
pub type Record = IndexMap<String, Value>;

/// Options controlling how cells are rendered as JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Emit every non-null scalar as a string.
    pub stringify: bool,
}

impl SerializeOptions {
    /// Set whether scalars are emitted as strings
    #[must_use]
    pub fn with_stringify(mut self, stringify: bool) -> Self {
        self.stringify = stringify;
        self
    }
}

/// Convert a cell to its JSON form.
#[must_use]
pub fn cell_to_json_value(cell: &CellValue, options: &SerializeOptions) -> Value {
    match cell {
        CellValue::Null => Value::Null,
        CellValue::Float(f) if !f.is_finite() => Value::Null,
        _ if options.stringify => Value::String(cell.as_text()),
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Int(i) => Value::Number(Number::from(*i)),
        CellValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        CellValue::String(s) => Value::String(s.clone()),
        CellValue::DateTime(_) => Value::String(cell.as_text()),
    }
}

/// Convert a table into ordered JSON records.
#[must_use]
pub fn serialize(table: &Table, options: &SerializeOptions) -> Vec<Record> {
    table
        .rows()
        .map(|row| {
            table
                .columns()
                .iter()
                .zip(row)
                .map(|(name, cell)| (name.clone(), cell_to_json_value(cell, options)))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn mixed_table() -> Table {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let mut table = Table::with_columns("Data", vec!["name", "score", "joined", "active"]);
        table.push_row(vec![
            CellValue::from("Alice"),
            CellValue::Float(f64::NAN),
            CellValue::DateTime(date),
            CellValue::Bool(true),
        ]);
        table.push_row(vec![
            CellValue::Null,
            CellValue::Int(7),
            CellValue::Float(f64::INFINITY),
            CellValue::Float(0.5),
        ]);
        table
    }

    #[test]
    fn test_special_values_are_normalized() {
        let records = serialize(&mixed_table(), &SerializeOptions::default());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], json!("Alice"));
        assert_eq!(records[0]["score"], Value::Null);
        assert_eq!(records[0]["joined"], json!("2024-01-15T00:00:00"));
        assert_eq!(records[0]["active"], json!(true));
        assert_eq!(records[1]["name"], Value::Null);
        assert_eq!(records[1]["score"], json!(7));
        assert_eq!(records[1]["joined"], Value::Null);
        assert_eq!(records[1]["active"], json!(0.5));
    }

    #[test]
    fn test_json_text_has_no_nan_token() {
        let records = serialize(&mixed_table(), &SerializeOptions::default());
        let text = serde_json::to_string(&records).unwrap();
        assert!(!text.contains("NaN"));
        assert!(!text.contains("inf"));
        assert!(text.starts_with(r#"[{"name":"Alice","score":null,"joined":"2024-01-15T00:00:00""#));
    }

    #[test]
    fn test_records_keep_column_order() {
        let records = serialize(&mixed_table(), &SerializeOptions::default());
        let keys: Vec<&str> = records[0].keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "score", "joined", "active"]);
    }

    #[test]
    fn test_stringify_keeps_nulls() {
        let options = SerializeOptions::default().with_stringify(true);
        let records = serialize(&mixed_table(), &options);

        assert_eq!(records[0]["score"], Value::Null);
        assert_eq!(records[0]["active"], json!("true"));
        assert_eq!(records[1]["name"], Value::Null);
        assert_eq!(records[1]["score"], json!("7"));
        assert_eq!(records[1]["active"], json!("0.5"));
    }

    #[test]
    fn test_zero_column_table_yields_empty_records() {
        let mut table = Table::with_columns::<String>("t", Vec::new());
        table.push_row(Vec::new());
        let records = serialize(&table, &SerializeOptions::default());
        assert_eq!(records, vec![Record::new()]);
    }
}
