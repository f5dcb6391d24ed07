use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::table::Table;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::Cursor;

/// Turns raw uploaded bytes into sheet names and tables.
///
/// Implementations must accept arbitrary input and fail with
/// `SheetError::InvalidWorkbook` rather than panic.
pub trait WorkbookLoader: Send + Sync {
    /// List the sheet names in workbook order.
    fn list_sheets(&self, bytes: &[u8]) -> Result<Vec<String>>;

    /// Parse one sheet, using its first row as the header.
    fn parse_sheet(&self, bytes: &[u8], name: &str) -> Result<Table>;
}

/// Loader backed by calamine; detects xlsx, xlsm, xlsb, xls and ods.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineLoader;

impl CalamineLoader {
    fn open(bytes: &[u8]) -> Result<Sheets<Cursor<Vec<u8>>>> {
        if bytes.is_empty() {
            return Err(SheetError::InvalidWorkbook("empty upload".to_string()));
        }
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| SheetError::InvalidWorkbook(e.to_string()))
    }
}

impl WorkbookLoader for CalamineLoader {
    fn list_sheets(&self, bytes: &[u8]) -> Result<Vec<String>> {
        Ok(Self::open(bytes)?.sheet_names())
    }

    fn parse_sheet(&self, bytes: &[u8], name: &str) -> Result<Table> {
        let mut workbook = Self::open(bytes)?;
        if !workbook.sheet_names().iter().any(|s| s == name) {
            return Err(SheetError::NotFound {
                name: name.to_string(),
            });
        }

        let range = workbook
            .worksheet_range(name)
            .map_err(|e| SheetError::InvalidWorkbook(format!("cannot read sheet '{name}': {e}")))?;

        Ok(range_to_table(name, &range))
    }
}

/// Convert a cell range into a table, first row as header.
fn range_to_table(name: &str, range: &Range<Data>) -> Table {
    let mut rows = range.rows();

    let Some(header) = rows.next() else {
        return Table::with_columns::<String>(name, Vec::new());
    };

    let header: Vec<CellValue> = header.iter().map(data_to_cell_value).collect();
    let mut table = Table::from_header_row(name, &header);

    for row in rows {
        table.push_row(row.iter().map(data_to_cell_value).collect());
    }

    table
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => number_to_cell_value(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                return dt
                    .as_duration()
                    .map_or(CellValue::Float(dt.as_f64()), |d| CellValue::String(d.to_string()));
            }
            dt.as_datetime()
                .map_or(CellValue::Float(dt.as_f64()), CellValue::DateTime)
        }
        Data::DateTimeIso(s) => {
            parse_iso_datetime(s).map_or_else(|| CellValue::String(s.clone()), CellValue::DateTime)
        }
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
    }
}

/// Workbooks store every number as a float; whole ones become `Int` so
/// their JSON form and filter text both read `1200`.
fn number_to_cell_value(f: f64) -> CellValue {
    // Exact integers only go up to 2^53.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_EXACT {
        CellValue::Int(f as i64)
    } else {
        CellValue::Float(f)
    }
}

/// Parse the ISO forms ODS files store dates in.
fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    s.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| s.parse::<NaiveDate>().ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;
    use rust_xlsxwriter::{Format, Workbook};

    fn sample_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        let data = workbook.add_worksheet();
        data.set_name("Data").unwrap();
        data.write_string(0, 0, "Village Name").unwrap();
        data.write_string(0, 1, "Population").unwrap();
        data.write_string(0, 2, "Surveyed").unwrap();
        data.write_string(1, 0, "Rampur").unwrap();
        data.write_number(1, 1, 1200).unwrap();
        data.write_number_with_format(1, 2, 45306, &date_format).unwrap();
        data.write_string(2, 0, "Lakhanpur").unwrap();
        data.write_boolean(2, 2, true).unwrap();

        let meta = workbook.add_worksheet();
        meta.set_name("Meta").unwrap();
        meta.write_string(0, 0, "key").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_list_sheets_in_order() {
        let names = CalamineLoader.list_sheets(&sample_workbook()).unwrap();
        assert_eq!(names, ["Data", "Meta"]);
    }

    #[test]
    fn test_parse_sheet_keeps_types() {
        let table = CalamineLoader
            .parse_sheet(&sample_workbook(), "Data")
            .unwrap();

        assert_eq!(table.name(), "Data");
        assert_eq!(table.columns(), ["Village Name", "Population", "Surveyed"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, "Population"), Some(&CellValue::Int(1200)));
        assert_eq!(
            table.get(0, "Surveyed").map(CellValue::as_text),
            Some("2024-01-15T00:00:00".to_string())
        );
        assert_eq!(table.get(1, "Population"), Some(&CellValue::Null));
        assert_eq!(table.get(1, "Surveyed"), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn test_parse_header_only_sheet() {
        let table = CalamineLoader
            .parse_sheet(&sample_workbook(), "Meta")
            .unwrap();
        assert_eq!(table.columns(), ["key"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_unknown_sheet() {
        let err = CalamineLoader
            .parse_sheet(&sample_workbook(), "Nope")
            .unwrap_err();
        assert_eq!(err.kind(), "NotFound");
    }

    #[test]
    fn test_garbage_bytes_are_invalid() {
        let err = CalamineLoader.list_sheets(b"not a workbook").unwrap_err();
        assert_eq!(err.kind(), "InvalidWorkbook");

        let err = CalamineLoader.list_sheets(&[]).unwrap_err();
        assert_eq!(err.kind(), "InvalidWorkbook");
    }

    #[test]
    fn test_data_conversion() {
        assert_eq!(data_to_cell_value(&Data::Empty), CellValue::Null);
        assert_eq!(data_to_cell_value(&Data::Int(3)), CellValue::Int(3));
        assert_eq!(data_to_cell_value(&Data::Float(1200.0)), CellValue::Int(1200));
        assert_eq!(data_to_cell_value(&Data::Float(-4.0)), CellValue::Int(-4));
        assert_eq!(data_to_cell_value(&Data::Float(2.5)), CellValue::Float(2.5));
        assert_eq!(data_to_cell_value(&Data::Float(1e300)), CellValue::Float(1e300));
        assert!(matches!(
            data_to_cell_value(&Data::Float(f64::NAN)),
            CellValue::Float(f) if f.is_nan()
        ));
        assert_eq!(
            data_to_cell_value(&Data::Error(CellErrorType::Div0)),
            CellValue::String("#DIV/0!".to_string())
        );
        assert_eq!(
            data_to_cell_value(&Data::DateTimeIso("2024-03-01".to_string())),
            CellValue::DateTime(
                NaiveDate::from_ymd_opt(2024, 3, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
        assert_eq!(
            data_to_cell_value(&Data::DateTimeIso("sometime".to_string())),
            CellValue::String("sometime".to_string())
        );
    }
}
