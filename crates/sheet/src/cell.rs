use chrono::NaiveDateTime;
use std::fmt;

/// ISO-8601 layout used for date-time text coercion and JSON output.
const ISO_8601: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Represents a cell value in a table
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Check if the value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Get the value as text, the form every filter compares against.
    ///
    /// Null coerces to the empty string and date-times to ISO-8601.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::DateTime(dt) => dt.format(ISO_8601).to_string(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_text_of_null_is_empty() {
        assert_eq!(CellValue::Null.as_text(), "");
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
    }

    #[test]
    fn test_text_of_numbers() {
        assert_eq!(CellValue::Int(-42).as_text(), "-42");
        assert_eq!(CellValue::Float(2.5).as_text(), "2.5");
        assert_eq!(CellValue::Float(1.0).as_text(), "1");
        assert_eq!(CellValue::Float(f64::NAN).as_text(), "NaN");
    }

    #[test]
    fn test_text_of_datetime_is_iso() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(CellValue::DateTime(dt).as_text(), "2024-01-15T09:30:00");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(CellValue::from(true), CellValue::Bool(true));
        assert_eq!(CellValue::from("x"), CellValue::String("x".to_string()));
    }
}
