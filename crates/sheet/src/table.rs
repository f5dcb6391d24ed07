use crate::cell::CellValue;
use std::collections::{HashMap, HashSet};

/// A table of named columns and typed rows (row-major storage).
///
/// Every row holds exactly one value per column; column names are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table with the given column names.
    ///
    /// Empty names become `Unnamed: <position>` and repeated names get a
    /// `.1`, `.2`, ... suffix so that every column stays addressable.
    #[must_use]
    pub fn with_columns<S: Into<String>>(name: &str, columns: Vec<S>) -> Self {
        let header: Vec<String> = columns.into_iter().map(Into::into).collect();
        Self::from_parts(name, unique_column_names(&header), Vec::new())
    }

    /// Create a table whose first row holds the column names
    ///
    /// # Example
    /// ```
    /// use sheetsift_sheet::Table;
    ///
    /// let table = Table::from_data(vec![
    ///     vec!["Name", "City"],
    ///     vec!["Alice", "NYC"],
    /// ]);
    /// assert_eq!(table.columns(), ["Name", "City"]);
    /// assert_eq!(table.row_count(), 1);
    /// ```
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let mut rows = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect::<Vec<CellValue>>());

        let Some(header) = rows.next() else {
            return Self::with_columns::<String>("Sheet1", Vec::new());
        };

        let mut table = Self::from_header_row("Sheet1", &header);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Create an empty table named `name` from a header row of cells.
    #[must_use]
    pub fn from_header_row(name: &str, header: &[CellValue]) -> Self {
        let names: Vec<String> = header.iter().map(CellValue::as_text).collect();
        Self::from_parts(name, unique_column_names(&names), Vec::new())
    }

    /// Build a table from columns that are already known to be unique.
    pub(crate) fn from_parts(name: &str, columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let column_index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        Table {
            name: name.to_string(),
            columns,
            column_index,
            rows,
        }
    }

    /// Get the table name (the sheet it was loaded from)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the column names in order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the number of columns
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, if it exists
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    /// Get a cell by row position and column name
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Get a row by position
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Iterate over rows in order
    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Append a row, padding missing trailing cells with null.
    ///
    /// Cells beyond the last column are dropped.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Null);
        self.rows.push(row);
    }
}

/// Make header names unique and non-empty.
fn unique_column_names(header: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(header.len());
    let mut repeats: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(header.len());

    for (i, raw) in header.iter().enumerate() {
        let base = if raw.is_empty() {
            format!("Unnamed: {i}")
        } else {
            raw.clone()
        };

        let mut name = base.clone();
        while seen.contains(&name) {
            let n = repeats.entry(base.clone()).or_insert(0);
            *n += 1;
            name = format!("{base}.{n}");
        }

        seen.insert(name.clone());
        names.push(name);
    }

    names
}
