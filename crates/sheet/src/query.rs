//! Field-scoped text filtering and column projection over a [`Table`].
//!
//! Queries are pure: [`apply`] never mutates its input and returns a new
//! table holding the surviving rows in their original order.

use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::table::Table;
use std::str::FromStr;

/// Separator between clauses in the compact `field:pattern||field:pattern` form.
pub const CLAUSE_SEPARATOR: &str = "||";

/// How a clause pattern is compared against a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Case-insensitive substring match
    #[default]
    Contains,
    /// Case-sensitive equality with the cell's text form
    Exact,
}

impl FromStr for MatchMode {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contains" => Ok(MatchMode::Contains),
            "exact" => Ok(MatchMode::Exact),
            other => Err(SheetError::BadRequest(format!(
                "Unknown match mode '{other}'. Expected 'contains' or 'exact'"
            ))),
        }
    }
}

/// One filter condition on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub field: String,
    pub mode: MatchMode,
    pub pattern: String,
}

impl FilterClause {
    pub fn new(field: impl Into<String>, mode: MatchMode, pattern: impl Into<String>) -> Self {
        FilterClause {
            field: field.into(),
            mode,
            pattern: pattern.into(),
        }
    }

    /// Shorthand for a case-insensitive substring clause.
    pub fn contains(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, MatchMode::Contains, pattern)
    }

    /// Shorthand for a case-sensitive equality clause.
    pub fn exact(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, MatchMode::Exact, pattern)
    }

    /// Parse `field:pattern||field:pattern` into clauses sharing one mode.
    ///
    /// Each clause splits on its first `:`, so patterns may contain colons.
    /// Empty segments are skipped.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::BadRequest` for a clause without `:` or with an
    /// empty field name.
    pub fn parse_list(filters: &str, mode: MatchMode) -> Result<Vec<Self>> {
        filters
            .split(CLAUSE_SEPARATOR)
            .filter(|segment| !segment.trim().is_empty())
            .map(|segment| {
                let (field, pattern) = segment.split_once(':').ok_or_else(|| {
                    SheetError::BadRequest(format!(
                        "Malformed filter clause '{segment}'. Expected field:pattern"
                    ))
                })?;
                if field.is_empty() {
                    return Err(SheetError::BadRequest(format!(
                        "Filter clause '{segment}' has an empty field name"
                    )));
                }
                Ok(Self::new(field, mode, pattern))
            })
            .collect()
    }

    /// Check a single cell against this clause.
    #[must_use]
    pub fn matches(&self, cell: &CellValue) -> bool {
        match self.mode {
            MatchMode::Contains => {
                if self.pattern.is_empty() {
                    return true;
                }
                if cell.is_null() {
                    return false;
                }
                cell.as_text()
                    .to_lowercase()
                    .contains(&self.pattern.to_lowercase())
            }
            MatchMode::Exact => cell.as_text() == self.pattern,
        }
    }
}

/// Filters plus an optional column projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<FilterClause>,
    /// `None` keeps every column; `Some` keeps only the listed ones that exist.
    pub projection: Option<Vec<String>>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, clause: FilterClause) -> Self {
        self.filters.push(clause);
        self
    }

    #[must_use]
    pub fn project<S: Into<String>>(mut self, columns: Vec<S>) -> Self {
        self.projection = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

/// Run `query` against `table` and return the resulting table.
///
/// # Errors
///
/// Returns `SheetError::UnknownField` if a filter names a column the table
/// does not have. Unknown projection names are ignored.
pub fn apply(table: &Table, query: &Query) -> Result<Table> {
    let resolved: Vec<(usize, &FilterClause)> = query
        .filters
        .iter()
        .map(|clause| {
            table
                .column_index(&clause.field)
                .map(|col| (col, clause))
                .ok_or_else(|| SheetError::UnknownField {
                    name: clause.field.clone(),
                })
        })
        .collect::<Result<_>>()?;

    let matching = table
        .rows()
        .filter(|row| resolved.iter().all(|(col, clause)| clause.matches(&row[*col])));

    let Some(projection) = &query.projection else {
        let rows = matching.map(<[CellValue]>::to_vec).collect();
        return Ok(Table::from_parts(table.name(), table.columns().to_vec(), rows));
    };

    let mut columns: Vec<String> = Vec::with_capacity(projection.len());
    let mut indices: Vec<usize> = Vec::with_capacity(projection.len());
    for name in projection {
        if let Some(col) = table.column_index(name) {
            if !indices.contains(&col) {
                indices.push(col);
                columns.push(name.clone());
            }
        }
    }

    let rows = matching
        .map(|row| indices.iter().map(|&col| row[col].clone()).collect())
        .collect();

    Ok(Table::from_parts(table.name(), columns, rows))
}
