//! Table querying for sheetsift
//!
//! Loads one sheet of an uploaded workbook into an in-memory [`Table`], filters
//! its rows with field-scoped text clauses, projects columns, and turns the
//! result into JSON records.
//!
//! # Examples
//!
//! ## Filtering a table
//!
//! ```
//! use sheetsift_sheet::{apply, FilterClause, Query, Table};
//!
//! let table = Table::from_data(vec![
//!     vec!["Village Name", "District"],
//!     vec!["Rampur", "North"],
//!     vec!["Gokul", "South"],
//! ]);
//!
//! let query = Query::new().filter(FilterClause::contains("Village Name", "PUR"));
//! let result = apply(&table, &query).unwrap();
//!
//! assert_eq!(result.row_count(), 1);
//! ```
//!
//! ## Serializing records
//!
//! ```
//! use sheetsift_sheet::{serialize, CellValue, SerializeOptions, Table};
//!
//! let mut table = Table::with_columns("Data", vec!["score"]);
//! table.push_row(vec![CellValue::Float(f64::NAN)]);
//!
//! let records = serialize(&table, &SerializeOptions::default());
//! assert!(records[0]["score"].is_null());
//! ```
//!
//! ## Working with a session
//!
//! ```no_run
//! use sheetsift_sheet::{Query, SerializeOptions, Session};
//!
//! let bytes = std::fs::read("villages.xlsx").unwrap();
//! let mut session = Session::new();
//! let sheets = session.load_workbook(bytes).unwrap();
//! session.select_sheet(&sheets[0]).unwrap();
//! let records = session.search(&Query::new(), &SerializeOptions::default()).unwrap();
//! ```

mod cell;
mod error;
mod json;
mod query;
mod session;
mod table;
mod xlsx;

/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export the record serializer.
pub use json::{cell_to_json_value, serialize, Record, SerializeOptions};
/// Re-export the query engine.
pub use query::{apply, FilterClause, MatchMode, Query, CLAUSE_SEPARATOR};
/// Re-export session state.
pub use session::Session;
/// Re-export table type.
pub use table::Table;
/// Re-export workbook loading.
pub use xlsx::{CalamineLoader, WorkbookLoader};
