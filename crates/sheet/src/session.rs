//! Single-slot state for the workbook being explored.
//!
//! A session remembers the bytes and sheet names of the most recent upload
//! and at most one materialized [`Table`]. Every operation either succeeds
//! and replaces state, or fails and leaves it untouched.

use crate::error::{Result, SheetError};
use crate::json::{serialize, Record, SerializeOptions};
use crate::query::{apply, Query};
use crate::table::Table;
use crate::xlsx::{CalamineLoader, WorkbookLoader};

struct LoadedWorkbook {
    bytes: Vec<u8>,
    sheet_names: Vec<String>,
}

/// The currently queryable workbook and sheet.
pub struct Session {
    loader: Box<dyn WorkbookLoader>,
    workbook: Option<LoadedWorkbook>,
    table: Option<Table>,
}

impl Session {
    /// Create an empty session reading workbooks with calamine
    #[must_use]
    pub fn new() -> Self {
        Self::with_loader(CalamineLoader)
    }

    /// Create an empty session with a custom workbook loader
    #[must_use]
    pub fn with_loader<L: WorkbookLoader + 'static>(loader: L) -> Self {
        Session {
            loader: Box::new(loader),
            workbook: None,
            table: None,
        }
    }

    /// Register an uploaded workbook and return its sheet names.
    ///
    /// Any previously selected table is discarded.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::InvalidWorkbook` if the bytes cannot be parsed; the
    /// previous workbook and selection are kept in that case.
    pub fn load_workbook(&mut self, bytes: Vec<u8>) -> Result<Vec<String>> {
        let sheet_names = self.loader.list_sheets(&bytes)?;

        self.workbook = Some(LoadedWorkbook {
            bytes,
            sheet_names: sheet_names.clone(),
        });
        self.table = None;

        Ok(sheet_names)
    }

    /// Materialize a sheet of the current workbook and make it active.
    ///
    /// Returns the sheet's column names.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::NoWorkbookLoaded` before any upload and
    /// `SheetError::NotFound` if `name` is not a sheet of the latest upload.
    pub fn select_sheet(&mut self, name: &str) -> Result<Vec<String>> {
        let workbook = self.workbook.as_ref().ok_or(SheetError::NoWorkbookLoaded)?;

        if !workbook.sheet_names.iter().any(|s| s == name) {
            return Err(SheetError::NotFound {
                name: name.to_string(),
            });
        }

        let table = self.loader.parse_sheet(&workbook.bytes, name)?;
        let columns = table.columns().to_vec();
        self.table = Some(table);

        Ok(columns)
    }

    /// Sheet names of the latest upload (empty before any upload)
    #[must_use]
    pub fn sheet_names(&self) -> &[String] {
        self.workbook
            .as_ref()
            .map_or(&[][..], |w| w.sheet_names.as_slice())
    }

    /// Whether a workbook has been uploaded
    #[must_use]
    pub fn has_workbook(&self) -> bool {
        self.workbook.is_some()
    }

    /// The active table, if a sheet is selected
    #[must_use]
    pub fn current_table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    /// Name of the selected sheet
    #[must_use]
    pub fn selected_sheet(&self) -> Option<&str> {
        self.table.as_ref().map(Table::name)
    }

    /// Run a query against the active table.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::NoWorkbookLoaded` before any upload,
    /// `SheetError::NoActiveTable` if no sheet is selected and
    /// `SheetError::UnknownField` for filters on missing columns.
    pub fn query(&self, query: &Query) -> Result<Table> {
        if self.workbook.is_none() {
            return Err(SheetError::NoWorkbookLoaded);
        }
        let table = self.current_table().ok_or(SheetError::NoActiveTable)?;
        apply(table, query)
    }

    /// Run a query and serialize the matching rows.
    ///
    /// # Errors
    ///
    /// Same as [`Session::query`].
    pub fn search(&self, query: &Query, options: &SerializeOptions) -> Result<Vec<Record>> {
        let result = self.query(query)?;
        Ok(serialize(&result, options))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("sheet_names", &self.sheet_names())
            .field("selected_sheet", &self.selected_sheet())
            .finish_non_exhaustive()
    }
}
