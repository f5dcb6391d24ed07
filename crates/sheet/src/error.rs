use thiserror::Error;

/// Errors that can occur while loading, selecting or querying sheets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error("Invalid workbook: {0}")]
    InvalidWorkbook(String),

    #[error("No workbook loaded. Upload a workbook first")]
    NoWorkbookLoaded,

    #[error("Sheet not found: {name}")]
    NotFound { name: String },

    #[error("Unknown field: {name}")]
    UnknownField { name: String },

    #[error("No active table. Select a sheet first")]
    NoActiveTable,

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl SheetError {
    /// Machine-readable error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SheetError::InvalidWorkbook(_) => "InvalidWorkbook",
            SheetError::NoWorkbookLoaded => "NoWorkbookLoaded",
            SheetError::NotFound { .. } => "NotFound",
            SheetError::UnknownField { .. } => "UnknownField",
            SheetError::NoActiveTable => "NoActiveTable",
            SheetError::BadRequest(_) => "BadRequest",
        }
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
