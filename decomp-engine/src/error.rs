use thiserror::Error;

/// Shape problems in the source data. These are caller bugs (a metric or
/// dimension referencing a column the dataset does not have) and propagate
/// uncaught; numeric edge cases are handled by defined-value policy in the
/// engine and never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataShapeError {
    #[error("column not found: {name}")]
    MissingColumn { name: String },

    #[error("dataset has no columns")]
    NoColumns,

    #[error("duplicate column name: {name}")]
    DuplicateColumn { name: String },
}

/// Errors from the table-provider collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("table not found: {table}")]
    TableNotFound { table: String },

    #[error("table load failed: {0}")]
    LoadFailed(String),
}
