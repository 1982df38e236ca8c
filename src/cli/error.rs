//! CLI-level errors (wraps domain errors)

use thiserror::Error;

use crate::errors::HierarchyError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Hierarchy(#[from] HierarchyError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Config(_) => crate::exitcode::CONFIG,
            CliError::Hierarchy(e) => match e {
                HierarchyError::Io(_) => crate::exitcode::IOERR,
                HierarchyError::NoSheets(_) => crate::exitcode::NOINPUT,
                HierarchyError::InvalidColumn(_) => crate::exitcode::USAGE,
                HierarchyError::Csv(_)
                | HierarchyError::Workbook(_)
                | HierarchyError::Archive(_)
                | HierarchyError::WorkbookXml(_)
                | HierarchyError::CycleDetected(_)
                | HierarchyError::Json(_)
                | HierarchyError::InvalidTree(_) => crate::exitcode::DATAERR,
            },
        }
    }
}
