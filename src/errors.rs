//! Domain-level errors for hierarchy reconstruction

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HierarchyError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read workbook: {0}")]
    Workbook(String),

    #[error("failed to open workbook archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("malformed workbook xml: {0}")]
    WorkbookXml(String),

    #[error("workbook contains no sheets: {0}")]
    NoSheets(PathBuf),

    #[error("invalid formula column: {0}")]
    InvalidColumn(String),

    #[error("cycle detected in formula references at row {0}")]
    CycleDetected(u32),

    #[error("failed to serialize tree: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid tree document: {0}")]
    InvalidTree(String),
}

pub type HierarchyResult<T> = Result<T, HierarchyError>;
