use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid Excel file: {path} ({details})")]
    InvalidExcel { path: PathBuf, details: String },

    #[error("sheet \"{name}\" not found (available: {available})")]
    SheetNotFound { name: String, available: String },

    #[error("sheet index {index} out of range (have {count} sheets)")]
    SheetIndexOutOfRange { index: usize, count: usize },

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("input has no header row after skipping {skipped} rows")]
    EmptyInput { skipped: usize },

    #[error("{report}: missing required columns: {}", missing.join(", "))]
    MissingColumns { report: String, missing: Vec<String> },

    #[error("invalid reference date \"{0}\" (expected YYYY-MM-DD)")]
    UnparseableReferenceDate(String),

    #[error("column \"{column}\" row {row}: cannot parse date \"{value}\"")]
    UnparseableDate {
        column: String,
        row: usize,
        value: String,
    },

    #[error("invalid config {path}: {details}")]
    Config { path: PathBuf, details: String },

    #[error("failed to read CSV: {0}")]
    CsvRead(#[source] csv::Error),

    #[error("failed to write CSV: {0}")]
    CsvWrite(#[from] csv::Error),

    #[error("failed to write workbook {path}: {details}")]
    XlsxWrite { path: PathBuf, details: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::FileNotFound(_) => 1,
            Error::InvalidExcel { .. } => 2,
            Error::CsvRead(_) => 2,
            Error::EmptyInput { .. } => 2,
            Error::SheetNotFound { .. } => 3,
            Error::SheetIndexOutOfRange { .. } => 3,
            Error::UnsupportedFormat(_) => 3,
            Error::UnparseableReferenceDate(_) => 3,
            Error::Config { .. } => 3,
            Error::CsvWrite(_) => 4,
            Error::XlsxWrite { .. } => 4,
            Error::MissingColumns { .. } => 5,
            Error::UnparseableDate { .. } => 5,
            Error::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
