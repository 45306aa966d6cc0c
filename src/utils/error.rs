// src/utils/error.rs
use thiserror::Error;

/// Failures raised while turning raw markup into a `ParseResult`.
/// Missing fields are never errors; only an unusable document is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("XML export failed: {0}")]
    Xml(String),

    #[error("CSV export failed: {0}")]
    Csv(String),

    #[error("Spreadsheet export failed: {0}")]
    Spreadsheet(String),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid document id for an output folder: '{0}'")]
    InvalidDocumentId(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
