//! Error types for the zipdist library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when resolving postal codes or loading the dataset.
#[derive(Error, Debug)]
pub enum ZipError {
    /// The postal code was empty after trimming whitespace.
    #[error("ZIP code is empty")]
    EmptyCode,

    /// The dataset has no record for the postal code.
    #[error("ZIP code not found: {code}")]
    NotFound { code: String },

    /// The dataset has a record, but its latitude or longitude is missing.
    #[error("ZIP code not found or has no coordinates: {code}")]
    NoCoordinates { code: String },

    /// The record's coordinates are not usable numbers.
    #[error("Failed to parse coordinates for ZIP: {code}")]
    MalformedCoordinates { code: String },

    /// IO error when reading dataset files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Neither `{COUNTRY}.txt` nor `{COUNTRY}.zip` exists in the data directory.
    #[error("Postal code dataset not found: {path}")]
    DatasetNotFound { path: PathBuf },

    /// The dataset file could not be parsed.
    #[error("Failed to read postal code dataset: {0}")]
    Csv(#[from] csv::Error),

    /// A dataset archive was unreadable or did not contain the expected file.
    #[error("Invalid dataset archive {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    /// Downloading the dataset failed.
    #[error("Failed to download dataset for {country}: {reason}")]
    DownloadFailed { country: String, reason: String },

    /// HTTP error during download.
    #[cfg(feature = "download")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse classification of a [`ZipError`], used by callers that need to map
/// failures onto a protocol (e.g. HTTP status codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied an unusable postal code.
    InvalidInput,
    /// The postal code is well formed but cannot be resolved.
    NotFound,
    /// Dataset integrity or infrastructure failure.
    Internal,
}

impl ZipError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ZipError::EmptyCode => ErrorKind::InvalidInput,
            ZipError::NotFound { .. } | ZipError::NoCoordinates { .. } => ErrorKind::NotFound,
            _ => ErrorKind::Internal,
        }
    }
}

/// Result type alias using [`ZipError`].
pub type Result<T> = std::result::Result<T, ZipError>;
