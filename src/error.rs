//! Error types and result type for the grantxml crate.
//!
//! This module defines all error variants that can occur while ingesting a
//! patent grant bulk file. It uses the `snafu` library for ergonomic error
//! handling with automatic backtrace capture.
//!
//! # Examples
//!
//! ```
//! use grantxml::{Result, GrantError};
//!
//! fn open_source() -> Result<String> {
//!     Err(GrantError::invalid_parameter("Source file id cannot be empty"))
//! }
//!
//! match open_source() {
//!     Ok(data) => println!("Success: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```
//!
//! # Error Variants
//!
//! - [`GrantError::Io`]: I/O errors from file and stream operations
//! - [`GrantError::ParserError`]: XML/JSON/URL parsing errors
//! - [`GrantError::InvalidDataFormat`]: Malformed record content
//! - [`GrantError::InvalidParameter`]: Invalid configuration or arguments
//! - [`GrantError::CsvError`]: CSV writer/reader failures
//! - [`GrantError::DatabaseError`]: SQLite failures
//! - [`GrantError::ArchiveError`]: Zip container failures

use std::io;
use snafu::{Snafu, Backtrace};

// Re-export snafu for context providers
pub use snafu;

/// Main error type for the grantxml crate.
///
/// All errors include automatic backtrace capture for debugging purposes.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum GrantError {
    /// I/O error occurred during file or stream operations.
    #[snafu(display("IO error: {source}"))]
    Io {
        source: io::Error,
        backtrace: Backtrace,
    },

    /// Error parsing XML, JSON, or other structured data formats.
    #[snafu(display("Parser error: {source}"))]
    ParserError {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        backtrace: Backtrace,
    },

    /// A record fragment is malformed or misses mandatory data.
    #[snafu(display("Invalid data format: {message}"))]
    InvalidDataFormat {
        message: String,
        backtrace: Backtrace,
    },

    /// Function was called with invalid parameters or configuration.
    #[snafu(display("Invalid parameter: {message}"))]
    InvalidParameter {
        message: String,
        backtrace: Backtrace,
    },

    /// CSV file could not be written or read back.
    #[snafu(display("CSV error: {source}"))]
    CsvError {
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// Database statement failed.
    #[snafu(display("Database error: {source}"))]
    DatabaseError {
        source: rusqlite::Error,
        backtrace: Backtrace,
    },

    /// The container archive could not be read.
    #[snafu(display("Archive error: {source}"))]
    ArchiveError {
        source: zip::result::ZipError,
        backtrace: Backtrace,
    },

    /// General error that doesn't fit other categories.
    #[snafu(display("General error: {message}"))]
    GeneralError {
        message: String,
        backtrace: Backtrace,
    },
}

// For automatic conversions from standard error types
impl From<io::Error> for GrantError {
    fn from(source: io::Error) -> Self {
        Self::Io { source, backtrace: Backtrace::capture() }
    }
}

impl From<quick_xml::Error> for GrantError {
    fn from(source: quick_xml::Error) -> Self {
        Self::ParserError { source: Box::new(source), backtrace: Backtrace::capture() }
    }
}

impl From<serde_json::Error> for GrantError {
    fn from(source: serde_json::Error) -> Self {
        Self::ParserError { source: Box::new(source), backtrace: Backtrace::capture() }
    }
}

impl From<url::ParseError> for GrantError {
    fn from(source: url::ParseError) -> Self {
        Self::ParserError { source: Box::new(source), backtrace: Backtrace::capture() }
    }
}

impl From<csv::Error> for GrantError {
    fn from(source: csv::Error) -> Self {
        Self::CsvError { source, backtrace: Backtrace::capture() }
    }
}

impl From<rusqlite::Error> for GrantError {
    fn from(source: rusqlite::Error) -> Self {
        Self::DatabaseError { source, backtrace: Backtrace::capture() }
    }
}

impl From<zip::result::ZipError> for GrantError {
    fn from(source: zip::result::ZipError) -> Self {
        Self::ArchiveError { source, backtrace: Backtrace::capture() }
    }
}

/// Helper methods for creating errors without context providers.
impl GrantError {
    /// Creates an `InvalidParameter` error with the given message.
    ///
    /// # Examples
    ///
    /// ```
    /// use grantxml::GrantError;
    ///
    /// let error = GrantError::invalid_parameter("Unknown output mode");
    /// ```
    pub fn invalid_parameter<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameter {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates an `InvalidDataFormat` error with the given message.
    pub fn invalid_data_format<S: Into<String>>(message: S) -> Self {
        Self::InvalidDataFormat {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates a `GeneralError` with the given message.
    pub fn general_error<S: Into<String>>(message: S) -> Self {
        Self::GeneralError {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Checks if this error is an `InvalidDataFormat` variant.
    pub fn is_invalid_data_format(&self) -> bool {
        matches!(self, GrantError::InvalidDataFormat { .. })
    }
}

/// A specialized `Result` type for grantxml operations.
///
/// This is a convenience type alias that uses [`GrantError`] as the error type.
pub type Result<T> = std::result::Result<T, GrantError>;
