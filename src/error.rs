//! # DLOG Table Error Handling
//!
//! This module defines the TableError enum, which represents the different error
//! types that can occur while loading, validating, rendering or storing tables.

use crate::table::Revision;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableError>;

/// Represents the different error types that can occur in the table codec.
#[derive(Debug, Error)]
pub enum TableError {
    /// Observed byte count does not equal the catalog size for the table.
    #[error("Size mismatch for table 0x{table:02x}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        table: u8,
        expected: usize,
        actual: usize,
    },

    /// The table identifier is not in the catalog.
    #[error("Unknown table: 0x{0:02x}")]
    UnknownTable(u8),

    /// The table is known but has no layout for the requested revision.
    #[error("Table 0x{table:02x} has no layout for revision {revision}")]
    UnsupportedRevision { table: u8, revision: Revision },

    /// Rendered string does not fit the destination.
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Integrity check failed.
    #[error("Checksum mismatch: expected 0x{expected:04x}, calculated 0x{calculated:04x}")]
    ChecksumMismatch { expected: u16, calculated: u16 },

    /// A decoded field failed a semantic check.
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Indicates a nom parsing error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// File store failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl<E: std::fmt::Debug> From<nom::Err<E>> for TableError {
    fn from(err: nom::Err<E>) -> Self {
        TableError::Parse(format!("{err:?}"))
    }
}
