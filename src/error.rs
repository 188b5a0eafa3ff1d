//! Custom error types for the feed ledger
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. The grid codec variants carry the
//! coordinate of the offending cell so the importing user can find it.

use thiserror::Error;

use crate::grid::GridCoordinate;

/// The main error type for feed ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Spreadsheet container could not be written
    #[error("Export error: {0}")]
    Export(String),

    /// Spreadsheet container could not be read
    #[error("Import error: {0}")]
    Import(String),

    /// Sheet label is neither the monthly nor the yearly label
    #[error("Unrecognized document kind: sheet '{label}'")]
    UnrecognizedDocumentKind { label: String },

    /// Row 1 metadata is missing, unparseable or for another collection
    #[error("Malformed header at {coordinate}: {reason}")]
    MalformedHeader {
        coordinate: GridCoordinate,
        reason: String,
    },

    /// The document was built for a different pond layout
    #[error("Stale template at {coordinate}: {reason}")]
    StaleTemplate {
        coordinate: GridCoordinate,
        reason: String,
    },

    /// Month label does not match any calendar table entry
    #[error("Unknown month name '{name}'{}", at_suffix(.coordinate))]
    UnknownMonthName {
        name: String,
        coordinate: Option<GridCoordinate>,
    },

    /// A pond cell holds something that is not a non-negative amount
    #[error("Invalid amount at {coordinate}: '{text}'")]
    InvalidAmount {
        coordinate: GridCoordinate,
        text: String,
    },

    /// Ledger entries already exist for the target period
    #[error("Feed ledger already recorded for collection {collection}, farm {farm}, period {period}")]
    PeriodAlreadyLedgered {
        collection: String,
        farm: String,
        period: String,
    },
}

fn at_suffix(coordinate: &Option<GridCoordinate>) -> String {
    match coordinate {
        Some(coord) => format!(" at {}", coord),
        None => String::new(),
    }
}

impl LedgerError {
    /// Create a "not found" error for farms
    pub fn farm_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Farm",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for feed collections
    pub fn collection_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Feed collection",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for ledger entries
    pub fn entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Ledger entry",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error came from validating or reading a grid document
    pub fn is_codec(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedDocumentKind { .. }
                | Self::MalformedHeader { .. }
                | Self::StaleTemplate { .. }
                | Self::UnknownMonthName { .. }
                | Self::InvalidAmount { .. }
        )
    }

    /// The offending cell, when the error points at one
    pub fn coordinate(&self) -> Option<GridCoordinate> {
        match self {
            Self::MalformedHeader { coordinate, .. }
            | Self::StaleTemplate { coordinate, .. }
            | Self::InvalidAmount { coordinate, .. } => Some(*coordinate),
            Self::UnknownMonthName { coordinate, .. } => *coordinate,
            _ => None,
        }
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for LedgerError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<calamine::XlsxError> for LedgerError {
    fn from(err: calamine::XlsxError) -> Self {
        Self::Import(err.to_string())
    }
}

/// Result type alias for feed ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = LedgerError::farm_not_found("7");
        assert_eq!(err.to_string(), "Farm not found: 7");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_codec_errors_render_coordinates() {
        let err = LedgerError::InvalidAmount {
            coordinate: GridCoordinate::new(4, 3),
            text: "ten".into(),
        };
        assert_eq!(err.to_string(), "Invalid amount at C4: 'ten'");
        assert!(err.is_codec());
        assert_eq!(err.coordinate(), Some(GridCoordinate::new(4, 3)));

        let err = LedgerError::UnknownMonthName {
            name: "Smarch".into(),
            coordinate: None,
        };
        assert_eq!(err.to_string(), "Unknown month name 'Smarch'");
        assert_eq!(err.coordinate(), None);
    }

    #[test]
    fn test_period_already_ledgered_is_not_codec() {
        let err = LedgerError::PeriodAlreadyLedgered {
            collection: "1".into(),
            farm: "2".into(),
            period: "2024-02".into(),
        };
        assert!(!err.is_codec());
        assert!(err.to_string().contains("2024-02"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let ledger_err: LedgerError = io_err.into();
        assert!(matches!(ledger_err, LedgerError::Io(_)));
    }
}
