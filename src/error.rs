//! Error types for the Sickness Absence Rates engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that aborts a publication family run.

use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the publication engine.
///
/// A family run that hits any of these errors produces no output for that
/// family. Statistical consumers need complete tables, not partial ones.
///
/// # Example
///
/// ```
/// use absence_rates::error::PublicationError;
///
/// let error = PublicationError::MissingConfigValue {
///     key: "month_date".to_string(),
/// };
/// assert_eq!(error.to_string(), "Missing required configuration value: month_date");
/// ```
#[derive(Debug, Error)]
pub enum PublicationError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A required run parameter was absent.
    #[error("Missing required configuration value: {key}")]
    MissingConfigValue {
        /// The configuration key that was absent.
        key: String,
    },

    /// A breakdown's filter matched no records at all.
    #[error("Breakdown '{breakdown}' in family '{family}' matched no records ({condition})")]
    EmptyGroupResult {
        /// The publication family being composed.
        family: String,
        /// The breakdown spec name.
        breakdown: String,
        /// A description of the filter that matched nothing.
        condition: String,
    },

    /// An absence rate was requested over zero days available.
    #[error("Absence rate undefined: {days_lost} days lost over zero days available")]
    DivisionUndefined {
        /// The days lost numerator.
        days_lost: Decimal,
    },

    /// A composed row does not carry a column the output schema requires.
    #[error("Schema mismatch in family '{family}' for column '{column}': {context}")]
    SchemaMismatch {
        /// The publication family being assembled.
        family: String,
        /// The output column header.
        column: String,
        /// Where the mismatch was found.
        context: String,
    },

    /// A record carried a value outside a fixed enumeration.
    #[error("Unknown value '{value}' for breakdown field '{field}'")]
    UnknownBreakdownValue {
        /// The record field that was checked.
        field: String,
        /// The offending value.
        value: String,
    },

    /// A labelled row could not be located when slicing a tagged sub-table.
    #[error("Row '{label}' not found in table '{table}'")]
    RowNotFound {
        /// The table searched.
        table: String,
        /// The row label that was expected.
        label: String,
    },

    /// Records could not be read from a source.
    #[error("Failed to read records from '{path}': {message}")]
    SourceError {
        /// The source location.
        path: String,
        /// A description of the read failure.
        message: String,
    },

    /// An output table could not be written.
    #[error("Failed to write output '{path}': {message}")]
    OutputError {
        /// The output location.
        path: String,
        /// A description of the write failure.
        message: String,
    },
}

/// A type alias for Results that return PublicationError.
pub type PublicationResult<T> = Result<T, PublicationError>;
