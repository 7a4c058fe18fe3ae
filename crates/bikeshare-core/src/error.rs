use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the bikeshare explorer.
///
/// Every variant except [`ExplorerError::UnknownCity`] and
/// [`ExplorerError::InvalidFilter`] is a load failure: it aborts the load of
/// one city dataset and no partial record set is returned.
#[derive(Error, Debug)]
pub enum ExplorerError {
    /// The source file configured for a city does not exist.
    #[error("No trip data found for {city} at {path}")]
    SourceNotFound { city: String, path: PathBuf },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV layer rejected the input (bad quoting, ragged rows, I/O).
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A column every trip dataset must carry is missing from the header.
    #[error("Missing required column \"{0}\"")]
    MissingColumn(String),

    /// Only one of the two demographic columns is present.
    #[error("Dataset must carry both \"Gender\" and \"Birth Year\" or neither")]
    InconsistentSchema,

    /// A start or end time did not match any recognised format.
    #[error("Invalid timestamp \"{value}\" on line {line}")]
    InvalidTimestamp { line: u64, value: String },

    /// A trip duration was not a non-negative number of seconds.
    #[error("Invalid trip duration \"{value}\" on line {line}")]
    InvalidDuration { line: u64, value: String },

    /// A birth year was present but not a whole year.
    #[error("Invalid birth year \"{value}\" on line {line}")]
    InvalidBirthYear { line: u64, value: String },

    /// A city name is not one of the supported datasets.
    #[error("Unknown city: {0}")]
    UnknownCity(String),

    /// A month or weekday filter value could not be understood.
    #[error("Invalid filter value: {0}")]
    InvalidFilter(String),
}

/// Convenience alias used throughout the explorer crates.
pub type Result<T> = std::result::Result<T, ExplorerError>;
