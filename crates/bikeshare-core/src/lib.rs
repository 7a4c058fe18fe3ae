//! Domain types shared by the bikeshare explorer crates.
//!
//! Trip records and filters, the error type, timestamp parsing, number
//! formatting and the command-line settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{ExplorerError, Result};
