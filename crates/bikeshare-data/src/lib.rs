//! Data layer for the bikeshare explorer.
//!
//! Loads a city's trip table, filters it by month and weekday, computes the
//! descriptive statistics and pages through raw rows.

pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod pager;
pub mod reader;

pub use bikeshare_core as core;
