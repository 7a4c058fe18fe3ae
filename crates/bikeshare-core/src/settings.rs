use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::error::ExplorerError;
use crate::models::{City, DayFilter, FilterSpec, MonthFilter};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Explore descriptive statistics of bike-share trip logs
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bikeshare-explorer",
    about = "Explore descriptive statistics of bike-share trip logs",
    version
)]
pub struct Settings {
    /// City to analyse (chicago, new york city, washington). Omit to be asked
    /// interactively.
    #[arg(long, value_parser = parse_city)]
    pub city: Option<City>,

    /// Month filter: a month name, a number 1-12, or "all"
    #[arg(long, default_value = "all", value_parser = parse_month)]
    pub month: MonthFilter,

    /// Day-of-week filter: a weekday name or "all"
    #[arg(long, default_value = "all", value_parser = parse_day)]
    pub day: DayFilter,

    /// Directory holding chicago.csv, new_york_city.csv and washington.csv
    #[arg(long, env = "BIKESHARE_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Output format of the statistics report
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Compute the report sections on separate threads
    #[arg(long)]
    pub parallel: bool,

    /// Number of five-row pages of raw trips to print after the report
    #[arg(long, default_value = "0")]
    pub raw_pages: usize,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,
}

impl Settings {
    /// The filter selected on the command line.
    pub fn filter(&self) -> FilterSpec {
        FilterSpec::new(self.month, self.day)
    }

    /// The city→file mapping rooted at `--data-dir`.
    pub fn datasets(&self) -> CityDatasets {
        CityDatasets::in_dir(&self.data_dir)
    }

    pub fn wants_json(&self) -> bool {
        self.format == "json"
    }
}

fn parse_city(s: &str) -> Result<City, ExplorerError> {
    s.parse()
}

fn parse_month(s: &str) -> Result<MonthFilter, ExplorerError> {
    s.parse()
}

fn parse_day(s: &str) -> Result<DayFilter, ExplorerError> {
    s.parse()
}

// ── CityDatasets ───────────────────────────────────────────────────────────────

/// Where each city's trip table lives on disk.
///
/// Owned by the caller and handed to the loader; nothing in the pipeline keeps
/// a process-wide mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityDatasets {
    sources: BTreeMap<City, PathBuf>,
}

impl CityDatasets {
    /// Map every supported city to its conventional file name inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        let sources = City::ALL
            .iter()
            .map(|city| (*city, dir.join(city.default_file_name())))
            .collect();
        Self { sources }
    }

    /// Path configured for `city`, if any.
    pub fn source_for(&self, city: City) -> Option<&Path> {
        self.sources.get(&city).map(PathBuf::as_path)
    }
}
