use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Month, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;

// ── City ──────────────────────────────────────────────────────────────────────

/// The cities a trip dataset is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum City {
    Chicago,
    #[serde(rename = "New York City")]
    NewYorkCity,
    Washington,
}

impl City {
    /// Every supported city in display order.
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    /// Human-readable city name.
    pub fn name(self) -> &'static str {
        match self {
            City::Chicago => "Chicago",
            City::NewYorkCity => "New York City",
            City::Washington => "Washington",
        }
    }

    /// File name the city's dataset is conventionally published under.
    pub fn default_file_name(self) -> &'static str {
        match self {
            City::Chicago => "chicago.csv",
            City::NewYorkCity => "new_york_city.csv",
            City::Washington => "washington.csv",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for City {
    type Err = ExplorerError;

    /// Case-insensitive; also accepts `"new york"` and `"nyc"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalised.as_str() {
            "chicago" => Ok(City::Chicago),
            "new york city" | "new york" | "nyc" => Ok(City::NewYorkCity),
            "washington" | "washington dc" => Ok(City::Washington),
            _ => Err(ExplorerError::UnknownCity(s.trim().to_string())),
        }
    }
}

// ── DatasetSchema ─────────────────────────────────────────────────────────────

/// Which optional demographic columns a loaded dataset carries.
///
/// Decided once from the source header; never varies per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSchema {
    /// `Gender` and `Birth Year` are both present.
    Full,
    /// Neither demographic column exists.
    Reduced,
}

impl DatasetSchema {
    pub fn has_demographics(self) -> bool {
        matches!(self, DatasetSchema::Full)
    }
}

// ── TripRecord ────────────────────────────────────────────────────────────────

/// A single bike-share trip as read from a city dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    /// Local start time as written in the source (no timezone applied).
    pub start_time: NaiveDateTime,
    /// Local end time as written in the source.
    pub end_time: NaiveDateTime,
    /// Trip length in whole seconds.
    pub trip_duration_seconds: u64,
    pub start_station: String,
    pub end_station: String,
    /// Rider category, e.g. `"Subscriber"` or `"Customer"`. Empty when the
    /// source cell was blank.
    pub user_type: String,
    /// Only ever `Some` for datasets with [`DatasetSchema::Full`].
    #[serde(default)]
    pub gender: Option<String>,
    /// Only ever `Some` for datasets with [`DatasetSchema::Full`].
    #[serde(default)]
    pub birth_year: Option<i32>,
}

impl TripRecord {
    /// Calendar month of the start time.
    pub fn month(&self) -> Month {
        // `month()` is always in 1..=12.
        Month::try_from(self.start_time.month() as u8).unwrap_or(Month::January)
    }

    /// Day of the week of the start time.
    pub fn weekday(&self) -> Weekday {
        self.start_time.weekday()
    }

    /// Hour of the day (0-23) of the start time.
    pub fn hour(&self) -> u32 {
        self.start_time.hour()
    }

    /// Start and end station joined into a single route key.
    pub fn route(&self) -> String {
        format!("{} - {}", self.start_station, self.end_station)
    }
}

// ── Filters ───────────────────────────────────────────────────────────────────

/// Month selection applied to trip start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MonthFilter {
    #[default]
    All,
    Only(Month),
}

impl MonthFilter {
    pub fn accepts(&self, month: Month) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Only(wanted) => *wanted == month,
        }
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str("All months"),
            MonthFilter::Only(month) => f.write_str(month.name()),
        }
    }
}

impl FromStr for MonthFilter {
    type Err = ExplorerError;

    /// Accepts `all`, a month number (`1`-`12`) or a full / abbreviated name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(MonthFilter::All);
        }
        if let Ok(number) = trimmed.parse::<u8>() {
            return Month::try_from(number)
                .map(MonthFilter::Only)
                .map_err(|_| ExplorerError::InvalidFilter(format!("month {number}")));
        }
        trimmed
            .parse::<Month>()
            .map(MonthFilter::Only)
            .map_err(|_| ExplorerError::InvalidFilter(format!("month \"{trimmed}\"")))
    }
}

/// Day-of-week selection applied to trip start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DayFilter {
    #[default]
    All,
    Only(Weekday),
}

impl DayFilter {
    pub fn accepts(&self, day: Weekday) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::Only(wanted) => *wanted == day,
        }
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => f.write_str("All days"),
            DayFilter::Only(day) => f.write_str(weekday_name(*day)),
        }
    }
}

impl FromStr for DayFilter {
    type Err = ExplorerError;

    /// Accepts `all` or a case-insensitive full / abbreviated weekday name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(DayFilter::All);
        }
        trimmed
            .parse::<Weekday>()
            .map(DayFilter::Only)
            .map_err(|_| ExplorerError::InvalidFilter(format!("day \"{trimmed}\"")))
    }
}

/// The (month, day-of-week) pair narrowing which trips are analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    pub month: MonthFilter,
    pub day: DayFilter,
}

impl FilterSpec {
    pub fn new(month: MonthFilter, day: DayFilter) -> Self {
        Self { month, day }
    }

    /// A filter that keeps every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.month == MonthFilter::All && self.day == DayFilter::All
    }

    /// `true` when `record` passes both the month and the day filter.
    pub fn matches(&self, record: &TripRecord) -> bool {
        self.month.accepts(record.month()) && self.day.accepts(record.weekday())
    }
}

/// Full English name of a weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
