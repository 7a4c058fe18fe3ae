//! Descriptive statistics over a filtered trip sequence.
//!
//! Four independent, read-only aggregators: travel times, station
//! popularity, trip durations and rider demographics. Each returns a fresh
//! summary value and treats an empty input as "no data" instead of failing.

use std::collections::HashMap;
use std::hash::Hash;

use bikeshare_core::models::{DatasetSchema, TripRecord};
use chrono::{Month, Weekday};
use serde::Serialize;
use tracing::warn;

// ── Shared summary types ──────────────────────────────────────────────────────

/// The single most frequent value of a field and how often it occurred.
///
/// Ties resolve to the earliest value in the field's natural order (January
/// first, Monday first, hour 0 first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Popular<T> {
    pub value: T,
    pub count: usize,
}

/// Every value sharing the highest frequency, sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TiedModes<T> {
    pub values: Vec<T>,
    pub count: usize,
}

impl<T> TiedModes<T> {
    fn map<U>(self, f: impl FnMut(T) -> U) -> TiedModes<U> {
        TiedModes {
            values: self.values.into_iter().map(f).collect(),
            count: self.count,
        }
    }
}

/// Number of trips carrying one label of a categorical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// A demographic section of the user report.
///
/// `NoData` means the dataset collects the field but no filtered trip has a
/// value; `NotCollected` means the dataset never carries the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Demographic<T> {
    Available(T),
    NoData,
    NotCollected,
}

impl<T> Demographic<T> {
    pub fn as_available(&self) -> Option<&T> {
        match self {
            Demographic::Available(value) => Some(value),
            _ => None,
        }
    }
}

// ── TimeStats ─────────────────────────────────────────────────────────────────

/// Most frequent start month, weekday and hour. `None` when there are no trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeStats {
    pub popular_month: Option<Popular<Month>>,
    pub popular_day: Option<Popular<Weekday>>,
    pub popular_hour: Option<Popular<u32>>,
}

impl TimeStats {
    pub fn compute(records: &[TripRecord]) -> Self {
        let mut months = [0usize; 12];
        let mut days = [0usize; 7];
        let mut hours = [0usize; 24];

        for record in records {
            months[record.month().number_from_month() as usize - 1] += 1;
            days[record.weekday().num_days_from_monday() as usize] += 1;
            hours[record.hour() as usize] += 1;
        }

        Self {
            popular_month: first_max(&months).and_then(|(idx, count)| {
                Month::try_from(idx as u8 + 1)
                    .ok()
                    .map(|value| Popular { value, count })
            }),
            popular_day: first_max(&days).map(|(idx, count)| Popular {
                value: weekday_from_monday(idx),
                count,
            }),
            popular_hour: first_max(&hours).map(|(idx, count)| Popular {
                value: idx as u32,
                count,
            }),
        }
    }
}

// ── StationStats ──────────────────────────────────────────────────────────────

/// Most used start station, end station and start→end route, each with all
/// tied winners. `None` when there are no trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationStats {
    pub start_stations: Option<TiedModes<String>>,
    pub end_stations: Option<TiedModes<String>>,
    /// Routes are rendered as `"<start> - <end>"`.
    pub routes: Option<TiedModes<String>>,
}

impl StationStats {
    pub fn compute(records: &[TripRecord]) -> Self {
        let start_stations = tied_modes(records.iter().map(|r| r.start_station.as_str()))
            .map(|modes| modes.map(str::to_string));
        let end_stations = tied_modes(records.iter().map(|r| r.end_station.as_str()))
            .map(|modes| modes.map(str::to_string));
        let routes = tied_modes(records.iter().map(TripRecord::route));

        Self {
            start_stations,
            end_stations,
            routes,
        }
    }
}

// ── DurationStats ─────────────────────────────────────────────────────────────

/// Total and mean trip duration in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub trip_count: usize,
    /// Summed as `u128` so no number of `u64` durations can overflow it.
    pub total_seconds: u128,
    /// `None` for an empty input rather than a division by zero.
    pub mean_seconds: Option<f64>,
}

impl DurationStats {
    pub fn compute(records: &[TripRecord]) -> Self {
        let total_seconds: u128 = records
            .iter()
            .map(|r| u128::from(r.trip_duration_seconds))
            .sum();
        let trip_count = records.len();
        let mean_seconds = if trip_count == 0 {
            None
        } else {
            Some(total_seconds as f64 / trip_count as f64)
        };

        Self {
            trip_count,
            total_seconds,
            mean_seconds,
        }
    }
}

// ── UserStats ─────────────────────────────────────────────────────────────────

/// Oldest, youngest and most common rider birth years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthYearStats {
    pub earliest: i32,
    pub most_recent: i32,
    pub most_common: TiedModes<i32>,
}

/// Rider counts per user type plus, where the dataset has them, gender and
/// birth-year statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    /// Ordered by count descending, then label. Empty when there are no trips.
    pub user_types: Vec<CategoryCount>,
    pub genders: Demographic<Vec<CategoryCount>>,
    pub birth_years: Demographic<BirthYearStats>,
}

impl UserStats {
    /// Dispatches on the dataset's schema; a reduced dataset reports its
    /// demographic sections as [`Demographic::NotCollected`].
    pub fn compute(records: &[TripRecord], schema: DatasetSchema) -> Self {
        if schema.has_demographics() {
            Self::with_demographics(records)
        } else {
            Self::without_demographics(records)
        }
    }

    fn with_demographics(records: &[TripRecord]) -> Self {
        let genders = category_counts(records.iter().filter_map(|r| r.gender.as_deref()));
        let genders = if genders.is_empty() {
            Demographic::NoData
        } else {
            Demographic::Available(genders)
        };

        let years: Vec<i32> = records.iter().filter_map(|r| r.birth_year).collect();
        let birth_years = match (
            years.iter().min(),
            years.iter().max(),
            tied_modes(years.iter().copied()),
        ) {
            (Some(&earliest), Some(&most_recent), Some(most_common)) => {
                Demographic::Available(BirthYearStats {
                    earliest,
                    most_recent,
                    most_common,
                })
            }
            _ => Demographic::NoData,
        };

        Self {
            user_types: user_type_counts(records),
            genders,
            birth_years,
        }
    }

    fn without_demographics(records: &[TripRecord]) -> Self {
        Self {
            user_types: user_type_counts(records),
            genders: Demographic::NotCollected,
            birth_years: Demographic::NotCollected,
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Per-type rider counts. Blank user types are left out and logged once.
fn user_type_counts(records: &[TripRecord]) -> Vec<CategoryCount> {
    let blanks = blank_user_types(records);
    if blanks > 0 {
        warn!("Skipped {} trips with a blank user type", blanks);
    }
    category_counts(
        records
            .iter()
            .map(|r| r.user_type.as_str())
            .filter(|t| !t.is_empty()),
    )
}

fn blank_user_types(records: &[TripRecord]) -> usize {
    records.iter().filter(|r| r.user_type.is_empty()).count()
}

/// Count each label, ordered by count descending then label ascending.
fn category_counts<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out
}

/// All values tied for the highest count, sorted ascending.
fn tied_modes<K>(values: impl Iterator<Item = K>) -> Option<TiedModes<K>>
where
    K: Eq + Hash + Ord,
{
    let mut counts: HashMap<K, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let best = counts.values().copied().max()?;
    let mut winners: Vec<K> = counts
        .into_iter()
        .filter(|(_, count)| *count == best)
        .map(|(value, _)| value)
        .collect();
    winners.sort();

    Some(TiedModes {
        values: winners,
        count: best,
    })
}

/// Index and count of the first maximal non-zero bucket.
fn first_max(buckets: &[usize]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for (idx, &count) in buckets.iter().enumerate() {
        if count > best.map_or(0, |(_, c)| c) {
            best = Some((idx, count));
        }
    }
    best
}

fn weekday_from_monday(idx: usize) -> Weekday {
    match idx {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
