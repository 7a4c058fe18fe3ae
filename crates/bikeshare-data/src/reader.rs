//! CSV loading for city trip datasets.
//!
//! Reads one city's trip table into an immutable [`RecordStore`], deciding the
//! dataset's [`DatasetSchema`] from the header and failing fast on any row that
//! cannot be parsed.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bikeshare_core::error::{ExplorerError, Result};
use bikeshare_core::models::{City, DatasetSchema, FilterSpec, TripRecord};
use bikeshare_core::settings::CityDatasets;
use bikeshare_core::time_utils::parse_local_timestamp;
use csv::StringRecord;
use serde::Deserialize;
use tracing::{debug, info};

use crate::filter::filter_trips;

/// Columns every city dataset must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Start Time",
    "End Time",
    "Trip Duration",
    "Start Station",
    "End Station",
    "User Type",
];

const GENDER_COLUMN: &str = "Gender";
const BIRTH_YEAR_COLUMN: &str = "Birth Year";

// ── RecordStore ───────────────────────────────────────────────────────────────

/// All trips of one city, in source order.
///
/// Immutable once built; filtering produces new sequences instead of
/// rewriting the store.
#[derive(Debug, Clone)]
pub struct RecordStore {
    city: City,
    schema: DatasetSchema,
    records: Vec<TripRecord>,
}

impl RecordStore {
    /// Load the dataset configured for `city` in `datasets`.
    pub fn load_city(city: City, datasets: &CityDatasets) -> Result<Self> {
        let path = datasets
            .source_for(city)
            .ok_or_else(|| ExplorerError::UnknownCity(city.name().to_string()))?;
        Self::load(city, path)
    }

    /// Load `city`'s trips from the CSV file at `path`.
    pub fn load(city: City, path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ExplorerError::SourceNotFound {
                city: city.name().to_string(),
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path).map_err(|source| ExplorerError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self::from_reader(city, BufReader::new(file))?;
        info!(
            "Loaded {} trips for {} from {} ({:?} schema)",
            store.len(),
            city,
            path.display(),
            store.schema
        );
        Ok(store)
    }

    /// Parse CSV data from any reader. The first row must be the header.
    pub fn from_reader<R: Read>(city: City, reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let schema = detect_schema(&headers)?;

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let raw: RawTripRow = row.deserialize(Some(&headers))?;
            records.push(raw.into_record(line, schema)?);
        }

        debug!("Parsed {} rows for {}", records.len(), city);

        Ok(Self {
            city,
            schema,
            records,
        })
    }

    /// Build a store from records that are already parsed.
    ///
    /// For a [`DatasetSchema::Reduced`] store any demographic values on the
    /// records are dropped, so a store never mixes the two shapes.
    pub fn from_records(city: City, schema: DatasetSchema, mut records: Vec<TripRecord>) -> Self {
        if schema == DatasetSchema::Reduced {
            for record in &mut records {
                record.gender = None;
                record.birth_year = None;
            }
        }
        Self {
            city,
            schema,
            records,
        }
    }

    pub fn city(&self) -> City {
        self.city
    }

    pub fn schema(&self) -> DatasetSchema {
        self.schema
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Trips passing `spec`, in source order.
    pub fn filter(&self, spec: &FilterSpec) -> Vec<TripRecord> {
        filter_trips(&self.records, spec)
    }
}

// ── Row parsing ───────────────────────────────────────────────────────────────

/// One CSV row before validation. Unknown columns (such as the unnamed index
/// column) are ignored.
#[derive(Debug, Deserialize)]
struct RawTripRow {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time")]
    end_time: String,
    #[serde(rename = "Trip Duration")]
    trip_duration: String,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "User Type", default)]
    user_type: String,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    #[serde(rename = "Birth Year", default)]
    birth_year: Option<String>,
}

impl RawTripRow {
    fn into_record(self, line: u64, schema: DatasetSchema) -> Result<TripRecord> {
        let start_time = parse_local_timestamp(&self.start_time).ok_or_else(|| {
            ExplorerError::InvalidTimestamp {
                line,
                value: self.start_time.clone(),
            }
        })?;
        let end_time =
            parse_local_timestamp(&self.end_time).ok_or_else(|| ExplorerError::InvalidTimestamp {
                line,
                value: self.end_time.clone(),
            })?;
        let trip_duration_seconds = parse_duration_seconds(&self.trip_duration).ok_or_else(|| {
            ExplorerError::InvalidDuration {
                line,
                value: self.trip_duration.clone(),
            }
        })?;

        let (gender, birth_year) = match schema {
            DatasetSchema::Reduced => (None, None),
            DatasetSchema::Full => {
                let gender = self.gender.filter(|g| !g.is_empty());
                let birth_year = match self.birth_year.as_deref() {
                    None | Some("") => None,
                    Some(raw) => Some(parse_birth_year(raw).ok_or_else(|| {
                        ExplorerError::InvalidBirthYear {
                            line,
                            value: raw.to_string(),
                        }
                    })?),
                };
                (gender, birth_year)
            }
        };

        Ok(TripRecord {
            start_time,
            end_time,
            trip_duration_seconds,
            start_station: self.start_station,
            end_station: self.end_station,
            user_type: self.user_type,
            gender,
            birth_year,
        })
    }
}

/// Decide the schema from the header, rejecting tables that lack a required
/// column or carry only one of the demographic columns.
fn detect_schema(headers: &StringRecord) -> Result<DatasetSchema> {
    let has = |name: &str| headers.iter().any(|h| h == name);

    if let Some(missing) = REQUIRED_COLUMNS.into_iter().find(|col| !has(col)) {
        return Err(ExplorerError::MissingColumn(missing.to_string()));
    }

    match (has(GENDER_COLUMN), has(BIRTH_YEAR_COLUMN)) {
        (true, true) => Ok(DatasetSchema::Full),
        (false, false) => Ok(DatasetSchema::Reduced),
        _ => Err(ExplorerError::InconsistentSchema),
    }
}

/// Whole seconds from `"1039"` or `"1039.41"`; fractional values are rounded.
/// Values that do not fit a `u64` are rejected rather than saturated.
fn parse_duration_seconds(raw: &str) -> Option<u64> {
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(secs);
    }
    let value = raw.parse::<f64>().ok()?.round();
    // `u64::MAX as f64` rounds up to 2^64, which is itself out of range.
    if value.is_finite() && value >= 0.0 && value < u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

/// A year from `"1989"` or `"1989.0"`. Non-integral values are rejected.
fn parse_birth_year(raw: &str) -> Option<i32> {
    if let Ok(year) = raw.parse::<i32>() {
        return Some(year);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i32)
    } else {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::io::Write;
    use tempfile::TempDir;

    const FULL_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1423854,2017-06-23 15:09:32,2017-06-23 15:14:53,321,Wood St & Hubbard St,Damen Ave & Chicago Ave,Subscriber,Male,1992.0
955915,2017-05-25 18:19:03,2017-05-25 18:45:53,1610,Theater on the Lake,Sheffield Ave & Waveland Ave,Subscriber,Female,1992.0
9031,2017-01-04 08:27:49,2017-01-04 08:34:45,416,May St & Taylor St,Wood St & Taylor St,Customer,,
";

    const REDUCED_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
1621326,2017-06-21 08:36:34,2017-06-21 08:44:43,489.066,14th & Belmont St NW,15th & K St NW,Subscriber
482740,2017-03-11 10:40:00,2017-03-11 10:46:00,402.549,Yuma St & Tenley Circle NW,Connecticut Ave & Yuma St NW,Subscriber
";

    fn write_csv(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    // ── Schema detection ──────────────────────────────────────────────────────

    #[test]
    fn test_full_schema_detected() {
        let store = RecordStore::from_reader(City::Chicago, FULL_CSV.as_bytes()).unwrap();
        assert_eq!(store.schema(), DatasetSchema::Full);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_reduced_schema_detected() {
        let store = RecordStore::from_reader(City::Washington, REDUCED_CSV.as_bytes()).unwrap();
        assert_eq!(store.schema(), DatasetSchema::Reduced);
        assert!(store
            .records()
            .iter()
            .all(|r| r.gender.is_none() && r.birth_year.is_none()));
    }

    #[test]
    fn test_single_demographic_column_is_rejected() {
        let csv = "Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender\n";
        let err = RecordStore::from_reader(City::Chicago, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ExplorerError::InconsistentSchema));
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "Start Time,End Time,Start Station,End Station,User Type\n";
        let err = RecordStore::from_reader(City::Chicago, csv.as_bytes()).unwrap_err();
        match err {
            ExplorerError::MissingColumn(col) => assert_eq!(col, "Trip Duration"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_source_is_missing_columns() {
        let err = RecordStore::from_reader(City::Chicago, "".as_bytes()).unwrap_err();
        assert!(matches!(err, ExplorerError::MissingColumn(_)));
    }

    // ── Row parsing ───────────────────────────────────────────────────────────

    #[test]
    fn test_row_fields_parsed() {
        let store = RecordStore::from_reader(City::Chicago, FULL_CSV.as_bytes()).unwrap();
        let first = &store.records()[0];
        assert_eq!(first.start_time.month(), 6);
        assert_eq!(first.start_time.hour(), 15);
        assert_eq!(first.end_time.minute(), 14);
        assert_eq!(first.trip_duration_seconds, 321);
        assert_eq!(first.start_station, "Wood St & Hubbard St");
        assert_eq!(first.end_station, "Damen Ave & Chicago Ave");
        assert_eq!(first.user_type, "Subscriber");
        assert_eq!(first.gender.as_deref(), Some("Male"));
        assert_eq!(first.birth_year, Some(1992));
    }

    #[test]
    fn test_blank_demographics_become_none() {
        let store = RecordStore::from_reader(City::Chicago, FULL_CSV.as_bytes()).unwrap();
        let third = &store.records()[2];
        assert_eq!(third.gender, None);
        assert_eq!(third.birth_year, None);
    }

    #[test]
    fn test_fractional_durations_rounded() {
        let store = RecordStore::from_reader(City::Washington, REDUCED_CSV.as_bytes()).unwrap();
        assert_eq!(store.records()[0].trip_duration_seconds, 489);
        assert_eq!(store.records()[1].trip_duration_seconds, 403);
    }

    #[test]
    fn test_source_order_preserved() {
        let store = RecordStore::from_reader(City::Chicago, FULL_CSV.as_bytes()).unwrap();
        let durations: Vec<u64> = store
            .records()
            .iter()
            .map(|r| r.trip_duration_seconds)
            .collect();
        assert_eq!(durations, vec![321, 1610, 416]);
    }

    #[test]
    fn test_bad_timestamp_fails_whole_load() {
        let csv = "\
Start Time,End Time,Trip Duration,Start Station,End Station,User Type
2017-06-21 08:36:34,2017-06-21 08:44:43,489,A,B,Subscriber
yesterday,2017-06-21 08:44:43,489,A,B,Subscriber
";
        let err = RecordStore::from_reader(City::Washington, csv.as_bytes()).unwrap_err();
        match err {
            ExplorerError::InvalidTimestamp { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_duration_rejected() {
        let csv = "\
Start Time,End Time,Trip Duration,Start Station,End Station,User Type
2017-06-21 08:36:34,2017-06-21 08:44:43,-5,A,B,Subscriber
";
        let err = RecordStore::from_reader(City::Washington, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidDuration { .. }));
    }

    #[test]
    fn test_out_of_range_duration_rejected() {
        let csv = "\
Start Time,End Time,Trip Duration,Start Station,End Station,User Type
2017-06-21 08:36:34,2017-06-21 08:44:43,1e20,A,B,Subscriber
2017-06-21 09:36:34,2017-06-21 09:44:43,1e20,A,B,Subscriber
";
        let err = RecordStore::from_reader(City::Washington, csv.as_bytes()).unwrap_err();
        match err {
            ExplorerError::InvalidDuration { line, value } => {
                assert_eq!(line, 2);
                assert_eq!(value, "1e20");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_birth_year_rejected() {
        let csv = "\
Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
2017-06-21 08:36:34,2017-06-21 08:44:43,5,A,B,Subscriber,Male,nineteen
";
        let err = RecordStore::from_reader(City::Chicago, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidBirthYear { .. }));
    }

    #[test]
    fn test_parse_duration_seconds() {
        assert_eq!(parse_duration_seconds("0"), Some(0));
        assert_eq!(parse_duration_seconds("100"), Some(100));
        assert_eq!(parse_duration_seconds("99.5"), Some(100));
        assert_eq!(parse_duration_seconds("-1.0"), None);
        assert_eq!(parse_duration_seconds("NaN"), None);
        assert_eq!(parse_duration_seconds("ten"), None);
        assert_eq!(parse_duration_seconds("inf"), None);
        assert_eq!(parse_duration_seconds("1e20"), None);
        assert_eq!(
            parse_duration_seconds("18446744073709551615"),
            Some(u64::MAX)
        );
    }

    #[test]
    fn test_parse_birth_year() {
        assert_eq!(parse_birth_year("1989"), Some(1989));
        assert_eq!(parse_birth_year("1989.0"), Some(1989));
        assert_eq!(parse_birth_year("1989.5"), None);
    }

    // ── File loading ──────────────────────────────────────────────────────────

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "chicago.csv", FULL_CSV);
        let store = RecordStore::load(City::Chicago, &path).unwrap();
        assert_eq!(store.city(), City::Chicago);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_load_city_via_datasets() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "washington.csv", REDUCED_CSV);
        let datasets = CityDatasets::in_dir(dir.path());
        let store = RecordStore::load_city(City::Washington, &datasets).unwrap();
        assert_eq!(store.schema(), DatasetSchema::Reduced);
    }

    #[test]
    fn test_missing_source_file() {
        let dir = TempDir::new().unwrap();
        let datasets = CityDatasets::in_dir(dir.path());
        let err = RecordStore::load_city(City::NewYorkCity, &datasets).unwrap_err();
        assert!(matches!(err, ExplorerError::SourceNotFound { .. }));
    }

    #[test]
    fn test_from_records_reduced_drops_demographics() {
        let mut store = RecordStore::from_reader(City::Chicago, FULL_CSV.as_bytes()).unwrap();
        let records = std::mem::take(&mut store.records);
        let reduced = RecordStore::from_records(City::Washington, DatasetSchema::Reduced, records);
        assert!(reduced.records().iter().all(|r| r.gender.is_none()));
        assert!(reduced.records().iter().all(|r| r.birth_year.is_none()));
    }
}
