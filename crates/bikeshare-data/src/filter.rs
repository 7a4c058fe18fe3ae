//! Month / day-of-week filtering of trip sequences.

use bikeshare_core::models::{FilterSpec, TripRecord};
use tracing::debug;

/// Return the trips passing `spec`, preserving their relative order.
///
/// Month and day filters combine with AND. An empty result is valid.
pub fn filter_trips(records: &[TripRecord], spec: &FilterSpec) -> Vec<TripRecord> {
    if spec.is_unrestricted() {
        return records.to_vec();
    }

    let filtered: Vec<TripRecord> = records
        .iter()
        .filter(|record| spec.matches(record))
        .cloned()
        .collect();

    debug!(
        "Filter {} / {} kept {} of {} trips",
        spec.month,
        spec.day,
        filtered.len(),
        records.len()
    );

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use bikeshare_core::models::{DayFilter, MonthFilter};
    use chrono::{Month, NaiveDate, Weekday};

    fn trip(y: i32, m: u32, d: u32, duration: u64) -> TripRecord {
        let start = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        TripRecord {
            start_time: start,
            end_time: start + chrono::Duration::seconds(duration as i64),
            trip_duration_seconds: duration,
            start_station: "A".to_string(),
            end_station: "B".to_string(),
            user_type: "Subscriber".to_string(),
            gender: None,
            birth_year: None,
        }
    }

    /// Mondays 2017-03-06 / 2017-04-03, Tuesdays 2017-03-07 / 2017-04-04.
    fn sample() -> Vec<TripRecord> {
        vec![
            trip(2017, 3, 6, 1),
            trip(2017, 4, 4, 2),
            trip(2017, 3, 7, 3),
            trip(2017, 4, 3, 4),
            trip(2017, 3, 6, 5),
        ]
    }

    fn durations(records: &[TripRecord]) -> Vec<u64> {
        records.iter().map(|r| r.trip_duration_seconds).collect()
    }

    fn march() -> MonthFilter {
        MonthFilter::Only(Month::March)
    }

    #[test]
    fn test_unrestricted_is_identity() {
        let records = sample();
        assert_eq!(filter_trips(&records, &FilterSpec::all()), records);
    }

    #[test]
    fn test_month_only() {
        let filtered = filter_trips(&sample(), &FilterSpec::new(march(), DayFilter::All));
        assert_eq!(durations(&filtered), vec![1, 3, 5]);
    }

    #[test]
    fn test_day_only() {
        let filtered = filter_trips(
            &sample(),
            &FilterSpec::new(MonthFilter::All, DayFilter::Only(Weekday::Mon)),
        );
        assert_eq!(durations(&filtered), vec![1, 4, 5]);
    }

    #[test]
    fn test_month_and_day_are_conjunctive() {
        let filtered = filter_trips(
            &sample(),
            &FilterSpec::new(march(), DayFilter::Only(Weekday::Mon)),
        );
        assert_eq!(durations(&filtered), vec![1, 5]);
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let filtered = filter_trips(
            &sample(),
            &FilterSpec::new(MonthFilter::Only(Month::December), DayFilter::All),
        );
        assert!(filtered.is_empty());
        assert!(filter_trips(&[], &FilterSpec::all()).is_empty());
    }

    #[test]
    fn test_result_is_ordered_subsequence() {
        let records = sample();
        let specs = [
            FilterSpec::new(march(), DayFilter::All),
            FilterSpec::new(MonthFilter::All, DayFilter::Only(Weekday::Tue)),
            FilterSpec::new(
                MonthFilter::Only(Month::April),
                DayFilter::Only(Weekday::Mon),
            ),
        ];
        for spec in &specs {
            let filtered = filter_trips(&records, spec);
            // Walk the source once; every filtered trip must be found in order.
            let mut source = records.iter();
            for kept in &filtered {
                assert!(source.any(|r| r == kept), "order broken for {spec:?}");
            }
        }
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let spec = FilterSpec::new(march(), DayFilter::Only(Weekday::Mon));
        let once = filter_trips(&sample(), &spec);
        let twice = filter_trips(&once, &spec);
        assert_eq!(once, twice);
    }
}
