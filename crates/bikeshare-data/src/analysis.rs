//! Main analysis pipeline for the bikeshare explorer.
//!
//! Filters a loaded [`RecordStore`] and runs every aggregator over the
//! result, returning a [`TripReport`] for the presentation layer together
//! with the filtered trips for raw-row paging.

use std::thread;
use std::time::Instant;

use bikeshare_core::models::{City, DatasetSchema, FilterSpec, TripRecord};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::aggregator::{DurationStats, StationStats, TimeStats, UserStats};
use crate::pager::RowPager;
use crate::reader::RecordStore;

// ── Public types ──────────────────────────────────────────────────────────────

/// Wall-clock seconds spent in each step of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionTimings {
    pub filter_seconds: f64,
    pub time_stats_seconds: f64,
    pub station_stats_seconds: f64,
    pub duration_stats_seconds: f64,
    pub user_stats_seconds: f64,
}

/// Metadata produced alongside the statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// ISO-8601 timestamp when this report was generated.
    pub generated_at: String,
    /// Number of trips in the store before filtering.
    pub records_loaded: usize,
    /// Whether the aggregators ran on separate threads.
    pub parallel: bool,
    pub timings: SectionTimings,
}

/// Every statistic computed for one (city, filter) selection.
///
/// Sections always appear in the order time, stations, durations, users.
#[derive(Debug, Clone, Serialize)]
pub struct TripReport {
    pub city: City,
    pub schema: DatasetSchema,
    pub filter: FilterSpec,
    /// Number of trips left after filtering.
    pub trip_count: usize,
    pub time: TimeStats,
    pub stations: StationStats,
    pub durations: DurationStats,
    pub users: UserStats,
    pub metadata: ReportMetadata,
}

/// The filtered trips together with their report.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub trips: Vec<TripRecord>,
    pub report: TripReport,
}

impl Analysis {
    /// A fresh pager over the filtered trips, starting at the first row.
    pub fn pager(&self) -> RowPager<'_> {
        RowPager::new(&self.trips)
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline.
///
/// 1. Filter the store's trips by `filter`.
/// 2. Compute the four statistic sections, concurrently when `parallel`.
/// 3. Return the trips and a [`TripReport`].
pub fn analyze(store: &RecordStore, filter: FilterSpec, parallel: bool) -> Analysis {
    // ── Step 1: Filter ────────────────────────────────────────────────────────
    let (trips, filter_seconds) = timed(|| store.filter(&filter));

    // ── Step 2: Aggregate ─────────────────────────────────────────────────────
    let mut report = summarize(store, filter, &trips, parallel);
    report.metadata.timings.filter_seconds = filter_seconds;

    info!(
        "Analysed {} of {} {} trips ({} / {})",
        report.trip_count,
        store.len(),
        store.city(),
        filter.month,
        filter.day
    );

    Analysis { trips, report }
}

/// Compute every statistic section over `trips`, which must already be
/// filtered from `store` by `filter`.
pub fn summarize(
    store: &RecordStore,
    filter: FilterSpec,
    trips: &[TripRecord],
    parallel: bool,
) -> TripReport {
    let schema = store.schema();

    let sections = if parallel {
        compute_parallel(trips, schema)
    } else {
        compute_sequential(trips, schema)
    };

    TripReport {
        city: store.city(),
        schema,
        filter,
        trip_count: trips.len(),
        time: sections.time.0,
        stations: sections.stations.0,
        durations: sections.durations.0,
        users: sections.users.0,
        metadata: ReportMetadata {
            generated_at: Utc::now().to_rfc3339(),
            records_loaded: store.len(),
            parallel,
            timings: SectionTimings {
                filter_seconds: 0.0,
                time_stats_seconds: sections.time.1,
                station_stats_seconds: sections.stations.1,
                duration_stats_seconds: sections.durations.1,
                user_stats_seconds: sections.users.1,
            },
        },
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Each section paired with the seconds it took.
struct Sections {
    time: (TimeStats, f64),
    stations: (StationStats, f64),
    durations: (DurationStats, f64),
    users: (UserStats, f64),
}

fn compute_sequential(trips: &[TripRecord], schema: DatasetSchema) -> Sections {
    Sections {
        time: timed(|| TimeStats::compute(trips)),
        stations: timed(|| StationStats::compute(trips)),
        durations: timed(|| DurationStats::compute(trips)),
        users: timed(|| UserStats::compute(trips, schema)),
    }
}

/// Runs the aggregators on scoped threads. They only read `trips`, so no
/// synchronisation is needed; results are placed by name, not by completion.
fn compute_parallel(trips: &[TripRecord], schema: DatasetSchema) -> Sections {
    thread::scope(|scope| {
        let time = scope.spawn(|| timed(|| TimeStats::compute(trips)));
        let stations = scope.spawn(|| timed(|| StationStats::compute(trips)));
        let durations = scope.spawn(|| timed(|| DurationStats::compute(trips)));
        let users = timed(|| UserStats::compute(trips, schema));

        Sections {
            time: join(time),
            stations: join(stations),
            durations: join(durations),
            users,
        }
    })
}

/// Join a scoped aggregator thread, re-raising its panic on this thread.
fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
}

fn timed<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed().as_secs_f64())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
