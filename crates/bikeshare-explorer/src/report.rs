//! Console rendering of trip reports and raw rows.

use std::io::{self, Write};

use bikeshare_core::formatting::{format_count, format_decimal, format_duration};
use bikeshare_core::models::{weekday_name, TripRecord};
use bikeshare_core::time_utils::format_hour;
use bikeshare_data::aggregator::{
    CategoryCount, Demographic, DurationStats, Popular, StationStats, TiedModes, TimeStats,
    UserStats,
};
use bikeshare_data::analysis::TripReport;

const RULE: &str = "----------------------------------------";
const NO_DATA: &str = "no data for this selection";

/// Write the full text report: time, stations, durations, users.
pub fn render_text<W: Write>(out: &mut W, report: &TripReport) -> io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "Bikeshare statistics for {} ({}, {}): {} of {} trips",
        report.city,
        report.filter.month,
        report.filter.day,
        format_count(report.trip_count as u128),
        format_count(report.metadata.records_loaded as u128),
    )?;

    let timings = &report.metadata.timings;
    render_time(out, &report.time)?;
    took(out, timings.time_stats_seconds)?;
    render_stations(out, &report.stations)?;
    took(out, timings.station_stats_seconds)?;
    render_durations(out, &report.durations)?;
    took(out, timings.duration_stats_seconds)?;
    render_users(out, &report.users, report.city.name())?;
    took(out, timings.user_stats_seconds)?;
    Ok(())
}

/// Pretty-printed JSON of the whole report.
pub fn render_json<W: Write>(out: &mut W, report: &TripReport) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    writeln!(out, "{json}")
}

/// One line per trip, numbered from `first_index + 1`.
pub fn render_rows<W: Write>(out: &mut W, rows: &[TripRecord], first_index: usize) -> io::Result<()> {
    for (offset, trip) in rows.iter().enumerate() {
        let mut line = format!(
            "{:>6}  {}  {}  {:>6}s  {} -> {}  {}",
            first_index + offset + 1,
            trip.start_time.format("%Y-%m-%d %H:%M:%S"),
            trip.end_time.format("%Y-%m-%d %H:%M:%S"),
            trip.trip_duration_seconds,
            trip.start_station,
            trip.end_station,
            display_or_dash(&trip.user_type),
        );
        if let Some(gender) = &trip.gender {
            line.push_str(&format!("  {gender}"));
        }
        if let Some(year) = trip.birth_year {
            line.push_str(&format!("  b.{year}"));
        }
        writeln!(out, "{line}")?;
    }
    Ok(())
}

// ── Sections ──────────────────────────────────────────────────────────────────

fn render_time<W: Write>(out: &mut W, stats: &TimeStats) -> io::Result<()> {
    writeln!(out, "\nThe Most Frequent Times of Travel\n")?;
    writeln!(
        out,
        "Most popular start month: {}",
        popular(&stats.popular_month, |m| m.name().to_string())
    )?;
    writeln!(
        out,
        "Most popular start day of the week: {}",
        popular(&stats.popular_day, |d| weekday_name(*d).to_string())
    )?;
    writeln!(
        out,
        "Most popular start hour (24h): {}",
        popular(&stats.popular_hour, |h| format_hour(*h))
    )
}

fn render_stations<W: Write>(out: &mut W, stats: &StationStats) -> io::Result<()> {
    writeln!(out, "\nThe Most Popular Stations and Trip\n")?;
    writeln!(out, "Most popular start station: {}", tied(stats.start_stations.as_ref()))?;
    writeln!(out, "Most popular end station: {}", tied(stats.end_stations.as_ref()))?;
    writeln!(out, "Most frequent trip: {}", tied(stats.routes.as_ref()))
}

fn render_durations<W: Write>(out: &mut W, stats: &DurationStats) -> io::Result<()> {
    writeln!(out, "\nTrip Duration\n")?;
    writeln!(
        out,
        "Total travel time: {} seconds ({})",
        format_count(stats.total_seconds),
        format_duration(stats.total_seconds as f64)
    )?;
    match stats.mean_seconds {
        Some(mean) => writeln!(
            out,
            "Mean travel time: {} seconds ({})",
            format_decimal(mean),
            format_duration(mean)
        ),
        None => writeln!(out, "Mean travel time: {NO_DATA}"),
    }
}

fn render_users<W: Write>(out: &mut W, stats: &UserStats, city: &str) -> io::Result<()> {
    writeln!(out, "\nUser Stats\n")?;
    if stats.user_types.is_empty() {
        writeln!(out, "Riders by user type: {NO_DATA}")?;
    } else {
        writeln!(out, "Riders by user type:")?;
        write_counts(out, &stats.user_types)?;
    }

    match &stats.genders {
        Demographic::Available(counts) => {
            writeln!(out, "Riders by gender:")?;
            write_counts(out, counts)?;
        }
        Demographic::NoData => writeln!(out, "Riders by gender: {NO_DATA}")?,
        Demographic::NotCollected => writeln!(out, "No gender data is available for {city}")?,
    }

    match &stats.birth_years {
        Demographic::Available(years) => {
            writeln!(out, "Earliest birth year: {}", years.earliest)?;
            writeln!(out, "Most recent birth year: {}", years.most_recent)?;
            writeln!(
                out,
                "Most common birth year: {}",
                tied(Some(&years.most_common))
            )
        }
        Demographic::NoData => writeln!(out, "Birth years: {NO_DATA}"),
        Demographic::NotCollected => {
            writeln!(out, "No age or birth year data is available for {city}")
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn took<W: Write>(out: &mut W, seconds: f64) -> io::Result<()> {
    writeln!(out, "\nThis took {:.6} seconds.", seconds)?;
    writeln!(out, "{RULE}")
}

fn write_counts<W: Write>(out: &mut W, counts: &[CategoryCount]) -> io::Result<()> {
    for entry in counts {
        writeln!(out, "  {:<12} {}", entry.label, format_count(entry.count as u128))?;
    }
    Ok(())
}

fn popular<T>(value: &Option<Popular<T>>, label: impl Fn(&T) -> String) -> String {
    match value {
        Some(p) => format!("{} ({} trips)", label(&p.value), format_count(p.count as u128)),
        None => NO_DATA.to_string(),
    }
}

fn tied<T: ToString>(modes: Option<&TiedModes<T>>) -> String {
    match modes {
        Some(m) => {
            let names: Vec<String> = m.values.iter().map(ToString::to_string).collect();
            format!("{} ({} trips)", names.join(", "), format_count(m.count as u128))
        }
        None => NO_DATA.to_string(),
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
