//! Interactive question-and-answer session.
//!
//! Asks for a city, month and weekday, prints the report, offers raw rows
//! five at a time and then offers to start over. All free-text validation
//! happens here; the data layer only ever sees parsed values.

use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::Result;
use bikeshare_core::models::{City, DayFilter, FilterSpec, MonthFilter};
use bikeshare_core::settings::CityDatasets;
use bikeshare_data::analysis::analyze;
use bikeshare_data::reader::RecordStore;
use tracing::{debug, warn};

use crate::report;

/// One interactive run over a pair of input / output streams.
pub struct Session<R, W> {
    input: R,
    output: W,
    datasets: CityDatasets,
    parallel: bool,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, datasets: CityDatasets, parallel: bool) -> Self {
        Self {
            input,
            output,
            datasets,
            parallel,
        }
    }

    /// Loop until the user declines to restart or the input ends.
    pub fn run(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "Hello! Let's explore some US bikeshare data!"
        )?;

        loop {
            if !self.run_once()? {
                break;
            }
            if !self.confirm("\nWould you like to restart? Enter yes or no.")? {
                break;
            }
        }

        writeln!(self.output, "Goodbye!")?;
        Ok(())
    }

    /// One selection cycle. Returns `false` when the input ran out.
    fn run_once(&mut self) -> Result<bool> {
        let Some(city) = self.ask::<City>("\nWhich city? Chicago, New York City, or Washington:")?
        else {
            return Ok(false);
        };
        let Some(month) = self.ask::<MonthFilter>(
            "\nWhich month? Type a month name (e.g. March), a number 1-12, or 'all':",
        )?
        else {
            return Ok(false);
        };
        let Some(day) =
            self.ask::<DayFilter>("\nWhich day? Type a weekday name (e.g. Monday) or 'all':")?
        else {
            return Ok(false);
        };

        writeln!(
            self.output,
            "\nShowing bikeshare data for {} ({}, {}).",
            city, month, day
        )?;

        let store = match RecordStore::load_city(city, &self.datasets) {
            Ok(store) => store,
            Err(e) => {
                warn!("Load failed for {}: {}", city, e);
                writeln!(self.output, "\nCould not load data for {}: {}", city, e)?;
                return Ok(true);
            }
        };

        let analysis = analyze(&store, FilterSpec::new(month, day), self.parallel);
        report::render_text(&mut self.output, &analysis.report)?;

        let mut pager = analysis.pager();
        let mut question = "\nWould you like to see 5 rows of raw data? Enter yes or no.";
        while !pager.is_exhausted() && self.confirm(question)? {
            let first = pager.position();
            report::render_rows(&mut self.output, pager.next_page(), first)?;
            question = "\nWould you like to see the next 5 rows of raw data? Enter yes or no.";
        }
        if pager.is_exhausted() && pager.position() > 0 {
            writeln!(self.output, "\nNo more rows.")?;
        }

        Ok(true)
    }

    /// Ask until the answer parses. `None` on end of input.
    fn ask<T: FromStr>(&mut self, question: &str) -> Result<Option<T>> {
        loop {
            let Some(answer) = self.prompt(question)? else {
                return Ok(None);
            };
            match answer.parse::<T>() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => {
                    debug!("Rejected answer {:?}", answer);
                    writeln!(self.output, "I'm sorry, I don't understand \"{}\".", answer)?;
                }
            }
        }
    }

    /// `true` only for an answer of "yes" or "y"; end of input counts as no.
    fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(self
            .prompt(question)?
            .map(|a| matches!(a.to_lowercase().as_str(), "yes" | "y"))
            .unwrap_or(false))
    }

    fn prompt(&mut self, question: &str) -> Result<Option<String>> {
        writeln!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Give back the output stream (used to inspect transcripts).
    pub fn into_output(self) -> W {
        self.output
    }
}
