mod bootstrap;
mod report;
mod session;

use std::io::{self, Write};

use anyhow::{Context, Result};
use bikeshare_core::settings::Settings;
use bikeshare_data::analysis::analyze;
use bikeshare_data::reader::RecordStore;
use clap::Parser;

use crate::session::Session;

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Bikeshare Explorer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Data directory: {}", settings.data_dir.display());

    let datasets = settings.datasets();

    let Some(city) = settings.city else {
        let stdin = io::stdin();
        let mut session = Session::new(stdin.lock(), io::stdout(), datasets, settings.parallel);
        return session.run();
    };

    let store = RecordStore::load_city(city, &datasets)
        .with_context(|| format!("loading trip data for {}", city))?;

    let analysis = analyze(&store, settings.filter(), settings.parallel);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if settings.wants_json() {
        report::render_json(&mut out, &analysis.report)?;
    } else {
        report::render_text(&mut out, &analysis.report)?;
    }

    let mut pager = analysis.pager();
    for _ in 0..settings.raw_pages {
        if pager.is_exhausted() {
            break;
        }
        let first = pager.position();
        report::render_rows(&mut out, pager.next_page(), first)?;
    }

    out.flush()?;
    Ok(())
}
