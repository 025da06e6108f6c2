/// `resalyze` -- reconcile one day's MOAB event log against the standing
/// reservations.
///
/// Reads the generated reservation definition file to learn the reservation
/// families and their recurrence hours, scans the event log for the
/// requested day (today plus `--offset` days, UTC), and writes per-family
/// records of the reservations that existed and the jobs that completed
/// under them.
///
/// The defaults point at the well-known Jet paths; `--sdir` and `--rfile`
/// override them for testing against copied logs.
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use moablog::{find_eventlog, read_reservations, EventDispatcher};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;

const MOAB_STATS_DIR: &str = "/misc/moab/moabhome/stats";
const RESERVATION_FILE: &str = "/misc/moab/moabhome/etc/jet.reservations.cfg";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase the verbosity level
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// A file to write output to [default: stdout]
    #[arg(long, short)]
    outfile: Option<String>,

    /// The MOAB statistics directory
    #[arg(long, short, default_value = MOAB_STATS_DIR)]
    sdir: String,

    /// The offset in days from today to query (may be negative)
    #[arg(long, short = 't', default_value_t = 0, allow_hyphen_values = true)]
    offset: i64,

    /// Restrict output to a single reservation family
    #[arg(long, short)]
    reservation: Option<String>,

    /// A file containing all reservation names
    #[arg(long, short = 'R', default_value = RESERVATION_FILE)]
    rfile: String,
}

fn main() {
    match resalyze() {
        Ok(()) => {}
        Err(msg) => {
            eprintln!("ERROR: {}", msg);
            process::exit(1);
        }
    }
}

fn resalyze() -> Result<()> {
    let cli = Cli::parse();

    let mut store = read_reservations(&cli.rfile)?;
    let log = find_eventlog(&cli.sdir, cli.offset);
    if cli.verbose > 0 {
        eprintln!("Event log: {}", log);
        eprintln!("Reservation families: {}", store.len());
    }

    let mut dispatcher = EventDispatcher::standard()?;
    let stats = dispatcher.scan_eventlog(&log, &mut store)?;
    if cli.verbose > 0 {
        let nr: usize = store.iter().map(|p| p.reservation_count()).sum();
        let nj: usize = store.iter().map(|p| p.job_count()).sum();
        eprintln!("Lines scanned: {}", stats.lines);
        eprintln!("Lines without a registered event type: {}", stats.skipped);
        eprintln!("Reservation events: {}", nr);
        eprintln!("Job events: {}", nj);
    }

    let only = cli.reservation.as_deref();
    match &cli.outfile {
        Some(f) => {
            let file =
                File::create(f).with_context(|| format!("unable to create output file {f}"))?;
            let mut w = BufWriter::new(file);
            output::write_projects(&mut w, &store, only)?;
            w.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut w = stdout.lock();
            output::write_projects(&mut w, &store, only)?;
        }
    }
    Ok(())
}
