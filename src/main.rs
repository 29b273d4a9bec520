use clap::Parser;
use lib::{JobEntry, JobState, SimpleLogger, run_batch};
use log::debug;
use std::time::Instant;

static LOGGER: SimpleLogger = SimpleLogger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level for output
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() {
    // Initialize timer and logger
    let total_start = Instant::now();
    log::set_logger(&LOGGER).unwrap();

    // Acquire CLI args
    let args = Args::parse();
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }

    // UI
    println!("Recupera! Dataset recovery pipeline");

    // The batch is fixed: two broken database dumps next to the working dir.
    let entries = JobEntry::default_batch();
    debug!("Processing {} fixed entries", entries.len());

    let states = run_batch(&entries);

    // Show summary. Per-entry failures were already logged; the process still
    // exits 0 so the remaining outputs stay usable.
    let exported = states
        .iter()
        .filter(|state| **state == JobState::Exported)
        .count();
    let aborted = states.len() - exported;
    println!(
        "Processed {} entries: {} exported, {} aborted",
        states.len(),
        exported,
        aborted
    );
    println!("Pipeline completed in {:.2?}", total_start.elapsed());
}
