//! # Tweetsearch
//!
//! Searches Twitter/X for tweets matching a term within a recent time window
//! and writes the timestamp and text of each match to CSV or a spreadsheet.
//!
//! ## Usage
//!
//! ```bash
//! # Last day of English tweets about Rust, CSV on STDOUT
//! tweetsearch -l en rustlang
//!
//! # At most 500 tweets from the last 6 hours into a spreadsheet
//! tweetsearch -t 6h -n 500 -f xlsx -o results.xlsx "rust async"
//!
//! # Debug logging (logs go to STDERR)
//! RUST_LOG=debug tweetsearch -o out.csv rustlang
//! ```

use clap::Parser;
use log::{error, info};

use tweetsearch::{run, Args};

/// Main entry point for the tweetsearch command.
///
/// Initializes logging, parses the arguments and runs the search. Any fatal
/// error (bad configuration, unsupported output, failed authentication) is
/// printed to STDERR and the process exits with status 1.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize the logging system
    env_logger::init();

    let args = Args::parse();

    match run(args).await {
        Ok(count) => {
            info!("Search finished, {} results written", count);
        }
        Err(e) => {
            error!("Search failed: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
