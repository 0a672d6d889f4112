//! Command-line arguments and their resolution against configured defaults.

use std::path::PathBuf;

use clap::Parser;
use log::warn;

use crate::duration::Duration;
use crate::error::OutputError;
use crate::output::{OutputDestination, OutputFormat};

#[derive(Parser, Debug, Clone)]
#[command(name = "tweetsearch")]
#[command(about = "Search Twitter for recent tweets and write them to CSV or a spreadsheet", long_about = None)]
#[command(version)]
pub struct Args {
    /// The desired language of returned tweets (ISO 639-1)
    #[arg(short, long)]
    pub lang: Option<String>,

    /// The output format. Options are csv, xls or xlsx
    #[arg(short, long)]
    pub format: Option<String>,

    /// The name of the output file. Output goes to STDOUT if not specified
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,

    /// How far back to search. Understands days, hours, minutes, seconds (d, h, m, s)
    #[arg(short, long, default_value = "1 day")]
    pub time: Duration,

    /// The number of tweets to return. Zero or negative means no limit
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub number: i64,

    /// Path to the INI config file [default: $TWEETSEARCH_CONFIG or config.ini]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// The term(s) to search for
    pub term: String,
}

impl Args {
    /// Language to search in: `--lang` lower-cased if it is exactly two characters, else `default`.
    ///
    /// The flag value is taken as given; surrounding whitespace makes it invalid.
    pub fn resolve_lang(&self, default: &str) -> String {
        let default = default.trim().to_lowercase();
        match &self.lang {
            Some(lang) => {
                let lang = lang.to_lowercase();
                if lang.chars().count() == 2 {
                    lang
                } else {
                    warn!(
                        "Language '{}' is not an ISO 639-1 code, using default '{}'",
                        lang, default
                    );
                    default
                }
            }
            None => default,
        }
    }

    /// Output format from `--format`, or `default` when it is absent.
    pub fn resolve_format(&self, default: &str) -> Result<OutputFormat, OutputError> {
        self.format.as_deref().unwrap_or(default).parse()
    }

    pub fn destination(&self) -> OutputDestination {
        match &self.outfile {
            Some(path) => OutputDestination::File(path.clone()),
            None => OutputDestination::Stdout,
        }
    }
}
