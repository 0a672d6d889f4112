//! # Tweetsearch Library
//!
//! A command-line utility library that searches Twitter/X for recent tweets
//! matching a term and writes one `[timestamp, text]` row per tweet to CSV or
//! to an xlsx spreadsheet.
//!
//! ## Features
//!
//! - Relative time windows such as `1 day`, `6h` or `15 mins`
//! - App-only OAuth 2.0 bearer token authentication
//! - Paged search with a result cap and a fixed 15 minute back-off on rate limits
//! - Streaming CSV output to a file or STDOUT, spreadsheet output to a file
//! - Structured logging via `RUST_LOG`
//!
//! ## Configuration
//!
//! Settings are read from the `[common]` section of `config.ini` (or the file
//! named by `--config` / `TWEETSEARCH_CONFIG`):
//! - `consumer_token`, `consumer_secret`: app credentials (required)
//! - `username`, `password`, `access_token`, `access_secret`: optional
//! - `default_format`: `csv`, `xls` or `xlsx`
//! - `default_lang`: two-letter language code
//!
//! Every key can also be supplied as `TWEETSEARCH_<KEY>` in the environment.

pub mod app;
pub mod cli;
pub mod config;
pub mod duration;
pub mod error;
pub mod oauth;
pub mod output;
pub mod pager;
pub mod query;
pub mod twitter;

// Re-export commonly used types and functions
pub use app::{execute, run, RunOptions};
pub use cli::Args;
pub use config::{Credentials, SearchConfig};
pub use duration::Duration;
pub use error::{ConfigError, DurationError, OutputError, ProviderError};
pub use oauth::{build_basic_auth_header, build_bearer_auth_header};
pub use output::{open_sink, OutputDestination, OutputFormat, OutputSink};
pub use pager::{
    Cap, PagerState, ResultPager, ResultRecord, SearchProvider, Sleeper, RATE_LIMIT_COOLDOWN,
};
pub use query::SearchQuery;
pub use twitter::TwitterSearchClient;
