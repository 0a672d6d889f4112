//! Error types for the tweetsearch utility.
//!
//! Pre-flight failures (duration parsing, output selection, configuration) are
//! fatal and reported before any network activity. Provider failures are
//! consumed by the result pager, which either backs off or stops.

use thiserror::Error;

/// Failure to parse a relative time string such as `"1 day"` or `"15m"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("invalid time string '{0}' (expected e.g. '1 day', '6h', '15 min')")]
    InvalidFormat(String),

    #[error("unknown time unit '{0}' (use days, hours, minutes or seconds)")]
    UnknownUnit(String),
}

/// Failure to select or write an output sink.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("spreadsheet output is binary and must be written to a file using -o")]
    UnsupportedDestination,

    #[error("unknown output format '{0}' (options are csv, xls or xlsx)")]
    UnknownOutputFormat(String),

    #[error("output is full ({0} rows)")]
    RowLimit(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Failure to load the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("missing config key '{key}' (set it in [common] or via {env_var})")]
    MissingKey { key: String, env_var: String },
}

/// Failure reported by a search provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("rate limit exceeded")]
    RateLimited,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Twitter API error ({status})")]
    Api { status: u16, body: String },

    #[error("failed to parse API response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ProviderError {
    /// True for the one failure the pager recovers from.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ProviderError::RateLimited)
    }
}
