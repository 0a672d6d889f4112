//! Relative time string parsing.
//!
//! Turns strings like `"1 day"`, `"6h"`, `"15 mins"` or `"30 seconds"` into a
//! whole number of seconds. Units are case-insensitive and may carry a
//! trailing plural `s`.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::DurationError;

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_MINUTE: u64 = 60;

/// Leading integer, optional whitespace, then a word for the unit.
///
/// The unit must not start with a digit, so a bare number stays a format
/// error. Any other word (`día`, `week2`) reaches the unit lookup.
fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\s*([^\W\d]\w*)$").expect("duration pattern is valid"))
}

/// A non-negative count of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(u64);

impl Duration {
    pub fn from_secs(secs: u64) -> Self {
        Duration(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Parses a relative time string into seconds.
    ///
    /// # Errors
    ///
    /// - `DurationError::InvalidFormat` when the text is not `<integer><space?><unit>`
    ///   (this covers negative and fractional numbers, and values too large to hold)
    /// - `DurationError::UnknownUnit` when the unit is not a day/hour/minute/second spelling
    ///
    /// # Example
    ///
    /// ```rust
    /// use tweetsearch::Duration;
    ///
    /// assert_eq!(Duration::parse("1 day").unwrap().as_secs(), 86_400);
    /// assert_eq!(Duration::parse("15M").unwrap().as_secs(), 900);
    /// ```
    pub fn parse(text: &str) -> Result<Self, DurationError> {
        let normalized = text.trim().to_lowercase();
        let captures = duration_regex()
            .captures(&normalized)
            .ok_or_else(|| DurationError::InvalidFormat(text.to_string()))?;

        let value: u64 = captures[1]
            .parse()
            .map_err(|_| DurationError::InvalidFormat(text.to_string()))?;
        let unit = &captures[2];

        let multiplier = unit_multiplier(unit)
            .or_else(|| unit.strip_suffix('s').and_then(unit_multiplier))
            .ok_or_else(|| DurationError::UnknownUnit(unit.to_string()))?;

        value
            .checked_mul(multiplier)
            .map(Duration)
            .ok_or_else(|| DurationError::InvalidFormat(text.to_string()))
    }
}

fn unit_multiplier(unit: &str) -> Option<u64> {
    match unit {
        "day" | "d" => Some(SECONDS_PER_DAY),
        "hour" | "h" => Some(SECONDS_PER_HOUR),
        "minute" | "min" | "m" => Some(SECONDS_PER_MINUTE),
        "second" | "sec" | "s" => Some(1),
        _ => None,
    }
}

impl FromStr for Duration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Duration::parse(s)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl From<Duration> for std::time::Duration {
    fn from(d: Duration) -> Self {
        std::time::Duration::from_secs(d.0)
    }
}
