//! Search query construction.

use chrono::{DateTime, Days, NaiveTime, TimeDelta, Utc};

use crate::duration::Duration;

/// One search invocation: what to look for and in which time window.
///
/// `since` is `now` minus the requested window. `until` is midnight at the
/// start of tomorrow, because the search API excludes results from the
/// `until` day itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    /// ISO 639-1 language code
    pub language: String,
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl SearchQuery {
    pub fn new(term: &str, language: &str, window: Duration, now: DateTime<Utc>) -> Self {
        let since = i64::try_from(window.as_secs())
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delta| now.checked_sub_signed(delta))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let tomorrow = now
            .date_naive()
            .checked_add_days(Days::new(1))
            .unwrap_or(now.date_naive());
        let until = tomorrow.and_time(NaiveTime::MIN).and_utc();

        SearchQuery {
            term: term.to_string(),
            language: language.to_string(),
            since,
            until,
        }
    }

    /// The `since` bound as a `YYYY-MM-DD` date.
    pub fn since_date(&self) -> String {
        self.since.format("%Y-%m-%d").to_string()
    }

    /// The `until` bound as a `YYYY-MM-DD` date.
    pub fn until_date(&self) -> String {
        self.until.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_bounds() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap();
        let query = SearchQuery::new("rust", "en", Duration::from_secs(86_400), now);

        assert_eq!(query.since, Utc.with_ymd_and_hms(2024, 3, 9, 15, 30, 0).unwrap());
        assert_eq!(query.until, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
        assert_eq!(query.since_date(), "2024-03-09");
        assert_eq!(query.until_date(), "2024-03-11");
        assert!(query.since < query.until);
    }

    #[test]
    fn test_zero_window_still_ordered() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let query = SearchQuery::new("rust", "en", Duration::from_secs(0), now);

        assert_eq!(query.since, now);
        assert_eq!(query.until, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert!(query.since < query.until);
    }
}
