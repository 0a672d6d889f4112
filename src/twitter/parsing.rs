//! Parsing of Twitter search responses.

use chrono::{DateTime, Utc};
use log::{debug, error};
use serde::Deserialize;

use crate::error::ProviderError;
use crate::pager::ResultRecord;

/// Format of `created_at` in v1.1 payloads, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    statuses: Vec<Status>,
    search_metadata: Option<SearchMetadata>,
}

#[derive(Debug, Deserialize)]
struct SearchMetadata {
    next_results: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Status {
    id: Option<u64>,
    id_str: Option<String>,
    created_at: Option<String>,
    full_text: Option<String>,
    text: Option<String>,
}

impl Status {
    fn id(&self) -> Option<u64> {
        self.id_str
            .as_deref()
            .and_then(|s| s.parse().ok())
            .or(self.id)
    }
}

/// One page of search results.
#[derive(Debug, Default)]
pub(crate) struct SearchPage {
    /// Records in delivery order
    pub records: Vec<ResultRecord>,
    /// Smallest status id on the page, including statuses that were skipped
    pub min_id: Option<u64>,
    /// Whether the API advertised another page
    pub has_more: bool,
}

/// Parses a v1.1 `created_at` timestamp into UTC.
pub(crate) fn parse_created_at(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(text, CREATED_AT_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses a `search/tweets.json` response body.
///
/// Statuses without a parseable timestamp or any text are skipped and logged.
pub(crate) fn parse_search_page(body: &str) -> Result<SearchPage, ProviderError> {
    let response: SearchResponse = serde_json::from_str(body)?;

    let mut page = SearchPage {
        has_more: !response.statuses.is_empty()
            && response
                .search_metadata
                .as_ref()
                .and_then(|m| m.next_results.as_ref())
                .is_some(),
        ..SearchPage::default()
    };

    for status in response.statuses {
        let id = status.id();
        if let Some(id) = id {
            page.min_id = Some(page.min_id.map_or(id, |min| min.min(id)));
        }

        let timestamp = match status.created_at.as_deref().map(|s| (s, parse_created_at(s))) {
            Some((_, Some(ts))) => ts,
            Some((raw, None)) => {
                error!("Failed to parse created_at '{}' for tweet {:?}", raw, id);
                continue;
            }
            None => {
                error!("Tweet {:?} missing created_at field", id);
                continue;
            }
        };

        let Some(text) = status.full_text.or(status.text) else {
            error!("Tweet {:?} has no text", id);
            continue;
        };

        page.records.push(ResultRecord { timestamp, text });
    }

    debug!(
        "Parsed page with {} records (min id {:?}, more: {})",
        page.records.len(),
        page.min_id,
        page.has_more
    );
    Ok(page)
}
