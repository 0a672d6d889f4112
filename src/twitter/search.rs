//! Tweet search against the Twitter API v1.1 standard search endpoint.
//!
//! [`TwitterSearchClient`] hides `max_id` pagination behind the
//! [`SearchProvider`] seam: it fetches one page at a time and yields the
//! statuses in delivery order.

use std::collections::VecDeque;

use log::{debug, info};
use reqwest::Client;
use url::Url;

use crate::config::SearchConfig;
use crate::error::ProviderError;
use crate::oauth::build_bearer_auth_header;
use crate::pager::{ResultRecord, SearchProvider};
use crate::query::SearchQuery;

use super::api::{obtain_bearer_token, send_api_request};
use super::parsing::parse_search_page;

/// Statuses requested per page (the endpoint maximum).
pub const PAGE_SIZE: u32 = 100;

const SEARCH_PATH: &str = "/1.1/search/tweets.json";

pub struct TwitterSearchClient {
    client: Client,
    api_base: String,
    bearer_token: String,
    query: SearchQuery,
    buffer: VecDeque<ResultRecord>,
    max_id: Option<u64>,
    finished: bool,
    page_count: u32,
}

impl TwitterSearchClient {
    pub fn new(api_base: &str, bearer_token: String, query: SearchQuery) -> Self {
        Self::with_client(Client::new(), api_base, bearer_token, query)
    }

    fn with_client(
        client: Client,
        api_base: &str,
        bearer_token: String,
        query: SearchQuery,
    ) -> Self {
        TwitterSearchClient {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            bearer_token,
            query,
            buffer: VecDeque::new(),
            max_id: None,
            finished: false,
            page_count: 0,
        }
    }

    /// Obtains a bearer token for the configured credentials and builds a client for `query`.
    ///
    /// # Errors
    ///
    /// Fails if the token exchange fails; no search request is made in that case.
    pub async fn authenticate(
        config: &SearchConfig,
        query: SearchQuery,
    ) -> Result<Self, ProviderError> {
        let client = Client::new();
        let bearer_token =
            obtain_bearer_token(&client, &config.api_base, &config.credentials).await?;
        Ok(Self::with_client(client, &config.api_base, bearer_token, query))
    }

    /// Number of pages fetched so far.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Builds the URL for the next page.
    ///
    /// The `since:` operator goes into `q`; `until` is a separate parameter.
    pub fn search_url(&self) -> Result<Url, ProviderError> {
        let q = format!("{} since:{}", self.query.term, self.query.since_date());
        let mut params = vec![
            ("q", q),
            ("until", self.query.until_date()),
            ("lang", self.query.language.clone()),
            ("count", PAGE_SIZE.to_string()),
            ("result_type", "recent".to_string()),
            ("tweet_mode", "extended".to_string()),
        ];
        if let Some(max_id) = self.max_id {
            params.push(("max_id", max_id.to_string()));
        }

        let url = Url::parse_with_params(&format!("{}{}", self.api_base, SEARCH_PATH), &params)?;
        Ok(url)
    }

    /// Fetches the next page into the buffer.
    ///
    /// The cursor only advances after a page was received and parsed, so a
    /// failed request is retried from the same position.
    async fn fetch_page(&mut self) -> Result<(), ProviderError> {
        let url = self.search_url()?;
        let page_number = self.page_count + 1;
        info!("Fetching page {} of search results", page_number);
        debug!("Search URL: {}", url);
        debug!("Request headers: Authorization: Bearer [REDACTED]");

        let request_builder = self
            .client
            .get(url)
            .header("Authorization", build_bearer_auth_header(&self.bearer_token));

        let response_text =
            send_api_request(request_builder, &format!("search_page_{}", page_number)).await?;
        let page = parse_search_page(&response_text)?;

        self.page_count = page_number;
        info!(
            "Page {} returned {} records",
            page_number,
            page.records.len()
        );

        match page.min_id {
            Some(min_id) if page.has_more && min_id > 0 => self.max_id = Some(min_id - 1),
            _ => {
                debug!("No more pages to fetch");
                self.finished = true;
            }
        }
        self.buffer.extend(page.records);
        Ok(())
    }
}

impl SearchProvider for TwitterSearchClient {
    async fn next_record(&mut self) -> Result<Option<ResultRecord>, ProviderError> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Ok(Some(record));
            }
            if self.finished {
                return Ok(None);
            }
            self.fetch_page().await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::Duration;
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn query() -> SearchQuery {
        let now = Utc.with_ymd_and_hms(2018, 10, 10, 21, 0, 0).unwrap();
        SearchQuery::new("rustlang", "en", Duration::from_secs(86_400), now)
    }

    fn status(id: u64, text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "id_str": id.to_string(),
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "full_text": text
        })
    }

    #[test]
    fn test_search_url() {
        let mut client = TwitterSearchClient::new("https://api.twitter.com/", "t".into(), query());
        let url = client.search_url().unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/1.1/search/tweets.json");
        assert!(pairs.contains(&("q".into(), "rustlang since:2018-10-09".into())));
        assert!(pairs.contains(&("until".into(), "2018-10-11".into())));
        assert!(pairs.contains(&("lang".into(), "en".into())));
        assert!(pairs.contains(&("count".into(), "100".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "max_id"));

        client.max_id = Some(41);
        let url = client.search_url().unwrap();
        assert!(url.query_pairs().any(|(k, v)| k == "max_id" && v == "41"));
    }

    #[tokio::test]
    async fn test_pages_through_results() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/1.1/search/tweets.json"))
            .and(header("Authorization", "Bearer token"))
            .and(query_param_is_missing("max_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "statuses": [status(200, "first"), status(199, "second")],
                "search_metadata": {"next_results": "?max_id=198"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/1.1/search/tweets.json"))
            .and(query_param("max_id", "198"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "statuses": [status(150, "third")],
                "search_metadata": {}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut client = TwitterSearchClient::new(&mock_server.uri(), "token".into(), query());
        let mut texts = Vec::new();
        while let Some(record) = client.next_record().await.unwrap() {
            texts.push(record.text);
        }

        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(client.page_count(), 2);
        assert!(client.next_record().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rate_limit_keeps_position() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/1.1/search/tweets.json"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/1.1/search/tweets.json"))
            .and(query_param_is_missing("max_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "statuses": [status(10, "after cooldown")]
            })))
            .mount(&mock_server)
            .await;

        let mut client = TwitterSearchClient::new(&mock_server.uri(), "token".into(), query());

        assert!(matches!(
            client.next_record().await,
            Err(ProviderError::RateLimited)
        ));
        let record = client.next_record().await.unwrap().unwrap();
        assert_eq!(record.text, "after cooldown");
        assert!(client.next_record().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/1.1/search/tweets.json"))
            .respond_with(ResponseTemplate::new(503).set_body_string("over capacity"))
            .mount(&mock_server)
            .await;

        let mut client = TwitterSearchClient::new(&mock_server.uri(), "token".into(), query());
        match client.next_record().await {
            Err(ProviderError::Api { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "over capacity");
            }
            other => panic!("Expected Api error, got: {:?}", other),
        }
    }
}
