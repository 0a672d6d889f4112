//! End-to-end search run: configuration, pre-flight checks, paging and output.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::cli::Args;
use crate::config::{config_path, SearchConfig};
use crate::duration::Duration;
use crate::error::OutputError;
use crate::output::{open_sink, OutputDestination, OutputFormat, OutputSink};
use crate::pager::{Cap, ResultPager, SearchProvider, Sleeper};
use crate::query::SearchQuery;
use crate::twitter::TwitterSearchClient;

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub term: String,
    pub language: String,
    pub format: OutputFormat,
    pub destination: OutputDestination,
    pub window: Duration,
    pub cap: Cap,
}

impl RunOptions {
    /// Merges command-line arguments with configured defaults.
    ///
    /// # Errors
    ///
    /// Returns `OutputError::UnknownOutputFormat` if neither `--format` nor the
    /// configured default names a supported format.
    pub fn resolve(args: &Args, config: &SearchConfig) -> Result<Self, OutputError> {
        Ok(RunOptions {
            term: args.term.clone(),
            language: args.resolve_lang(&config.default_lang),
            format: args.resolve_format(&config.default_format)?,
            destination: args.destination(),
            window: args.time,
            cap: Cap::from_count(args.number),
        })
    }
}

/// Runs a search with the resolved options and returns the number of rows written.
///
/// The output sink is opened before authenticating, so an unsupported
/// destination fails without touching the network. Provider failures during
/// paging end the run normally; rows written up to that point are kept.
pub async fn execute(
    config: &SearchConfig,
    options: &RunOptions,
    now: DateTime<Utc>,
) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
    let mut sink = open_sink(options.format, &options.destination)?;

    let query = SearchQuery::new(&options.term, &options.language, options.window, now);
    info!(
        "Searching for '{}' in language '{}' from {} until {}",
        query.term,
        query.language,
        query.since_date(),
        query.until_date()
    );
    debug!("Result cap: {:?}", options.cap);

    let client = TwitterSearchClient::authenticate(config, query).await?;
    let mut pager = ResultPager::new(client, options.cap);

    let written = write_results(&mut pager, sink).await?;

    if let Some(failure) = pager.last_failure() {
        debug!("Search ended early: {}", failure);
    }
    info!("Wrote {} results as {}", written, options.format);
    Ok(written)
}

/// Copies records from `pager` into `sink` and finalizes it.
///
/// A full sink ends the search and keeps what was written. Any other write
/// failure still finalizes the sink before it is returned, so rows buffered
/// up to that point are not lost.
async fn write_results<P: SearchProvider, S: Sleeper>(
    pager: &mut ResultPager<P, S>,
    mut sink: Box<dyn OutputSink>,
) -> Result<u64, OutputError> {
    let mut written = 0;
    while let Some(record) = pager.next().await {
        match sink.write(&record) {
            Ok(()) => written += 1,
            Err(OutputError::RowLimit(limit)) => {
                warn!("Output holds at most {} rows, stopping search", limit);
                break;
            }
            Err(e) => {
                if let Err(finalize_err) = sink.finalize() {
                    warn!("Failed to save partial output: {}", finalize_err);
                }
                return Err(e);
            }
        }
    }
    sink.finalize()?;
    Ok(written)
}

/// Loads configuration, resolves the arguments, and runs the search.
pub async fn run(args: Args) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
    let config = SearchConfig::load(&config_path(args.config.as_deref()))?;
    let options = RunOptions::resolve(&args, &config)?;
    execute(&config, &options, Utc::now()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::pager::ResultRecord;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    struct ListProvider(VecDeque<ResultRecord>);

    impl SearchProvider for ListProvider {
        async fn next_record(&mut self) -> Result<Option<ResultRecord>, ProviderError> {
            Ok(self.0.pop_front())
        }
    }

    struct NoSleep;

    impl Sleeper for NoSleep {
        async fn sleep(&mut self, _duration: std::time::Duration) {}
    }

    #[derive(Default)]
    struct Saved {
        rows: Vec<String>,
        finalized: bool,
    }

    /// Accepts `capacity` rows, then fails every write with `failure`.
    struct BoundedSink {
        capacity: usize,
        failure: fn() -> OutputError,
        pending: Vec<String>,
        saved: Rc<RefCell<Saved>>,
    }

    impl OutputSink for BoundedSink {
        fn write(&mut self, record: &ResultRecord) -> Result<(), OutputError> {
            if self.pending.len() >= self.capacity {
                return Err((self.failure)());
            }
            self.pending.push(record.text.clone());
            Ok(())
        }

        fn finalize(self: Box<Self>) -> Result<(), OutputError> {
            let BoundedSink { pending, saved, .. } = *self;
            let mut saved = saved.borrow_mut();
            saved.rows = pending;
            saved.finalized = true;
            Ok(())
        }
    }

    fn pager(texts: &[&str]) -> ResultPager<ListProvider, NoSleep> {
        let records = texts
            .iter()
            .map(|t| ResultRecord {
                timestamp: Utc::now(),
                text: t.to_string(),
            })
            .collect();
        ResultPager::with_sleeper(ListProvider(records), Cap::Unbounded, NoSleep)
    }

    fn sink(
        capacity: usize,
        failure: fn() -> OutputError,
    ) -> (Box<dyn OutputSink>, Rc<RefCell<Saved>>) {
        let saved = Rc::new(RefCell::new(Saved::default()));
        let sink = BoundedSink {
            capacity,
            failure,
            pending: Vec::new(),
            saved: Rc::clone(&saved),
        };
        (Box::new(sink), saved)
    }

    #[tokio::test]
    async fn test_full_sink_stops_search_and_saves_rows() {
        let mut pager = pager(&["a", "b", "c", "d"]);
        let (sink, saved) = sink(2, || OutputError::RowLimit(2));

        let written = write_results(&mut pager, sink).await.unwrap();

        assert_eq!(written, 2);
        let saved = saved.borrow();
        assert!(saved.finalized);
        assert_eq!(saved.rows, vec!["a", "b"]);
        // The rejected record was pulled, nothing after it
        assert_eq!(pager.emitted(), 3);
    }

    #[tokio::test]
    async fn test_write_failure_still_saves_buffered_rows() {
        let mut pager = pager(&["a", "b", "c"]);
        let (sink, saved) = sink(1, || {
            OutputError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        });

        let err = write_results(&mut pager, sink).await.unwrap_err();

        assert!(matches!(err, OutputError::Io(_)));
        let saved = saved.borrow();
        assert!(saved.finalized);
        assert_eq!(saved.rows, vec!["a"]);
    }

    #[tokio::test]
    async fn test_all_records_written_when_sink_has_room() {
        let mut pager = pager(&["a", "b"]);
        let (sink, saved) = sink(10, || OutputError::RowLimit(10));

        assert_eq!(write_results(&mut pager, sink).await.unwrap(), 2);
        assert_eq!(saved.borrow().rows, vec!["a", "b"]);
    }
}
