use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::domain::{FeedConfig, FeedGroup, KeywordSet, Notification};
use crate::errors::RelayResult;
use crate::services::filter_service::select;
use crate::services::notification_service::Notifier;
use crate::services::throttle::Throttle;
use crate::sources::FeedFetcher;
use crate::storage::{TimestampMap, TimestampRepository};

/// Outcome counters of one relay run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub feeds_processed: usize,
    pub feeds_failed: usize,
    pub sent: usize,
    pub send_failures: usize,
}

pub struct RelayService<F: FeedFetcher, N: Notifier, S: TimestampRepository> {
    fetcher: F,
    notifier: N,
    store: S,
    feeds: Vec<FeedConfig>,
    keywords: KeywordSet,
    lookback: chrono::Duration,
    throttle: Throttle,
    persist: bool,
}

impl<F: FeedFetcher, N: Notifier, S: TimestampRepository> RelayService<F, N, S> {
    pub fn new(config: &Config, fetcher: F, notifier: N, store: S) -> Self {
        Self {
            fetcher,
            notifier,
            store,
            feeds: config.feeds.clone(),
            keywords: config.keywords.clone(),
            lookback: config.lookback,
            throttle: Throttle::new(config.send_interval),
            persist: true,
        }
    }

    /// When false the run leaves the stored timestamps untouched
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn run(&self) -> RelayResult<RunSummary> {
        self.run_at(Utc::now())
    }

    /// One pass over every feed, unconditional group first. Timestamps are
    /// saved once, after all feeds.
    pub fn run_at(&self, now: DateTime<Utc>) -> RelayResult<RunSummary> {
        info!("Relay run started");

        let mut timestamps = self.store.load();
        let mut summary = RunSummary::default();

        for group in FeedGroup::ORDER {
            for feed in self.feeds.iter().filter(|f| f.group == group) {
                self.process_feed(feed, &mut timestamps, now, &mut summary);
            }
        }

        if self.persist {
            self.store.save(&timestamps)?;
        }

        info!(
            "Run finished successfully: {} feeds processed, {} failed, {} sent, {} send failures",
            summary.feeds_processed, summary.feeds_failed, summary.sent, summary.send_failures
        );

        Ok(summary)
    }

    /// Start of the lookback window. A window reaching past the earliest
    /// representable time is treated as "since the epoch".
    fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.lookback)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    fn process_feed(
        &self,
        feed: &FeedConfig,
        timestamps: &mut TimestampMap,
        now: DateTime<Utc>,
        summary: &mut RunSummary,
    ) {
        info!("Processing feed: {}", feed.name);

        let since = timestamps
            .get(&feed.name)
            .copied()
            .unwrap_or_else(|| self.window_start(now));

        let entries = match self.fetcher.fetch(&feed.url) {
            Ok(entries) => entries,
            Err(e) => {
                // Timestamp stays put so the entries are retried next run
                error!("Failed to fetch {}: {}", feed.name, e);
                summary.feeds_failed += 1;
                return;
            }
        };
        summary.feeds_processed += 1;

        if entries.is_empty() {
            debug!("No entries found for {}.", feed.name);
        }

        let keywords = feed.group.filters_by_keywords().then_some(&self.keywords);
        let selection = select(entries, since, keywords);

        if selection.entries.is_empty() {
            debug!("No new relevant entries in {} since last check.", feed.name);
        } else {
            info!(
                "Found {} new relevant entries in {}.",
                selection.entries.len(),
                feed.name
            );
        }

        for entry in &selection.entries {
            self.throttle.wait();

            match self.notifier.notify(&Notification::from_entry(entry)) {
                Ok(()) => {
                    info!("Delivered: {}", entry.title);
                    summary.sent += 1;
                }
                Err(e) => {
                    error!("Failed to deliver {}: {}", entry.title, e);
                    summary.send_failures += 1;
                }
            }
        }

        timestamps.insert(feed.name.clone(), selection.latest);
    }
}
