use std::{collections::HashSet, future::Future, time::Duration};

use tracing::{debug, error, info, warn};

use crate::{
    error::{AppResult, StoreError},
    feed::FeedSource,
    models::{CycleReport, Release},
    scraper::{self, PageSource},
    store::LinkStore,
    telegram::Notifier,
};

/// Poll → diff → scrape → notify → persist, one feed snapshot at a time.
pub struct Poller<F, P, S, N> {
    feed: F,
    pages: P,
    store: S,
    notifier: N,
    interval: Duration,
    seen: HashSet<String>,
    /// Links announced while the store was unreachable, re-recorded next cycle.
    pending: Vec<String>,
}

impl<F, P, S, N> Poller<F, P, S, N>
where
    F: FeedSource,
    P: PageSource,
    S: LinkStore,
    N: Notifier,
{
    /// Initializes the store and loads every seen link into memory.
    pub async fn start(
        feed: F,
        pages: P,
        store: S,
        notifier: N,
        interval: Duration,
    ) -> Result<Self, StoreError> {
        store.initialize().await?;
        let seen = store.load_all().await?;
        info!(seen = seen.len(), interval_secs = interval.as_secs(), "poller ready");

        Ok(Self { feed, pages, store, notifier, interval, seen, pending: Vec::new() })
    }

    /// Runs cycles until `stop` resolves. A cycle in progress always
    /// finishes; the stop signal interrupts only the idle wait.
    pub async fn run(mut self, stop: impl Future<Output = ()>) {
        tokio::pin!(stop);

        loop {
            self.poll_once().await;

            tokio::select! {
                biased;
                _ = &mut stop => {
                    info!("stop requested, poller exiting");
                    return;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    /// Processes one feed snapshot. Per-entry failures are logged and never
    /// abort the rest of the snapshot.
    pub async fn poll_once(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        self.flush_pending(&mut report).await;

        let entries = match self.feed.entries().await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "failed to fetch feed, waiting for next cycle");
                return report;
            },
        };
        report.entries = entries.len();

        for entry in entries {
            let link = entry.link;
            if self.seen.contains(&link) {
                report.skipped += 1;
                continue;
            }

            debug!(link = %link, title = ?entry.title, "new feed entry");

            let release = match self.scrape(&link).await {
                Ok(release) => release,
                Err(err) => {
                    warn!(link = %link, error = %err, "failed to scrape release, will retry next cycle");
                    report.failed += 1;
                    continue;
                },
            };

            match self.notifier.notify(&release).await {
                Ok(()) => {
                    info!(link = %link, title = %release.title, "announced release");
                    report.notified += 1;
                },
                Err(err) => {
                    error!(link = %link, error = %err, "failed to announce release, marking seen anyway");
                    report.undelivered += 1;
                },
            }

            self.mark_seen(link, &mut report).await;
        }

        info!(
            entries = report.entries,
            skipped = report.skipped,
            notified = report.notified,
            undelivered = report.undelivered,
            failed = report.failed,
            recorded = report.recorded,
            "poll cycle complete"
        );

        report
    }

    async fn scrape(&self, link: &str) -> AppResult<Release> {
        let html = self.pages.fetch(link).await?;
        Ok(scraper::extract(&html)?)
    }

    async fn mark_seen(&mut self, link: String, report: &mut CycleReport) {
        match self.store.record(&link).await {
            Ok(()) => report.recorded += 1,
            Err(StoreError::DuplicateLink(_)) => {
                debug!(link = %link, "link already recorded by another run");
            },
            Err(err) => {
                error!(link = %link, error = %err, "failed to record link, queued for retry");
                self.pending.push(link.clone());
            },
        }
        self.seen.insert(link);
    }

    async fn flush_pending(&mut self, report: &mut CycleReport) {
        if self.pending.is_empty() {
            return;
        }

        for link in std::mem::take(&mut self.pending) {
            match self.store.record(&link).await {
                Ok(()) => report.recorded += 1,
                Err(StoreError::DuplicateLink(_)) => {},
                Err(err) => {
                    warn!(link = %link, error = %err, "store still unavailable");
                    self.pending.push(link);
                },
            }
        }
    }
}
