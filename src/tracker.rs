use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::api::Platform;
use crate::config::SettingsConfig;
use crate::engine::{MAX_AGE_SECS, SECS_PER_HOUR, age_hours, estimate_votes, unix_now};
use crate::error::TrackerError;
use crate::log_writer::SubmissionLog;
use crate::reporter::{Reporter, elapsed_line, status_line};
use crate::state::WorkingSet;
use crate::types::LogRow;

/// Knobs for the poll loop.
#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub subreddit: String,
    pub submission_limit: u32,
    pub max_age_secs: f64,
    pub poll_interval: Duration,
    /// Pause after each submission refresh, for the platform's rate limit.
    pub entity_delay: Duration,
}

impl From<&SettingsConfig> for TrackerSettings {
    fn from(settings: &SettingsConfig) -> Self {
        Self {
            subreddit: settings.subreddit.clone(),
            submission_limit: settings.submission_limit,
            max_age_secs: MAX_AGE_SECS,
            poll_interval: settings.poll_interval(),
            entity_delay: settings.entity_delay(),
        }
    }
}

/// What one poll cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub added: usize,
    pub evicted: usize,
    pub refreshed: usize,
    pub rows_written: usize,
}

/// Totals reported when the tracker stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub rows_written: u64,
    pub total_added: u64,
    pub total_evicted: u64,
    pub still_tracked: usize,
}

/// Polls a community's new feed and logs vote estimates for each submission
/// during its first hours.
pub struct VoteTracker<P: Platform> {
    platform: P,
    log: SubmissionLog,
    working_set: WorkingSet,
    reporter: Reporter,
    settings: TrackerSettings,
    started: Instant,
    cycles: u64,
    rows_written: u64,
}

impl<P: Platform> VoteTracker<P> {
    pub fn new(
        platform: P,
        log: SubmissionLog,
        settings: TrackerSettings,
        reporter: Reporter,
    ) -> Self {
        Self {
            platform,
            log,
            working_set: WorkingSet::new(),
            reporter,
            settings,
            started: Instant::now(),
            cycles: 0,
            rows_written: 0,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    /// Connect, then poll until Ctrl+C.
    ///
    /// Only a failed connect is returned as an error; everything after that is
    /// logged and retried on the next cycle.
    pub async fn run(&mut self) -> Result<RunSummary, TrackerError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Connect, then poll until `shutdown` completes.
    ///
    /// `shutdown` is polled for the whole run, so it interrupts a cycle in
    /// progress as well as the pause between cycles. An interrupted cycle does
    /// not count towards `cycles`; rows it already wrote do.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<RunSummary, TrackerError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        self.connect().await?;
        if let Err(e) = self.log.init().await {
            warn!("Failed to create {}: {e}", self.log.dir().display());
        }

        info!(
            "Tracking r/{} (limit: {}, interval: {}s). Press Ctrl+C to stop.",
            self.settings.subreddit,
            self.settings.submission_limit,
            self.settings.poll_interval.as_secs(),
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = self.run_cycle() => {}
            }
            self.reporter.line(&format!(
                "Pausing for {} seconds",
                self.settings.poll_interval.as_secs()
            ));
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        }

        let summary = self.summary();
        info!(
            "Stopped after {} cycle(s): {} row(s) written, {} submission(s) tracked, {} finalized, {} still open",
            summary.cycles,
            summary.rows_written,
            summary.total_added,
            summary.total_evicted,
            summary.still_tracked,
        );
        Ok(summary)
    }

    /// Authenticate with the platform, forcing a fresh token.
    pub async fn connect(&mut self) -> Result<(), TrackerError> {
        let platform = self.platform.name();
        self.reporter.line(&format!("Initialising connection to {platform}"));
        self.platform
            .connect()
            .await
            .map_err(|source| TrackerError::Connect { platform, source })?;
        self.reporter.line(&format!("Successfully connected to {platform}"));
        Ok(())
    }

    /// One full cycle: fetch, merge, evict, refresh and persist, report elapsed.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.reporter.line("Retrieving/Removing submissions");
        let added = self.cache_new_submissions().await;
        let evicted = self.remove_old_submissions(unix_now()).await;
        let (refreshed, rows_written) = self.store_submissions_data().await;
        self.show_time_elapsed();
        self.cycles += 1;
        CycleReport {
            added,
            evicted,
            refreshed,
            rows_written,
        }
    }

    /// Fetch the newest submissions and start tracking the unseen ones.
    ///
    /// A failed fetch counts as an empty feed. Returns how many were added.
    pub async fn cache_new_submissions(&mut self) -> usize {
        let fetched = match self
            .platform
            .fetch_new(&self.settings.subreddit, self.settings.submission_limit)
            .await
        {
            Ok(submissions) => submissions,
            Err(e) => {
                warn!("Failed to fetch new submissions: {e}");
                Vec::new()
            }
        };
        let added = self.working_set.merge(fetched);
        self.reporter.line(&format!("{added} new submissions recorded"));
        added
    }

    /// Stop tracking everything at or past the age limit at `now` and finalize their logs.
    pub async fn remove_old_submissions(&mut self, now: f64) -> usize {
        let evicted = self.working_set.evict(now, self.settings.max_age_secs);
        self.reporter.line(&format!("{} old submissions removed", evicted.len()));
        for submission in &evicted {
            match self.log.finalize(&submission.id).await {
                Ok(true) => debug!("Finalized log for {}", submission.id),
                Ok(false) => {}
                Err(e) => warn!("Failed to finalize log for {}: {e}", submission.id),
            }
        }
        evicted.len()
    }

    /// Refresh every tracked submission in order and append a row to its log.
    ///
    /// Returns `(refreshed, rows_written)`. A failed refresh skips the submission
    /// for this cycle and leaves its cached state as it was.
    pub async fn store_submissions_data(&mut self) -> (usize, usize) {
        let mut refreshed = 0;
        let mut rows_written = 0;

        for (i, submission) in self.working_set.iter_mut().enumerate() {
            let snapshot = match self.platform.refresh(submission).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!("Failed to refresh {}: {e}", submission.id);
                    continue;
                }
            };
            submission.apply(snapshot);
            refreshed += 1;

            let estimate = estimate_votes(submission.score, submission.upvote_ratio);
            let age = age_hours(submission.created_utc, unix_now());
            self.reporter.line(&status_line(i, submission, estimate, age));

            let row = LogRow::new(
                unix_now(),
                submission.score,
                estimate,
                submission.upvote_ratio,
            );
            let written = match self.log.ensure(&submission.id).await {
                Ok(_) => self.log.append(&submission.id, &row).await,
                Err(e) => Err(e),
            };
            match written {
                Ok(()) => {
                    rows_written += 1;
                    self.rows_written += 1;
                }
                Err(e) => warn!("Failed to write log row for {}: {e}", submission.id),
            }

            if !self.settings.entity_delay.is_zero() {
                tokio::time::sleep(self.settings.entity_delay).await;
            }
        }

        (refreshed, rows_written)
    }

    pub fn show_time_elapsed(&self) {
        let hours = self.started.elapsed().as_secs_f64() / SECS_PER_HOUR;
        self.reporter.line(&elapsed_line(hours));
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            cycles: self.cycles,
            rows_written: self.rows_written,
            total_added: self.working_set.total_added,
            total_evicted: self.working_set.total_evicted,
            still_tracked: self.working_set.len(),
        }
    }
}
