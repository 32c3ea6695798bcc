use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;

use crate::api::Platform;
use crate::error::PlatformError;
use crate::types::{Submission, VoteSnapshot};

/// In-memory platform for testing.
///
/// Fetch results are consumed in order, one per call; once the script runs
/// out, fetches return an empty feed. Refreshes answer from `snapshots`, or
/// fail for ids listed in `failing_refresh`.
#[derive(Debug, Default)]
pub struct MockPlatform {
    pub connect_error: Option<String>,
    pub fetches: VecDeque<Result<Vec<Submission>, String>>,
    pub snapshots: HashMap<String, VoteSnapshot>,
    pub failing_refresh: Vec<String>,
    pub connect_calls: usize,
    pub fetch_calls: usize,
    /// Ids passed to `refresh`, in call order.
    pub refreshed: Vec<String>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_fetch(&mut self, submissions: Vec<Submission>) -> &mut Self {
        self.fetches.push_back(Ok(submissions));
        self
    }

    pub fn push_fetch_error(&mut self, message: &str) -> &mut Self {
        self.fetches.push_back(Err(message.to_string()));
        self
    }

    pub fn set_snapshot(&mut self, id: &str, score: i64, upvote_ratio: f64) -> &mut Self {
        self.snapshots
            .insert(id.to_string(), VoteSnapshot { score, upvote_ratio });
        self
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn name(&self) -> &'static str {
        "mock-platform"
    }

    async fn connect(&mut self) -> Result<(), PlatformError> {
        self.connect_calls += 1;
        match &self.connect_error {
            Some(message) => Err(PlatformError::Auth(message.clone())),
            None => Ok(()),
        }
    }

    async fn fetch_new(
        &mut self,
        _community: &str,
        limit: u32,
    ) -> Result<Vec<Submission>, PlatformError> {
        self.fetch_calls += 1;
        match self.fetches.pop_front() {
            Some(Ok(mut submissions)) => {
                submissions.truncate(limit as usize);
                Ok(submissions)
            }
            Some(Err(message)) => Err(PlatformError::Network(message)),
            None => Ok(Vec::new()),
        }
    }

    async fn refresh(&mut self, submission: &Submission) -> Result<VoteSnapshot, PlatformError> {
        self.refreshed.push(submission.id.clone());
        if self.failing_refresh.contains(&submission.id) {
            return Err(PlatformError::Api {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(self
            .snapshots
            .get(&submission.id)
            .copied()
            .unwrap_or(VoteSnapshot {
                score: submission.score,
                upvote_ratio: submission.upvote_ratio,
            }))
    }
}
