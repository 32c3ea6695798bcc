use serde::Deserialize;

use crate::REDDIT_SHORT_LINK_BASE;

/// A submission held in the working set.
///
/// Built from the platform's listing shape at the API boundary; everything past
/// `api` only ever sees this struct.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: String,
    /// Creation time in seconds since the epoch. Never changes.
    pub created_utc: f64,
    pub score: i64,
    /// Fraction of votes that are up. Exactly 0.5 means no directional information.
    pub upvote_ratio: f64,
    pub permalink: String,
}

impl Submission {
    /// Age in seconds at `now`.
    pub fn age_secs(&self, now: f64) -> f64 {
        now - self.created_utc
    }

    pub fn short_link(&self) -> String {
        format!("{}/{}", REDDIT_SHORT_LINK_BASE, self.id)
    }

    /// Overwrite the mutable vote state with a fresh snapshot.
    pub fn apply(&mut self, snapshot: VoteSnapshot) {
        self.score = snapshot.score;
        self.upvote_ratio = snapshot.upvote_ratio;
    }
}

/// Current score and ratio for one submission, as returned by a refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteSnapshot {
    pub score: i64,
    pub upvote_ratio: f64,
}

/// Up/down split derived from a net score and an upvote ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteEstimate {
    pub ups: i64,
    pub downs: i64,
}

/// One persisted observation: `[timestamp, score, ups, downs, ratio]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogRow {
    pub timestamp: f64,
    pub score: i64,
    pub ups: i64,
    pub downs: i64,
    pub ratio: f64,
}

impl LogRow {
    pub fn new(timestamp: f64, score: i64, estimate: VoteEstimate, ratio: f64) -> Self {
        Self {
            timestamp,
            score,
            ups: estimate.ups,
            downs: estimate.downs,
            ratio,
        }
    }

    /// Column values in file order.
    ///
    /// Floats use `{:?}` so whole numbers keep their trailing `.0`
    /// (`1.0`, not `1`), matching the existing data files.
    pub fn fields(&self) -> [String; 5] {
        [
            format!("{:?}", self.timestamp),
            self.score.to_string(),
            self.ups.to_string(),
            self.downs.to_string(),
            format!("{:?}", self.ratio),
        ]
    }
}

// ── Reddit response shapes ─────────────────────────────────────────

/// `{"kind": "Listing", "data": {"children": [...]}}`
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
}

/// A listing child. Only `t3` (link) children are submissions.
#[derive(Debug, Deserialize)]
pub struct Thing {
    pub kind: String,
    pub data: serde_json::Value,
}

/// Fields of a `t3` child that the tracker needs.
#[derive(Debug, Deserialize)]
pub struct LinkData {
    pub id: String,
    pub created_utc: f64,
    pub score: i64,
    #[serde(default = "default_ratio")]
    pub upvote_ratio: f64,
    pub permalink: String,
}

fn default_ratio() -> f64 {
    0.5
}

impl From<LinkData> for Submission {
    fn from(link: LinkData) -> Self {
        Self {
            id: link.id,
            created_utc: link.created_utc,
            score: link.score,
            upvote_ratio: link.upvote_ratio,
            permalink: link.permalink,
        }
    }
}

impl From<&LinkData> for VoteSnapshot {
    fn from(link: &LinkData) -> Self {
        Self {
            score: link.score,
            upvote_ratio: link.upvote_ratio,
        }
    }
}
