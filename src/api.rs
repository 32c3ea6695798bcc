use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::REDDIT_OAUTH_BASE;
use crate::auth::Session;
use crate::config::AccountConfig;
use crate::error::PlatformError;
use crate::types::{LinkData, Listing, Submission, VoteSnapshot};

/// The content platform as seen by the tracker.
#[async_trait]
pub trait Platform: Send {
    /// Human-readable platform name for logging.
    fn name(&self) -> &'static str;

    /// Authenticate, forcing a fresh token.
    async fn connect(&mut self) -> Result<(), PlatformError>;

    /// Newest submissions in `community`, at most `limit`.
    async fn fetch_new(
        &mut self,
        community: &str,
        limit: u32,
    ) -> Result<Vec<Submission>, PlatformError>;

    /// Current score and upvote ratio of one submission, looked up by permalink.
    async fn refresh(&mut self, submission: &Submission) -> Result<VoteSnapshot, PlatformError>;
}

/// Upper bound on any single request, token fetches included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client shared by the session and the API calls.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, PlatformError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Reddit over OAuth.
pub struct RedditClient {
    http: reqwest::Client,
    session: Session,
    base: Url,
}

impl RedditClient {
    pub fn new(account: AccountConfig, user_agent: &str) -> Result<Self, PlatformError> {
        let http = http_client(REQUEST_TIMEOUT)?;
        Ok(Self {
            session: Session::new(http.clone(), account, user_agent),
            http,
            base: Url::parse(REDDIT_OAUTH_BASE)?,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn get_json<T: DeserializeOwned>(
        &mut self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, PlatformError> {
        let token = self.session.bearer().await?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, self.session.user_agent())
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlatformError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Platform for RedditClient {
    fn name(&self) -> &'static str {
        "reddit"
    }

    async fn connect(&mut self) -> Result<(), PlatformError> {
        self.session.refresh(true).await
    }

    async fn fetch_new(
        &mut self,
        community: &str,
        limit: u32,
    ) -> Result<Vec<Submission>, PlatformError> {
        let url = self.base.join(&format!("r/{community}/new"))?;
        let limit = limit.to_string();
        let listing: Listing = self
            .get_json(url, &[("limit", limit.as_str()), ("raw_json", "1")])
            .await?;
        let submissions = links(listing)?
            .into_iter()
            .map(Submission::from)
            .collect::<Vec<_>>();
        debug!("Fetched {} submissions from r/{community}", submissions.len());
        Ok(submissions)
    }

    async fn refresh(&mut self, submission: &Submission) -> Result<VoteSnapshot, PlatformError> {
        let url = permalink_url(&self.base, &submission.permalink)?;
        // A permalink resolves to [submission listing, comment listing].
        let listings: Vec<Listing> = self
            .get_json(url, &[("limit", "1"), ("raw_json", "1")])
            .await?;
        snapshot_from(listings, &submission.id)
    }
}

/// Resolve a permalink (`/r/<sub>/comments/<id>/<slug>/`) against the API base.
pub fn permalink_url(base: &Url, permalink: &str) -> Result<Url, PlatformError> {
    Ok(base.join(permalink.trim_start_matches('/'))?)
}

/// Link (`t3`) children of a listing, deserialized.
pub fn links(listing: Listing) -> Result<Vec<LinkData>, PlatformError> {
    listing
        .data
        .children
        .into_iter()
        .filter(|child| child.kind == "t3")
        .map(|child| serde_json::from_value(child.data).map_err(PlatformError::from))
        .collect()
}

fn snapshot_from(listings: Vec<Listing>, id: &str) -> Result<VoteSnapshot, PlatformError> {
    let first = listings
        .into_iter()
        .next()
        .ok_or_else(|| PlatformError::NotFound(id.to_string()))?;
    let link = links(first)?
        .into_iter()
        .next()
        .ok_or_else(|| PlatformError::NotFound(id.to_string()))?;
    Ok(VoteSnapshot::from(&link))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_FEED: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": "t3_b2",
            "children": [
                {"kind": "t3", "data": {"id": "a1", "created_utc": 1476800000.0, "score": 10,
                    "upvote_ratio": 0.6, "permalink": "/r/EliteDangerous/comments/a1/first/",
                    "title": "First"}},
                {"kind": "t3", "data": {"id": "b2", "created_utc": 1476700000.0, "score": 4,
                    "upvote_ratio": 0.5, "permalink": "/r/EliteDangerous/comments/b2/second/"}},
                {"kind": "more", "data": {"count": 3}}
            ]
        }
    }"#;

    #[test]
    fn listing_to_submissions() {
        let listing: Listing = serde_json::from_str(NEW_FEED).unwrap();
        let subs: Vec<Submission> = links(listing)
            .unwrap()
            .into_iter()
            .map(Submission::from)
            .collect();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].id, "a1");
        assert_eq!(subs[0].score, 10);
        assert_eq!(subs[0].upvote_ratio, 0.6);
        assert_eq!(subs[1].permalink, "/r/EliteDangerous/comments/b2/second/");
    }

    #[test]
    fn malformed_link_is_parse_error() {
        let listing: Listing = serde_json::from_str(
            r#"{"data": {"children": [{"kind": "t3", "data": {"id": "x"}}]}}"#,
        )
        .unwrap();
        assert!(matches!(links(listing), Err(PlatformError::Parse(_))));
    }

    #[test]
    fn snapshot_from_permalink_response() {
        let body = format!(r#"[{NEW_FEED}, {{"kind": "Listing", "data": {{"children": []}}}}]"#);
        let listings: Vec<Listing> = serde_json::from_str(&body).unwrap();
        let snap = snapshot_from(listings, "a1").unwrap();
        assert_eq!(
            snap,
            VoteSnapshot {
                score: 10,
                upvote_ratio: 0.6
            }
        );
    }

    #[test]
    fn empty_permalink_response_is_not_found() {
        let err = snapshot_from(Vec::new(), "zz").unwrap_err();
        assert!(matches!(err, PlatformError::NotFound(id) if id == "zz"));
    }

    #[test]
    fn permalink_joins_onto_base() {
        let base = Url::parse(REDDIT_OAUTH_BASE).unwrap();
        let url = permalink_url(&base, "/r/EliteDangerous/comments/a1/first/").unwrap();
        assert_eq!(
            url.as_str(),
            "https://oauth.reddit.com/r/EliteDangerous/comments/a1/first/"
        );
    }
}
