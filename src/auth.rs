use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::debug;

use crate::REDDIT_TOKEN_URL;
use crate::config::AccountConfig;
use crate::error::PlatformError;

/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
    #[serde(default)]
    scope: String,
    error: Option<String>,
}

/// OAuth session for a Reddit script app (password grant).
pub struct Session {
    http: reqwest::Client,
    account: AccountConfig,
    user_agent: String,
    token_url: String,
    token: Option<String>,
    scope: String,
    expires_at: Option<Instant>,
}

impl Session {
    pub fn new(http: reqwest::Client, account: AccountConfig, user_agent: &str) -> Self {
        Self {
            http,
            account,
            user_agent: user_agent.to_string(),
            token_url: REDDIT_TOKEN_URL.to_string(),
            token: None,
            scope: String::new(),
            expires_at: None,
        }
    }

    /// Request tokens from `url` instead of Reddit's endpoint.
    pub fn with_token_url(mut self, url: &str) -> Self {
        self.token_url = url.to_string();
        self
    }

    /// Scope granted with the current token.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn is_fresh(&self) -> bool {
        match (&self.token, self.expires_at) {
            (Some(_), Some(at)) => Instant::now() + EXPIRY_MARGIN < at,
            _ => false,
        }
    }

    /// Fetch a new access token when `force` is set or the current one is about to expire.
    pub async fn refresh(&mut self, force: bool) -> Result<(), PlatformError> {
        if !force && self.is_fresh() {
            return Ok(());
        }

        let resp = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.account.client_id, Some(&self.account.client_secret))
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .form(&[
                ("grant_type", "password"),
                ("username", self.account.username.as_str()),
                ("password", self.account.password.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(PlatformError::Auth(format!("status {}: {}", status.as_u16(), body)));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;
        if let Some(err) = parsed.error {
            return Err(PlatformError::Auth(err));
        }
        let token = parsed
            .access_token
            .ok_or_else(|| PlatformError::Auth("no access_token in response".to_string()))?;

        debug!("Access token refreshed (expires in {}s)", parsed.expires_in);
        self.token = Some(token);
        self.scope = parsed.scope;
        self.expires_at = Some(Instant::now() + Duration::from_secs(parsed.expires_in));
        Ok(())
    }

    /// Bearer token for the next request, refreshing first if needed.
    pub async fn bearer(&mut self) -> Result<String, PlatformError> {
        self.refresh(false).await?;
        self.token
            .clone()
            .ok_or_else(|| PlatformError::Auth("no access token".to_string()))
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
