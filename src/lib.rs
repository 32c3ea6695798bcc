pub mod api;
pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod log_writer;
pub mod mock;
pub mod reporter;
pub mod state;
pub mod tracker;
pub mod types;

/// Reddit OAuth token endpoint (password grant, HTTP basic auth with the app credentials).
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Base URL for authenticated Reddit API requests.
pub const REDDIT_OAUTH_BASE: &str = "https://oauth.reddit.com";

/// Base URL for submission short links shown in status lines.
pub const REDDIT_SHORT_LINK_BASE: &str = "https://redd.it";

/// Default user agent, as registered for the script app.
pub const DEFAULT_USER_AGENT: &str = "vote-grapher-v1-by-Always_SFW";

/// Default community to track.
pub const DEFAULT_SUBREDDIT: &str = "EliteDangerous";
