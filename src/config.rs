use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::log_writer::DEFAULT_DATA_DIR;
use crate::{DEFAULT_SUBREDDIT, DEFAULT_USER_AGENT};

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Environment variable that overrides `account.client_secret`.
pub const ENV_CLIENT_SECRET: &str = "VOTE_GRAPHER_CLIENT_SECRET";

/// Environment variable that overrides `account.password`.
pub const ENV_PASSWORD: &str = "VOTE_GRAPHER_PASSWORD";

/// Top-level application config deserialized from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub account: AccountConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Reddit script-app credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Community whose "new" feed is tracked.
    #[serde(default = "default_subreddit")]
    pub subreddit: String,
    /// Print progress lines to stdout.
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    /// Submissions requested per fetch.
    #[serde(default = "default_submission_limit")]
    pub submission_limit: u32,
    /// Pause between poll cycles, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Pause between per-submission refreshes, in seconds.
    #[serde(default = "default_entity_delay")]
    pub entity_delay_secs: u64,
    /// Pause after creating a new log file, in milliseconds.
    #[serde(default = "default_create_pause")]
    pub create_pause_ms: u64,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_subreddit() -> String {
    DEFAULT_SUBREDDIT.to_string()
}

fn default_verbose() -> bool {
    true
}

fn default_submission_limit() -> u32 {
    50
}

fn default_poll_interval() -> u64 {
    120
}

fn default_entity_delay() -> u64 {
    2
}

fn default_create_pause() -> u64 {
    1000
}

fn default_data_dir() -> String {
    DEFAULT_DATA_DIR.to_string()
}

impl AccountConfig {
    /// Store `password` exactly as typed. Surrounding whitespace is part of it.
    pub fn set_password(&mut self, password: String) -> Result<()> {
        if password.trim().is_empty() {
            bail!("password cannot be empty");
        }
        self.password = password;
        Ok(())
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            subreddit: default_subreddit(),
            verbose: default_verbose(),
            submission_limit: default_submission_limit(),
            poll_interval_secs: default_poll_interval(),
            entity_delay_secs: default_entity_delay(),
            create_pause_ms: default_create_pause(),
            data_dir: default_data_dir(),
        }
    }
}

impl SettingsConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn entity_delay(&self) -> Duration {
        Duration::from_secs(self.entity_delay_secs)
    }

    pub fn create_pause(&self) -> Duration {
        Duration::from_millis(self.create_pause_ms)
    }
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(e).with_context(|| {
                    format!(
                        "{} not found — copy config.toml.template to config.toml first",
                        path.display()
                    )
                });
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        Self::parse(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        Ok(config)
    }

    /// Take secrets from the environment (or `.env`) when set, so they can stay out of the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var(ENV_CLIENT_SECRET) {
            self.account.client_secret = secret;
        }
        if let Ok(password) = std::env::var(ENV_PASSWORD) {
            self.account.password = password;
        }
    }

    /// Write config to the given TOML file path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
