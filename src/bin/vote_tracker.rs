use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use vote_grapher::api::RedditClient;
use vote_grapher::config::{AppConfig, CONFIG_PATH};
use vote_grapher::log_writer::SubmissionLog;
use vote_grapher::reporter::Reporter;
use vote_grapher::tracker::{TrackerSettings, VoteTracker};

#[derive(Parser)]
#[command(
    name = "vote-tracker",
    about = "Track score and estimated up/down votes of new Reddit submissions"
)]
struct Args {
    /// Path to the config file
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Community to track (overrides settings.subreddit)
    #[arg(long)]
    subreddit: Option<String>,

    /// User agent sent with every request (overrides settings.user_agent)
    #[arg(long)]
    user_agent: Option<String>,

    /// Suppress progress lines on stdout
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load(&args.config)?;
    config.apply_env_overrides();
    info!("Loaded config from {}", args.config.display());

    if let Some(subreddit) = args.subreddit {
        config.settings.subreddit = subreddit;
    }
    if let Some(user_agent) = args.user_agent {
        config.settings.user_agent = user_agent;
    }
    if args.quiet {
        config.settings.verbose = false;
    }
    if config.settings.submission_limit == 0 {
        anyhow::bail!("settings.submission_limit must be positive");
    }

    let settings = &config.settings;
    let platform = RedditClient::new(config.account.clone(), &settings.user_agent)?;
    let log = SubmissionLog::new(&settings.data_dir, settings.create_pause());
    let mut tracker = VoteTracker::new(
        platform,
        log,
        TrackerSettings::from(settings),
        Reporter::new(settings.verbose),
    );

    if let Err(e) = tracker.run().await {
        error!("{e}");
        std::process::exit(1);
    }
    Ok(())
}
