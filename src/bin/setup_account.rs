//! setup-account — First-time setup for the vote tracker.
//!
//! Expects `config.toml` to already exist (copied from `config.toml.template`).
//! Authenticates with the configured Reddit script app to validate the
//! credentials, prints the granted scope, and stores the password in the
//! existing config file.
//!
//! By default, reads the password interactively (hidden input) to avoid
//! leaking it into shell history. Use `--password` only for scripted/CI use.

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;

use vote_grapher::api::{Platform, RedditClient};
use vote_grapher::config::{AppConfig, CONFIG_PATH};

#[derive(Parser)]
#[command(
    name = "setup-account",
    about = "Validate Reddit credentials and save them to config.toml"
)]
struct Cli {
    /// Reddit account password.
    /// If omitted, reads interactively with hidden input (recommended).
    #[arg(long)]
    password: Option<String>,

    /// Script app secret. Kept as configured when omitted.
    #[arg(long)]
    client_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = Path::new(CONFIG_PATH);

    let mut app_config = AppConfig::load(config_path)?;

    println!("=== Vote Grapher — Account Setup ===\n");

    // ── Step 1: Read password ──────────────────────────────────────
    let password = match cli.password {
        Some(password) => password,
        None => {
            let prompt = format!("Password for u/{}: ", app_config.account.username);
            rpassword::prompt_password(prompt).context("failed to read password")?
        }
    };
    app_config.account.set_password(password)?;
    if let Some(secret) = cli.client_secret {
        app_config.account.client_secret = secret;
    }
    if app_config.account.client_secret.is_empty() {
        bail!("account.client_secret is empty — pass --client-secret or set it in config.toml");
    }

    // ── Step 2: Authenticate ───────────────────────────────────────
    println!("Authenticating as u/{}...", app_config.account.username);
    let mut client =
        RedditClient::new(app_config.account.clone(), &app_config.settings.user_agent)?;
    client
        .connect()
        .await
        .context("Reddit authentication failed — check client id, secret, username and password")?;
    println!("  Authentication successful");
    println!("  Scope: {}", client.session().scope());
    println!();

    // ── Step 3: Update config.toml ─────────────────────────────────
    println!("Updating credentials in {}...", config_path.display());
    app_config.save(config_path)?;
    println!("  Config updated successfully");
    println!();

    println!("=== Setup Complete ===");
    println!();
    println!("Next steps:");
    println!("  cargo run --bin vote-tracker -- --subreddit {}", app_config.settings.subreddit);

    Ok(())
}
