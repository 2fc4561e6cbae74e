use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use xstats::client::XClient;
use xstats::config;
use xstats::menu;

/// Check follower counts and recent posts of X (Twitter) users.
///
/// With no usernames given, an interactive menu runs; otherwise each
/// username is checked once and the tool exits.
#[derive(Parser)]
#[command(name = "xstats", version, about)]
struct Cli {
    /// Usernames to check non-interactively (with or without @)
    usernames: Vec<String>,

    /// auth_token session cookie
    #[arg(long)]
    auth_token: Option<String>,

    /// ct0 session cookie; fetched automatically when omitted
    #[arg(long)]
    csrf_token: Option<String>,

    /// Proxy URL for all requests
    #[arg(long)]
    proxy: Option<String>,

    /// Config file path (default: <config dir>/xstats/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit non-interactive results as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut account = config::load(cli.config.as_deref())?.with_overrides(
        cli.auth_token,
        cli.csrf_token,
        cli.proxy,
    );

    if !account.has_auth_token() && cli.usernames.is_empty() {
        menu::prompt_credentials(&mut account)?;
    }
    if !account.has_auth_token() {
        bail!("an auth token is required (--auth-token, config file, or prompt)");
    }

    let mut client = XClient::new(&account)?;
    let me = client
        .verify_credentials()
        .await
        .context("could not authenticate with the supplied session cookies")?;
    if cli.json {
        eprintln!("Logged in as @{}", me);
    } else {
        println!("Logged in as @{}", me);
    }

    if cli.usernames.is_empty() {
        menu::run(&client).await
    } else {
        check_usernames(&client, &cli.usernames, cli.json).await
    }
}

/// One-shot mode: check each username sequentially. Failures go to stderr
/// and never stop the run; in JSON mode the successes come out as one array.
async fn check_usernames(client: &XClient, usernames: &[String], json: bool) -> Result<()> {
    let mut results = Vec::new();

    for username in usernames {
        match client.user_stats(username).await {
            Ok(stats) => {
                if !json {
                    menu::print_stats(&stats);
                }
                results.push(stats);
            }
            Err(err) => eprintln!("@{}: {}", username.trim_start_matches('@'), err),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }
    Ok(())
}
