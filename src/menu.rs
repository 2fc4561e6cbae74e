//! Interactive menu loop and console output.

use anyhow::Result;
use dialoguer::{Input, Password, Select};

use crate::client::XClient;
use crate::config::AccountConfig;
use crate::error::ClientError;
use crate::stats::UserStats;

/// Run the menu loop until the user picks Exit. Every per-user failure is
/// printed and swallowed so one bad username never ends the session.
pub async fn run(client: &XClient) -> Result<()> {
    loop {
        let items = ["Check one user", "Check several users", "Exit"];
        let selection = Select::new()
            .with_prompt("Menu")
            .items(&items)
            .default(0)
            .interact()?;

        match selection {
            0 => check_single(client).await?,
            1 => check_batch(client).await?,
            _ => break,
        }
    }
    Ok(())
}

/// Prompt for credentials not supplied by flags or the config file.
/// `csrf_token` and `proxy_url` may be left empty.
pub fn prompt_credentials(config: &mut AccountConfig) -> Result<()> {
    if config.auth_token.is_empty() {
        config.auth_token = Password::new()
            .with_prompt("Auth token (auth_token browser cookie)")
            .interact()?;
    }
    if config.csrf_token.is_empty() {
        config.csrf_token = Input::new()
            .with_prompt("CSRF token (ct0 browser cookie, optional)")
            .allow_empty(true)
            .interact_text()?;
    }
    if config.proxy_url.is_empty() {
        config.proxy_url = Input::new()
            .with_prompt("Proxy URL (optional)")
            .allow_empty(true)
            .interact_text()?;
    }
    Ok(())
}

async fn check_single(client: &XClient) -> Result<()> {
    let username: String = Input::new()
        .with_prompt("Username (with or without @)")
        .allow_empty(true)
        .interact_text()?;
    if username.trim().is_empty() {
        return Ok(());
    }

    match client.user_stats(&username).await {
        Ok(stats) => print_stats(&stats),
        Err(err) => print_user_error(&username, &err),
    }
    Ok(())
}

async fn check_batch(client: &XClient) -> Result<()> {
    let input: String = Input::new()
        .with_prompt("Usernames (comma-separated)")
        .allow_empty(true)
        .interact_text()?;
    let usernames: Vec<&str> = input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    if usernames.is_empty() {
        return Ok(());
    }

    println!("Checking {} users...", usernames.len());
    let mut results = Vec::new();

    // One user at a time; a failed lookup is reported and skipped.
    for username in usernames {
        match client.user_stats(username).await {
            Ok(stats) => {
                println!(
                    "  @{}: {} tweets, {} replies",
                    stats.username, stats.timeline.tweets_count, stats.timeline.replies_count
                );
                results.push(stats);
            }
            Err(err) => print_user_error(username, &err),
        }
    }

    if !results.is_empty() {
        println!();
        print_summary_table(&results);
    }
    Ok(())
}

fn print_user_error(username: &str, err: &ClientError) {
    match err {
        ClientError::UserNotFound(name) => {
            println!("  @{}: not found or account is private", name);
        }
        other => println!("  @{}: {}", username.trim().trim_start_matches('@'), other),
    }
}

/// Full single-user report: counts plus the recent-posts list.
pub fn print_stats(stats: &UserStats) {
    println!();
    println!("Stats for @{}:", stats.username);
    println!("  Followers:   {}", format_count(stats.followers_count));
    println!("  Tweets:      {}", stats.timeline.tweets_count);
    println!("  Replies:     {}", stats.timeline.replies_count);
    println!("  Total posts: {}", stats.timeline.total_posts);

    if !stats.timeline.recent_tweets.is_empty() {
        println!();
        println!("Recent posts:");
        for (index, post) in stats.timeline.recent_tweets.iter().enumerate() {
            let marker = if post.is_reply { "reply" } else { "tweet" };
            println!("  {:>2}. [{}] {}", index + 1, marker, post.text);
            println!("      {}", post.url);
        }
    }
}

fn print_summary_table(results: &[UserStats]) {
    println!(
        "{:<20} {:>12} {:>8} {:>8} {:>8}",
        "Username", "Followers", "Tweets", "Replies", "Total"
    );
    println!("{}", "-".repeat(60));
    for stats in results {
        println!(
            "{:<20} {:>12} {:>8} {:>8} {:>8}",
            format!("@{}", stats.username),
            format_count(stats.followers_count),
            stats.timeline.tweets_count,
            stats.timeline.replies_count,
            stats.timeline.total_posts,
        );
    }
}

/// Render a count with thousands separators, e.g. 1234567 -> "1,234,567".
fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count_small() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
    }

    #[test]
    fn test_format_count_grouped() {
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
        assert_eq!(format_count(1000000000), "1,000,000,000");
    }
}
