//! Parsing and aggregation for UserTweets timeline responses.
//!
//! The document shape is imposed by the platform: a list of feed
//! instructions under `data.user.result.timeline_v2.timeline`, of which only
//! `TimelineAddEntries` carries entries. The envelope down to the
//! instruction list is required (a response without it is not a timeline
//! response and is rejected as malformed); everything below an entry is
//! optional, and entries that do not wrap a post are skipped.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ClientError;
use crate::stats::{PostSummary, TimelineStats};

/// How many recent posts are kept in the aggregate.
const RECENT_POSTS_CAP: usize = 10;

/// Display text is cut at this many characters.
const TEXT_LIMIT: usize = 100;

/// Entry ids carry this prefix in front of the numeric post id.
const ENTRY_ID_PREFIX: &str = "tweet-";

#[derive(Debug, Deserialize)]
struct TimelineEnvelope {
    data: EnvelopeData,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    user: EnvelopeUser,
}

#[derive(Debug, Deserialize)]
struct EnvelopeUser {
    result: EnvelopeUserResult,
}

#[derive(Debug, Deserialize)]
struct EnvelopeUserResult {
    timeline_v2: TimelineV2,
}

#[derive(Debug, Deserialize)]
struct TimelineV2 {
    timeline: Timeline,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    instructions: Vec<Instruction>,
}

/// Feed instructions. Pins, cursor cleanups and the rest are ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Instruction {
    TimelineAddEntries {
        #[serde(default)]
        entries: Vec<TimelineEntry>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct TimelineEntry {
    #[serde(rename = "entryId")]
    entry_id: String,
    #[serde(default)]
    content: EntryContent,
}

#[derive(Debug, Default, Deserialize)]
struct EntryContent {
    #[serde(rename = "itemContent")]
    item_content: Option<ItemContent>,
}

#[derive(Debug, Deserialize)]
struct ItemContent {
    tweet_results: Option<TweetResults>,
}

#[derive(Debug, Deserialize)]
struct TweetResults {
    result: Option<TweetResult>,
}

#[derive(Debug, Deserialize)]
struct TweetResult {
    legacy: Option<LegacyTweet>,
}

#[derive(Debug, Deserialize)]
struct LegacyTweet {
    #[serde(default)]
    full_text: String,
    in_reply_to_user_id_str: Option<String>,
}

/// Summarize a raw UserTweets response into counts and a recent-posts list.
///
/// A post is a reply when it answers a user other than `reference_user_id`;
/// answering yourself (thread continuation) counts as an original post.
/// Counts cover every qualifying entry even though the recent-posts list is
/// capped. Pure function: no I/O, the document is not mutated.
pub fn summarize_timeline(
    document: &Value,
    reference_user_id: &str,
    display_username: &str,
) -> Result<TimelineStats, ClientError> {
    let envelope: TimelineEnvelope =
        serde_json::from_value(document.clone()).map_err(ClientError::MalformedResponse)?;

    let instructions = envelope.data.user.result.timeline_v2.timeline.instructions;

    // No add-entries instruction is a valid (empty) timeline, not an error.
    let Some(entries) = instructions.into_iter().find_map(|instruction| match instruction {
        Instruction::TimelineAddEntries { entries } => Some(entries),
        Instruction::Other => None,
    }) else {
        return Ok(TimelineStats::default());
    };

    let mut stats = TimelineStats::default();

    for entry in entries {
        let TimelineEntry { entry_id, content } = entry;

        // Cursors, modules and other non-post entries fall out here.
        let Some(legacy) = content
            .item_content
            .and_then(|item| item.tweet_results)
            .and_then(|results| results.result)
            .and_then(|result| result.legacy)
        else {
            continue;
        };

        let is_reply = legacy
            .in_reply_to_user_id_str
            .as_deref()
            .is_some_and(|id| id != reference_user_id);

        if is_reply {
            stats.replies_count += 1;
        } else {
            stats.tweets_count += 1;
        }

        if stats.recent_tweets.len() < RECENT_POSTS_CAP {
            let id = entry_id
                .strip_prefix(ENTRY_ID_PREFIX)
                .unwrap_or(&entry_id)
                .to_string();
            stats.recent_tweets.push(PostSummary {
                text: truncate_text(&legacy.full_text, TEXT_LIMIT),
                url: format!("https://x.com/{}/status/{}", display_username, id),
                id,
                is_reply,
            });
        }
    }

    stats.total_posts = stats.tweets_count + stats.replies_count;
    Ok(stats)
}

/// Cut `text` to at most `limit` characters, marking the cut with `...`.
/// Character-based so multi-byte text is never split mid code point.
fn truncate_text(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
