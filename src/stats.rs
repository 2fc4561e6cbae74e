use serde::Serialize;

/// One post kept in the recent-posts list of a timeline summary.
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: String,
    pub text: String,
    pub url: String,
    pub is_reply: bool,
}

/// Aggregate over a single timeline response.
///
/// `total_posts` always equals `tweets_count + replies_count`, and
/// `recent_tweets` holds at most the first 10 qualifying posts in the
/// order the platform returned them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimelineStats {
    pub tweets_count: u32,
    pub replies_count: u32,
    pub total_posts: u32,
    pub recent_tweets: Vec<PostSummary>,
}

/// The full per-user record printed (or serialized) by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub username: String,
    pub user_id: String,
    pub followers_count: u64,
    #[serde(flatten)]
    pub timeline: TimelineStats,
}
