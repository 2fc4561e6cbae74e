//! Authenticated client for X's internal GraphQL API.
//!
//! Authentication rides on two browser-session cookies (`auth_token`, `ct0`)
//! plus the public web-app bearer token; `ct0` doubles as the CSRF header.
//! All calls are sequential, one request at a time.

use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::AccountConfig;
use crate::error::ClientError;
use crate::stats::UserStats;
use crate::timeline;

const API_BASE: &str = "https://x.com/i/api";

/// Bearer token of the public x.com web app, shared by every browser session.
const BEARER_TOKEN: &str = "AAAAAAAAAAAAAAAAAAAAANRILgAAAAAAnNwIzUejRCOuH5E6I8xnZz4puTs%3D1Zv7ttfk8LF81IUq16cHjhLTvJu4FA33AGWWjCpTnA";

const USER_TWEETS_QUERY_ID: &str = "E3opETHurmVJflFsUBVuUQ";
const USER_BY_SCREEN_NAME_QUERY_ID: &str = "G3KGOASz96M-Qu0nwmGXNg";

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

pub struct XClient {
    http: reqwest::Client,
    auth_token: String,
    csrf_token: String,
}

/// Strip surrounding whitespace and a leading `@` from user input.
pub fn normalize_username(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed)
}

impl XClient {
    pub fn new(config: &AccountConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .cookie_store(true);

        if !config.proxy_url.is_empty() {
            builder = builder.proxy(reqwest::Proxy::all(&config.proxy_url)?);
        }

        Ok(Self {
            http: builder.build()?,
            auth_token: config.auth_token.clone(),
            csrf_token: config.csrf_token.clone(),
        })
    }

    /// Check the session against the account settings endpoint and return
    /// the authenticated account's screen name.
    ///
    /// When no `ct0` cookie was supplied, the first response sets one; it is
    /// captured from the cookie jar and the call retried once with the CSRF
    /// header in place.
    pub async fn verify_credentials(&mut self) -> Result<String, ClientError> {
        let url = format!("{}/1.1/account/settings.json", API_BASE);

        if self.csrf_token.is_empty() {
            if let Some(ct0) = self.bootstrap_csrf_token(&url).await? {
                debug!("captured ct0 cookie from initial response");
                self.csrf_token = ct0;
            }
        }

        let settings = self.get_json(&url).await?;
        settings
            .get("screen_name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ClientError::AuthenticationFailure(
                    "settings response carried no screen name".to_string(),
                )
            })
    }

    /// Resolve a username to the platform's numeric user id.
    pub async fn resolve_user_id(&self, username: &str) -> Result<String, ClientError> {
        let user = self.user_by_screen_name(username).await?;
        user.get("rest_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::UserNotFound(username.to_string()))
    }

    /// Follower count for a username.
    pub async fn follower_count(&self, username: &str) -> Result<u64, ClientError> {
        let user = self.user_by_screen_name(username).await?;
        Ok(user
            .pointer("/legacy/followers_count")
            .and_then(Value::as_u64)
            .unwrap_or(0))
    }

    /// Fetch the raw UserTweets timeline document for a user id.
    pub async fn user_timeline(&self, user_id: &str) -> Result<Value, ClientError> {
        let variables = json!({
            "userId": user_id,
            "count": 100,
            "includePromotedContent": false,
            "withQuickPromoteEligibilityTweetFields": false,
            "withVoice": false,
            "withV2Timeline": true,
        });
        let features = json!({
            "profile_label_improvements_pcf_label_in_post_enabled": false,
            "rweb_tipjar_consumption_enabled": true,
            "responsive_web_graphql_exclude_directive_enabled": true,
            "verified_phone_label_enabled": false,
            "creator_subscriptions_tweet_preview_api_enabled": true,
            "responsive_web_graphql_timeline_navigation_enabled": true,
            "responsive_web_graphql_skip_user_profile_image_extensions_enabled": false,
            "premium_content_api_read_enabled": false,
            "communities_web_enable_tweet_community_results_fetch": true,
            "c9s_tweet_anatomy_moderator_badge_enabled": true,
            "responsive_web_grok_analyze_button_fetch_trends_enabled": true,
            "responsive_web_grok_analyze_post_followups_enabled": false,
            "responsive_web_grok_share_attachment_enabled": false,
            "articles_preview_enabled": true,
            "responsive_web_edit_tweet_api_enabled": true,
            "graphql_is_translatable_rweb_tweet_is_translatable_enabled": true,
            "view_counts_everywhere_api_enabled": true,
            "longform_notetweets_consumption_enabled": true,
            "responsive_web_twitter_article_tweet_consumption_enabled": true,
            "tweet_awards_web_tipping_enabled": false,
            "creator_subscriptions_quote_tweet_preview_enabled": false,
            "freedom_of_speech_not_reach_fetch_enabled": true,
            "standardized_nudges_misinfo": true,
            "tweet_with_visibility_results_prefer_gql_limited_actions_policy_enabled": true,
            "rweb_video_timestamps_enabled": true,
            "longform_notetweets_rich_text_read_enabled": true,
            "longform_notetweets_inline_media_enabled": true,
            "responsive_web_enhance_cards_enabled": false,
        });

        let url = graphql_url(USER_TWEETS_QUERY_ID, "UserTweets", &variables, &features);
        self.get_json(&url).await
    }

    /// Resolve and fetch everything the per-user report needs: user id,
    /// follower count, then the summarized timeline. Sequential calls.
    pub async fn user_stats(&self, username: &str) -> Result<UserStats, ClientError> {
        let username = normalize_username(username);
        debug!(username, "collecting user stats");

        let user_id = self.resolve_user_id(username).await?;
        let followers_count = self.follower_count(username).await?;
        let document = self.user_timeline(&user_id).await?;
        let timeline = timeline::summarize_timeline(&document, &user_id, username)?;

        Ok(UserStats {
            username: username.to_string(),
            user_id,
            followers_count,
            timeline,
        })
    }

    /// Look a user up by screen name, returning the `data.user.result`
    /// payload. An empty or missing payload means the user does not exist
    /// or the account is private.
    async fn user_by_screen_name(&self, username: &str) -> Result<Value, ClientError> {
        let variables = json!({
            "screen_name": username,
            "withSafetyModeUserFields": true,
        });
        let features = json!({
            "hidden_profile_likes_enabled": true,
            "hidden_profile_subscriptions_enabled": true,
            "responsive_web_graphql_exclude_directive_enabled": true,
            "verified_phone_label_enabled": false,
            "subscriptions_verification_info_is_identity_verified_enabled": true,
            "subscriptions_verification_info_verified_since_enabled": true,
            "highlights_tweets_tab_ui_enabled": true,
            "responsive_web_twitter_article_notes_tab_enabled": true,
            "creator_subscriptions_tweet_preview_api_enabled": true,
            "responsive_web_graphql_skip_user_profile_image_extensions_enabled": false,
            "responsive_web_graphql_timeline_navigation_enabled": true,
        });

        let url = graphql_url(
            USER_BY_SCREEN_NAME_QUERY_ID,
            "UserByScreenName",
            &variables,
            &features,
        );
        let response = self.get_json(&url).await?;

        response
            .pointer("/data/user/result")
            .filter(|result| result.get("rest_id").is_some())
            .cloned()
            .ok_or_else(|| ClientError::UserNotFound(username.to_string()))
    }

    async fn bootstrap_csrf_token(&self, url: &str) -> Result<Option<String>, ClientError> {
        let response = self.http.get(url).bearer_auth(BEARER_TOKEN).header(COOKIE, self.cookie_header()).send().await?;
        let ct0 = response
            .cookies()
            .find(|cookie| cookie.name() == "ct0")
            .map(|cookie| cookie.value().to_string());
        Ok(ct0)
    }

    async fn get_json(&self, url: &str) -> Result<Value, ClientError> {
        debug!(%url, "GET");
        let mut request = self
            .http
            .get(url)
            .bearer_auth(BEARER_TOKEN)
            .header(COOKIE, self.cookie_header());
        if !self.csrf_token.is_empty() {
            request = request.header("x-csrf-token", &self.csrf_token);
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::AuthenticationFailure(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }

        Ok(response.json().await?)
    }

    fn cookie_header(&self) -> String {
        if self.csrf_token.is_empty() {
            format!("auth_token={}", self.auth_token)
        } else {
            format!("auth_token={}; ct0={}", self.auth_token, self.csrf_token)
        }
    }
}

/// Build a GraphQL GET URL with JSON-encoded `variables` and `features`
/// query parameters, the way the web app issues these queries.
fn graphql_url(query_id: &str, operation: &str, variables: &Value, features: &Value) -> String {
    format!(
        "{}/graphql/{}/{}?variables={}&features={}",
        API_BASE,
        query_id,
        operation,
        urlencoding::encode(&variables.to_string()),
        urlencoding::encode(&features.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username_strips_at_and_whitespace() {
        assert_eq!(normalize_username("@alice"), "alice");
        assert_eq!(normalize_username("  bob  "), "bob");
        assert_eq!(normalize_username(" @carol"), "carol");
        assert_eq!(normalize_username("dave"), "dave");
    }

    #[test]
    fn test_graphql_url_encodes_parameters() {
        let url = graphql_url(
            "QUERYID",
            "UserTweets",
            &json!({ "userId": "42" }),
            &json!({ "flag": true }),
        );
        assert!(url.starts_with("https://x.com/i/api/graphql/QUERYID/UserTweets?"));
        assert!(url.contains("variables=%7B%22userId%22%3A%2242%22%7D"));
        assert!(url.contains("features=%7B%22flag%22%3Atrue%7D"));
        // Raw JSON must never appear unencoded in the query string.
        assert!(!url.contains('{'));
    }

    #[test]
    fn test_cookie_header_without_csrf_token() {
        let client = XClient::new(&AccountConfig {
            auth_token: "tok".to_string(),
            ..AccountConfig::default()
        })
        .unwrap();
        assert_eq!(client.cookie_header(), "auth_token=tok");
    }

    #[test]
    fn test_cookie_header_with_csrf_token() {
        let client = XClient::new(&AccountConfig {
            auth_token: "tok".to_string(),
            csrf_token: "csrf".to_string(),
            ..AccountConfig::default()
        })
        .unwrap();
        assert_eq!(client.cookie_header(), "auth_token=tok; ct0=csrf");
    }
}
