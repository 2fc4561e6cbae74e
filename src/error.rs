use thiserror::Error;

/// Errors surfaced at the API-client boundary.
///
/// `UserNotFound` is reported per user and never aborts a batch;
/// `AuthenticationFailure` is checked once at startup and ends the session.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),

    #[error("user @{0} not found or account is private")]
    UserNotFound(String),

    /// The response is missing the structural path a timeline document must
    /// carry. Distinct from an empty timeline, which is not an error.
    #[error("malformed API response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}
