//! Public comment submission.
//!
//! The pipeline is rate limit, then validation, then censorship, then
//! persistence. Rate limiting comes first so a flooding client burns its
//! quota even on requests that would fail validation anyway.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::database::models::Comment;
use crate::database::{BannedWordStore, CommentStore};
use crate::error::Error;
use crate::moderation::Censor;
use crate::ratelimit::{Decision, FixedWindowLimiter};

pub const MAX_CONTENT_LEN: usize = 1000;
pub const MAX_AUTHOR_LEN: usize = 100;

/// An incoming comment, as posted by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub match_id: i32,
    #[serde(default)]
    pub author: Option<String>,
    pub content: String,
}

/// Runs a submission through the full pipeline and persists it.
///
/// `identity` is whatever the transport layer uses to tell callers apart,
/// typically the client IP. The timestamp is injected for testability.
pub async fn submit<DB>(
    db: &DB,
    limiter: &FixedWindowLimiter,
    identity: &str,
    req: NewComment,
    now: DateTime<Utc>,
) -> Result<Comment, Error>
where
    DB: CommentStore<Error = Error> + BannedWordStore<Error = Error>,
{
    if let Decision::Limited { retry_after } = limiter.check(identity, now) {
        return Err(Error::RateLimited { retry_after });
    }

    let content = req.content.trim();
    if content.is_empty() {
        return Err(Error::Validation("comment content is required".to_string()));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(Error::Validation(format!(
            "comment content must be at most {MAX_CONTENT_LEN} characters"
        )));
    }

    let author = req.author.as_deref().map(str::trim).unwrap_or_default();
    if author.chars().count() > MAX_AUTHOR_LEN {
        return Err(Error::Validation(format!(
            "author name must be at most {MAX_AUTHOR_LEN} characters"
        )));
    }

    let censor = Censor::new(db.get_banned_words().await?);
    let content = censor.censor(content);
    // The fallback name is a fixed literal and never needs censoring.
    let author = if author.is_empty() {
        "Anonymous".to_string()
    } else {
        censor.censor(author)
    };

    db.insert_comment(req.match_id, &author, &content).await
}
