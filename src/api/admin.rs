//! Token-guarded endpoints for running the tournament.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::database::models::{Language, Match, News, Priority};
use crate::database::{BannedWordStore, CommentStore, MatchStore, NewsStore};
use crate::error::Error;

use super::Data;

pub async fn create_match<DB>(
    State(state): State<Arc<Data<DB>>>,
    Json(m): Json<Match>,
) -> Result<StatusCode, Error>
where
    DB: MatchStore<Error = Error> + Send + Sync,
{
    state.database.create_match(&m).await?;
    info!(match_id = m.id, "Match created.");
    Ok(StatusCode::CREATED)
}

pub async fn update_match<DB>(
    State(state): State<Arc<Data<DB>>>,
    Path(id): Path<i32>,
    Json(mut m): Json<Match>,
) -> Result<StatusCode, Error>
where
    DB: MatchStore<Error = Error> + Send + Sync,
{
    // The path wins over whatever id the body carries.
    m.id = id;
    state.database.update_match(&m).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_match<DB>(
    State(state): State<Arc<Data<DB>>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, Error>
where
    DB: MatchStore<Error = Error> + Send + Sync,
{
    state.database.delete_match(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_banned_words<DB>(
    State(state): State<Arc<Data<DB>>>,
) -> Result<Json<Vec<String>>, Error>
where
    DB: BannedWordStore<Error = Error> + Send + Sync,
{
    Ok(Json(state.database.get_banned_words().await?))
}

#[derive(Debug, Deserialize)]
pub struct NewBannedWord {
    pub word: String,
    #[serde(default)]
    pub language: Language,
}

pub async fn add_banned_word<DB>(
    State(state): State<Arc<Data<DB>>>,
    Json(req): Json<NewBannedWord>,
) -> Result<StatusCode, Error>
where
    DB: BannedWordStore<Error = Error> + Send + Sync,
{
    state
        .database
        .add_banned_word(&req.word, req.language)
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_banned_word<DB>(
    State(state): State<Arc<Data<DB>>>,
    Path(word): Path<String>,
) -> Result<StatusCode, Error>
where
    DB: BannedWordStore<Error = Error> + Send + Sync,
{
    state.database.remove_banned_word(&word).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_news<DB>(State(state): State<Arc<Data<DB>>>) -> Result<Json<Vec<News>>, Error>
where
    DB: NewsStore<Error = Error> + Send + Sync,
{
    Ok(Json(state.database.list_news().await?))
}

#[derive(Debug, Deserialize)]
pub struct NewNews {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub priority: Priority,
}

pub async fn create_news<DB>(
    State(state): State<Arc<Data<DB>>>,
    Json(req): Json<NewNews>,
) -> Result<(StatusCode, Json<News>), Error>
where
    DB: NewsStore<Error = Error> + Send + Sync,
{
    let title = req.title.trim();
    let message = req.message.trim();
    if title.is_empty() || message.is_empty() {
        return Err(Error::Validation(
            "news title and message are required".to_string(),
        ));
    }
    let news = state
        .database
        .create_news(title, message, req.priority)
        .await?;
    Ok((StatusCode::CREATED, Json(news)))
}

pub async fn delete_news<DB>(
    State(state): State<Arc<Data<DB>>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error>
where
    DB: NewsStore<Error = Error> + Send + Sync,
{
    state.database.delete_news(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_comment<DB>(
    State(state): State<Arc<Data<DB>>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error>
where
    DB: CommentStore<Error = Error> + Send + Sync,
{
    state.database.delete_comment(id).await?;
    info!(comment_id = id, "Comment removed by an admin.");
    Ok(StatusCode::NO_CONTENT)
}
