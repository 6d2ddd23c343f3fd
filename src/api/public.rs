//! Unauthenticated endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::comments::{self, NewComment};
use crate::database::models::{Comment, Match, Phase, Team};
use crate::database::{BannedWordStore, CommentStore, MatchStore, NewsStore, TeamStore};
use crate::error::Error;
use crate::stats::{self, Dashboard, StandingsEntry, TopScorer};

use super::{client_identity, Data};

pub async fn standings<DB>(
    State(state): State<Arc<Data<DB>>>,
) -> Result<Json<Vec<StandingsEntry>>, Error>
where
    DB: TeamStore<Error = Error> + MatchStore<Error = Error> + Send + Sync,
{
    Ok(Json(stats::standings(&state.database).await?))
}

pub async fn top_scorers<DB>(
    State(state): State<Arc<Data<DB>>>,
) -> Result<Json<Vec<TopScorer>>, Error>
where
    DB: TeamStore<Error = Error> + MatchStore<Error = Error> + Send + Sync,
{
    Ok(Json(stats::top_scorers(&state.database).await?))
}

pub async fn dashboard<DB>(State(state): State<Arc<Data<DB>>>) -> Result<Json<Dashboard>, Error>
where
    DB: TeamStore<Error = Error>
        + MatchStore<Error = Error>
        + NewsStore<Error = Error>
        + Send
        + Sync,
{
    Ok(Json(stats::dashboard(&state.database, Utc::now()).await?))
}

pub async fn teams<DB>(State(state): State<Arc<Data<DB>>>) -> Result<Json<Vec<Team>>, Error>
where
    DB: TeamStore<Error = Error> + Send + Sync,
{
    Ok(Json(state.database.get_all_teams().await?))
}

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    pub phase: Option<Phase>,
}

pub async fn matches<DB>(
    State(state): State<Arc<Data<DB>>>,
    Query(query): Query<MatchQuery>,
) -> Result<Json<Vec<Match>>, Error>
where
    DB: MatchStore<Error = Error> + Send + Sync,
{
    Ok(Json(state.database.get_matches(query.phase).await?))
}

pub async fn comments<DB>(
    State(state): State<Arc<Data<DB>>>,
    Path(match_id): Path<i32>,
) -> Result<Json<Vec<Comment>>, Error>
where
    DB: CommentStore<Error = Error> + Send + Sync,
{
    Ok(Json(state.database.get_comments(match_id).await?))
}

pub async fn post_comment<DB>(
    State(state): State<Arc<Data<DB>>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>), Error>
where
    DB: CommentStore<Error = Error> + BannedWordStore<Error = Error> + Send + Sync,
{
    let identity = client_identity(&headers, addr);
    let comment = comments::submit(
        &state.database,
        &state.limiter,
        &identity,
        req,
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
