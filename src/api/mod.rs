//! HTTP surface of the service.
//!
//! Handlers are grouped by privilege: everything under `/api` is public,
//! everything under `/api/admin` sits behind the bearer-token guard.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::database::{BannedWordStore, CommentStore, MatchStore, NewsStore, TeamStore};
use crate::error::Error;
use crate::ratelimit::FixedWindowLimiter;

pub mod admin;
pub mod public;

/// Comment submissions allowed per identity per window.
pub const COMMENT_LIMIT: u32 = 3;
/// Length of the comment rate-limit window.
pub const COMMENT_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Shared state passed to every handler.
pub struct Data<DB> {
    pub database: DB,
    pub limiter: FixedWindowLimiter,
    pub admin_token: String,
}

impl<DB> Data<DB> {
    pub fn new(database: DB, admin_token: String) -> Self {
        Data {
            database,
            limiter: FixedWindowLimiter::new(COMMENT_LIMIT, COMMENT_WINDOW),
            admin_token,
        }
    }
}

/// Assembles the full route tree over any store implementation.
pub fn router<DB>(state: Arc<Data<DB>>) -> Router
where
    DB: TeamStore<Error = Error>
        + MatchStore<Error = Error>
        + CommentStore<Error = Error>
        + BannedWordStore<Error = Error>
        + NewsStore<Error = Error>
        + Send
        + Sync
        + 'static,
{
    let admin_routes = Router::new()
        .route("/matches", post(admin::create_match::<DB>))
        .route(
            "/matches/:id",
            put(admin::update_match::<DB>).delete(admin::delete_match::<DB>),
        )
        .route(
            "/words",
            get(admin::list_banned_words::<DB>).post(admin::add_banned_word::<DB>),
        )
        .route("/words/:word", delete(admin::remove_banned_word::<DB>))
        .route(
            "/news",
            get(admin::list_news::<DB>).post(admin::create_news::<DB>),
        )
        .route("/news/:id", delete(admin::delete_news::<DB>))
        .route("/comments/:id", delete(admin::delete_comment::<DB>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin::<DB>,
        ));

    let public_routes = Router::new()
        .route("/stats/standings", get(public::standings::<DB>))
        .route("/stats/scorers", get(public::top_scorers::<DB>))
        .route("/stats/dashboard", get(public::dashboard::<DB>))
        .route("/teams", get(public::teams::<DB>))
        .route("/matches", get(public::matches::<DB>))
        .route("/comments/:match_id", get(public::comments::<DB>))
        .route("/comments", post(public::post_comment::<DB>));

    Router::new()
        .nest("/api/admin", admin_routes)
        .nest("/api", public_routes)
        .with_state(state)
}

/// Rejects any request whose bearer token does not match `ADMIN_TOKEN`.
async fn require_admin<DB>(
    State(state): State<Arc<Data<DB>>>,
    req: Request,
    next: Next,
) -> Result<Response, Error>
where
    DB: Send + Sync + 'static,
{
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| token == state.admin_token);

    if !authorized {
        return Err(Error::Unauthorized);
    }
    Ok(next.run(req).await)
}

/// Identity used for rate limiting: the first hop of `X-Forwarded-For`
/// when a proxy supplied one, otherwise the socket address.
pub fn client_identity(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|hop| hop.trim().to_string())
        .filter(|hop| !hop.is_empty())
        .unwrap_or_else(|| addr.ip().to_string())
}
