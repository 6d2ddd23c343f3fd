use std::future::Future;

use sqlx::PgPool;
use tracing::info;

use crate::error::Error;

use self::legacy::{LegacyMatch, LegacyTeam};
use self::models::*;

/// Adapter types for the pre-migration snake_case JSON fixtures.
pub mod legacy;
/// In-memory store used by the test suite.
pub mod memory;
/// Models for the database.
///
/// These models are specific to the current database design and schema.
/// Most if not all are directly mapped to a table in the database.
pub mod models;

/// Any store holding the tournament's teams and rosters.
///
/// Note that changing the implementation of these traits only changes which
/// backend the service talks to (e.g. Postgres, in-memory); the schema is
/// fixed by the model types.
pub trait TeamStore {
    type Error;

    /// Retrieves every team with its full roster.
    fn get_all_teams(&self) -> impl Future<Output = Result<Vec<Team>, Self::Error>> + Send;

    /// Replaces the whole team collection. Teams are never partially
    /// mutated; imports swap the entire set.
    fn replace_teams(&self, teams: &[Team]) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Any store holding the match log.
pub trait MatchStore {
    type Error;

    /// Retrieves matches, optionally restricted to a single phase,
    /// ordered by date.
    fn get_matches(&self, phase: Option<Phase>) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send;

    /// Retrieves a single match by its id.
    fn get_match(&self, id: i32) -> impl Future<Output = Result<Option<Match>, Self::Error>> + Send;

    /// Creates a match. The id is chosen by the admin and must be unique.
    fn create_match(&self, m: &Match) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Updates a match in place (scores, goals, scheduling details).
    fn update_match(&self, m: &Match) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Deletes a match by id.
    fn delete_match(&self, id: i32) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Any store holding public comments.
pub trait CommentStore {
    type Error;

    /// Persists a comment, returning the stored row with its generated id
    /// and timestamp. Callers are responsible for censoring first.
    fn insert_comment(
        &self,
        match_id: i32,
        author: &str,
        content: &str,
    ) -> impl Future<Output = Result<Comment, Self::Error>> + Send;

    /// Retrieves the most recent comments for a match, newest first,
    /// capped at 100.
    fn get_comments(&self, match_id: i32) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send;

    /// Deletes a comment by id.
    fn delete_comment(&self, id: i64) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Any store holding the banned-word list.
pub trait BannedWordStore {
    type Error;

    /// Retrieves every banned word, lowercased.
    fn get_banned_words(&self) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;

    /// Adds a word to the banned list. Duplicates are a validation error.
    fn add_banned_word(&self, word: &str, language: Language) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Removes a word from the banned list.
    fn remove_banned_word(&self, word: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Any store holding news items.
pub trait NewsStore {
    type Error;

    /// Retrieves the most prominent news item: high priority first, then
    /// most recent.
    fn latest_news(&self) -> impl Future<Output = Result<Option<News>, Self::Error>> + Send;

    /// Retrieves all news items, newest first.
    fn list_news(&self) -> impl Future<Output = Result<Vec<News>, Self::Error>> + Send;

    /// Creates a news item, returning the stored row.
    fn create_news(
        &self,
        title: &str,
        message: &str,
        priority: Priority,
    ) -> impl Future<Output = Result<News, Self::Error>> + Send;

    /// Deletes a news item by id.
    fn delete_news(&self, id: i64) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// The Postgres database used by the tournament site.
#[derive(Debug, Clone)]
pub struct PgDatabase {
    pub pool: PgPool,
}

impl PgDatabase {
    pub async fn connect() -> Result<Self, Error> {
        #[cfg(debug_assertions)]
        dotenv::dotenv().ok();

        let db_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                return Err(Error::Other(anyhow::anyhow!(
                    "DATABASE_URL environment variable not found"
                )));
            }
        };
        let pool = PgPool::connect(db_url.as_str()).await?;
        info!("Successfully connected to the database.");

        Ok(PgDatabase { pool })
    }

    pub async fn migrate(&self) -> Result<(), Error> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(anyhow::Error::from)?;
        Ok(())
    }

    /// Seeds teams and matches from a directory of legacy JSON fixtures
    /// (`teams.json`, `matches.json`), replacing whatever is there.
    pub async fn seed_from_legacy(&self, dir: &str) -> Result<(), Error> {
        let dir = std::path::Path::new(dir);

        let teams_raw = std::fs::read_to_string(dir.join("teams.json"))
            .map_err(|e| anyhow::anyhow!("Unable to read teams.json: {e}"))?;
        let legacy_teams: Vec<LegacyTeam> =
            serde_json::from_str(&teams_raw).map_err(anyhow::Error::from)?;
        let teams: Vec<Team> = legacy_teams.into_iter().map(Team::from).collect();
        self.replace_teams(&teams).await?;

        let matches_raw = std::fs::read_to_string(dir.join("matches.json"))
            .map_err(|e| anyhow::anyhow!("Unable to read matches.json: {e}"))?;
        let legacy_matches: Vec<LegacyMatch> =
            serde_json::from_str(&matches_raw).map_err(anyhow::Error::from)?;

        sqlx::query("DELETE FROM matches")
            .execute(&self.pool)
            .await?;
        for m in legacy_matches.into_iter().map(Match::from) {
            self.create_match(&m).await?;
        }

        info!("Seeded {} teams and the legacy match log.", teams.len());
        Ok(())
    }
}

/// True when the database rejected an insert for violating a unique
/// constraint.
fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}

impl TeamStore for PgDatabase {
    type Error = Error;

    async fn get_all_teams(&self) -> Result<Vec<Team>, Self::Error> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, players
            FROM teams
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(teams)
    }

    async fn replace_teams(&self, teams: &[Team]) -> Result<(), Self::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM teams").execute(&mut *tx).await?;
        for team in teams {
            sqlx::query(
                r#"
                INSERT INTO teams (id, name, players)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(team.id)
            .bind(&team.name)
            .bind(serde_json::to_value(&team.players).map_err(anyhow::Error::from)?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

impl MatchStore for PgDatabase {
    type Error = Error;

    async fn get_matches(&self, phase: Option<Phase>) -> Result<Vec<Match>, Self::Error> {
        let matches = match phase {
            Some(phase) => {
                sqlx::query_as::<_, Match>(
                    r#"
                    SELECT id, date, location, phase, team1_id, team2_id, score1, score2, goals
                    FROM matches
                    WHERE phase = $1
                    ORDER BY date, id
                    "#,
                )
                .bind(phase)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Match>(
                    r#"
                    SELECT id, date, location, phase, team1_id, team2_id, score1, score2, goals
                    FROM matches
                    ORDER BY date, id
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(matches)
    }

    async fn get_match(&self, id: i32) -> Result<Option<Match>, Self::Error> {
        let m = sqlx::query_as::<_, Match>(
            r#"
            SELECT id, date, location, phase, team1_id, team2_id, score1, score2, goals
            FROM matches
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(m)
    }

    async fn create_match(&self, m: &Match) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            INSERT INTO matches (id, date, location, phase, team1_id, team2_id, score1, score2, goals)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(m.id)
        .bind(m.date)
        .bind(&m.location)
        .bind(m.phase)
        .bind(m.team1_id)
        .bind(m.team2_id)
        .bind(m.score1)
        .bind(m.score2)
        .bind(serde_json::to_value(&m.goals).map_err(anyhow::Error::from)?)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Validation(format!("match {} already exists", m.id))
            } else {
                Error::from(e)
            }
        })?;

        Ok(())
    }

    async fn update_match(&self, m: &Match) -> Result<(), Self::Error> {
        let result = sqlx::query(
            r#"
            UPDATE matches
            SET date = $2,
                location = $3,
                phase = $4,
                team1_id = $5,
                team2_id = $6,
                score1 = $7,
                score2 = $8,
                goals = $9
            WHERE id = $1
            "#,
        )
        .bind(m.id)
        .bind(m.date)
        .bind(&m.location)
        .bind(m.phase)
        .bind(m.team1_id)
        .bind(m.team2_id)
        .bind(m.score1)
        .bind(m.score2)
        .bind(serde_json::to_value(&m.goals).map_err(anyhow::Error::from)?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("match"));
        }
        Ok(())
    }

    async fn delete_match(&self, id: i32) -> Result<(), Self::Error> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("match"));
        }
        Ok(())
    }
}

impl CommentStore for PgDatabase {
    type Error = Error;

    async fn insert_comment(
        &self,
        match_id: i32,
        author: &str,
        content: &str,
    ) -> Result<Comment, Self::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (match_id, author, content)
            VALUES ($1, $2, $3)
            RETURNING id, match_id, author, content, created_at
            "#,
        )
        .bind(match_id)
        .bind(author)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn get_comments(&self, match_id: i32) -> Result<Vec<Comment>, Self::Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, match_id, author, content, created_at
            FROM comments
            WHERE match_id = $1
            ORDER BY created_at DESC
            LIMIT 100
            "#,
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn delete_comment(&self, id: i64) -> Result<(), Self::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("comment"));
        }
        Ok(())
    }
}

impl BannedWordStore for PgDatabase {
    type Error = Error;

    async fn get_banned_words(&self) -> Result<Vec<String>, Self::Error> {
        let words = sqlx::query_scalar::<_, String>(
            r#"
            SELECT word FROM banned_words ORDER BY word
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(words)
    }

    async fn add_banned_word(&self, word: &str, language: Language) -> Result<(), Self::Error> {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return Err(Error::Validation("word is required".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO banned_words (word, language)
            VALUES ($1, $2)
            "#,
        )
        .bind(&word)
        .bind(language)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Validation(format!("\"{word}\" is already banned"))
            } else {
                Error::from(e)
            }
        })?;

        Ok(())
    }

    async fn remove_banned_word(&self, word: &str) -> Result<(), Self::Error> {
        let result = sqlx::query("DELETE FROM banned_words WHERE word = $1")
            .bind(word.trim().to_lowercase())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("banned word"));
        }
        Ok(())
    }
}

impl NewsStore for PgDatabase {
    type Error = Error;

    async fn latest_news(&self) -> Result<Option<News>, Self::Error> {
        let news = sqlx::query_as::<_, News>(
            r#"
            SELECT id, title, message, date, priority
            FROM news
            ORDER BY (priority = 'high') DESC, date DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(news)
    }

    async fn list_news(&self) -> Result<Vec<News>, Self::Error> {
        let news = sqlx::query_as::<_, News>(
            r#"
            SELECT id, title, message, date, priority
            FROM news
            ORDER BY date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(news)
    }

    async fn create_news(
        &self,
        title: &str,
        message: &str,
        priority: Priority,
    ) -> Result<News, Self::Error> {
        let news = sqlx::query_as::<_, News>(
            r#"
            INSERT INTO news (title, message, priority)
            VALUES ($1, $2, $3)
            RETURNING id, title, message, date, priority
            "#,
        )
        .bind(title)
        .bind(message)
        .bind(priority)
        .fetch_one(&self.pool)
        .await?;

        Ok(news)
    }

    async fn delete_news(&self, id: i64) -> Result<(), Self::Error> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("news item"));
        }
        Ok(())
    }
}
