use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The phase a match belongs to.
///
/// Group-phase results feed the standings table; knockout results do not,
/// although goals scored in them still count toward the scorer tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "phase", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Group,
    Knockout,
}

/// A team within the database, with its full roster embedded.
///
/// Teams are created or replaced wholesale by the admin import path; the
/// stats engine never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i32,
    pub name: String,
    #[sqlx(json)]
    pub players: Vec<Player>,
}

/// A roster entry. `member_id` is unique across all teams and is the key
/// that joins goals to players.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub member_id: i32,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub nickname: String,
    pub number: i32,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub is_captain: bool,
}

impl Player {
    /// Display name used in scorer listings: "first last", falling back to
    /// the nickname when both name parts are empty.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string();
        if full.is_empty() {
            self.nickname.clone()
        } else {
            full
        }
    }
}

/// A match within the database.
///
/// `score1`/`score2` are null until the match has been played; that null is
/// the only signal separating scheduled from completed matches. The goal
/// list is stored alongside the scores but nothing forces the two to agree.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub location: String,
    pub phase: Phase,
    pub team1_id: i32,
    pub team2_id: i32,
    pub score1: Option<i32>,
    pub score2: Option<i32>,
    #[sqlx(json)]
    #[serde(default)]
    pub goals: Vec<Goal>,
}

impl Match {
    /// A match only counts toward standings once both scores are recorded.
    pub fn is_completed(&self) -> bool {
        self.score1.is_some() && self.score2.is_some()
    }
}

/// A single goal, referencing a roster entry by member id.
///
/// The reference is not enforced; a goal may point at a member absent from
/// every roster and the aggregation degrades to "Unknown" instead of
/// failing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub member_id: i32,
    pub minute: i32,
}

/// The language a banned word belongs to. Informational only; matching is
/// language-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, Default)]
#[sqlx(type_name = "language", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    He,
    #[default]
    Other,
}

/// A banned word. Stored lowercased; uniqueness is on the word itself.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BannedWord {
    pub word: String,
    pub language: Language,
}

/// A public comment attached to a match.
///
/// Author and content are stored post-censorship; raw banned text never
/// reaches the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub match_id: i32,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// News item priority. High-priority items take precedence on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, Default)]
#[sqlx(type_name = "priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
}

/// An admin-authored news item.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct News {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub date: DateTime<Utc>,
    pub priority: Priority,
}
