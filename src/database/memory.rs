//! An in-memory store backing the test suite.
//!
//! Implements every store trait over plain `Vec`s behind a mutex, so the
//! stats and comment pipelines can be exercised without a live Postgres.

use std::sync::Mutex;

use chrono::Utc;

use crate::error::Error;

use super::models::*;
use super::{BannedWordStore, CommentStore, MatchStore, NewsStore, TeamStore};

#[derive(Debug, Default)]
struct Inner {
    teams: Vec<Team>,
    matches: Vec<Match>,
    comments: Vec<Comment>,
    banned_words: Vec<BannedWord>,
    news: Vec<News>,
    next_comment_id: i64,
    next_news_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(teams: Vec<Team>, matches: Vec<Match>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.lock();
            inner.teams = teams;
            inner.matches = matches;
        }
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TeamStore for MemoryStore {
    type Error = Error;

    async fn get_all_teams(&self) -> Result<Vec<Team>, Self::Error> {
        let mut teams = self.lock().teams.clone();
        teams.sort_by_key(|t| t.id);
        Ok(teams)
    }

    async fn replace_teams(&self, teams: &[Team]) -> Result<(), Self::Error> {
        self.lock().teams = teams.to_vec();
        Ok(())
    }
}

impl MatchStore for MemoryStore {
    type Error = Error;

    async fn get_matches(&self, phase: Option<Phase>) -> Result<Vec<Match>, Self::Error> {
        let mut matches: Vec<Match> = self
            .lock()
            .matches
            .iter()
            .filter(|m| phase.map_or(true, |p| m.phase == p))
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.date, m.id));
        Ok(matches)
    }

    async fn get_match(&self, id: i32) -> Result<Option<Match>, Self::Error> {
        Ok(self.lock().matches.iter().find(|m| m.id == id).cloned())
    }

    async fn create_match(&self, m: &Match) -> Result<(), Self::Error> {
        let mut inner = self.lock();
        if inner.matches.iter().any(|existing| existing.id == m.id) {
            return Err(Error::Validation(format!("match {} already exists", m.id)));
        }
        inner.matches.push(m.clone());
        Ok(())
    }

    async fn update_match(&self, m: &Match) -> Result<(), Self::Error> {
        let mut inner = self.lock();
        match inner.matches.iter_mut().find(|existing| existing.id == m.id) {
            Some(existing) => {
                *existing = m.clone();
                Ok(())
            }
            None => Err(Error::NotFound("match")),
        }
    }

    async fn delete_match(&self, id: i32) -> Result<(), Self::Error> {
        let mut inner = self.lock();
        let before = inner.matches.len();
        inner.matches.retain(|m| m.id != id);
        if inner.matches.len() == before {
            return Err(Error::NotFound("match"));
        }
        Ok(())
    }
}

impl CommentStore for MemoryStore {
    type Error = Error;

    async fn insert_comment(
        &self,
        match_id: i32,
        author: &str,
        content: &str,
    ) -> Result<Comment, Self::Error> {
        let mut inner = self.lock();
        inner.next_comment_id += 1;
        let comment = Comment {
            id: inner.next_comment_id,
            match_id,
            author: author.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        inner.comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comments(&self, match_id: i32) -> Result<Vec<Comment>, Self::Error> {
        let mut comments: Vec<Comment> = self
            .lock()
            .comments
            .iter()
            .filter(|c| c.match_id == match_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        comments.truncate(100);
        Ok(comments)
    }

    async fn delete_comment(&self, id: i64) -> Result<(), Self::Error> {
        let mut inner = self.lock();
        let before = inner.comments.len();
        inner.comments.retain(|c| c.id != id);
        if inner.comments.len() == before {
            return Err(Error::NotFound("comment"));
        }
        Ok(())
    }
}

impl BannedWordStore for MemoryStore {
    type Error = Error;

    async fn get_banned_words(&self) -> Result<Vec<String>, Self::Error> {
        let mut words: Vec<String> = self
            .lock()
            .banned_words
            .iter()
            .map(|w| w.word.clone())
            .collect();
        words.sort();
        Ok(words)
    }

    async fn add_banned_word(&self, word: &str, language: Language) -> Result<(), Self::Error> {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return Err(Error::Validation("word is required".to_string()));
        }
        let mut inner = self.lock();
        if inner.banned_words.iter().any(|w| w.word == word) {
            return Err(Error::Validation(format!("\"{word}\" is already banned")));
        }
        inner.banned_words.push(BannedWord { word, language });
        Ok(())
    }

    async fn remove_banned_word(&self, word: &str) -> Result<(), Self::Error> {
        let word = word.trim().to_lowercase();
        let mut inner = self.lock();
        let before = inner.banned_words.len();
        inner.banned_words.retain(|w| w.word != word);
        if inner.banned_words.len() == before {
            return Err(Error::NotFound("banned word"));
        }
        Ok(())
    }
}

impl NewsStore for MemoryStore {
    type Error = Error;

    async fn latest_news(&self) -> Result<Option<News>, Self::Error> {
        let inner = self.lock();
        let mut news: Vec<&News> = inner.news.iter().collect();
        news.sort_by(|a, b| {
            (b.priority == Priority::High)
                .cmp(&(a.priority == Priority::High))
                .then(b.date.cmp(&a.date))
        });
        Ok(news.first().map(|n| (*n).clone()))
    }

    async fn list_news(&self) -> Result<Vec<News>, Self::Error> {
        let mut news = self.lock().news.clone();
        news.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(news)
    }

    async fn create_news(
        &self,
        title: &str,
        message: &str,
        priority: Priority,
    ) -> Result<News, Self::Error> {
        let mut inner = self.lock();
        inner.next_news_id += 1;
        let news = News {
            id: inner.next_news_id,
            title: title.to_string(),
            message: message.to_string(),
            date: Utc::now(),
            priority,
        };
        inner.news.push(news.clone());
        Ok(news)
    }

    async fn delete_news(&self, id: i64) -> Result<(), Self::Error> {
        let mut inner = self.lock();
        let before = inner.news.len();
        inner.news.retain(|n| n.id != id);
        if inner.news.len() == before {
            return Err(Error::NotFound("news item"));
        }
        Ok(())
    }
}
