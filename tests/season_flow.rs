//! End-to-end runs of the aggregation and comment pipelines over the
//! in-memory store.

use std::time::Duration;

use chrono::{TimeZone, Utc};

use matchday::comments::{self, NewComment};
use matchday::database::memory::MemoryStore;
use matchday::database::models::{Goal, Language, Match, Phase, Player, Team};
use matchday::database::{BannedWordStore, CommentStore, MatchStore, TeamStore};
use matchday::error::Error;
use matchday::ratelimit::FixedWindowLimiter;
use matchday::stats;

fn team(id: i32, name: &str, players: Vec<Player>) -> Team {
    Team {
        id,
        name: name.to_string(),
        players,
    }
}

fn player(member_id: i32, first: &str, last: &str) -> Player {
    Player {
        member_id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        number: member_id,
        ..Player::default()
    }
}

fn group_match(id: i32, t1: i32, t2: i32, score: Option<(i32, i32)>) -> Match {
    Match {
        id,
        date: Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap() + chrono::Duration::days(id as i64),
        location: "Main pitch".to_string(),
        phase: Phase::Group,
        team1_id: t1,
        team2_id: t2,
        score1: score.map(|(a, _)| a),
        score2: score.map(|(_, b)| b),
        goals: Vec::new(),
    }
}

#[tokio::test]
async fn group_stage_results_produce_the_expected_table() {
    let store = MemoryStore::new();
    store
        .replace_teams(&[
            team(1, "Team A", vec![player(101, "Avi", "Cohen")]),
            team(2, "Team B", vec![]),
            team(3, "Team C", vec![]),
        ])
        .await
        .unwrap();
    store
        .create_match(&group_match(1, 1, 2, Some((2, 1))))
        .await
        .unwrap();
    store
        .create_match(&group_match(2, 1, 3, Some((1, 1))))
        .await
        .unwrap();
    // Scheduled but unplayed; must not move the table.
    store
        .create_match(&group_match(3, 2, 3, None))
        .await
        .unwrap();

    let table = stats::standings(&store).await.unwrap();

    assert_eq!(table[0].team_name, "Team A");
    assert_eq!(table[0].played, 2);
    assert_eq!(table[0].won, 1);
    assert_eq!(table[0].drawn, 1);
    assert_eq!(table[0].points, 4);
    assert_eq!(table[0].goal_diff, 1);

    assert_eq!(table[1].team_name, "Team C");
    assert_eq!(table[1].played, 1);
    assert_eq!(table[1].drawn, 1);
    assert_eq!(table[1].points, 1);
    assert_eq!(table[1].goal_diff, 0);

    assert_eq!(table[2].team_name, "Team B");
    assert_eq!(table[2].played, 1);
    assert_eq!(table[2].lost, 1);
    assert_eq!(table[2].points, 0);
    assert_eq!(table[2].goal_diff, -1);
}

#[tokio::test]
async fn scorer_table_spans_group_and_knockout_goals() {
    let store = MemoryStore::new();
    store
        .replace_teams(&[
            team(1, "Team A", vec![player(101, "Avi", "Cohen")]),
            team(2, "Team B", vec![player(201, "Dan", "Levi")]),
        ])
        .await
        .unwrap();

    let mut group = group_match(1, 1, 2, Some((2, 0)));
    group.goals = vec![
        Goal { member_id: 101, minute: 12 },
        Goal { member_id: 101, minute: 61 },
    ];
    store.create_match(&group).await.unwrap();

    let mut finals = group_match(2, 1, 2, Some((0, 1)));
    finals.phase = Phase::Knockout;
    finals.goals = vec![Goal { member_id: 201, minute: 89 }];
    store.create_match(&finals).await.unwrap();

    let scorers = stats::top_scorers(&store).await.unwrap();
    assert_eq!(scorers.len(), 2);
    assert_eq!(scorers[0].player_name, "Avi Cohen");
    assert_eq!(scorers[0].team_name, "Team A");
    assert_eq!(scorers[0].goals, 2);
    assert_eq!(scorers[1].player_name, "Dan Levi");
    assert_eq!(scorers[1].goals, 1);
}

#[tokio::test]
async fn comment_pipeline_censors_limits_and_recovers() {
    let store = MemoryStore::new();
    store.add_banned_word("fuck", Language::En).await.unwrap();
    store.add_banned_word("זין", Language::He).await.unwrap();
    let limiter = FixedWindowLimiter::new(3, Duration::from_secs(300));
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap();

    let submit = |content: &str, at| {
        let req = NewComment {
            match_id: 1,
            author: None,
            content: content.to_string(),
        };
        comments::submit(&store, &limiter, "203.0.113.7", req, at)
    };

    // Three quick submissions inside the window all land.
    let first = submit("fuck this ref", start).await.unwrap();
    assert_eq!(first.content, "**** this ref");
    assert_eq!(first.author, "Anonymous");

    let second = submit("זין שלך", start + chrono::Duration::seconds(20))
        .await
        .unwrap();
    assert_eq!(second.content, "*** שלך");

    submit("clean take", start + chrono::Duration::seconds(40))
        .await
        .unwrap();

    // The fourth inside the same window bounces with a positive retry hint.
    let err = submit("one more", start + chrono::Duration::seconds(60))
        .await
        .unwrap_err();
    match err {
        Error::RateLimited { retry_after } => assert!(retry_after > Duration::ZERO),
        other => panic!("expected RateLimited, got {other:?}"),
    }
    assert_eq!(store.get_comments(1).await.unwrap().len(), 3);

    // Once the window elapses the identity gets a fresh allowance.
    submit("back again", start + chrono::Duration::seconds(301))
        .await
        .unwrap();
    assert_eq!(store.get_comments(1).await.unwrap().len(), 4);
}

#[tokio::test]
async fn phase_filter_narrows_the_match_list() {
    let store = MemoryStore::new();
    store
        .create_match(&group_match(1, 1, 2, Some((1, 0))))
        .await
        .unwrap();
    let mut ko = group_match(2, 1, 2, None);
    ko.phase = Phase::Knockout;
    store.create_match(&ko).await.unwrap();

    let all = store.get_matches(None).await.unwrap();
    assert_eq!(all.len(), 2);
    let knockout = store.get_matches(Some(Phase::Knockout)).await.unwrap();
    assert_eq!(knockout.len(), 1);
    assert_eq!(knockout[0].id, 2);
}
