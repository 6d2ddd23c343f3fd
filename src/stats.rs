//! Standings and scorer aggregation.
//!
//! Nothing here is cached or incremental. Tables are recomputed from the
//! full team and match collections on every request; the tournament is
//! small enough that correctness-by-recomputation beats bookkeeping.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::database::models::{Match, News, Phase, Team};
use crate::database::{MatchStore, NewsStore, TeamStore};
use crate::error::Error;

/// One row of the standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsEntry {
    pub team_id: i32,
    pub team_name: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub goal_diff: i32,
    pub points: u32,
}

impl StandingsEntry {
    fn new(team: &Team) -> Self {
        StandingsEntry {
            team_id: team.id,
            team_name: team.name.clone(),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_diff: 0,
            points: 0,
        }
    }

    fn record(&mut self, scored: i32, conceded: i32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        self.goal_diff = self.goals_for - self.goals_against;
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.won += 1;
                self.points += 3;
            }
            std::cmp::Ordering::Equal => {
                self.drawn += 1;
                self.points += 1;
            }
            std::cmp::Ordering::Less => self.lost += 1,
        }
    }
}

/// One row of the top-scorer table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopScorer {
    pub member_id: i32,
    pub player_name: String,
    pub team_name: String,
    pub position: String,
    pub goals: u32,
}

/// Everything the front page needs in one payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub standings: Vec<StandingsEntry>,
    pub top_scorer: Option<TopScorer>,
    pub latest_news: Option<News>,
    pub next_match: Option<Match>,
    pub recent_matches: Vec<Match>,
}

/// Computes the standings table from group-phase completed matches.
///
/// Win 3, draw 1, loss 0. Ties break on goal difference, then goals
/// scored; teams still tied keep roster order. Matches with missing
/// scores, or referencing a team id outside the roster set, are skipped.
pub fn standings_from(teams: &[Team], matches: &[Match]) -> Vec<StandingsEntry> {
    let mut table: Vec<StandingsEntry> = teams.iter().map(StandingsEntry::new).collect();
    let index: HashMap<i32, usize> = table
        .iter()
        .enumerate()
        .map(|(i, entry)| (entry.team_id, i))
        .collect();

    for m in matches {
        if m.phase != Phase::Group {
            continue;
        }
        let (Some(score1), Some(score2)) = (m.score1, m.score2) else {
            continue;
        };
        let (Some(&i1), Some(&i2)) = (index.get(&m.team1_id), index.get(&m.team2_id)) else {
            warn!(
                match_id = m.id,
                team1 = m.team1_id,
                team2 = m.team2_id,
                "Match references a team outside the roster set, skipping."
            );
            continue;
        };
        table[i1].record(score1, score2);
        table[i2].record(score2, score1);
    }

    table.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_diff.cmp(&a.goal_diff))
            .then(b.goals_for.cmp(&a.goals_for))
    });
    table
}

/// Computes the scorer table from every goal on record, all phases.
///
/// Players appear only once they have scored; ties keep
/// order-of-first-goal. A goal referencing a member on no roster is
/// tallied under "Unknown" rather than dropped.
pub fn top_scorers_from(teams: &[Team], matches: &[Match]) -> Vec<TopScorer> {
    let mut roster: HashMap<i32, (String, String, String)> = HashMap::new();
    for team in teams {
        for player in &team.players {
            roster.insert(
                player.member_id,
                (player.display_name(), team.name.clone(), player.position.clone()),
            );
        }
    }

    let mut scorers: Vec<TopScorer> = Vec::new();
    let mut index: HashMap<i32, usize> = HashMap::new();
    for m in matches {
        for goal in &m.goals {
            let i = *index.entry(goal.member_id).or_insert_with(|| {
                let (player_name, team_name, position) = match roster.get(&goal.member_id) {
                    Some(entry) => entry.clone(),
                    None => {
                        warn!(
                            match_id = m.id,
                            member_id = goal.member_id,
                            "Goal references a member on no roster."
                        );
                        ("Unknown".to_string(), "Unknown".to_string(), String::new())
                    }
                };
                scorers.push(TopScorer {
                    member_id: goal.member_id,
                    player_name,
                    team_name,
                    position,
                    goals: 0,
                });
                scorers.len() - 1
            });
            scorers[i].goals += 1;
        }
    }

    scorers.sort_by(|a, b| b.goals.cmp(&a.goals));
    scorers
}

pub async fn standings<DB>(db: &DB) -> Result<Vec<StandingsEntry>, Error>
where
    DB: TeamStore<Error = Error> + MatchStore<Error = Error>,
{
    let (teams, matches) = tokio::try_join!(db.get_all_teams(), db.get_matches(None))?;
    Ok(standings_from(&teams, &matches))
}

pub async fn top_scorers<DB>(db: &DB) -> Result<Vec<TopScorer>, Error>
where
    DB: TeamStore<Error = Error> + MatchStore<Error = Error>,
{
    let (teams, matches) = tokio::try_join!(db.get_all_teams(), db.get_matches(None))?;
    Ok(top_scorers_from(&teams, &matches))
}

/// Builds the dashboard payload: top five of the table, the leading
/// scorer, the featured news item, the next scheduled match and the five
/// most recent results.
pub async fn dashboard<DB>(db: &DB, now: DateTime<Utc>) -> Result<Dashboard, Error>
where
    DB: TeamStore<Error = Error> + MatchStore<Error = Error> + NewsStore<Error = Error>,
{
    let (teams, matches, latest_news) = tokio::try_join!(
        db.get_all_teams(),
        db.get_matches(None),
        db.latest_news()
    )?;

    let mut standings = standings_from(&teams, &matches);
    standings.truncate(5);
    let top_scorer = top_scorers_from(&teams, &matches).into_iter().next();

    // Selection is by date alone; a future-dated match counts as next
    // even if its scores were already entered.
    let next_match = matches
        .iter()
        .filter(|m| m.date >= now)
        .min_by_key(|m| m.date)
        .cloned();
    let mut recent_matches: Vec<Match> = matches
        .iter()
        .filter(|m| m.is_completed())
        .cloned()
        .collect();
    recent_matches.sort_by(|a, b| b.date.cmp(&a.date));
    recent_matches.truncate(5);

    Ok(Dashboard {
        standings,
        top_scorer,
        latest_news,
        next_match,
        recent_matches,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::database::models::{Goal, Player};

    use super::*;

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
            date: Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap(),
            location: String::new(),
            phase: Phase::Group,
            team1_id: t1,
            team2_id: t2,
            score1: score.map(|(a, _)| a),
            score2: score.map(|(_, b)| b),
            goals: Vec::new(),
        }
    }

    #[test]
    fn standings_award_three_one_zero() {
        let teams = vec![team(1, "A", vec![]), team(2, "B", vec![]), team(3, "C", vec![])];
        let matches = vec![
            group_match(1, 1, 2, Some((2, 0))),
            group_match(2, 2, 3, Some((1, 1))),
        ];
        let table = standings_from(&teams, &matches);

        assert_eq!(table[0].team_name, "A");
        assert_eq!(table[0].points, 3);
        assert_eq!(table[0].won, 1);

        let b = table.iter().find(|e| e.team_name == "B").unwrap();
        assert_eq!(b.points, 1);
        assert_eq!(b.played, 2);
        assert_eq!(b.lost, 1);
        assert_eq!(b.drawn, 1);

        let c = table.iter().find(|e| e.team_name == "C").unwrap();
        assert_eq!(c.points, 1);
        assert_eq!(c.played, 1);
    }

    #[test]
    fn standings_break_ties_on_goal_diff_then_goals_for() {
        let teams = vec![team(1, "A", vec![]), team(2, "B", vec![]), team(3, "C", vec![]), team(4, "D", vec![])];
        // A and B both win once; A by a wider margin.
        let matches = vec![
            group_match(1, 1, 3, Some((4, 0))),
            group_match(2, 2, 4, Some((1, 0))),
        ];
        let table = standings_from(&teams, &matches);
        assert_eq!(table[0].team_name, "A");
        assert_eq!(table[1].team_name, "B");
        assert_eq!(table[0].goal_diff, 4);
        assert_eq!(table[1].goal_diff, 1);
    }

    #[test]
    fn standings_keep_roster_order_for_full_ties() {
        let teams = vec![team(7, "First", vec![]), team(3, "Second", vec![])];
        let table = standings_from(&teams, &[]);
        assert_eq!(table[0].team_name, "First");
        assert_eq!(table[1].team_name, "Second");
    }

    #[test]
    fn standings_skip_unplayed_and_knockout_matches() {
        let teams = vec![team(1, "A", vec![]), team(2, "B", vec![])];
        let mut knockout = group_match(2, 1, 2, Some((5, 0)));
        knockout.phase = Phase::Knockout;
        let matches = vec![group_match(1, 1, 2, None), knockout];
        let table = standings_from(&teams, &matches);
        assert!(table.iter().all(|e| e.played == 0 && e.points == 0));
    }

    #[test]
    fn standings_skip_matches_with_unknown_teams() {
        let teams = vec![team(1, "A", vec![])];
        let matches = vec![group_match(1, 1, 99, Some((3, 0)))];
        let table = standings_from(&teams, &matches);
        assert_eq!(table[0].played, 0);
    }

    #[test]
    fn standings_points_and_goal_arithmetic_hold() {
        let teams = vec![team(1, "A", vec![]), team(2, "B", vec![]), team(3, "C", vec![])];
        let matches = vec![
            group_match(1, 1, 2, Some((2, 1))),
            group_match(2, 1, 3, Some((0, 0))),
            group_match(3, 2, 3, Some((3, 2))),
        ];
        let table = standings_from(&teams, &matches);

        // Every completed match hands out 3 (win) or 2 (draw) points total.
        let total_points: u32 = table.iter().map(|e| e.points).sum();
        assert_eq!(total_points, 3 + 2 + 3);

        let total_for: i32 = table.iter().map(|e| e.goals_for).sum();
        let total_against: i32 = table.iter().map(|e| e.goals_against).sum();
        assert_eq!(total_for, total_against);
        for entry in &table {
            assert_eq!(entry.goal_diff, entry.goals_for - entry.goals_against);
            assert_eq!(entry.played, entry.won + entry.drawn + entry.lost);
        }
    }

    #[test]
    fn scorers_count_goals_across_phases() {
        let teams = vec![
            team(1, "A", vec![player(101, "Avi", "Cohen")]),
            team(2, "B", vec![player(201, "Dan", "Levi")]),
        ];
        let mut m1 = group_match(1, 1, 2, Some((2, 1)));
        m1.goals = vec![
            Goal { member_id: 101, minute: 10 },
            Goal { member_id: 101, minute: 55 },
            Goal { member_id: 201, minute: 70 },
        ];
        let mut m2 = group_match(2, 1, 2, Some((0, 1)));
        m2.phase = Phase::Knockout;
        m2.goals = vec![Goal { member_id: 201, minute: 88 }];

        let scorers = top_scorers_from(&teams, &[m1, m2]);
        assert_eq!(scorers.len(), 2);
        assert_eq!(scorers[0].player_name, "Avi Cohen");
        assert_eq!(scorers[0].goals, 2);
        assert_eq!(scorers[0].team_name, "A");
        assert_eq!(scorers[1].player_name, "Dan Levi");
        assert_eq!(scorers[1].goals, 2);
    }

    #[test]
    fn scorers_omit_players_without_goals() {
        let teams = vec![team(1, "A", vec![player(101, "Avi", "Cohen"), player(102, "Bo", "Peretz")])];
        let mut m = group_match(1, 1, 1, Some((1, 0)));
        m.goals = vec![Goal { member_id: 101, minute: 5 }];
        let scorers = top_scorers_from(&teams, &[m]);
        assert_eq!(scorers.len(), 1);
        assert_eq!(scorers[0].member_id, 101);
    }

    #[test]
    fn scorers_tie_keeps_order_of_first_goal() {
        let teams = vec![team(1, "A", vec![player(101, "First", ""), player(102, "Second", "")])];
        let mut m = group_match(1, 1, 1, Some((2, 0)));
        m.goals = vec![
            Goal { member_id: 102, minute: 3 },
            Goal { member_id: 101, minute: 9 },
        ];
        let scorers = top_scorers_from(&teams, &[m]);
        assert_eq!(scorers[0].player_name, "Second");
        assert_eq!(scorers[1].player_name, "First");
    }

    #[test]
    fn scorers_tally_unknown_members_as_unknown() {
        let teams = vec![team(1, "A", vec![])];
        let mut m = group_match(1, 1, 1, Some((1, 0)));
        m.goals = vec![Goal { member_id: 999, minute: 40 }];
        let scorers = top_scorers_from(&teams, &[m]);
        assert_eq!(scorers.len(), 1);
        assert_eq!(scorers[0].player_name, "Unknown");
        assert_eq!(scorers[0].team_name, "Unknown");
    }

    #[test]
    fn scorer_goal_totals_match_goal_lists() {
        let teams = vec![team(1, "A", vec![player(101, "Avi", "Cohen")])];
        let mut m1 = group_match(1, 1, 1, Some((2, 0)));
        m1.goals = vec![
            Goal { member_id: 101, minute: 1 },
            Goal { member_id: 999, minute: 2 },
        ];
        let mut m2 = group_match(2, 1, 1, Some((1, 0)));
        m2.goals = vec![Goal { member_id: 101, minute: 3 }];
        let matches = [m1, m2];

        let total_goals: usize = matches.iter().map(|m| m.goals.len()).sum();
        let scorers = top_scorers_from(&teams, &matches);
        let tallied: u32 = scorers.iter().map(|s| s.goals).sum();
        assert_eq!(tallied as usize, total_goals);
    }

    #[tokio::test]
    async fn dashboard_next_match_is_picked_by_date_alone() {
        use crate::database::memory::MemoryStore;

        let now = Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap();
        // Future-dated but already scored; still the next match.
        let mut prerecorded = group_match(1, 1, 2, Some((2, 0)));
        prerecorded.date = Utc.with_ymd_and_hms(2026, 3, 7, 18, 0, 0).unwrap();
        let mut later = group_match(2, 2, 1, None);
        later.date = Utc.with_ymd_and_hms(2026, 3, 9, 18, 0, 0).unwrap();

        let store = MemoryStore::with_data(
            vec![team(1, "A", vec![]), team(2, "B", vec![])],
            vec![prerecorded, later],
        );
        let dashboard = dashboard(&store, now).await.unwrap();
        assert_eq!(dashboard.next_match.as_ref().unwrap().id, 1);
    }

    #[tokio::test]
    async fn dashboard_assembles_all_sections() {
        use crate::database::memory::MemoryStore;
        use crate::database::NewsStore;

        let teams = vec![
            team(1, "A", vec![player(101, "Avi", "Cohen")]),
            team(2, "B", vec![]),
        ];
        let now = Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap();
        let mut played = group_match(1, 1, 2, Some((1, 0)));
        played.date = Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap();
        played.goals = vec![Goal { member_id: 101, minute: 30 }];
        let mut upcoming = group_match(2, 2, 1, None);
        upcoming.date = Utc.with_ymd_and_hms(2026, 3, 8, 18, 0, 0).unwrap();

        let store = MemoryStore::with_data(teams, vec![played, upcoming]);
        store
            .create_news("Kickoff", "Season opens", crate::database::models::Priority::High)
            .await
            .unwrap();

        let dashboard = dashboard(&store, now).await.unwrap();
        assert_eq!(dashboard.standings[0].team_name, "A");
        assert_eq!(dashboard.top_scorer.as_ref().unwrap().player_name, "Avi Cohen");
        assert_eq!(dashboard.latest_news.as_ref().unwrap().title, "Kickoff");
        assert_eq!(dashboard.next_match.as_ref().unwrap().id, 2);
        assert_eq!(dashboard.recent_matches.len(), 1);
        assert_eq!(dashboard.recent_matches[0].id, 1);
    }
}
