//! Adapter for the pre-migration JSON fixtures.
//!
//! The legacy site shipped its data as snake_case JSON (`team1_id`,
//! `member_id`, a single `name` per roster member). The current schema is
//! camelCase with split name fields. The mapping lives here, in one place,
//! instead of being scattered through ad-hoc renames.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::models::{Goal, Match, Phase, Player, Team};

#[derive(Debug, Deserialize)]
pub struct LegacyTeam {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub members: Vec<LegacyMember>,
}

#[derive(Debug, Deserialize)]
pub struct LegacyMember {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    pub number: i32,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub is_captain: bool,
}

#[derive(Debug, Deserialize)]
pub struct LegacyMatch {
    pub id: i32,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_phase")]
    pub phase: Phase,
    pub team1_id: i32,
    pub team2_id: i32,
    pub score1: Option<i32>,
    pub score2: Option<i32>,
    #[serde(default)]
    pub goals: Vec<LegacyGoal>,
}

#[derive(Debug, Deserialize)]
pub struct LegacyGoal {
    pub member_id: i32,
    pub minute: i32,
}

fn default_phase() -> Phase {
    Phase::Group
}

impl From<LegacyMember> for Player {
    fn from(member: LegacyMember) -> Self {
        // Legacy rosters carry one display name; split on the first space.
        let mut parts = member.name.splitn(2, ' ');
        let first = parts.next().unwrap_or_default().to_string();
        let last = parts.next().unwrap_or_default().to_string();
        let first_name = if first.is_empty() {
            member.nickname.clone()
        } else {
            first
        };
        Player {
            member_id: member.id,
            first_name,
            last_name: last,
            nickname: member.nickname,
            number: member.number,
            position: member.position,
            is_captain: member.is_captain,
        }
    }
}

impl From<LegacyTeam> for Team {
    fn from(team: LegacyTeam) -> Self {
        Team {
            id: team.id,
            name: team.name,
            players: team.members.into_iter().map(Player::from).collect(),
        }
    }
}

impl From<LegacyGoal> for Goal {
    fn from(goal: LegacyGoal) -> Self {
        Goal {
            member_id: goal.member_id,
            minute: goal.minute,
        }
    }
}

impl From<LegacyMatch> for Match {
    fn from(m: LegacyMatch) -> Self {
        Match {
            id: m.id,
            date: m.date,
            location: m.location,
            phase: m.phase,
            team1_id: m.team1_id,
            team2_id: m.team2_id,
            score1: m.score1,
            score2: m.score2,
            goals: m.goals.into_iter().map(Goal::from).collect(),
        }
    }
}
