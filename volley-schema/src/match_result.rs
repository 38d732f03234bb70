use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use volley_core::{
    MatchId, MatchStatus, TeamId, TournamentId,
    validation::{MatchSide, SetScore, validate_match_sets},
};

use crate::{FieldIssue, Schema};

fn default_status() -> MatchStatus {
    MatchStatus::Scheduled
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchPayload {
    pub tournament_id: Option<TournamentId>,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub scheduled_at: DateTime<Utc>,
    #[validate(length(max = 255, message = "Venue must be at most 255 characters"))]
    pub venue: Option<String>,
    #[serde(default = "default_status")]
    pub status: MatchStatus,
}

impl Schema for CreateMatchPayload {
    const REQUIRED: &'static [&'static str] = &["homeTeamId", "awayTeamId", "scheduledAt"];

    fn refine(&self, issues: &mut Vec<FieldIssue>) {
        if self.home_team_id == self.away_team_id {
            issues.push(FieldIssue::new(
                "awayTeamId",
                "A team cannot play against itself",
            ));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordMatchResultPayload {
    pub match_id: MatchId,
    #[validate(length(min = 3, max = 5, message = "A match result has between 3 and 5 sets"))]
    pub sets: Vec<SetScore>,
}

impl RecordMatchResultPayload {
    /// Sets won by (home, away).
    pub fn sets_won(&self) -> (u32, u32) {
        self.sets
            .iter()
            .fold((0, 0), |(home, away), set| match set.winner() {
                Some(MatchSide::Home) => (home + 1, away),
                Some(MatchSide::Away) => (home, away + 1),
                None => (home, away),
            })
    }

    pub fn winner(&self) -> Option<MatchSide> {
        let (home, away) = self.sets_won();
        match home.cmp(&away) {
            std::cmp::Ordering::Greater => Some(MatchSide::Home),
            std::cmp::Ordering::Less => Some(MatchSide::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Rally points scored by (home, away) across every set.
    pub fn points(&self) -> (u32, u32) {
        self.sets.iter().fold((0, 0), |(home, away), set| {
            (home + set.home as u32, away + set.away as u32)
        })
    }
}

impl Schema for RecordMatchResultPayload {
    const REQUIRED: &'static [&'static str] = &["matchId", "sets"];

    fn refine(&self, issues: &mut Vec<FieldIssue>) {
        for message in validate_match_sets(&self.sets).errors {
            issues.push(FieldIssue::new("sets", message));
        }
    }
}
