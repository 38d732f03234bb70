use serde::{Deserialize, Serialize};
use validator::Validate;
use volley_core::{DivisionId, MAX_TEAM_SIZE, MIN_TEAM_SIZE, TeamId, UserId, stats::TeamRecord};

use crate::{FieldIssue, Schema, rules::not_blank};

fn default_min_members() -> usize {
    MIN_TEAM_SIZE
}

fn default_max_members() -> usize {
    MAX_TEAM_SIZE
}

fn roster_bounds_issue(min: usize, max: usize, issues: &mut Vec<FieldIssue>) {
    if min > max {
        issues.push(FieldIssue::new(
            "minMembers",
            "Minimum members cannot exceed maximum members",
        ));
    }
}

fn coaching_staff_issue(
    coach: Option<UserId>,
    assistant: Option<UserId>,
    issues: &mut Vec<FieldIssue>,
) {
    if let (Some(coach), Some(assistant)) = (coach, assistant) {
        if coach == assistant {
            issues.push(FieldIssue::new(
                "assistantCoachId",
                "Assistant coach must be a different person from the coach",
            ));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamPayload {
    #[validate(length(min = 2, max = 100, message = "Team name must be between 2 and 100 characters"))]
    pub name: String,
    pub division_id: Option<DivisionId>,
    pub coach_id: Option<UserId>,
    pub assistant_coach_id: Option<UserId>,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 1900, max = 2100, message = "Founded year must be between 1900 and 2100"))]
    pub founded_year: Option<i32>,
    #[serde(default = "default_min_members")]
    #[validate(range(min = 6, max = 15, message = "Team size must be between 6 and 15 members"))]
    pub min_members: usize,
    #[serde(default = "default_max_members")]
    #[validate(range(min = 6, max = 15, message = "Team size must be between 6 and 15 members"))]
    pub max_members: usize,
    #[validate(length(max = 200, message = "Home court must be at most 200 characters"))]
    pub home_court: Option<String>,
}

impl Schema for CreateTeamPayload {
    const REQUIRED: &'static [&'static str] = &["name"];

    fn refine(&self, issues: &mut Vec<FieldIssue>) {
        roster_bounds_issue(self.min_members, self.max_members, issues);
        coaching_staff_issue(self.coach_id, self.assistant_coach_id, issues);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 100, message = "Team name must be between 2 and 100 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division_id: Option<DivisionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coach_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_coach_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1900, max = 2100, message = "Founded year must be between 1900 and 2100"))]
    pub founded_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 6, max = 15, message = "Team size must be between 6 and 15 members"))]
    pub min_members: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 6, max = 15, message = "Team size must be between 6 and 15 members"))]
    pub max_members: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200, message = "Home court must be at most 200 characters"))]
    pub home_court: Option<String>,
}

impl Schema for UpdateTeamPayload {
    fn refine(&self, issues: &mut Vec<FieldIssue>) {
        if let (Some(min), Some(max)) = (self.min_members, self.max_members) {
            roster_bounds_issue(min, max, issues);
        }
        coaching_staff_issue(self.coach_id, self.assistant_coach_id, issues);
    }
}

/// Season totals for one team as entered by an admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatsPayload {
    pub team_id: TeamId,
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    pub matches_played: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub sets_won: u32,
    #[serde(default)]
    pub sets_lost: u32,
    #[serde(default)]
    pub points_for: u32,
    #[serde(default)]
    pub points_against: u32,
}

impl TeamStatsPayload {
    pub fn to_record(&self) -> TeamRecord {
        TeamRecord {
            team_id: self.team_id,
            name: self.name.clone(),
            matches_played: self.matches_played,
            wins: self.wins,
            losses: self.losses,
            sets_won: self.sets_won,
            sets_lost: self.sets_lost,
            points_for: self.points_for,
            points_against: self.points_against,
        }
    }
}

impl Schema for TeamStatsPayload {
    const REQUIRED: &'static [&'static str] = &["teamId", "name"];

    fn refine(&self, issues: &mut Vec<FieldIssue>) {
        if u64::from(self.wins) + u64::from(self.losses) > u64::from(self.matches_played) {
            issues.push(FieldIssue::new(
                "wins",
                "Wins and losses cannot exceed matches played",
            ));
        }
    }
}
