use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;
use volley_core::{
    MatchId, PlayerId, PlayerPosition, PlayerStatus, SkillLevel, TeamId, UserId,
    stats::PlayerStatLine,
};

use crate::{
    FieldIssue, Schema,
    rules::{valid_email, valid_full_name, valid_phone, valid_player_age},
};

fn default_skill_level() -> SkillLevel {
    SkillLevel::Beginner
}

fn default_status() -> PlayerStatus {
    PlayerStatus::Active
}

fn captaincy_issue(is_captain: bool, is_vice_captain: bool, issues: &mut Vec<FieldIssue>) {
    if is_captain && is_vice_captain {
        issues.push(FieldIssue::new(
            "isViceCaptain",
            "A player cannot be both captain and vice-captain",
        ));
    }
}

fn duplicate_positions_issue(positions: &[PlayerPosition], issues: &mut Vec<FieldIssue>) {
    let unique: HashSet<&PlayerPosition> = positions.iter().collect();
    if unique.len() != positions.len() {
        issues.push(FieldIssue::new("positions", "Positions must not repeat"));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerPayload {
    pub user_id: Option<UserId>,
    #[validate(custom(function = "valid_full_name"))]
    pub full_name: String,
    #[validate(custom(function = "valid_player_age"))]
    pub date_of_birth: NaiveDate,
    #[validate(custom(function = "valid_email"))]
    pub email: Option<String>,
    #[validate(custom(function = "valid_phone"))]
    pub phone: Option<String>,
    #[validate(range(min = 140.0, max = 220.0, message = "Height must be between 140 and 220 cm"))]
    pub height: Option<f64>,
    #[validate(range(min = 40.0, max = 150.0, message = "Weight must be between 40 and 150 kg"))]
    pub weight: Option<f64>,
    #[validate(range(min = 1, max = 99, message = "Jersey number must be between 1 and 99"))]
    pub jersey_number: Option<u8>,
    #[validate(length(min = 1, message = "At least one position is required"))]
    pub positions: Vec<PlayerPosition>,
    #[serde(default = "default_skill_level")]
    pub skill_level: SkillLevel,
    #[serde(default = "default_status")]
    pub status: PlayerStatus,
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default)]
    pub is_vice_captain: bool,
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

impl Schema for CreatePlayerPayload {
    const REQUIRED: &'static [&'static str] = &["fullName", "dateOfBirth", "positions"];

    fn refine(&self, issues: &mut Vec<FieldIssue>) {
        captaincy_issue(self.is_captain, self.is_vice_captain, issues);
        duplicate_positions_issue(&self.positions, issues);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlayerPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "valid_full_name"))]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "valid_player_age"))]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "valid_email"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "valid_phone"))]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 140.0, max = 220.0, message = "Height must be between 140 and 220 cm"))]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 40.0, max = 150.0, message = "Weight must be between 40 and 150 kg"))]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 99, message = "Jersey number must be between 1 and 99"))]
    pub jersey_number: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "At least one position is required"))]
    pub positions: Option<Vec<PlayerPosition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<SkillLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PlayerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_captain: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_vice_captain: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

impl Schema for UpdatePlayerPayload {
    fn refine(&self, issues: &mut Vec<FieldIssue>) {
        captaincy_issue(
            self.is_captain.unwrap_or(false),
            self.is_vice_captain.unwrap_or(false),
            issues,
        );
        if let Some(positions) = &self.positions {
            duplicate_positions_issue(positions, issues);
        }
    }
}

/// Box-score line for one player in one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMatchStatsPayload {
    pub player_id: PlayerId,
    pub match_id: MatchId,
    #[serde(default)]
    pub serves_attempted: u32,
    #[serde(default)]
    pub successful_serves: u32,
    #[serde(default)]
    pub aces: u32,
    #[serde(default)]
    pub attacks_attempted: u32,
    #[serde(default)]
    pub successful_attacks: u32,
    #[serde(default)]
    pub blocks_attempted: u32,
    #[serde(default)]
    pub successful_blocks: u32,
    #[serde(default)]
    pub receptions_attempted: u32,
    #[serde(default)]
    pub successful_receptions: u32,
    #[serde(default)]
    pub digs: u32,
}

impl PlayerMatchStatsPayload {
    pub fn to_stat_line(&self) -> PlayerStatLine {
        PlayerStatLine {
            matches_played: 1,
            serves_attempted: self.serves_attempted,
            successful_serves: self.successful_serves,
            aces: self.aces,
            attacks_attempted: self.attacks_attempted,
            successful_attacks: self.successful_attacks,
            blocks_attempted: self.blocks_attempted,
            successful_blocks: self.successful_blocks,
            receptions_attempted: self.receptions_attempted,
            successful_receptions: self.successful_receptions,
            digs: self.digs,
        }
    }
}

impl Schema for PlayerMatchStatsPayload {
    const REQUIRED: &'static [&'static str] = &["playerId", "matchId"];

    fn refine(&self, issues: &mut Vec<FieldIssue>) {
        let pairs = [
            ("successfulServes", self.successful_serves, self.serves_attempted, "serves"),
            ("successfulAttacks", self.successful_attacks, self.attacks_attempted, "attacks"),
            ("successfulBlocks", self.successful_blocks, self.blocks_attempted, "blocks"),
            (
                "successfulReceptions",
                self.successful_receptions,
                self.receptions_attempted,
                "receptions",
            ),
        ];
        for (path, successful, attempted, what) in pairs {
            if successful > attempted {
                issues.push(FieldIssue::new(
                    path,
                    format!("Successful {} cannot exceed attempted {}", what, what),
                ));
            }
        }
        if self.aces > self.successful_serves {
            issues.push(FieldIssue::new(
                "aces",
                "Aces cannot exceed successful serves",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Utc};
    use serde_json::json;

    use super::*;
    use crate::{check, parse};

    fn adult_birth_date() -> String {
        let year = Utc::now().date_naive().year() - 25;
        format!("{}-01-15", year)
    }

    #[test]
    fn test_update_player_accepts_empty_object() {
        let payload: UpdatePlayerPayload = parse(&json!({})).unwrap();
        assert_eq!(payload, UpdatePlayerPayload::default());
    }

    #[test]
    fn test_create_player_rejects_empty_object() {
        let err = parse::<CreatePlayerPayload>(&json!({})).unwrap_err();
        assert!(err.has_issue_at("fullName"));
        assert!(err.has_issue_at("dateOfBirth"));
        assert!(err.has_issue_at("positions"));
    }

    #[test]
    fn test_create_player() {
        let team_id = TeamId::new();
        let payload: CreatePlayerPayload = parse(&json!({
            "fullName": "Tran Thi Binh",
            "dateOfBirth": adult_birth_date(),
            "height": 178.5,
            "weight": 66,
            "jerseyNumber": 7,
            "positions": ["OUTSIDE_HITTER", "OPPOSITE_HITTER"],
            "teamId": team_id,
            "isCaptain": true,
        }))
        .unwrap();
        assert_eq!(payload.skill_level, SkillLevel::Beginner);
        assert_eq!(payload.status, PlayerStatus::Active);
        assert_eq!(payload.team_id, Some(team_id));
        assert!(!payload.is_vice_captain);
    }

    #[test]
    fn test_create_player_field_ranges() {
        let err = parse::<CreatePlayerPayload>(&json!({
            "fullName": "Tran Thi Binh",
            "dateOfBirth": "2020-01-01",
            "height": 230,
            "weight": 30,
            "jerseyNumber": 0,
            "positions": [],
        }))
        .unwrap_err();
        assert_eq!(
            err.messages_at("height"),
            vec!["Height must be between 140 and 220 cm"]
        );
        assert!(err.has_issue_at("weight"));
        assert!(err.has_issue_at("jerseyNumber"));
        assert!(err.has_issue_at("positions"));
        assert_eq!(
            err.messages_at("dateOfBirth"),
            vec!["Player must be between 16 and 45 years old"]
        );
    }

    #[test]
    fn test_captaincy_is_exclusive() {
        let err = parse::<CreatePlayerPayload>(&json!({
            "fullName": "Le Van Cuong",
            "dateOfBirth": adult_birth_date(),
            "positions": ["SETTER", "SETTER"],
            "jerseyNumber": 3,
            "isCaptain": true,
            "isViceCaptain": true,
        }))
        .unwrap_err();
        assert_eq!(
            err.messages_at("isViceCaptain"),
            vec!["A player cannot be both captain and vice-captain"]
        );
        assert!(err.has_issue_at("positions"));

        let update = UpdatePlayerPayload {
            is_captain: Some(true),
            is_vice_captain: Some(true),
            ..Default::default()
        };
        assert!(check(&update).unwrap_err().has_issue_at("isViceCaptain"));

        let update = UpdatePlayerPayload {
            is_captain: Some(true),
            ..Default::default()
        };
        assert!(check(&update).is_ok());
    }

    #[test]
    fn test_match_stats_refinements() {
        let stats = PlayerMatchStatsPayload {
            player_id: PlayerId::new(),
            match_id: MatchId::new(),
            serves_attempted: 10,
            successful_serves: 12,
            aces: 13,
            attacks_attempted: 20,
            successful_attacks: 21,
            blocks_attempted: 4,
            successful_blocks: 2,
            receptions_attempted: 0,
            successful_receptions: 0,
            digs: 8,
        };
        let err = check(&stats).unwrap_err();
        assert_eq!(
            err.messages_at("successfulServes"),
            vec!["Successful serves cannot exceed attempted serves"]
        );
        assert!(err.has_issue_at("successfulAttacks"));
        assert!(err.has_issue_at("aces"));
        assert!(!err.has_issue_at("successfulBlocks"));

        let ok = PlayerMatchStatsPayload {
            successful_serves: 9,
            aces: 2,
            successful_attacks: 11,
            ..stats
        };
        assert!(check(&ok).is_ok());
        let line = ok.to_stat_line();
        assert_eq!(line.matches_played, 1);
        assert_eq!(line.successful_attacks, 11);
    }

    #[test]
    fn test_match_stats_counter_limits() {
        let maxed: PlayerMatchStatsPayload = parse(&json!({
            "playerId": PlayerId::new(),
            "matchId": MatchId::new(),
            "servesAttempted": u32::MAX,
            "successfulServes": u32::MAX,
            "aces": u32::MAX,
            "digs": u32::MAX,
        }))
        .unwrap();
        assert_eq!(maxed.to_stat_line().aces, u32::MAX);

        let err = parse::<PlayerMatchStatsPayload>(&json!({
            "playerId": PlayerId::new(),
            "matchId": MatchId::new(),
            "successfulAttacks": u32::MAX,
            "aces": u32::MAX,
        }))
        .unwrap_err();
        assert!(err.has_issue_at("successfulAttacks"));
        assert!(err.has_issue_at("aces"));

        let err = parse::<PlayerMatchStatsPayload>(&json!({
            "playerId": PlayerId::new(),
            "matchId": MatchId::new(),
            "digs": u64::from(u32::MAX) + 1,
        }))
        .unwrap_err();
        assert!(err.has_issue_at(""));
    }
}
