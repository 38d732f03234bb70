use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;
use volley_core::{
    DivisionId, TournamentStatus,
    validation::{
        REGISTRATION_BEFORE_START_ERROR, REGISTRATION_ORDER_ERROR, TOURNAMENT_ORDER_ERROR,
        TournamentDates, validate_tournament_dates,
    },
};

use crate::{FieldIssue, Schema};

fn default_status() -> TournamentStatus {
    TournamentStatus::Upcoming
}

fn date_issue_path(message: &str) -> &'static str {
    match message {
        REGISTRATION_ORDER_ERROR => "registrationEnd",
        TOURNAMENT_ORDER_ERROR => "endDate",
        REGISTRATION_BEFORE_START_ERROR => "startDate",
        _ => "",
    }
}

fn date_issues(dates: &TournamentDates, issues: &mut Vec<FieldIssue>) {
    for message in validate_tournament_dates(dates).errors {
        issues.push(FieldIssue::new(date_issue_path(&message), message));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentPayload {
    #[validate(length(min = 3, max = 200, message = "Tournament name must be between 3 and 200 characters"))]
    pub name: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 255, message = "Location must be at most 255 characters"))]
    pub location: Option<String>,
    pub registration_start: Option<NaiveDate>,
    pub registration_end: Option<NaiveDate>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(range(min = 2, max = 64, message = "A tournament takes between 2 and 64 teams"))]
    pub max_teams: Option<u32>,
    #[validate(range(min = 0.0, message = "Entry fee cannot be negative"))]
    pub entry_fee: Option<f64>,
    pub division_id: Option<DivisionId>,
    #[serde(default = "default_status")]
    pub status: TournamentStatus,
}

impl CreateTournamentPayload {
    pub fn dates(&self) -> TournamentDates {
        TournamentDates {
            registration_start: self.registration_start,
            registration_end: self.registration_end,
            start_date: Some(self.start_date),
            end_date: Some(self.end_date),
        }
    }
}

impl Schema for CreateTournamentPayload {
    const REQUIRED: &'static [&'static str] = &["name", "startDate", "endDate"];

    fn refine(&self, issues: &mut Vec<FieldIssue>) {
        date_issues(&self.dates(), issues);
    }
}

/// Partial update. Date rules apply to whichever pairs are supplied together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTournamentPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 200, message = "Tournament name must be between 3 and 200 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255, message = "Location must be at most 255 characters"))]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_end: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 2, max = 64, message = "A tournament takes between 2 and 64 teams"))]
    pub max_teams: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Entry fee cannot be negative"))]
    pub entry_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division_id: Option<DivisionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TournamentStatus>,
}

impl Schema for UpdateTournamentPayload {
    fn refine(&self, issues: &mut Vec<FieldIssue>) {
        let dates = TournamentDates {
            registration_start: self.registration_start,
            registration_end: self.registration_end,
            start_date: self.start_date,
            end_date: self.end_date,
        };
        date_issues(&dates, issues);
    }
}
