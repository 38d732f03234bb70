use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;
use volley_core::{ApplicationStatus, Gender, PlayerPosition, SkillLevel, TeamId};

use crate::{
    FieldIssue, Schema, SchemaError,
    rules::{not_blank, valid_email, valid_full_name, valid_phone, valid_player_age},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    #[validate(custom(function = "valid_full_name"))]
    pub name: String,
    #[validate(custom(function = "valid_phone"))]
    pub phone: String,
    #[validate(length(min = 2, max = 50, message = "Relationship must be between 2 and 50 characters"))]
    pub relationship: String,
}

/// A prospective member applying to join the club, optionally for a given team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationPayload {
    #[validate(custom(function = "valid_full_name"))]
    pub full_name: String,
    #[validate(custom(function = "valid_email"))]
    pub email: String,
    #[validate(custom(function = "valid_phone"))]
    pub phone: String,
    #[validate(custom(function = "valid_player_age"))]
    pub date_of_birth: NaiveDate,
    pub gender: Option<Gender>,
    #[validate(range(min = 140.0, max = 220.0, message = "Height must be between 140 and 220 cm"))]
    pub height: Option<f64>,
    #[validate(range(min = 40.0, max = 150.0, message = "Weight must be between 40 and 150 kg"))]
    pub weight: Option<f64>,
    pub desired_team_id: Option<TeamId>,
    #[validate(length(min = 1, message = "At least one position is required"))]
    pub preferred_positions: Vec<PlayerPosition>,
    pub skill_level: Option<SkillLevel>,
    #[validate(length(max = 1000, message = "Experience must be at most 1000 characters"))]
    pub experience: Option<String>,
    #[validate(nested)]
    pub emergency_contact: EmergencyContact,
}

impl Schema for CreateApplicationPayload {
    const REQUIRED: &'static [&'static str] = &[
        "fullName",
        "email",
        "phone",
        "dateOfBirth",
        "preferredPositions",
        "emergencyContact",
    ];

    fn refine(&self, issues: &mut Vec<FieldIssue>) {
        if self.emergency_contact.phone == self.phone {
            issues.push(FieldIssue::new(
                "emergencyContact.phone",
                "Emergency contact phone must differ from the applicant's phone",
            ));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewApplicationPayload {
    pub decision: ApplicationStatus,
    #[validate(length(max = 500, message = "Review note must be at most 500 characters"))]
    pub review_note: Option<String>,
}

impl ReviewApplicationPayload {
    pub fn approve() -> Self {
        Self {
            decision: ApplicationStatus::Approved,
            review_note: None,
        }
    }

    pub fn reject(note: impl Into<String>) -> Self {
        Self {
            decision: ApplicationStatus::Rejected,
            review_note: Some(note.into()),
        }
    }
}

impl Schema for ReviewApplicationPayload {
    const REQUIRED: &'static [&'static str] = &["decision"];

    fn refine(&self, issues: &mut Vec<FieldIssue>) {
        match self.decision {
            ApplicationStatus::Approved => {}
            ApplicationStatus::Rejected => {
                let blank = self
                    .review_note
                    .as_deref()
                    .is_none_or(|note| not_blank(note).is_err());
                if blank {
                    issues.push(FieldIssue::new(
                        "reviewNote",
                        "A rejection needs a review note",
                    ));
                }
            }
            ApplicationStatus::Pending => issues.push(FieldIssue::new(
                "decision",
                "Decision must be APPROVED or REJECTED",
            )),
        }
    }
}

/// Resolves the status an application moves to after a review.
pub fn apply_review(
    current: ApplicationStatus,
    review: &ReviewApplicationPayload,
) -> Result<ApplicationStatus, SchemaError> {
    crate::check(review)?;
    if !current.can_transition_to(review.decision) {
        return SchemaError::at(
            "decision",
            format!(
                "Application cannot move from {} to {}",
                current, review.decision
            ),
        );
    }
    Ok(review.decision)
}
