use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;
use volley_core::UserRole;

use crate::{
    FieldIssue, Schema,
    rules::{not_blank, valid_email, valid_full_name, valid_password, valid_phone},
};

fn default_role() -> UserRole {
    UserRole::Member
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(custom(function = "valid_email"))]
    pub email: String,
    #[validate(custom(function = "valid_password"))]
    pub password: String,
    #[validate(custom(function = "valid_full_name"))]
    pub full_name: String,
    #[validate(custom(function = "valid_phone"))]
    pub phone: Option<String>,
    #[serde(default = "default_role")]
    pub role: UserRole,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Schema for CreateUserPayload {
    const REQUIRED: &'static [&'static str] = &["email", "password", "fullName"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "valid_email"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "valid_full_name"))]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "valid_phone"))]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Schema for UpdateUserPayload {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(custom(function = "valid_email"))]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

impl Schema for LoginPayload {
    const REQUIRED: &'static [&'static str] = &["email", "password"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    #[validate(custom(function = "not_blank"))]
    pub current_password: String,
    #[validate(custom(function = "valid_password"))]
    pub new_password: String,
    pub confirm_password: String,
}

impl Schema for ChangePasswordPayload {
    const REQUIRED: &'static [&'static str] =
        &["currentPassword", "newPassword", "confirmPassword"];

    fn refine(&self, issues: &mut Vec<FieldIssue>) {
        if self.confirm_password != self.new_password {
            issues.push(FieldIssue::new("confirmPassword", "Passwords do not match"));
        }
        if self.new_password == self.current_password {
            issues.push(FieldIssue::new(
                "newPassword",
                "New password must differ from the current password",
            ));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "valid_full_name"))]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "valid_phone"))]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255, message = "Address must be at most 255 characters"))]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Avatar URL must be at most 500 characters"))]
    pub avatar_url: Option<String>,
}

impl Schema for UpdateProfilePayload {
    fn refine(&self, issues: &mut Vec<FieldIssue>) {
        if let Some(dob) = self.date_of_birth {
            if dob >= chrono::Utc::now().date_naive() {
                issues.push(FieldIssue::new(
                    "dateOfBirth",
                    "Date of birth must be in the past",
                ));
            }
        }
    }
}
