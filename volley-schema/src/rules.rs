use std::borrow::Cow;

use chrono::NaiveDate;
use validator::ValidationError;
use volley_core::{
    MAX_PASSWORD_LENGTH, MAX_PLAYER_AGE, MIN_PASSWORD_LENGTH, MIN_PLAYER_AGE, validation,
};

fn fail(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

pub(crate) fn valid_email(value: &str) -> Result<(), ValidationError> {
    if validation::is_valid_email(value) {
        Ok(())
    } else {
        Err(fail("email", "Invalid email address"))
    }
}

pub(crate) fn valid_phone(value: &str) -> Result<(), ValidationError> {
    if validation::is_valid_phone(value) {
        Ok(())
    } else {
        Err(fail("phone", "Phone number must be 10 or 11 digits"))
    }
}

pub(crate) fn valid_password(value: &str) -> Result<(), ValidationError> {
    if validation::is_valid_password(value, MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH) {
        Ok(())
    } else {
        Err(fail(
            "password",
            format!(
                "Password must be between {} and {} characters",
                MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
            ),
        ))
    }
}

pub(crate) fn valid_full_name(value: &str) -> Result<(), ValidationError> {
    if validation::is_valid_full_name(value) {
        Ok(())
    } else {
        Err(fail("full_name", "Name must be between 2 and 100 characters"))
    }
}

pub(crate) fn valid_player_age(value: &NaiveDate) -> Result<(), ValidationError> {
    if validation::is_valid_player_age(*value, None) {
        Ok(())
    } else {
        Err(fail(
            "player_age",
            format!(
                "Player must be between {} and {} years old",
                MIN_PLAYER_AGE, MAX_PLAYER_AGE
            ),
        ))
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(fail("required", "Must not be blank"))
    } else {
        Ok(())
    }
}
