use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    MAX_HEIGHT_CM, MAX_JERSEY_NUMBER, MAX_PLAYER_AGE, MAX_SETS_PER_MATCH, MAX_TEAM_SIZE,
    MAX_WEIGHT_KG, MIN_HEIGHT_CM, MIN_JERSEY_NUMBER, MIN_PLAYER_AGE, MIN_TEAM_SIZE,
    MIN_WEIGHT_KG, PlayerId, SETS_TO_WIN_MATCH,
};

pub static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10,11}$").expect("phone pattern compiles"));

pub const REGISTRATION_ORDER_ERROR: &str =
    "Registration end date must be after registration start date";
pub const TOURNAMENT_ORDER_ERROR: &str = "Tournament end date must be after tournament start date";
pub const REGISTRATION_BEFORE_START_ERROR: &str =
    "Registration must close before the tournament starts";

/// Outcome of a check that reports every violated rule at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Length is counted in characters, not bytes.
pub fn is_valid_password(password: &str, min: usize, max: usize) -> bool {
    let len = password.chars().count();
    len >= min && len <= max
}

pub fn is_valid_full_name(name: &str) -> bool {
    let len = name.trim().chars().count();
    (2..=100).contains(&len)
}

/// Age in whole years at `reference` (today in UTC when `None`).
pub fn calculate_age(birth_date: NaiveDate, reference: Option<NaiveDate>) -> i32 {
    let reference = reference.unwrap_or_else(|| Utc::now().date_naive());
    let mut age = reference.year() - birth_date.year();
    if (reference.month(), reference.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

pub fn is_valid_player_age(birth_date: NaiveDate, reference: Option<NaiveDate>) -> bool {
    let age = calculate_age(birth_date, reference);
    (MIN_PLAYER_AGE..=MAX_PLAYER_AGE).contains(&age)
}

pub fn is_valid_height(height_cm: f64) -> bool {
    (MIN_HEIGHT_CM..=MAX_HEIGHT_CM).contains(&height_cm)
}

pub fn is_valid_weight(weight_kg: f64) -> bool {
    (MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&weight_kg)
}

pub fn is_valid_jersey_number(number: u8) -> bool {
    (MIN_JERSEY_NUMBER..=MAX_JERSEY_NUMBER).contains(&number)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JerseyAssignment {
    pub player_id: PlayerId,
    pub jersey_number: u8,
}

/// Checks that `number` is in range and not worn by anyone else on the roster.
/// The assignment held by `current_player` itself is ignored so a player can
/// keep their own number on update.
pub fn is_jersey_number_available(
    number: u8,
    roster: &[JerseyAssignment],
    current_player: Option<PlayerId>,
) -> bool {
    if !is_valid_jersey_number(number) {
        return false;
    }
    !roster
        .iter()
        .any(|a| a.jersey_number == number && Some(a.player_id) != current_player)
}

pub fn is_valid_team_size(member_count: usize) -> bool {
    (MIN_TEAM_SIZE..=MAX_TEAM_SIZE).contains(&member_count)
}

/// End must be strictly after start.
pub fn is_valid_date_range<T: PartialOrd>(start: &T, end: &T) -> bool {
    end > start
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TournamentDates {
    pub registration_start: Option<NaiveDate>,
    pub registration_end: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Rules whose dates are both present are evaluated; all failures are returned
/// in a fixed order.
pub fn validate_tournament_dates(dates: &TournamentDates) -> ValidationResult {
    let mut errors = Vec::new();

    if let (Some(start), Some(end)) = (dates.registration_start, dates.registration_end) {
        if !is_valid_date_range(&start, &end) {
            errors.push(REGISTRATION_ORDER_ERROR.to_string());
        }
    }
    if let (Some(start), Some(end)) = (dates.start_date, dates.end_date) {
        if !is_valid_date_range(&start, &end) {
            errors.push(TOURNAMENT_ORDER_ERROR.to_string());
        }
    }
    if let (Some(registration_end), Some(start)) = (dates.registration_end, dates.start_date) {
        if registration_end >= start {
            errors.push(REGISTRATION_BEFORE_START_ERROR.to_string());
        }
    }

    ValidationResult::from_errors(errors)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetKind {
    Regular,
    Deciding,
}

impl SetKind {
    /// Set numbers are 1-based; the fifth set of a best-of-five is deciding.
    pub fn for_set(set_number: u8) -> Self {
        if set_number >= MAX_SETS_PER_MATCH {
            SetKind::Deciding
        } else {
            SetKind::Regular
        }
    }

    pub fn target_points(&self) -> u16 {
        match self {
            SetKind::Regular => 25,
            SetKind::Deciding => 15,
        }
    }
}

pub fn is_valid_set_score(score_a: u16, score_b: u16, kind: SetKind) -> bool {
    let winner = score_a.max(score_b);
    let loser = score_a.min(score_b);
    winner - loser >= 2 && winner >= kind.target_points()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSide {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetScore {
    pub home: u16,
    pub away: u16,
}

impl SetScore {
    pub fn new(home: u16, away: u16) -> Self {
        Self { home, away }
    }

    pub fn winner(&self) -> Option<MatchSide> {
        if self.home > self.away {
            Some(MatchSide::Home)
        } else if self.away > self.home {
            Some(MatchSide::Away)
        } else {
            None
        }
    }
}

/// Checks a best-of-five result: every set legal for its position, the match
/// decided, and no set played after a side reached three sets.
pub fn validate_match_sets(sets: &[SetScore]) -> ValidationResult {
    let mut errors = Vec::new();

    if sets.is_empty() {
        errors.push("A match result needs at least one set".to_string());
        return ValidationResult::from_errors(errors);
    }
    if sets.len() > MAX_SETS_PER_MATCH as usize {
        errors.push(format!(
            "A match has at most {} sets, got {}",
            MAX_SETS_PER_MATCH,
            sets.len()
        ));
    }

    let (mut home_sets, mut away_sets) = (0u8, 0u8);
    let mut decided_at = None;
    for (index, set) in sets.iter().enumerate() {
        let set_number = index + 1;
        let kind = SetKind::for_set(u8::try_from(set_number).unwrap_or(u8::MAX));
        if !is_valid_set_score(set.home, set.away, kind) {
            errors.push(format!(
                "Set {} score {}-{} is not a valid final score",
                set_number, set.home, set.away
            ));
            continue;
        }
        if decided_at.is_some() {
            continue;
        }
        match set.winner() {
            Some(MatchSide::Home) => home_sets += 1,
            Some(MatchSide::Away) => away_sets += 1,
            None => {}
        }
        if home_sets == SETS_TO_WIN_MATCH || away_sets == SETS_TO_WIN_MATCH {
            decided_at = Some(set_number);
        }
    }

    match decided_at {
        Some(n) if n < sets.len() => {
            errors.push(format!("Match was already decided after set {}", n));
        }
        None if errors.is_empty() => {
            errors.push("Match is not decided: no side won three sets".to_string());
        }
        _ => {}
    }

    ValidationResult::from_errors(errors)
}
