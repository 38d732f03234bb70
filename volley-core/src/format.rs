use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::{
    ApplicationStatus, MatchStatus, PlayerPosition, PlayerStatus, SkillLevel, TournamentStatus,
    UserRole,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePattern {
    /// `dd/MM/yyyy`
    Date,
    /// `dd/MM/yyyy HH:mm`
    DateTime,
    /// `HH:mm`
    Time,
    /// `yyyy-MM-dd`
    Iso,
}

impl DatePattern {
    fn chrono_format(&self) -> &'static str {
        match self {
            DatePattern::Date => "%d/%m/%Y",
            DatePattern::DateTime => "%d/%m/%Y %H:%M",
            DatePattern::Time => "%H:%M",
            DatePattern::Iso => "%Y-%m-%d",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    En,
    #[default]
    Vi,
}

impl Locale {
    fn separators(&self) -> (char, char) {
        match self {
            Locale::En => (',', '.'),
            Locale::Vi => ('.', ','),
        }
    }
}

pub fn format_datetime(value: &DateTime<Utc>, pattern: DatePattern) -> String {
    value.format(pattern.chrono_format()).to_string()
}

pub fn format_naive_date(value: NaiveDate, pattern: DatePattern) -> String {
    value
        .and_time(NaiveTime::MIN)
        .format(pattern.chrono_format())
        .to_string()
}

const DATETIME_INPUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M",
];

const DATE_INPUTS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Accepts RFC 3339, ISO dates and date-times, and the display patterns.
/// Values without an offset are read as UTC.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_INPUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in DATE_INPUTS {
        if let Ok(date) = NaiveDate::parse_from_str(input, fmt) {
            return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }
    }
    None
}

/// Formats a date string; anything unparseable becomes an empty string.
pub fn format_date_str(input: &str, pattern: DatePattern) -> String {
    parse_date(input)
        .map(|dt| format_datetime(&dt, pattern))
        .unwrap_or_default()
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

pub fn format_relative_time(value: &DateTime<Utc>, now: Option<DateTime<Utc>>) -> String {
    let now = now.unwrap_or_else(Utc::now);
    let elapsed = now.signed_duration_since(*value);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return plural(hours, "hour");
    }
    let days = elapsed.num_days();
    if days < 7 {
        return plural(days, "day");
    }
    format_datetime(value, DatePattern::Date)
}

pub fn format_full_name(first_name: &str, last_name: &str) -> String {
    [first_name.trim(), last_name.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First letter of the first and last words, uppercased.
pub fn initials(full_name: &str) -> String {
    let words: Vec<&str> = full_name.split_whitespace().collect();
    let pick = |word: Option<&&str>| {
        word.and_then(|w| w.chars().next())
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_default()
    };
    match words.len() {
        0 => String::new(),
        1 => pick(words.first()),
        _ => format!("{}{}", pick(words.first()), pick(words.last())),
    }
}

/// Groups 10-digit numbers 4-3-3 and 11-digit numbers 4-3-4; anything else is
/// returned unchanged.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 | 11 => format!("{} {} {}", &digits[..4], &digits[4..7], &digits[7..]),
        _ => phone.to_string(),
    }
}

fn group_thousands(integer_digits: &str, separator: char) -> String {
    let len = integer_digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in integer_digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

pub fn format_number(value: f64, decimals: usize, locale: Locale) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let (group_sep, decimal_sep) = locale.separators();
    let fixed = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let mut out = String::new();
    if value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        out.push('-');
    }
    out.push_str(&group_thousands(integer, group_sep));
    if let Some(fraction) = fraction {
        out.push(decimal_sep);
        out.push_str(fraction);
    }
    out
}

/// Vietnamese đồng, no minor units.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return String::new();
    }
    format!("{} ₫", format_number(amount.round(), 0, Locale::Vi))
}

pub fn format_percentage(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return String::new();
    }
    format!("{:.*}%", decimals, value)
}

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

fn trim_decimal(value: f64) -> String {
    let rounded = format!("{:.1}", value);
    if let Some(whole) = rounded.strip_suffix(".0") {
        return whole.to_string();
    }
    rounded
}

pub fn format_height(height_cm: f64) -> String {
    format!("{} cm", trim_decimal(height_cm))
}

pub fn format_weight(weight_kg: f64) -> String {
    format!("{} kg", trim_decimal(weight_kg))
}

pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{}...", kept.trim_end())
}

impl UserRole {
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "Super Admin",
            UserRole::Admin => "Administrator",
            UserRole::Coach => "Coach",
            UserRole::AssistantCoach => "Assistant Coach",
            UserRole::Player => "Player",
            UserRole::Member => "Member",
        }
    }
}

impl PlayerPosition {
    pub fn label(&self) -> &'static str {
        match self {
            PlayerPosition::Setter => "Setter",
            PlayerPosition::OutsideHitter => "Outside Hitter",
            PlayerPosition::OppositeHitter => "Opposite Hitter",
            PlayerPosition::MiddleBlocker => "Middle Blocker",
            PlayerPosition::Libero => "Libero",
            PlayerPosition::DefensiveSpecialist => "Defensive Specialist",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            PlayerPosition::Setter => "S",
            PlayerPosition::OutsideHitter => "OH",
            PlayerPosition::OppositeHitter => "OPP",
            PlayerPosition::MiddleBlocker => "MB",
            PlayerPosition::Libero => "L",
            PlayerPosition::DefensiveSpecialist => "DS",
        }
    }
}

impl SkillLevel {
    pub fn label(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
            SkillLevel::Professional => "Professional",
        }
    }
}

impl PlayerStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PlayerStatus::Active => "Active",
            PlayerStatus::Injured => "Injured",
            PlayerStatus::Suspended => "Suspended",
            PlayerStatus::Retired => "Retired",
            PlayerStatus::Inactive => "Inactive",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            PlayerStatus::Active => "green",
            PlayerStatus::Injured => "orange",
            PlayerStatus::Suspended => "red",
            PlayerStatus::Retired => "gray",
            PlayerStatus::Inactive => "default",
        }
    }
}

impl ApplicationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "orange",
            ApplicationStatus::Approved => "green",
            ApplicationStatus::Rejected => "red",
        }
    }
}

impl TournamentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "Upcoming",
            TournamentStatus::RegistrationOpen => "Registration Open",
            TournamentStatus::Ongoing => "Ongoing",
            TournamentStatus::Completed => "Completed",
            TournamentStatus::Cancelled => "Cancelled",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "blue",
            TournamentStatus::RegistrationOpen => "cyan",
            TournamentStatus::Ongoing => "green",
            TournamentStatus::Completed => "gray",
            TournamentStatus::Cancelled => "red",
        }
    }
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "Scheduled",
            MatchStatus::InProgress => "In Progress",
            MatchStatus::Completed => "Completed",
            MatchStatus::Cancelled => "Cancelled",
            MatchStatus::Postponed => "Postponed",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "blue",
            MatchStatus::InProgress => "green",
            MatchStatus::Completed => "gray",
            MatchStatus::Cancelled => "red",
            MatchStatus::Postponed => "orange",
        }
    }
}

fn label_or_raw<E: std::str::FromStr>(raw: &str, label: impl Fn(E) -> &'static str) -> String {
    raw.parse::<E>()
        .map(|v| label(v).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn role_label(raw: &str) -> String {
    label_or_raw(raw, |r: UserRole| r.label())
}

pub fn position_label(raw: &str) -> String {
    label_or_raw(raw, |p: PlayerPosition| p.label())
}

pub fn skill_level_label(raw: &str) -> String {
    label_or_raw(raw, |s: SkillLevel| s.label())
}

pub fn player_status_label(raw: &str) -> String {
    label_or_raw(raw, |s: PlayerStatus| s.label())
}

pub fn application_status_label(raw: &str) -> String {
    label_or_raw(raw, |s: ApplicationStatus| s.label())
}

pub fn tournament_status_label(raw: &str) -> String {
    label_or_raw(raw, |s: TournamentStatus| s.label())
}

pub fn match_status_label(raw: &str) -> String {
    label_or_raw(raw, |s: MatchStatus| s.label())
}

const FALLBACK_COLOR: &str = "default";

/// Color tag for any known player, application, tournament or match status key.
pub fn status_color(raw: &str) -> &'static str {
    if let Ok(s) = raw.parse::<PlayerStatus>() {
        return s.color();
    }
    if let Ok(s) = raw.parse::<ApplicationStatus>() {
        return s.color();
    }
    if let Ok(s) = raw.parse::<TournamentStatus>() {
        return s.color();
    }
    if let Ok(s) = raw.parse::<MatchStatus>() {
        return s.color();
    }
    FALLBACK_COLOR
}
