use std::{fmt::Write as _, fs, path::Path};

use clap::ValueEnum;
use log::{debug, info};
use serde_json::Value;
use thiserror::Error;
use volley_client::{ClientConfig, ClientError, ConfigError, Session};
use volley_core::{
    TournamentId,
    format::{Locale, format_number, format_percentage, truncate_text},
    stats::{
        PlayerStatLine, RankedTeam, TeamRecord, player_performance, rank_teams, team_performance,
    },
};
use volley_schema::{
    FieldIssue, Schema, SchemaError, application, match_result, parse, player, team, tournament,
    user,
};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("{path} is not valid JSON: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("{0}")]
    Schema(#[from] SchemaError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Client(#[from] ClientError),
    #[error("cannot encode output: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PayloadKind {
    UserCreate,
    UserUpdate,
    Login,
    ChangePassword,
    ProfileUpdate,
    PlayerCreate,
    PlayerUpdate,
    PlayerMatchStats,
    TeamCreate,
    TeamUpdate,
    TeamStats,
    TournamentCreate,
    TournamentUpdate,
    ApplicationCreate,
    ApplicationReview,
    MatchCreate,
    MatchResult,
}

fn accepts<S: Schema>(value: &Value) -> Result<(), SchemaError> {
    parse::<S>(value).map(|_| ())
}

pub fn validate_value(kind: PayloadKind, value: &Value) -> Result<(), SchemaError> {
    match kind {
        PayloadKind::UserCreate => accepts::<user::CreateUserPayload>(value),
        PayloadKind::UserUpdate => accepts::<user::UpdateUserPayload>(value),
        PayloadKind::Login => accepts::<user::LoginPayload>(value),
        PayloadKind::ChangePassword => accepts::<user::ChangePasswordPayload>(value),
        PayloadKind::ProfileUpdate => accepts::<user::UpdateProfilePayload>(value),
        PayloadKind::PlayerCreate => accepts::<player::CreatePlayerPayload>(value),
        PayloadKind::PlayerUpdate => accepts::<player::UpdatePlayerPayload>(value),
        PayloadKind::PlayerMatchStats => accepts::<player::PlayerMatchStatsPayload>(value),
        PayloadKind::TeamCreate => accepts::<team::CreateTeamPayload>(value),
        PayloadKind::TeamUpdate => accepts::<team::UpdateTeamPayload>(value),
        PayloadKind::TeamStats => accepts::<team::TeamStatsPayload>(value),
        PayloadKind::TournamentCreate => accepts::<tournament::CreateTournamentPayload>(value),
        PayloadKind::TournamentUpdate => accepts::<tournament::UpdateTournamentPayload>(value),
        PayloadKind::ApplicationCreate => {
            accepts::<application::CreateApplicationPayload>(value)
        }
        PayloadKind::ApplicationReview => {
            accepts::<application::ReviewApplicationPayload>(value)
        }
        PayloadKind::MatchCreate => accepts::<match_result::CreateMatchPayload>(value),
        PayloadKind::MatchResult => accepts::<match_result::RecordMatchResultPayload>(value),
    }
}

fn read_json(path: &Path) -> Result<Value, CommandError> {
    let display = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|source| CommandError::Read {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CommandError::Json {
        path: display,
        source,
    })
}

/// Parses every element of a JSON array, reporting issues as `[index].path`.
fn parse_all<S: Schema>(value: &Value) -> Result<Vec<S>, SchemaError> {
    let Some(items) = value.as_array() else {
        return SchemaError::at("", "Expected a JSON array");
    };
    let mut parsed = Vec::with_capacity(items.len());
    let mut issues = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match parse::<S>(item) {
            Ok(payload) => parsed.push(payload),
            Err(err) => issues.extend(err.issues.into_iter().map(|issue| {
                let path = if issue.path.is_empty() {
                    format!("[{}]", index)
                } else {
                    format!("[{}].{}", index, issue.path)
                };
                FieldIssue::new(path, issue.message)
            })),
        }
    }
    if issues.is_empty() {
        Ok(parsed)
    } else {
        Err(SchemaError::new(issues))
    }
}

/// Returns whether the payload is valid; issues are printed one per line.
pub fn validate_file(kind: PayloadKind, path: &Path) -> Result<bool, CommandError> {
    let value = read_json(path)?;
    match validate_value(kind, &value) {
        Ok(()) => {
            println!("{}: valid {:?} payload", path.display(), kind);
            Ok(true)
        }
        Err(err) => {
            println!("{}: {} issue(s)", path.display(), err.issues.len());
            for issue in &err.issues {
                let field = if issue.path.is_empty() {
                    "(payload)"
                } else {
                    &issue.path
                };
                println!("  {}: {}", field, issue.message);
            }
            Ok(false)
        }
    }
}

pub fn render_standings(standings: &[RankedTeam]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<24} {:>3} {:>3} {:>3} {:>8} {:>5} {:>6}",
        "#", "Team", "MP", "W", "L", "Win %", "Pts", "Diff"
    );
    for entry in standings {
        let record = &entry.record;
        let performance = team_performance(record);
        let _ = writeln!(
            out,
            "{:>4}  {:<24} {:>3} {:>3} {:>3} {:>8} {:>5} {:>+6}",
            entry.rank,
            truncate_text(&record.name, 24),
            record.matches_played,
            record.wins,
            record.losses,
            format_percentage(performance.win_rate, 1),
            entry.ranking_points,
            entry.point_differential,
        );
    }
    out
}

fn load_team_records(path: &Path) -> Result<Vec<TeamRecord>, CommandError> {
    let value = read_json(path)?;
    let stats = parse_all::<team::TeamStatsPayload>(&value)?;
    Ok(stats.iter().map(|s| s.to_record()).collect())
}

pub fn standings_file(path: &Path, json: bool) -> Result<(), CommandError> {
    let records = load_team_records(path)?;
    debug!("Loaded {} team records from {}", records.len(), path.display());
    print_standings(&rank_teams(&records), json)
}

fn print_standings(standings: &[RankedTeam], json: bool) -> Result<(), CommandError> {
    if json {
        let out = serde_json::to_string_pretty(standings)?;
        println!("{}", out);
    } else {
        print!("{}", render_standings(standings));
    }
    Ok(())
}

pub fn render_player_report(line: &PlayerStatLine) -> String {
    let performance = player_performance(line);
    let rows = [
        ("Matches", line.matches_played.to_string()),
        ("Serve", format_percentage(performance.serve_percentage, 1)),
        ("Attack", format_percentage(performance.attack_percentage, 1)),
        ("Block", format_percentage(performance.block_percentage, 1)),
        ("Reception", format_percentage(performance.reception_percentage, 1)),
        ("Aces / match", format_number(performance.aces_per_match, 2, Locale::En)),
        ("Digs / match", format_number(performance.digs_per_match, 2, Locale::En)),
        ("Points / match", format_number(performance.points_per_match, 2, Locale::En)),
        ("Total points", performance.total_points.to_string()),
    ];
    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{:<16}{:>10}", label, value);
    }
    out
}

/// Sums per-match stat lines from a JSON array and prints the aggregate.
pub fn player_report_file(path: &Path) -> Result<(), CommandError> {
    let value = read_json(path)?;
    let matches = parse_all::<player::PlayerMatchStatsPayload>(&value)?;
    let lines: Vec<PlayerStatLine> = matches.iter().map(|m| m.to_stat_line()).collect();
    let total: PlayerStatLine = lines.iter().sum();
    print!("{}", render_player_report(&total));
    Ok(())
}

pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub async fn remote_standings(
    credentials: Credentials,
    tournament: Option<TournamentId>,
    json: bool,
) -> Result<(), CommandError> {
    let config = ClientConfig::from_env()?;
    info!("Fetching standings from {}", config.base_url);
    let client = volley_client::connect(&config, Session::default())?;
    client
        .login(&user::LoginPayload {
            email: credentials.email,
            password: credentials.password,
        })
        .await?;
    let standings = client.team_standings(tournament).await?;
    client.logout().await;
    print_standings(&standings, json)
}
