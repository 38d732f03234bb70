use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use log::error;
use volley_core::TournamentId;

use crate::commands::{CommandError, Credentials, PayloadKind};

mod commands;
mod logs;

#[derive(Parser)]
#[command(name = "volley-admin")]
#[command(about = "Volleyball club administration tools", long_about = None)]
struct Cli {
    /// Print debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a JSON payload file against a schema
    Validate {
        #[arg(value_enum)]
        kind: PayloadKind,
        file: PathBuf,
    },

    /// Rank teams from a JSON array of team stats
    Standings {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Aggregate a JSON array of per-match player stats
    PlayerReport { file: PathBuf },

    /// Fetch team stats from the club API and rank them
    RemoteStandings {
        #[arg(long, env = "VOLLEY_ADMIN_EMAIL")]
        email: String,
        #[arg(long, env = "VOLLEY_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
        /// Restrict to one tournament
        #[arg(long)]
        tournament: Option<uuid::Uuid>,
        #[arg(long)]
        json: bool,
    },
}

async fn run(command: Commands) -> Result<bool, CommandError> {
    match command {
        Commands::Validate { kind, file } => commands::validate_file(kind, &file),
        Commands::Standings { file, json } => commands::standings_file(&file, json).map(|_| true),
        Commands::PlayerReport { file } => commands::player_report_file(&file).map(|_| true),
        Commands::RemoteStandings {
            email,
            password,
            tournament,
            json,
        } => commands::remote_standings(
            Credentials { email, password },
            tournament.map(TournamentId),
            json,
        )
        .await
        .map(|_| true),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = logs::init_logger(cli.verbose) {
        eprintln!("Failed to initialize logger: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(2)
        }
    }
}
