//! Arena CLI - LLM agents battle head to head
//!
//! # Usage
//!
//! ```bash
//! # Interactive menu (default)
//! arena
//!
//! # One battle, no prompts
//! arena battle claude grok --category code --difficulty hard
//!
//! # Full eight-agent knockout
//! arena tournament --category debate --report
//!
//! # Roster and models
//! arena agents
//!
//! # Read back an archived battle
//! arena fetch bafy...
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use arena_llm::{ArenaConfig, ProviderKind};

mod app;
mod commands;
mod console;
mod render;

use commands::{agents, battle, fetch, play, tournament};

/// Arena - streaming LLM battles with an LLM judge
#[derive(Parser)]
#[command(
    name = "arena",
    version,
    about = "Arena - LLM agents battle head to head",
    long_about = "Two agents answer the same prompt side by side while their replies stream in.\n\
                  A judge model scores both, ratings move by Elo, and battles can be\n\
                  archived to IPFS and recorded on a ledger."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Model provider: openrouter or mock (offline)
    #[arg(long, global = true, env = "ARENA_PROVIDER")]
    provider: Option<ProviderKind>,

    /// Judge and summary model
    #[arg(long, global = true, env = "ARENA_JUDGE_MODEL")]
    judge_model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu: battles, tournaments, leaderboard, history
    #[command(name = "play")]
    Play(play::PlayArgs),

    /// Run a single battle
    #[command(name = "battle")]
    Battle(battle::BattleArgs),

    /// Run an eight-agent tournament
    #[command(name = "tournament")]
    Tournament(tournament::TournamentArgs),

    /// List the roster
    #[command(name = "agents")]
    Agents(agents::AgentsArgs),

    /// Fetch an archived battle from IPFS
    #[command(name = "fetch")]
    Fetch(fetch::FetchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // a missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut config = ArenaConfig::from_env()?;
    if let Some(provider) = cli.provider {
        config.provider = provider;
    }
    if let Some(model) = cli.judge_model {
        config.judge_model = model;
    }

    match cli.command.unwrap_or(Commands::Play(play::PlayArgs::default())) {
        Commands::Play(args) => play::run(args, config).await,
        Commands::Battle(args) => battle::run(args, config).await,
        Commands::Tournament(args) => tournament::run(args, config).await,
        Commands::Agents(args) => agents::run(args),
        Commands::Fetch(args) => fetch::run(args, config).await,
    }
}

/// Setup logging based on verbosity level
fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stderr keeps log lines out of the side-by-side stream on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();
}

/// Print a success message with a checkmark
pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an error message with an X
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg);
}

/// Print an info message
pub fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}
