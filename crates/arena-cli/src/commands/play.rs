//! Play command - the interactive menu
//!
//! Usage:
//! ```bash
//! arena
//! arena play --summary
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;

use arena_core::{AgentName, Category, Difficulty};
use arena_llm::ArenaConfig;

use super::tournament::{play_out, DEFAULT_PAUSE_MS};
use super::{
    export_battle, export_tournament, fight, ledger_hint, open_arena, record_and_show,
    record_tournament, Display,
};
use crate::app::{Arena, REPORTS_DIR};
use crate::console::Console;
use crate::print_error;
use crate::render;

/// Arguments for the play command
#[derive(Args, Default)]
pub struct PlayArgs {
    /// Show short summaries instead of streaming live
    #[arg(long)]
    summary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Battle,
    Tournament,
    Leaderboard,
    History,
    VoteStats,
    Exit,
}

const MENU: [(&str, MenuAction); 6] = [
    ("⚔  Quick Battle", MenuAction::Battle),
    ("🏆 Tournament", MenuAction::Tournament),
    ("📊 Leaderboard", MenuAction::Leaderboard),
    ("📜 Battle History", MenuAction::History),
    ("🗳  Vote Stats", MenuAction::VoteStats),
    ("🚪 Exit", MenuAction::Exit),
];

/// Run the interactive menu until the user exits or input ends
pub async fn run(args: PlayArgs, config: ArenaConfig) -> Result<()> {
    render::title();
    render::key_status(&config.key_status());
    if config.pinata_jwt.is_none() {
        println!(
            "  {}\n",
            "Set PINATA_JWT in .env for IPFS battle storage.".bright_black()
        );
    }

    let mut arena = open_arena(config)?;
    let mut console = Console::stdio();
    menu(
        &mut arena,
        &mut console,
        Display::from_flag(args.summary),
        Path::new(REPORTS_DIR),
    )
    .await?;

    println!("\n  {}\n", "Thanks for watching the arena!".bright_black());
    Ok(())
}

/// Menu loop. A failed action is reported and the menu comes back; the
/// session's standings survive it. Only unreadable input ends the loop early.
async fn menu<R: BufRead, W: Write>(
    arena: &mut Arena,
    console: &mut Console<R, W>,
    display: Display,
    reports: &Path,
) -> Result<()> {
    let labels: Vec<String> = MENU.iter().map(|(label, _)| label.to_string()).collect();

    loop {
        let Some(choice) = console.choose("What would you like to do?", &labels)? else {
            return Ok(());
        };
        let outcome = match MENU[choice].1 {
            MenuAction::Battle => quick_battle(arena, console, display, reports).await,
            MenuAction::Tournament => run_tournament(arena, console, display, reports).await,
            MenuAction::Leaderboard => {
                render::leaderboard(arena.state());
                Ok(())
            }
            MenuAction::History => {
                render::history(arena.state());
                Ok(())
            }
            MenuAction::VoteStats => {
                render::vote_stats(arena.state().vote_stats());
                Ok(())
            }
            MenuAction::Exit => return Ok(()),
        };
        if let Err(e) = outcome {
            tracing::warn!(error = %format!("{:#}", e), "menu action failed");
            print_error(&format!("{:#}", e));
        }
    }
}

async fn quick_battle<R: BufRead, W: Write>(
    arena: &mut Arena,
    console: &mut Console<R, W>,
    display: Display,
    reports: &Path,
) -> Result<()> {
    let roster: Vec<String> = AgentName::ALL
        .iter()
        .map(|a| format!("{} (ELO: {})", a.display_name(), arena.state().agent(*a).elo))
        .collect();
    let Some([a, b]) = console.choose_pair("Pick exactly 2 agents to battle:", &roster)? else {
        return Ok(());
    };
    let pair = [AgentName::ALL[a], AgentName::ALL[b]];
    let Some(category) = choose_category(console)? else {
        return Ok(());
    };
    let Some(difficulty) = choose_difficulty(console)? else {
        return Ok(());
    };
    let prompt = arena.pick_prompt(category, difficulty)?;

    let Some(mut concluded) =
        fight(arena, pair, prompt, display, |pair| audience_vote(console, pair)).await?
    else {
        return Ok(());
    };

    if arena.recorder().is_enabled() {
        if console.confirm("Record this battle?", false)? {
            record_and_show(arena, &mut concluded.result).await;
        }
    } else {
        ledger_hint();
    }
    if console.confirm("📄 Export battle report?", false)? {
        export_battle(reports, &concluded.result).await?;
    }
    Ok(())
}

async fn run_tournament<R: BufRead, W: Write>(
    arena: &mut Arena,
    console: &mut Console<R, W>,
    display: Display,
    reports: &Path,
) -> Result<()> {
    let Some(category) = choose_category(console)? else {
        return Ok(());
    };
    let mut tournament = play_out(
        arena,
        category,
        display,
        Duration::from_millis(DEFAULT_PAUSE_MS),
        |pair| audience_vote(console, pair),
    )
    .await?;

    if arena.recorder().is_enabled() && console.confirm("Record tournament battles?", false)? {
        record_tournament(arena, &mut tournament).await;
    }
    if console.confirm("📄 Export tournament report?", false)? {
        export_tournament(reports, &tournament).await?;
    }
    Ok(())
}

/// `Some(None)` is "random"; `None` means input ended
fn choose_category<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
) -> Result<Option<Option<Category>>> {
    let mut options = vec!["🎲 Random".to_string()];
    options.extend(Category::ALL.iter().map(|c| c.as_str().to_string()));
    Ok(console
        .choose("Choose a battle category:", &options)?
        .map(|i| i.checked_sub(1).map(|i| Category::ALL[i])))
}

fn choose_difficulty<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<Option<Difficulty>> {
    let options: Vec<String> = Difficulty::ALL
        .iter()
        .map(|d| format!("{} {} (K={})", d.stars(), d.as_str(), d.k_factor()))
        .collect();
    Ok(console
        .choose("Choose difficulty:", &options)?
        .map(|i| Difficulty::ALL[i]))
}

/// The audience pick, asked before the verdict is revealed
fn audience_vote<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    pair: [AgentName; 2],
) -> Result<Option<AgentName>> {
    let options = vec![
        pair[0].display_name().to_string(),
        pair[1].display_name().to_string(),
        "Skip voting".to_string(),
    ];
    Ok(console
        .choose("🗳  Who do you think won?", &options)?
        .and_then(|i| pair.get(i).copied()))
}
