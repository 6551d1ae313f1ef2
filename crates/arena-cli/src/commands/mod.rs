//! CLI command implementations

pub mod agents;
pub mod battle;
pub mod fetch;
pub mod play;
pub mod tournament;

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use arena_anchor::{LedgerError, Recording};
use arena_core::{AgentName, BattlePrompt, BattleResult, Tournament};
use arena_llm::{ArenaConfig, NullRenderer, ProviderKind};

use crate::app::{self, Arena, Concluded};
use crate::render::{self, TerminalRenderer};
use crate::{print_error, print_info, print_success, print_warning};

const FAUCET_URL: &str = "https://www.bnbchain.org/en/testnet-faucet";

/// How replies are shown while a battle runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    /// Side-by-side columns redrawn as tokens arrive
    Live,
    /// Collected silently, then shown as short summaries
    Summary,
}

impl Display {
    pub fn from_flag(summary: bool) -> Self {
        if summary {
            Display::Summary
        } else {
            Display::Live
        }
    }
}

/// Build the session, explaining what to do when the API key is missing
pub(crate) fn open_arena(config: ArenaConfig) -> Result<Arena> {
    if config.provider == ProviderKind::OpenRouter && config.openrouter_api_key.is_none() {
        print_error("OPENROUTER_API_KEY is not set");
        print_info("Copy .env.example to .env and add your OpenRouter key, or pass --provider mock to play offline.");
    }
    Arena::from_config(config)
}

/// Play one battle: collect both replies, take the audience vote, judge and
/// update the standings. Returns `None` when the judge gives no usable
/// verdict; the battle then leaves no trace.
pub(crate) async fn fight<V>(
    arena: &mut Arena,
    pair: [AgentName; 2],
    prompt: BattlePrompt,
    display: Display,
    vote: V,
) -> Result<Option<Concluded>>
where
    V: FnOnce([AgentName; 2]) -> Result<Option<AgentName>>,
{
    render::battle_header(pair, &prompt);

    let responses = match display {
        Display::Live => {
            arena
                .collect(pair, &prompt, &mut TerminalRenderer::stdout())
                .await?
        }
        Display::Summary => {
            print_info("Both agents are thinking...");
            let responses = arena.collect(pair, &prompt, &mut NullRenderer).await?;
            let summaries = arena.summarize(&responses).await;
            render::head_to_head(arena.state(), &responses, &summaries);
            responses
        }
    };

    let pick = vote(pair)?;

    print_info(&format!("🦙 {} is judging...", arena.judge_model()));
    let verdict = match arena.judge(&prompt, &responses).await {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::warn!(error = %e, "battle abandoned");
            print_error(&format!("Judge failed to return a verdict: {}", e));
            println!();
            return Ok(None);
        }
    };

    render::verdict(&verdict, pair, &format!("Judge {}", arena.judge_model()));
    render::vote_result(pick, verdict.winner);

    let k_factor = prompt.k_factor();
    let concluded = arena.conclude(prompt, pair, responses, verdict, pick)?;
    render::rating_changes(&concluded.changes, k_factor);
    Ok(Some(concluded))
}

/// Record a battle, printing why when it cannot be
pub(crate) async fn record_battle(arena: &mut Arena, result: &mut BattleResult) -> Option<Recording> {
    match arena.record(result).await {
        Ok(recording) => Some(recording),
        Err(LedgerError::InsufficientBalance(msg)) => {
            print_warning(&format!("Recording skipped: {}", msg));
            print_info(&format!("Wallet has no tBNB - get some from {}", FAUCET_URL));
            None
        }
        Err(e) => {
            print_warning(&format!("Recording failed: {}", e));
            None
        }
    }
}

/// Record one battle and print the full receipt
pub(crate) async fn record_and_show(arena: &mut Arena, result: &mut BattleResult) {
    if let Some(recording) = record_battle(arena, result).await {
        let link = recording
            .receipt
            .ipfs_cid
            .as_deref()
            .and_then(|cid| arena.archive_link(cid));
        render::receipt(&recording, link);
    }
}

/// Record every decided match of a finished tournament
pub(crate) async fn record_tournament(arena: &mut Arena, tournament: &mut Tournament) {
    for m in tournament.matches.iter_mut() {
        let number = m.match_number;
        let Some(result) = m.result.as_mut() else {
            continue;
        };
        match record_battle(arena, result).await {
            Some(recording) => {
                let tx: String = recording.receipt.tx_hash.chars().take(10).collect();
                print_success(&format!("Match #{} recorded (tx: {}...)", number, tx));
                for warning in &recording.warnings {
                    print_warning(warning);
                }
            }
            None => print_warning(&format!("Match #{} recording failed.", number)),
        }
    }
}

pub(crate) fn ledger_hint() {
    println!(
        "  {}\n",
        "No ledger configured. Set ARENA_LEDGER_FILE, or BNB_TESTNET_RPC, WALLET_ADDRESS and ARENA_CONTRACT_ADDRESS."
            .bright_black()
    );
}

pub(crate) async fn export_battle(dir: &Path, result: &BattleResult) -> Result<()> {
    let path = app::export_battle_report(dir, result).await?;
    print_success(&format!("Report saved to {}", path.display()));
    Ok(())
}

pub(crate) async fn export_tournament(dir: &Path, tournament: &Tournament) -> Result<()> {
    let path = app::export_tournament_report(dir, tournament).await?;
    print_success(&format!("Report saved to {}", path.display()));
    Ok(())
}
