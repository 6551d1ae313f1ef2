//! Battle command - one battle without prompts
//!
//! Usage:
//! ```bash
//! arena battle claude grok --category code --difficulty hard
//! arena battle --summary --record --report
//! ```

use anyhow::{anyhow, bail, Result};
use clap::Args;
use rand::seq::SliceRandom;
use std::path::Path;

use arena_core::{AgentName, Category, Difficulty};
use arena_llm::ArenaConfig;

use super::{export_battle, fight, ledger_hint, open_arena, record_and_show, Display};
use crate::app::REPORTS_DIR;

/// Arguments for the battle command
#[derive(Args)]
pub struct BattleArgs {
    /// First agent (random when omitted)
    agent1: Option<AgentName>,

    /// Second agent (random when omitted)
    agent2: Option<AgentName>,

    /// Prompt category (any when omitted)
    #[arg(short, long)]
    category: Option<Category>,

    /// Prompt difficulty, which sets the K-factor
    #[arg(short, long, default_value = "medium")]
    difficulty: Difficulty,

    /// Show short summaries instead of streaming live
    #[arg(long)]
    summary: bool,

    /// Record the result on the configured ledger
    #[arg(long)]
    record: bool,

    /// Write a markdown report to ./reports
    #[arg(long)]
    report: bool,
}

/// Fill in missing agents at random, never pairing an agent with itself
fn resolve_pair(first: Option<AgentName>, second: Option<AgentName>) -> Result<[AgentName; 2]> {
    let mut pool: Vec<AgentName> = AgentName::ALL
        .into_iter()
        .filter(|a| Some(*a) != first && Some(*a) != second)
        .collect();
    pool.shuffle(&mut rand::rng());
    let mut pool = pool.into_iter();
    let mut draw = || pool.next().ok_or_else(|| anyhow!("Not enough agents to draw from"));

    let first = match first {
        Some(agent) => agent,
        None => draw()?,
    };
    let second = match second {
        Some(agent) => agent,
        None => draw()?,
    };
    if first == second {
        bail!("An agent cannot battle itself: {}", first);
    }
    Ok([first, second])
}

/// Run the battle command
pub async fn run(args: BattleArgs, config: ArenaConfig) -> Result<()> {
    let mut arena = open_arena(config)?;
    let pair = resolve_pair(args.agent1, args.agent2)?;
    let prompt = arena.pick_prompt(args.category, args.difficulty)?;

    let Some(mut concluded) = fight(
        &mut arena,
        pair,
        prompt,
        Display::from_flag(args.summary),
        |_| Ok(None),
    )
    .await?
    else {
        bail!("Battle abandoned without a verdict");
    };

    if args.record {
        if arena.recorder().is_enabled() {
            record_and_show(&mut arena, &mut concluded.result).await;
        } else {
            ledger_hint();
        }
    }
    if args.report {
        export_battle(Path::new(REPORTS_DIR), &concluded.result).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_pair() {
        let pair = resolve_pair(Some(AgentName::Kimi), Some(AgentName::Gpt)).unwrap();
        assert_eq!(pair, [AgentName::Kimi, AgentName::Gpt]);

        for _ in 0..20 {
            let [a, b] = resolve_pair(None, Some(AgentName::Claude)).unwrap();
            assert_ne!(a, b);
            assert_eq!(b, AgentName::Claude);

            let [a, b] = resolve_pair(None, None).unwrap();
            assert_ne!(a, b);
        }

        assert!(resolve_pair(Some(AgentName::Glm), Some(AgentName::Glm)).is_err());
    }
}
