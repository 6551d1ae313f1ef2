//! Tournament command - eight agents, single elimination
//!
//! Usage:
//! ```bash
//! arena tournament --category debate
//! arena tournament --record --report --pause-ms 0
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;
use std::time::Duration;

use arena_core::{AgentName, Category, Tournament};
use arena_llm::ArenaConfig;

use super::{export_tournament, fight, ledger_hint, open_arena, record_tournament, Display};
use crate::app::{Arena, REPORTS_DIR};
use crate::print_warning;
use crate::render;

/// Cosmetic pause between matches
pub const DEFAULT_PAUSE_MS: u64 = 1500;

/// Arguments for the tournament command
#[derive(Args)]
pub struct TournamentArgs {
    /// Prompt category for every match (mixed when omitted)
    #[arg(short, long)]
    category: Option<Category>,

    /// Show short summaries instead of streaming live
    #[arg(long)]
    summary: bool,

    /// Record every match on the configured ledger afterwards
    #[arg(long)]
    record: bool,

    /// Write a markdown report to ./reports
    #[arg(long)]
    report: bool,

    /// Pause between matches, in milliseconds
    #[arg(long, default_value_t = DEFAULT_PAUSE_MS)]
    pause_ms: u64,
}

/// Run the tournament command
pub async fn run(args: TournamentArgs, config: ArenaConfig) -> Result<()> {
    let mut arena = open_arena(config)?;
    let mut tournament = play_out(
        &mut arena,
        args.category,
        Display::from_flag(args.summary),
        Duration::from_millis(args.pause_ms),
        |_| Ok(None),
    )
    .await?;

    if args.record {
        if arena.recorder().is_enabled() {
            record_tournament(&mut arena, &mut tournament).await;
        } else {
            ledger_hint();
        }
    }
    if args.report {
        export_tournament(Path::new(REPORTS_DIR), &tournament).await?;
    }
    Ok(())
}

/// Seed a bracket and play it until a champion is crowned or a match cannot
/// be judged. Rounds get harder: easy, medium, then hard for the final.
pub(crate) async fn play_out<V>(
    arena: &mut Arena,
    category: Option<Category>,
    display: Display,
    pause: Duration,
    mut vote: V,
) -> Result<Tournament>
where
    V: FnMut([AgentName; 2]) -> Result<Option<AgentName>>,
{
    println!("\n{}", "  🏟  TOURNAMENT".yellow().bold());
    let mut tournament = arena.new_tournament(category)?;
    println!(
        "  {} {}",
        "Category:".bold(),
        tournament.category_label().yellow()
    );
    render::bracket(&tournament);

    while let Some((index, m)) = tournament.next_playable_match() {
        let Some(pair) = m.participants else {
            break;
        };
        let round = m.round;
        let difficulty = round.difficulty();
        println!(
            "\n  {}",
            format!("{} #{} {}", round.label(), m.match_number, difficulty.stars())
                .yellow()
                .bold()
        );

        let prompt = arena.pick_prompt(category, difficulty)?;
        let Some(concluded) = fight(arena, pair, prompt, display, &mut vote).await? else {
            print_warning("Tournament stopped: a match could not be judged.");
            break;
        };
        tournament = tournament.advance(index, concluded.result)?;
        tracing::info!(tournament = %tournament.id, index, "match decided");
        render::bracket(&tournament);

        if tournament.next_playable_match().is_some() {
            tokio::time::sleep(pause).await;
        }
    }

    if let Some(champion) = tournament.champion {
        println!("\n  {}", "C H A M P I O N".yellow().bold());
        println!(
            "  🏆 {} 🏆\n",
            render::paint(champion, champion.display_name()).bold()
        );
    }
    Ok(tournament)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_anchor::BattleRecorder;
    use arena_llm::{MockClient, ProviderKind};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_offline_tournament_crowns_champion() {
        let config = ArenaConfig {
            provider: ProviderKind::Mock,
            judge_model: "judge".into(),
            ..Default::default()
        };
        let mut arena =
            Arena::with_parts(&config, Arc::new(MockClient::smart()), BattleRecorder::default());

        let mut votes = 0;
        let tournament = play_out(
            &mut arena,
            Some(Category::Strategy),
            Display::Summary,
            Duration::ZERO,
            |pair| {
                votes += 1;
                Ok(Some(pair[0]))
            },
        )
        .await
        .unwrap();

        assert!(tournament.is_complete());
        let champion = tournament.champion.unwrap();
        assert_eq!(tournament.matches[6].winner, Some(champion));
        assert_eq!(votes, 7);
        assert_eq!(arena.state().battle_history().len(), 7);
        assert_eq!(arena.state().vote_stats().total_votes, 7);
        assert_eq!(arena.state().agent(champion).wins, 3);
    }
}
