//! Markdown reports for finished battles and tournaments

use std::fmt::Write;

use crate::agent::AgentName;
use crate::battle::BattleResult;
use crate::tournament::{Round, Tournament};

const FOOTER: &str = "*Played in the Arena*";

/// File name for a battle report
pub fn battle_report_name(result: &BattleResult) -> String {
    format!("battle-{}.md", result.id)
}

/// File name for a tournament report
pub fn tournament_report_name(tournament: &Tournament) -> String {
    format!("tournament-{}.md", tournament.id)
}

fn score_text(result: &BattleResult, agent: AgentName) -> String {
    result
        .verdict
        .score(agent)
        .map(|s| format!("{}/10", s))
        .unwrap_or_else(|| "?/10".to_string())
}

/// Full battle report with both responses, verdict and receipts
pub fn battle_report(result: &BattleResult) -> String {
    let winner = result.winner();
    let loser = result.loser();
    let prompt = &result.prompt;

    let mut out = String::new();
    let _ = writeln!(out, "# Arena Battle Report\n");
    let _ = writeln!(out, "**Battle ID:** {}", result.id);
    let _ = writeln!(out, "**Date:** {}", result.timestamp.to_rfc3339());
    let _ = writeln!(
        out,
        "**Category:** {} | **Difficulty:** {} {}\n",
        prompt.category,
        prompt.difficulty,
        prompt.difficulty.stars()
    );
    let _ = writeln!(out, "> {}\n", prompt.prompt);
    let _ = writeln!(out, "---\n");
    let _ = writeln!(
        out,
        "## Matchup: {} vs {}\n",
        winner.display_name(),
        loser.display_name()
    );
    for r in &result.responses {
        let _ = writeln!(
            out,
            "### {} (responded in {}ms)\n",
            r.agent.display_name(),
            r.time_ms
        );
        let _ = writeln!(out, "{}\n", r.response);
    }
    let _ = writeln!(out, "---\n");
    let _ = writeln!(out, "## Judge Verdict\n");
    let _ = writeln!(out, "**Winner: {}**\n", winner.display_name());
    let _ = writeln!(out, "| Agent | Score |");
    let _ = writeln!(out, "|-------|-------|");
    for agent in [winner, loser] {
        let _ = writeln!(out, "| {} | {} |", agent.display_name(), score_text(result, agent));
    }
    let _ = writeln!(out, "\n**Reasoning:** {}\n", result.verdict.reasoning);
    let _ = writeln!(out, "---\n");
    let _ = writeln!(
        out,
        "*Ledger: {}*",
        result.tx_hash.as_deref().unwrap_or("Not recorded")
    );
    let _ = writeln!(
        out,
        "*IPFS: {}*",
        result.ipfs_cid.as_deref().unwrap_or("Not stored")
    );
    out.push_str(FOOTER);
    out
}

/// Round-by-round tournament summary
pub fn tournament_report(tournament: &Tournament) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Arena Tournament Report\n");
    let _ = writeln!(out, "**Tournament ID:** {}", tournament.id);
    let _ = writeln!(out, "**Date:** {}", tournament.timestamp.to_rfc3339());
    let _ = writeln!(out, "**Category:** {}", tournament.category_label());
    let _ = writeln!(
        out,
        "**Champion:** {}\n",
        tournament
            .champion
            .map(|c| c.display_name())
            .unwrap_or("TBD")
    );
    let _ = writeln!(out, "---\n");

    for round in Round::ALL {
        let _ = writeln!(out, "## {}\n", round.plural_label());
        for m in tournament.matches_in_round(round) {
            let (a, b) = match m.participants {
                Some([a, b]) => (a.display_name(), b.display_name()),
                None => ("TBD", "TBD"),
            };
            match (&m.result, m.participants) {
                (Some(result), Some([pa, pb])) => {
                    let _ = writeln!(out, "**Match {}:** {} vs {}", m.match_number, a, b);
                    let _ = writeln!(out, "- Winner: **{}**", result.winner().display_name());
                    let _ = writeln!(
                        out,
                        "- Score: {} vs {}",
                        score_text(result, pa),
                        score_text(result, pb)
                    );
                    let _ = writeln!(out, "- {}", result.verdict.reasoning);
                }
                _ => {
                    let _ = writeln!(out, "**Match {}:** {} vs {} - *Not played*", m.match_number, a, b);
                }
            }
            out.push('\n');
        }
    }

    if let Some(champion) = tournament.champion {
        let _ = writeln!(out, "---\n");
        let _ = writeln!(out, "## CHAMPION: {}\n", champion.display_name());
    }
    out.push_str(FOOTER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::BattleResponse;
    use crate::prompt::{BattlePrompt, Category, Difficulty};
    use crate::verdict::JudgeVerdict;

    fn result() -> BattleResult {
        let pair = [AgentName::Deepseek, AgentName::Minimax];
        BattleResult::assemble(
            BattlePrompt::new(Category::Strategy, Difficulty::Hard, "Plan a heist."),
            pair,
            [
                BattleResponse::new(AgentName::Deepseek, "Tunnel.", 900),
                BattleResponse::new(AgentName::Minimax, "Disguise.", 1100),
            ],
            JudgeVerdict::new(pair, AgentName::Minimax, [6.0, 8.5], "More daring.").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_battle_report_contents() {
        let mut r = result();
        let report = battle_report(&r);
        assert!(report.contains("## Matchup: MiniMax M2.5 vs DeepSeek V3.2"));
        assert!(report.contains("### DeepSeek V3.2 (responded in 900ms)"));
        assert!(report.contains("| MiniMax M2.5 | 8.5/10 |"));
        assert!(report.contains("**Reasoning:** More daring."));
        assert!(report.contains("*Ledger: Not recorded*"));

        r.attach_receipts(Some("0xfeed".into()), Some("bafycid".into()));
        let report = battle_report(&r);
        assert!(report.contains("*Ledger: 0xfeed*"));
        assert!(report.contains("*IPFS: bafycid*"));
        assert!(battle_report_name(&r).ends_with(".md"));
    }

    #[test]
    fn test_tournament_report_unplayed() {
        let t = Tournament::create(AgentName::ALL, None, &mut rand::rng()).unwrap();
        let report = tournament_report(&t);
        assert!(report.contains("**Champion:** TBD"));
        assert!(report.contains("**Category:** mixed"));
        assert!(report.contains("## Quarter-Finals"));
        assert!(report.contains("**Match 7:** TBD vs TBD - *Not played*"));
        assert!(!report.contains("## CHAMPION"));
    }
}
