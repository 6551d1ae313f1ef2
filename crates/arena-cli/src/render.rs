//! Terminal output: live side-by-side stream, verdicts, tables, bracket

use colored::{Color, ColoredString, Colorize};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Table};
use std::io::{self, Write};

use arena_anchor::Recording;
use arena_core::{
    AgentName, BattlePrompt, BattleResponse, Difficulty, GameState, JudgeVerdict, Tournament,
    TournamentMatch, VoteStats,
};
use arena_llm::{BattleSummary, KeyStatus, SideView, SidePhase, StreamRenderer};

use crate::app::RatingChange;

pub const DEFAULT_WIDTH: usize = 100;
const HISTORY_LIMIT: usize = 10;
const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

/// Terminal width from `COLUMNS`, else 100
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.trim().parse().ok())
        .filter(|w: &usize| *w >= 40)
        .unwrap_or(DEFAULT_WIDTH)
}

pub fn agent_color(name: AgentName) -> Color {
    name.profile().color.parse().unwrap_or(Color::White)
}

pub fn paint(name: AgentName, text: &str) -> ColoredString {
    text.color(agent_color(name))
}

fn cell_color(name: AgentName) -> comfy_table::Color {
    use comfy_table::Color as C;
    match name.profile().color {
        "magenta" => C::Magenta,
        "red" => C::Red,
        "green" => C::Green,
        "cyan" => C::Cyan,
        "blue" => C::Blue,
        "yellow" => C::Yellow,
        "white" => C::White,
        _ => C::DarkGrey,
    }
}

fn styled_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
    table
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

/// Word-wrap to `width` columns, keeping paragraph breaks. Words longer than
/// the width are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut rest: Vec<char> = paragraph.chars().collect();
        while rest.len() > width {
            match rest[..=width].iter().rposition(|c| *c == ' ').filter(|&i| i > 0) {
                Some(space) => {
                    lines.push(rest[..space].iter().collect());
                    rest.drain(..=space);
                }
                None => {
                    lines.push(rest[..width].iter().collect());
                    rest.drain(..width);
                }
            }
        }
        if !rest.is_empty() {
            lines.push(rest.into_iter().collect());
        }
    }
    lines
}

pub fn difficulty_label(difficulty: Difficulty) -> ColoredString {
    let text = format!("{} {}", difficulty.stars(), capitalize(difficulty.as_str()));
    match difficulty {
        Difficulty::Easy => text.green(),
        Difficulty::Medium => text.yellow(),
        Difficulty::Hard => text.red(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn title() {
    println!();
    println!("{}", "  ⚔  A R E N A  ⚔".red().bold());
    println!(
        "{}",
        "  LLM agents battle head to head, judged by an LLM\n".bright_black()
    );
}

pub fn key_status(statuses: &[KeyStatus]) {
    for status in statuses {
        if status.set {
            println!("  {} {}", "✓".green(), status.label.white());
        } else {
            println!("  {} {}", "✗".red(), status.label.bright_black());
        }
    }
    println!();
}

pub fn battle_header(pair: [AgentName; 2], prompt: &BattlePrompt) {
    let rule = "═".repeat(60).yellow();
    println!();
    println!("  {}", rule);
    println!(
        "  {}  {}  {}",
        paint(pair[0], pair[0].display_name()).bold(),
        "⚔".white().bold(),
        paint(pair[1], pair[1].display_name()).bold()
    );
    println!();
    println!("  {}   {}", "Category:".bold(), prompt.category.as_str().yellow());
    println!("  {} {}", "Difficulty:".bold(), difficulty_label(prompt.difficulty));
    for (i, line) in wrap_text(&prompt.prompt, terminal_width().saturating_sub(16)).iter().enumerate() {
        let label = if i == 0 { "Prompt:" } else { "" };
        println!("  {} {}", pad(label, 11).bold(), line);
    }
    println!("  {}", rule);
}

/// Full response, for output that was not streamed live
pub fn response(reply: &BattleResponse) {
    println!(
        "\n  {}  {}",
        paint(reply.agent, reply.agent.display_name()).bold(),
        format!("({}ms)", reply.time_ms).bright_black()
    );
    for line in wrap_text(&reply.response, terminal_width().saturating_sub(4)) {
        println!("  {}", line);
    }
}

/// Both summaries side by side, stacked on narrow terminals
pub fn head_to_head(state: &GameState, responses: &[BattleResponse; 2], summaries: &[BattleSummary; 2]) {
    let width = terminal_width();
    if width < 60 {
        for (reply, summary) in responses.iter().zip(summaries) {
            response(&BattleResponse::new(reply.agent, summary.summary.clone(), reply.time_ms));
        }
        return;
    }

    let col = width / 2 - 3;
    let columns: Vec<Vec<String>> = summaries
        .iter()
        .map(|s| wrap_text(&s.summary, col.saturating_sub(2)))
        .collect();
    let rows = columns.iter().map(Vec::len).max().unwrap_or(0);

    println!();
    let heads: Vec<ColoredString> = responses
        .iter()
        .map(|r| paint(r.agent, &pad(r.agent.display_name(), col)).bold())
        .collect();
    println!("  {}{}  {}", heads[0], "│".bright_black(), heads[1]);
    let meta: Vec<String> = responses
        .iter()
        .map(|r| format!("{}ms  ELO {}", r.time_ms, state.agent(r.agent).elo))
        .collect();
    println!(
        "  {}{}  {}",
        pad(&meta[0], col).bright_black(),
        "│".bright_black(),
        meta[1].bright_black()
    );
    println!("  {}{}{}", "─".repeat(col).bright_black(), "┼".bright_black(), "─".repeat(col).bright_black());
    for i in 0..rows {
        let left = columns[0].get(i).map(String::as_str).unwrap_or("");
        let right = columns[1].get(i).map(String::as_str).unwrap_or("");
        println!("  {}{}  {}", pad(left, col), "│".bright_black(), right);
    }
    println!();
}

pub fn verdict(verdict: &JudgeVerdict, pair: [AgentName; 2], judge: &str) {
    println!();
    println!("  {}", format!("🦙 {} has spoken!", judge).magenta().bold());
    println!(
        "  {} {}",
        "WINNER:".bold(),
        paint(verdict.winner, verdict.winner.display_name()).bold()
    );
    println!();

    let mut table = styled_table();
    table.set_header(vec![
        Cell::new("Agent").fg(comfy_table::Color::Cyan),
        Cell::new("Score").fg(comfy_table::Color::Cyan),
        Cell::new("Result").fg(comfy_table::Color::Cyan),
    ]);
    for agent in pair {
        let score = verdict.score(agent).unwrap_or(0.0);
        let result = if agent == verdict.winner {
            Cell::new("👑 WINNER").fg(comfy_table::Color::Green)
        } else {
            Cell::new("LOST").fg(comfy_table::Color::Red)
        };
        table.add_row(vec![
            Cell::new(agent.display_name()).fg(cell_color(agent)),
            Cell::new(format!("{}/10", score)),
            result,
        ]);
    }
    println!("{table}");

    println!("\n  {}", "Reasoning:".bold());
    for line in wrap_text(&verdict.reasoning, terminal_width().saturating_sub(6)) {
        println!("    {}", line.italic());
    }
    println!();
}

pub fn rating_changes(changes: &[RatingChange; 2], k_factor: u32) {
    let parts: Vec<String> = changes
        .iter()
        .map(|c| {
            let delta = c.after - c.before;
            let delta = if delta >= 0 {
                format!("+{}", delta).green()
            } else {
                delta.to_string().red()
            };
            format!(
                "{} {} → {} ({})",
                paint(c.agent, c.agent.display_name()),
                c.before,
                c.after,
                delta
            )
        })
        .collect();
    println!("  {}  {}", parts.join("   "), format!("(K={})", k_factor).bright_black());
    println!();
}

pub fn leaderboard_table(state: &GameState) -> Table {
    let mut table = styled_table();
    table.set_header(vec![
        Cell::new("Rank").fg(comfy_table::Color::Cyan),
        Cell::new("Agent").fg(comfy_table::Color::Cyan),
        Cell::new("ELO").fg(comfy_table::Color::Cyan),
        Cell::new("Wins").fg(comfy_table::Color::Cyan),
        Cell::new("Losses").fg(comfy_table::Color::Cyan),
        Cell::new("Win Rate").fg(comfy_table::Color::Cyan),
    ]);
    for (i, agent) in state.leaderboard().into_iter().enumerate() {
        let medal = MEDALS.get(i).copied().unwrap_or(" ");
        table.add_row(vec![
            Cell::new(format!("{} {}", medal, i + 1)),
            Cell::new(&agent.display_name).fg(cell_color(agent.name)),
            Cell::new(agent.elo),
            Cell::new(agent.wins).fg(comfy_table::Color::Green),
            Cell::new(agent.losses).fg(comfy_table::Color::Red),
            Cell::new(
                agent
                    .win_rate()
                    .map(|r| format!("{:.0}%", r))
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
        ]);
    }
    table
}

/// Roster with the models each agent is called through
pub fn roster_table() -> Table {
    let mut table = styled_table();
    table.set_header(vec![
        Cell::new("Agent").fg(comfy_table::Color::Cyan),
        Cell::new("Model").fg(comfy_table::Color::Cyan),
        Cell::new("Fallback").fg(comfy_table::Color::Cyan),
        Cell::new("Color").fg(comfy_table::Color::Cyan),
    ]);
    for name in AgentName::ALL {
        let profile = name.profile();
        table.add_row(vec![
            Cell::new(profile.display_name).fg(cell_color(name)),
            Cell::new(profile.model),
            Cell::new(profile.fallback_model.unwrap_or("-")),
            Cell::new(profile.color),
        ]);
    }
    table
}

pub fn leaderboard(state: &GameState) {
    println!("\n{}\n", "🏆 LEADERBOARD".yellow().bold());
    println!("{}", leaderboard_table(state));
    println!();
}

/// Last ten battles, newest first
pub fn history_lines(state: &GameState) -> Vec<String> {
    state
        .recent_battles(HISTORY_LIMIT)
        .map(|b| {
            let winner = b.winner();
            let loser = b.loser();
            let time = b.timestamp.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S");
            let score = |a| b.verdict.score(a).unwrap_or(0.0);
            let mut line = format!(
                "{}  {} {}  {} beat {}  {}",
                time.to_string().bright_black(),
                pad(b.prompt.category.as_str(), 8).yellow(),
                pad(b.prompt.difficulty.stars(), 3),
                winner.display_name().bold(),
                loser.display_name(),
                format!("({}-{})", score(winner), score(loser)).bright_black()
            );
            if b.tx_hash.is_some() {
                line.push_str(&" [on-chain]".green().to_string());
            }
            if b.ipfs_cid.is_some() {
                line.push_str(&" [IPFS]".cyan().to_string());
            }
            line
        })
        .collect()
}

pub fn history(state: &GameState) {
    let lines = history_lines(state);
    if lines.is_empty() {
        println!("\n  {}\n", "No battles yet.".bright_black());
        return;
    }
    println!("\n{}\n", "📜 BATTLE HISTORY".yellow().bold());
    for line in lines {
        println!("  {}", line);
    }
    println!();
}

pub fn vote_stats(stats: VoteStats) {
    println!("\n{}\n", "🗳  VOTE STATS".yellow().bold());
    let Some(rate) = stats.agreement_rate() else {
        println!("  {}\n", "No votes cast yet. Vote during battles!".bright_black());
        return;
    };
    println!("  {}   {}", "Total Votes:".bold(), stats.total_votes);
    println!("  {}        {}", "Agreed:".bold(), stats.agreed_with_judge.to_string().green());
    println!(
        "  {}     {}",
        "Disagreed:".bold(),
        (stats.total_votes - stats.agreed_with_judge).to_string().red()
    );
    println!("  {}     {:.0}%\n", "Agreement:".bold(), rate);
}

pub fn vote_result(pick: Option<AgentName>, judge_winner: AgentName) {
    match pick {
        None => {}
        Some(pick) if pick == judge_winner => {
            println!("  {}\n", "✅ You agreed with the judge!".green());
        }
        Some(pick) => println!(
            "  {}\n",
            format!(
                "❌ You disagreed! You picked {}, the judge picked {}",
                pick.display_name(),
                judge_winner.display_name()
            )
            .red()
        ),
    }
}

pub fn receipt(recording: &Recording, archive_link: Option<String>) {
    let r = &recording.receipt;
    let headline = match r.backend.as_str() {
        "evm" => format!("✓ Battle recorded on-chain in block #{}", r.sequence),
        _ => format!("✓ Battle #{} recorded in the {} ledger", r.sequence, r.backend),
    };
    println!("  {}", headline.green().bold());
    println!("  {}       {}", "Tx:".bold(), r.tx_hash.cyan());
    if r.backend == "evm" {
        println!(
            "  {} {}",
            "Explorer:".bold(),
            format!("https://testnet.bscscan.com/tx/{}", r.tx_hash).cyan().underline()
        );
    }
    if let Some(link) = archive_link.filter(|_| r.ipfs_cid.is_some()) {
        println!("  {}     {}", "IPFS:".bold(), link.cyan().underline());
    }
    for warning in &recording.warnings {
        println!("  {} {}", "⚠".yellow().bold(), warning);
    }
    println!();
}

// -- bracket --------------------------------------------------------------

const LABEL: usize = 16;
const SEMI_COL: usize = 20;
const FINAL_COL: usize = 40;
const CHAMPION_COL: usize = 60;

/// A bracket row with its visible width tracked apart from colour codes
#[derive(Default)]
struct Row {
    text: String,
    width: usize,
}

impl Row {
    fn plain(mut self, s: &str) -> Self {
        self.text.push_str(s);
        self.width += s.chars().count();
        self
    }

    fn line(mut self, s: &str) -> Self {
        self.text.push_str(&s.bright_black().to_string());
        self.width += s.chars().count();
        self
    }

    fn at(self, col: usize) -> Self {
        let gap = " ".repeat(col.saturating_sub(self.width));
        self.plain(&gap)
    }

    fn label(mut self, name: Option<AgentName>, highlight: bool) -> Self {
        let painted = match name {
            Some(n) => {
                let text = pad(&truncate(n.display_name(), LABEL), LABEL);
                if highlight {
                    paint(n, &text).bold()
                } else {
                    paint(n, &text)
                }
            }
            None => pad("???", LABEL).bright_black(),
        };
        self.text.push_str(&painted.to_string());
        self.width += LABEL;
        self
    }
}

fn won(m: &TournamentMatch, agent: Option<AgentName>) -> bool {
    agent.is_some() && m.winner == agent
}

fn entrant(m: &TournamentMatch, slot: usize, corner: &str, end: &str) -> Row {
    let agent = m.participants.map(|p| p[slot]);
    Row::default()
        .line(corner)
        .label(agent, won(m, agent))
        .plain(" ")
        .line(end)
}

fn bracket_half(t: &Tournament, quarters: [usize; 2], semi: usize, top: bool) -> Vec<Row> {
    let [qa, qb] = quarters.map(|i| &t.matches[i]);
    let semi = &t.matches[semi];
    let fin = &t.matches[6];

    let rows = vec![
        entrant(qa, 0, "┌─ ", "┐"),
        Row::default()
            .at(SEMI_COL)
            .line("├─ ")
            .label(qa.winner, won(semi, qa.winner))
            .plain(" ")
            .line("┐"),
        entrant(qa, 1, "└─ ", "┘").at(FINAL_COL).line("│"),
        Row::default()
            .at(FINAL_COL)
            .line("├─ ")
            .label(semi.winner, won(fin, semi.winner))
            .plain(" ")
            .line(if top { "┐" } else { "┘" }),
        entrant(qb, 0, "┌─ ", "┐").at(FINAL_COL).line("│"),
        Row::default()
            .at(SEMI_COL)
            .line("├─ ")
            .label(qb.winner, won(semi, qb.winner))
            .plain(" ")
            .line("┘"),
        entrant(qb, 1, "└─ ", "┘"),
    ];

    // the final's connector runs below the top half's finalist and above the bottom's
    let bar = if top { 4..7 } else { 0..3 };
    rows.into_iter()
        .enumerate()
        .map(|(i, r)| if bar.contains(&i) { r.at(CHAMPION_COL).line("│") } else { r })
        .collect()
}

/// The bracket as printable lines
pub fn bracket_lines(t: &Tournament) -> Vec<String> {
    let champion = match t.champion {
        Some(c) => format!("{} {}", paint(c, c.display_name()).bold(), "🏆".yellow()),
        None => "???".bright_black().to_string(),
    };

    let mut rows = bracket_half(t, [0, 1], 4, true);
    rows.push(Row::default().at(CHAMPION_COL).line("│"));
    rows.push(Row::default().at(CHAMPION_COL).line("├─ ").plain(&champion));
    rows.push(Row::default().at(CHAMPION_COL).line("│"));
    rows.extend(bracket_half(t, [2, 3], 5, false));

    rows.into_iter().map(|r| format!("  {}", r.text)).collect()
}

pub fn bracket(t: &Tournament) {
    println!("\n{}\n", "  TOURNAMENT BRACKET".yellow().bold());
    for line in bracket_lines(t) {
        println!("{}", line);
    }
    println!();
}

// -- live stream ----------------------------------------------------------

fn phase_hint(phase: SidePhase) -> Option<&'static str> {
    match phase {
        SidePhase::StreamingFallback => Some("primary model failed, trying fallback..."),
        SidePhase::NonStreamingFallback => Some("waiting for a non-streamed reply..."),
        _ => None,
    }
}

/// Two columns redrawn in place on every tick
pub struct TerminalRenderer<W> {
    out: W,
    col_width: usize,
    drawn_rows: usize,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W, terminal_width: usize) -> Self {
        Self {
            out,
            col_width: (terminal_width / 2).saturating_sub(3).max(10),
            drawn_rows: 0,
        }
    }

    fn column(side: &SideView, wrap: usize) -> Vec<String> {
        if side.text.is_empty() {
            if let Some(hint) = phase_hint(side.phase) {
                return vec![hint.to_string()];
            }
        }
        wrap_text(&side.text, wrap)
    }
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), terminal_width())
    }
}

impl<W: Write + Send> StreamRenderer for TerminalRenderer<W> {
    fn begin(&mut self, agents: [AgentName; 2]) -> io::Result<()> {
        let left = pad(agents[0].display_name(), self.col_width + 1);
        writeln!(self.out)?;
        writeln!(
            self.out,
            "  {}{}  {}",
            paint(agents[0], &left).bold(),
            "│".bright_black(),
            paint(agents[1], agents[1].display_name()).bold()
        )?;
        writeln!(
            self.out,
            "  {}{}{}",
            "─".repeat(self.col_width + 1).bright_black(),
            "┼".bright_black(),
            "─".repeat(self.col_width).bright_black()
        )?;
        self.out.flush()
    }

    fn render(&mut self, sides: &[SideView; 2]) -> io::Result<()> {
        let wrap = self.col_width.saturating_sub(2).max(1);
        let columns = [Self::column(&sides[0], wrap), Self::column(&sides[1], wrap)];
        let rows = columns[0].len().max(columns[1].len()).max(1);

        if self.drawn_rows > 0 {
            write!(self.out, "\x1b[{}A", self.drawn_rows)?;
            for _ in 0..self.drawn_rows {
                write!(self.out, "\x1b[2K\n")?;
            }
            write!(self.out, "\x1b[{}A", self.drawn_rows)?;
        }

        for i in 0..rows {
            let cursor = |side: usize| -> ColoredString {
                if !sides[side].is_done() && i + 1 == columns[side].len() {
                    "█".green()
                } else {
                    " ".normal()
                }
            };
            let left = columns[0].get(i).map(String::as_str).unwrap_or("");
            let right = columns[1].get(i).map(String::as_str).unwrap_or("");
            writeln!(
                self.out,
                "  {}{}{}  {}{}",
                pad(left, self.col_width),
                cursor(0),
                "│".bright_black(),
                right,
                cursor(1)
            )?;
        }
        self.drawn_rows = rows;
        self.out.flush()
    }

    fn finish(&mut self, responses: &[BattleResponse; 2]) -> io::Result<()> {
        let timing = |r: &BattleResponse| format!("{}: {}ms", r.agent.display_name(), r.time_ms);
        writeln!(self.out)?;
        writeln!(
            self.out,
            "  {}{}  {}",
            pad(&timing(&responses[0]), self.col_width + 1).bright_black(),
            "│".bright_black(),
            timing(&responses[1]).bright_black()
        )?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{BattleResult, Category, JudgeVerdict};

    fn no_colour() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("hello world foo", 11), vec!["hello world", "foo"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
        assert!(wrap_text("", 10).iter().all(String::is_empty));
        assert_eq!(wrap_text("héllo wörld", 5), vec!["héllo", "wörld"]);
    }

    #[test]
    fn test_fresh_bracket_layout() {
        no_colour();
        let t = Tournament::create(AgentName::ALL, Some(Category::Code), &mut rand::rng()).unwrap();
        let lines = bracket_lines(&t);
        assert_eq!(lines.len(), 17);

        for agent in AgentName::ALL {
            assert!(lines.iter().any(|l| l.contains(agent.display_name())));
        }
        // four semi-final slots, two final slots and the champion
        assert_eq!(lines.iter().filter(|l| l.contains("???")).count(), 7);

        let at = |row: usize, col: usize| lines[row].chars().nth(col + 2);
        assert_eq!(at(3, CHAMPION_COL), Some('┐'));
        assert_eq!(at(8, CHAMPION_COL), Some('├'));
        assert_eq!(at(13, CHAMPION_COL), Some('┘'));
        for row in [4, 5, 6, 7, 9, 10, 11, 12] {
            assert_eq!(at(row, CHAMPION_COL), Some('│'), "row {}", row);
        }
        assert_eq!(at(1, SEMI_COL), Some('├'));
        assert_eq!(at(2, FINAL_COL), Some('│'));
    }

    #[test]
    fn test_bracket_shows_champion() {
        no_colour();
        let mut t = Tournament::create(AgentName::ALL, None, &mut rand::rng()).unwrap();
        while let Some((index, m)) = t.next_playable_match() {
            let pair = m.participants.unwrap();
            let result = BattleResult::assemble(
                BattlePrompt::new(Category::Roast, m.round.difficulty(), "Roast"),
                pair,
                [
                    BattleResponse::new(pair[0], "a", 1),
                    BattleResponse::new(pair[1], "b", 1),
                ],
                JudgeVerdict::new(pair, pair[0], [7.0, 5.0], "First seed").unwrap(),
            )
            .unwrap();
            t = t.advance(index, result).unwrap();
        }
        let champion = t.champion.unwrap();
        let lines = bracket_lines(&t);
        assert!(lines[8].contains(champion.display_name()));
        assert!(!lines.iter().any(|l| l.contains("???")));
    }

    #[test]
    fn test_leaderboard_order() {
        no_colour();
        let state = GameState::new();
        let rendered = leaderboard_table(&state).to_string();
        assert!(rendered.contains("Win Rate"));
        assert_eq!(rendered.matches("N/A").count(), 8);
    }

    #[test]
    fn test_renderer_redraws_in_place() {
        no_colour();
        let mut renderer = TerminalRenderer::new(Vec::new(), 60);
        let pair = [AgentName::Claude, AgentName::Grok];
        renderer.begin(pair).unwrap();

        let mut sides = pair.map(|agent| SideView {
            agent,
            phase: SidePhase::StreamingPrimary,
            text: String::new(),
            time_ms: None,
        });
        sides[0].text = "first words".into();
        renderer.render(&sides).unwrap();
        sides[1].phase = SidePhase::StreamingFallback;
        renderer.render(&sides).unwrap();
        renderer
            .finish(&[
                BattleResponse::new(AgentName::Claude, "first words", 120),
                BattleResponse::new(AgentName::Grok, "late", 340),
            ])
            .unwrap();

        let out = String::from_utf8(renderer.out).unwrap();
        assert!(out.contains("Claude Opus 4.6"));
        assert!(out.contains("first words"));
        assert!(out.contains('█'));
        assert!(out.contains("\x1b[1A"));
        assert!(out.contains("trying fallback"));
        assert!(out.contains("Grok 4.1 Fast: 340ms"));
    }
}
