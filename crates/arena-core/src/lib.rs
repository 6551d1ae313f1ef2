//! # Arena Core
//!
//! Core types for the battle arena:
//! - [`AgentName`] / [`Agent`]: the eight-agent roster and its standings
//! - [`PromptCatalog`]: battle prompts by category and difficulty
//! - [`JudgeVerdict`]: strictly parsed judge decisions
//! - [`BattleResult`]: one aggregated battle
//! - [`elo`] and [`GameState`]: functional rating updates
//! - [`Tournament`]: the eight-entrant knockout bracket

pub mod agent;
pub mod battle;
pub mod elo;
pub mod error;
pub mod prompt;
pub mod report;
pub mod state;
pub mod tournament;
pub mod verdict;

pub use agent::{Agent, AgentName, AgentProfile, INITIAL_ELO};
pub use battle::{BattleResponse, BattleResult};
pub use elo::{calculate_elo, update_game_state, EloUpdate};
pub use error::CoreError;
pub use prompt::{BattlePrompt, Category, Difficulty, PromptCatalog};
pub use state::{GameState, VoteStats};
pub use tournament::{BracketError, Round, Tournament, TournamentMatch};
pub use verdict::{strip_code_fences, JudgeVerdict, VerdictError};
