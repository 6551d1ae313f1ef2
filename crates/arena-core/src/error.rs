//! Error types for core arena operations

use thiserror::Error;

use crate::agent::AgentName;

/// Errors raised while assembling results or updating standings
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Name outside the agent roster
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// A battle needs two different agents
    #[error("An agent cannot battle itself: {0}")]
    SelfBattle(AgentName),

    /// Response set does not line up with the competing pair
    #[error("Missing response for agent: {0}")]
    MissingResponse(AgentName),

    /// Response from an agent outside the competing pair
    #[error("Unexpected response from agent: {0}")]
    UnexpectedResponse(AgentName),

    /// Verdict names a winner that did not compete
    #[error("Verdict winner {winner} is not one of {pair:?}")]
    WinnerNotInBattle {
        winner: AgentName,
        pair: [AgentName; 2],
    },

    /// Unknown prompt category or difficulty
    #[error("Invalid {kind}: {value}")]
    InvalidChoice { kind: &'static str, value: String },
}
