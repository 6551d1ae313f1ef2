//! Judge verdicts and strict parsing of judge replies
//!
//! A judge reply is untrusted model output. It is parsed against a fixed
//! schema and every field is checked against the pair of agents that actually
//! competed; nothing is coerced or defaulted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::agent::AgentName;

/// Lowest score a judge may award
pub const MIN_SCORE: f64 = 1.0;
/// Highest score a judge may award
pub const MAX_SCORE: f64 = 10.0;

/// Why a judge reply was rejected
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VerdictError {
    /// Reply is not a JSON object of the expected shape
    #[error("Invalid verdict JSON: {0}")]
    Malformed(String),

    /// `winner` is not one of the competing agents
    #[error("Invalid verdict field `winner`: {0:?} is not one of the competing agents")]
    InvalidWinner(String),

    /// `scores` lacks a numeric entry for a competing agent
    #[error("Invalid verdict field `scores`: missing score for agent {0}")]
    MissingScore(AgentName),

    /// `scores` entry outside the 1-10 scale
    #[error("Invalid verdict field `scores`: {agent} scored {score}, expected 1-10")]
    ScoreOutOfRange { agent: AgentName, score: f64 },
}

impl VerdictError {
    /// Name of the offending verdict field
    pub fn field(&self) -> &'static str {
        match self {
            VerdictError::Malformed(_) => "verdict",
            VerdictError::InvalidWinner(_) => "winner",
            VerdictError::MissingScore(_) | VerdictError::ScoreOutOfRange { .. } => "scores",
        }
    }
}

/// The judge's decision for one battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeVerdict {
    pub winner: AgentName,
    /// Score per competing agent, 1-10
    pub scores: BTreeMap<AgentName, f64>,
    pub reasoning: String,
}

#[derive(Deserialize)]
struct RawVerdict {
    winner: String,
    scores: serde_json::Map<String, serde_json::Value>,
    reasoning: String,
}

impl JudgeVerdict {
    /// Build a verdict from already-typed parts, applying the same checks as [`JudgeVerdict::parse`]
    pub fn new(
        pair: [AgentName; 2],
        winner: AgentName,
        scores: [f64; 2],
        reasoning: impl Into<String>,
    ) -> Result<Self, VerdictError> {
        if !pair.contains(&winner) {
            return Err(VerdictError::InvalidWinner(winner.to_string()));
        }
        let mut map = BTreeMap::new();
        for (agent, score) in pair.into_iter().zip(scores) {
            check_range(agent, score)?;
            map.insert(agent, score);
        }
        Ok(Self {
            winner,
            scores: map,
            reasoning: reasoning.into(),
        })
    }

    /// Parse a raw judge reply for a battle between `pair`
    pub fn parse(raw: &str, pair: [AgentName; 2]) -> Result<Self, VerdictError> {
        let cleaned = strip_code_fences(raw);
        let parsed: RawVerdict =
            serde_json::from_str(&cleaned).map_err(|e| VerdictError::Malformed(e.to_string()))?;

        let winner = parsed
            .winner
            .parse::<AgentName>()
            .ok()
            .filter(|w| pair.contains(w))
            .ok_or_else(|| VerdictError::InvalidWinner(parsed.winner.clone()))?;

        let mut scores = BTreeMap::new();
        for agent in pair {
            let score = parsed
                .scores
                .get(agent.as_str())
                .and_then(serde_json::Value::as_f64)
                .ok_or(VerdictError::MissingScore(agent))?;
            check_range(agent, score)?;
            scores.insert(agent, score);
        }

        Ok(Self {
            winner,
            scores,
            reasoning: parsed.reasoning.trim().to_string(),
        })
    }

    pub fn score(&self, agent: AgentName) -> Option<f64> {
        self.scores.get(&agent).copied()
    }
}

fn check_range(agent: AgentName, score: f64) -> Result<(), VerdictError> {
    if score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(VerdictError::ScoreOutOfRange { agent, score })
    }
}

/// Remove Markdown code-fence markers (```` ``` ```` or ```` ```json ````) around a reply
pub fn strip_code_fences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        if let Some(after) = rest.strip_prefix("json") {
            rest = after;
        }
        rest = rest.trim_start();
    }
    out.push_str(rest);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIR: [AgentName; 2] = [AgentName::Claude, AgentName::Grok];

    #[test]
    fn test_parse_plain_verdict() {
        let raw = r#"{"winner": "grok", "scores": {"claude": 6, "grok": 8.5}, "reasoning": "Funnier."}"#;
        let verdict = JudgeVerdict::parse(raw, PAIR).unwrap();
        assert_eq!(verdict.winner, AgentName::Grok);
        assert_eq!(verdict.score(AgentName::Claude), Some(6.0));
        assert_eq!(verdict.score(AgentName::Grok), Some(8.5));
        assert_eq!(verdict.reasoning, "Funnier.");
    }

    #[test]
    fn test_parse_fenced_verdict() {
        let raw = "```json\n{\"winner\": \"claude\", \"scores\": {\"claude\": 9, \"grok\": 7}, \"reasoning\": \"Sharper.\"}\n```";
        let verdict = JudgeVerdict::parse(raw, PAIR).unwrap();
        assert_eq!(verdict.winner, AgentName::Claude);

        let bare_fence = "```\n{\"winner\": \"claude\", \"scores\": {\"claude\": 9, \"grok\": 7}, \"reasoning\": \"x\"}```";
        assert!(JudgeVerdict::parse(bare_fence, PAIR).is_ok());
    }

    #[test]
    fn test_foreign_winner_rejected() {
        let raw = r#"{"winner": "gpt", "scores": {"claude": 6, "grok": 8}, "reasoning": "?"}"#;
        let err = JudgeVerdict::parse(raw, PAIR).unwrap_err();
        assert_eq!(err, VerdictError::InvalidWinner("gpt".to_string()));
        assert_eq!(err.field(), "winner");

        let raw = r#"{"winner": "llama", "scores": {"claude": 6, "grok": 8}, "reasoning": "?"}"#;
        assert!(matches!(
            JudgeVerdict::parse(raw, PAIR),
            Err(VerdictError::InvalidWinner(_))
        ));
    }

    #[test]
    fn test_missing_score_rejected() {
        let raw = r#"{"winner": "claude", "scores": {"claude": 6}, "reasoning": "?"}"#;
        let err = JudgeVerdict::parse(raw, PAIR).unwrap_err();
        assert_eq!(err, VerdictError::MissingScore(AgentName::Grok));
        assert_eq!(err.field(), "scores");

        let raw = r#"{"winner": "claude", "scores": {"claude": 6, "grok": "eight"}, "reasoning": "?"}"#;
        assert_eq!(
            JudgeVerdict::parse(raw, PAIR).unwrap_err(),
            VerdictError::MissingScore(AgentName::Grok)
        );
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        let raw = r#"{"winner": "claude", "scores": {"claude": 11, "grok": 4}, "reasoning": "?"}"#;
        assert!(matches!(
            JudgeVerdict::parse(raw, PAIR),
            Err(VerdictError::ScoreOutOfRange { agent: AgentName::Claude, .. })
        ));
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(matches!(
            JudgeVerdict::parse("Claude wins, obviously.", PAIR),
            Err(VerdictError::Malformed(_))
        ));
        let missing_reasoning = r#"{"winner": "claude", "scores": {"claude": 6, "grok": 4}}"#;
        let err = JudgeVerdict::parse(missing_reasoning, PAIR).unwrap_err();
        assert!(err.to_string().contains("reasoning"));
    }

    #[test]
    fn test_new_validates() {
        assert!(JudgeVerdict::new(PAIR, AgentName::Gpt, [5.0, 6.0], "").is_err());
        assert!(JudgeVerdict::new(PAIR, AgentName::Grok, [0.0, 6.0], "").is_err());
        let v = JudgeVerdict::new(PAIR, AgentName::Grok, [5.0, 6.0], "ok").unwrap();
        assert_eq!(v.scores.len(), 2);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {} "), "{}");
    }
}
