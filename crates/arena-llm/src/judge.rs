//! Judge adapter: one completion with a fixed rubric, strictly parsed

use arena_core::{BattlePrompt, BattleResponse, JudgeVerdict, VerdictError};
use std::fmt::Write;
use std::sync::Arc;
use thiserror::Error;

use crate::config::DEFAULT_JUDGE_MODEL;
use crate::provider::{LlmError, LlmRequest, ModelClient};

/// Rubric given to the judge model
pub const JUDGE_SYSTEM_PROMPT: &str = "You are a fair and impartial open-source AI judge in an AI battle arena. \
You are judging AI agents head to head. Be brutally honest and fair. \
Score each agent 1-10 on: creativity (30%), accuracy (30%), clarity (20%), entertainment (20%). \
Respond ONLY in this exact JSON format on a single line, no markdown, no backticks:\n\
{\"winner\": \"agent_name\", \"scores\": {\"agent1_name\": 7, \"agent2_name\": 5}, \"reasoning\": \"One sentence explaining your verdict.\"}\n\
Replace agent1_name and agent2_name with the actual agent names provided. \
The winner must be the agent with the higher weighted score.";

/// Judging failures; either aborts the battle
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("Judge call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Judge returned an invalid verdict ({}): {}", .0.field(), .0)]
    InvalidVerdict(#[from] VerdictError),
}

/// User message listing the challenge and both responses
pub fn build_user_prompt(prompt: &BattlePrompt, responses: &[BattleResponse; 2]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Category: {}", prompt.category);
    let _ = writeln!(out, "Challenge: {}", prompt.prompt);
    out.push('\n');
    for r in responses {
        let _ = writeln!(out, "--- {} (responded in {}ms) ---", r.agent, r.time_ms);
        let _ = writeln!(out, "{}", r.response);
        out.push('\n');
    }
    out.push_str("Judge these responses. Return ONLY the JSON verdict.");
    out
}

/// Asks a judge model to pick a winner
#[derive(Debug, Clone)]
pub struct Judge {
    client: Arc<dyn ModelClient>,
    model: String,
}

impl Judge {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self::with_model(client, DEFAULT_JUDGE_MODEL)
    }

    pub fn with_model(client: Arc<dyn ModelClient>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Judge one battle. The verdict's winner is guaranteed to be one of the
    /// two responding agents.
    pub async fn judge(
        &self,
        prompt: &BattlePrompt,
        responses: &[BattleResponse; 2],
    ) -> Result<JudgeVerdict, JudgeError> {
        let pair = [responses[0].agent, responses[1].agent];
        let request = LlmRequest::new(&self.model, JUDGE_SYSTEM_PROMPT, &build_user_prompt(prompt, responses));

        let reply = self.client.complete(request).await?;
        match JudgeVerdict::parse(&reply.content, pair) {
            Ok(verdict) => {
                tracing::info!(winner = %verdict.winner, judge = %self.model, "verdict parsed");
                Ok(verdict)
            }
            Err(e) => {
                tracing::warn!(field = e.field(), error = %e, raw = %reply.content, "rejected judge reply");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockClient;
    use arena_core::{AgentName, Category, Difficulty};

    fn setup() -> (BattlePrompt, [BattleResponse; 2]) {
        (
            BattlePrompt::new(Category::Riddle, Difficulty::Medium, "What has keys but no locks?"),
            [
                BattleResponse::new(AgentName::Kimi, "A piano.", 800),
                BattleResponse::new(AgentName::Gemini, "A keyboard, or a piano.", 950),
            ],
        )
    }

    #[test]
    fn test_user_prompt_format() {
        let (prompt, responses) = setup();
        let text = build_user_prompt(&prompt, &responses);
        assert!(text.starts_with("Category: riddle\nChallenge: What has keys but no locks?\n\n"));
        assert!(text.contains("--- kimi (responded in 800ms) ---\nA piano.\n"));
        assert!(text.contains("--- gemini (responded in 950ms) ---"));
        assert!(text.ends_with("Return ONLY the JSON verdict."));
    }

    #[tokio::test]
    async fn test_fenced_verdict_accepted() {
        let (prompt, responses) = setup();
        let mock = MockClient::smart().reply(
            DEFAULT_JUDGE_MODEL,
            "```json\n{\"winner\": \"gemini\", \"scores\": {\"kimi\": 6, \"gemini\": 7.5}, \"reasoning\": \"Covers both.\"}\n```",
        );
        let judge = Judge::new(Arc::new(mock));
        let verdict = judge.judge(&prompt, &responses).await.unwrap();
        assert_eq!(verdict.winner, AgentName::Gemini);
        assert_eq!(verdict.score(AgentName::Gemini), Some(7.5));
    }

    #[tokio::test]
    async fn test_foreign_winner_rejected() {
        let (prompt, responses) = setup();
        let mock = MockClient::smart().reply(
            "judge-x",
            "{\"winner\": \"claude\", \"scores\": {\"kimi\": 6, \"gemini\": 7}, \"reasoning\": \"?\"}",
        );
        let judge = Judge::with_model(Arc::new(mock), "judge-x");
        let err = judge.judge(&prompt, &responses).await.unwrap_err();
        assert!(matches!(err, JudgeError::InvalidVerdict(VerdictError::InvalidWinner(_))));
        assert!(err.to_string().contains("(winner)"));
    }

    #[tokio::test]
    async fn test_missing_score_rejected() {
        let (prompt, responses) = setup();
        let mock = MockClient::smart().reply(
            DEFAULT_JUDGE_MODEL,
            "{\"winner\": \"kimi\", \"scores\": {\"kimi\": 6}, \"reasoning\": \"?\"}",
        );
        let err = Judge::new(Arc::new(mock)).judge(&prompt, &responses).await.unwrap_err();
        assert!(matches!(
            err,
            JudgeError::InvalidVerdict(VerdictError::MissingScore(AgentName::Gemini))
        ));
        assert_eq!(
            err.to_string(),
            "Judge returned an invalid verdict (scores): Invalid verdict field `scores`: missing score for agent gemini"
        );
    }

    #[tokio::test]
    async fn test_smart_mock_judges_offline() {
        let (prompt, responses) = setup();
        let judge = Judge::new(Arc::new(MockClient::smart()));
        let verdict = judge.judge(&prompt, &responses).await.unwrap();
        assert_eq!(verdict.winner, AgentName::Gemini);
    }
}
