//! Short summaries of battle responses for compact displays

use arena_core::{AgentName, BattleResponse};
use std::sync::Arc;

use crate::config::DEFAULT_JUDGE_MODEL;
use crate::provider::{LlmRequest, ModelClient};

const SUMMARY_SYSTEM_PROMPT: &str = "You are a concise summarizer for an AI battle arena. \
Summarize the following AI agent response in exactly 2-3 sentences. \
Focus on the key argument, approach, or creative angle. \
Be direct and informative. Do not include any preamble.";

/// Longest input sent to the summary model, in characters
pub const MAX_INPUT_CHARS: usize = 3000;
/// Length of the excerpt used when summarizing fails, in characters
pub const FALLBACK_CHARS: usize = 200;
const SUMMARY_MAX_TOKENS: u32 = 256;

/// A response condensed to a few sentences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleSummary {
    pub agent: AgentName,
    pub summary: String,
    /// True when this is a plain excerpt rather than a model summary
    pub is_fallback: bool,
}

/// Summarizes responses with a small model
#[derive(Debug, Clone)]
pub struct Summarizer {
    client: Arc<dyn ModelClient>,
    model: String,
}

impl Summarizer {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self::with_model(client, DEFAULT_JUDGE_MODEL)
    }

    pub fn with_model(client: Arc<dyn ModelClient>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    /// Never fails: falls back to an excerpt of the response
    pub async fn summarize(&self, response: &BattleResponse) -> BattleSummary {
        let input = truncate_input(&response.response);
        let request = LlmRequest::new(
            &self.model,
            SUMMARY_SYSTEM_PROMPT,
            &format!("Summarize this response:\n\n{}", input),
        )
        .with_max_tokens(SUMMARY_MAX_TOKENS);

        match self.client.complete(request).await {
            Ok(reply) => BattleSummary {
                agent: response.agent,
                summary: reply.content.trim().to_string(),
                is_fallback: false,
            },
            Err(e) => {
                tracing::debug!(agent = %response.agent, error = %e, "summary failed, using excerpt");
                BattleSummary {
                    agent: response.agent,
                    summary: excerpt(&response.response),
                    is_fallback: true,
                }
            }
        }
    }

    /// Summarize both sides concurrently
    pub async fn summarize_battle(&self, responses: &[BattleResponse; 2]) -> [BattleSummary; 2] {
        let (a, b) = tokio::join!(self.summarize(&responses[0]), self.summarize(&responses[1]));
        [a, b]
    }
}

fn truncate_input(text: &str) -> String {
    if text.chars().count() > MAX_INPUT_CHARS {
        let head: String = text.chars().take(MAX_INPUT_CHARS).collect();
        format!("{}\n\n[truncated]", head)
    } else {
        text.to_string()
    }
}

fn excerpt(text: &str) -> String {
    let head: String = text.chars().take(FALLBACK_CHARS).collect();
    if text.chars().count() > FALLBACK_CHARS {
        format!("{}...", head.trim())
    } else {
        head.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockClient;
    use crate::provider::LlmError;

    #[test]
    fn test_truncation() {
        let long = "x".repeat(MAX_INPUT_CHARS + 10);
        let input = truncate_input(&long);
        assert!(input.ends_with("[truncated]"));
        assert_eq!(input.chars().filter(|c| *c == 'x').count(), MAX_INPUT_CHARS);
        assert_eq!(truncate_input("short"), "short");

        assert_eq!(excerpt(&"é".repeat(250)).chars().count(), FALLBACK_CHARS + 3);
        assert_eq!(excerpt("  brief  "), "brief");
    }

    #[tokio::test]
    async fn test_summary_and_fallback() {
        let ok = Summarizer::with_model(
            Arc::new(MockClient::smart().reply("sum", "  It argues for tabs.  ")),
            "sum",
        );
        let response = BattleResponse::new(AgentName::Gpt, "Tabs are better because...", 10);
        let s = ok.summarize(&response).await;
        assert_eq!(s.summary, "It argues for tabs.");
        assert!(!s.is_fallback);

        let failing = Summarizer::with_model(
            Arc::new(MockClient::smart().fail("sum", LlmError::NotConfigured("no key".into()))),
            "sum",
        );
        let long = BattleResponse::new(AgentName::Gpt, "y".repeat(300), 10);
        let [a, b] = failing.summarize_battle(&[response.clone(), long]).await;
        assert!(a.is_fallback && b.is_fallback);
        assert_eq!(a.summary, "Tabs are better because...");
        assert!(b.summary.ends_with("..."));
        assert_eq!(b.summary.len(), FALLBACK_CHARS + 3);
    }
}
