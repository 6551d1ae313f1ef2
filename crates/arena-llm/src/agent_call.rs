//! One-shot agent calls with a single fallback

use arena_core::{AgentName, BattleResponse};
use std::time::Instant;

use crate::provider::{LlmError, LlmRequest, ModelClient};

/// Ask `agent` the battle prompt with its persona.
///
/// The primary model is tried first; on any failure the agent's fallback
/// model, if it has one, gets exactly one more attempt. `time_ms` covers the
/// attempt that succeeded.
pub async fn call_agent(
    client: &dyn ModelClient,
    agent: AgentName,
    prompt: &str,
) -> Result<BattleResponse, LlmError> {
    let profile = agent.profile();

    let start = Instant::now();
    let primary = client
        .complete(LlmRequest::new(profile.model, profile.personality, prompt))
        .await;

    let (response, start) = match (primary, profile.fallback_model) {
        (Ok(response), _) => (response, start),
        (Err(e), Some(fallback)) => {
            tracing::warn!(%agent, model = profile.model, error = %e, fallback, "primary model failed, retrying on fallback");
            let start = Instant::now();
            let response = client
                .complete(LlmRequest::new(fallback, profile.personality, prompt))
                .await?;
            (response, start)
        }
        (Err(e), None) => return Err(e),
    };

    Ok(BattleResponse::new(
        agent,
        response.content,
        start.elapsed().as_millis() as u64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCall, MockClient};

    fn down(model: &str) -> LlmError {
        LlmError::RemoteCall {
            model: model.to_string(),
            status: Some(503),
            body: "down".into(),
        }
    }

    #[tokio::test]
    async fn test_primary_success() {
        let mock = MockClient::smart().reply("x-ai/grok-4.1-fast", "primary answer");
        let r = call_agent(&mock, AgentName::Grok, "hi").await.unwrap();
        assert_eq!(r.agent, AgentName::Grok);
        assert_eq!(r.response, "primary answer");
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_used_once() {
        let mock = MockClient::smart()
            .fail("x-ai/grok-4.1-fast", down("x-ai/grok-4.1-fast"))
            .reply("x-ai/grok-beta", "fallback answer");
        let r = call_agent(&mock, AgentName::Grok, "hi").await.unwrap();
        assert_eq!(r.response, "fallback answer");
        assert_eq!(
            mock.calls(),
            vec![
                MockCall { model: "x-ai/grok-4.1-fast".into(), streaming: false },
                MockCall { model: "x-ai/grok-beta".into(), streaming: false },
            ]
        );
    }

    #[tokio::test]
    async fn test_no_fallback_propagates() {
        let mock = MockClient::smart().fail("anthropic/claude-opus-4.6", down("anthropic/claude-opus-4.6"));
        let err = call_agent(&mock, AgentName::Claude, "hi").await.unwrap_err();
        assert_eq!(err, down("anthropic/claude-opus-4.6"));
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_both_fail_propagates_fallback_error() {
        let mock = MockClient::smart()
            .fail("z-ai/glm-5", down("z-ai/glm-5"))
            .fail("z-ai/glm-4", down("z-ai/glm-4"));
        let err = call_agent(&mock, AgentName::Glm, "hi").await.unwrap_err();
        assert_eq!(err.model(), Some("z-ai/glm-4"));
        assert_eq!(mock.calls().len(), 2);
    }
}
