//! Mock model client for tests and offline play

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::provider::{LlmError, LlmRequest, LlmResponse, ModelClient, StreamSink};

/// Scripted behaviour for one model
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Reply with this text; streamed word by word
    Text(String),
    /// Fail every call with this error
    Fail(LlmError),
}

/// A call seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub model: String,
    pub streaming: bool,
}

/// Model client that answers from a script, or with generated replies for
/// models it has no script for
#[derive(Debug, Default)]
pub struct MockClient {
    script: HashMap<String, MockReply>,
    calls: Mutex<Vec<MockCall>>,
    /// Pause before each streamed chunk
    chunk_delay: Duration,
    /// Pause before answering, per model
    latency: HashMap<String, Duration>,
}

impl MockClient {
    /// Generated replies for every model
    pub fn smart() -> Self {
        Self::default()
    }

    /// Script a reply for `model`
    pub fn reply(mut self, model: &str, text: &str) -> Self {
        self.script
            .insert(model.to_string(), MockReply::Text(text.to_string()));
        self
    }

    /// Make every call to `model` fail
    pub fn fail(mut self, model: &str, error: LlmError) -> Self {
        self.script.insert(model.to_string(), MockReply::Fail(error));
        self
    }

    /// Wait `delay` before every answer (or failure) from `model`
    pub fn with_latency(mut self, model: &str, delay: Duration) -> Self {
        self.latency.insert(model.to_string(), delay);
        self
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, model: &str, streaming: bool) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MockCall {
                model: model.to_string(),
                streaming,
            });
    }

    async fn answer(&self, request: &LlmRequest) -> Result<String, LlmError> {
        if let Some(delay) = self.latency.get(&request.model) {
            tokio::time::sleep(*delay).await;
        }
        match self.script.get(&request.model) {
            Some(MockReply::Text(text)) if text.is_empty() => Err(LlmError::EmptyResponse {
                model: request.model.clone(),
            }),
            Some(MockReply::Text(text)) => Ok(text.clone()),
            Some(MockReply::Fail(e)) => Err(e.clone()),
            None => Ok(generate_reply(request)),
        }
    }
}

/// Reply shaped by the system prompt: verdict JSON for the judge, a short
/// digest for the summarizer, otherwise an in-character answer
fn generate_reply(request: &LlmRequest) -> String {
    let system = request.system.to_lowercase();

    if system.contains("judge") {
        return generate_verdict(&request.prompt);
    }

    if system.contains("summarizer") {
        let body = request
            .prompt
            .split_once("\n\n")
            .map(|(_, b)| b)
            .unwrap_or(&request.prompt);
        let first = body.split_terminator(['.', '\n']).next().unwrap_or(body).trim();
        return format!("The agent argues: {}.", first);
    }

    let challenge: String = request.prompt.chars().take(60).collect();
    format!(
        "Challenge accepted. On \"{}\" my answer is simple: \
         start from first principles, commit to one bold idea and \
         deliver it with style. ({} signing off.)",
        challenge.trim(),
        request.model
    )
}

/// Pick the longer response as the winner
fn generate_verdict(prompt: &str) -> String {
    let mut entries: Vec<(String, usize)> = Vec::new();
    for line in prompt.lines() {
        if let Some(rest) = line.strip_prefix("--- ") {
            if let Some((agent, _)) = rest.split_once(" (responded") {
                entries.push((agent.to_string(), 0));
                continue;
            }
        }
        if line.starts_with("Judge these responses") {
            break;
        }
        if let Some(last) = entries.last_mut() {
            last.1 += line.len();
        }
    }

    match entries.as_slice() {
        [(a, len_a), (b, len_b), ..] => {
            let (winner, loser) = if len_a >= len_b { (a, b) } else { (b, a) };
            format!(
                "{{\"winner\": \"{}\", \"scores\": {{\"{}\": 8, \"{}\": 6}}, \"reasoning\": \"{} gave the fuller answer.\"}}",
                winner, winner, loser, winner
            )
        }
        _ => "I cannot judge without two responses.".to_string(),
    }
}

#[async_trait]
impl ModelClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        self.record(&request.model, false);
        let content = self.answer(&request).await?;
        Ok(LlmResponse {
            content,
            model: request.model,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn complete_stream(
        &self,
        request: LlmRequest,
        sink: &dyn StreamSink,
    ) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        self.record(&request.model, true);
        let content = match self.answer(&request).await {
            Ok(content) => content,
            Err(e) => {
                sink.on_error(&e);
                return Err(e);
            }
        };

        for word in content.split_inclusive(' ') {
            if !self.chunk_delay.is_zero() {
                tokio::time::sleep(self.chunk_delay).await;
            }
            sink.on_chunk(word);
        }
        sink.on_done();

        Ok(LlmResponse {
            content,
            model: request.model,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Collect(Mutex<String>);

    impl StreamSink for Collect {
        fn on_chunk(&self, chunk: &str) {
            self.0.lock().unwrap().push_str(chunk);
        }
    }

    #[tokio::test]
    async fn test_scripted_reply_streams() {
        let mock = MockClient::smart().reply("m", "one two three");
        let sink = Collect(Mutex::new(String::new()));
        let response = mock
            .complete_stream(LlmRequest::new("m", "s", "p"), &sink)
            .await
            .unwrap();
        assert_eq!(response.content, "one two three");
        assert_eq!(*sink.0.lock().unwrap(), "one two three");
        assert_eq!(mock.calls(), vec![MockCall { model: "m".into(), streaming: true }]);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let mock = MockClient::smart().fail(
            "bad",
            LlmError::Timeout { model: "bad".into(), secs: 30 },
        );
        let err = mock.complete(LlmRequest::new("bad", "s", "p")).await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout { .. }));

        let empty = MockClient::smart().reply("quiet", "");
        assert!(matches!(
            empty.complete(LlmRequest::new("quiet", "s", "p")).await,
            Err(LlmError::EmptyResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_smart_judge_reply() {
        let prompt = "Category: code\nChallenge: FizzBuzz\n\n\
                      --- gpt (responded in 10ms) ---\nshort\n\n\
                      --- glm (responded in 12ms) ---\na much longer answer here\n\n\
                      Judge these responses. Return ONLY the JSON verdict.";
        let mock = MockClient::smart();
        let reply = mock
            .complete(LlmRequest::new("judge", "You are a fair judge", prompt))
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&reply.content).unwrap();
        assert_eq!(json["winner"], "glm");
        assert_eq!(json["scores"]["gpt"], 6);
    }
}
