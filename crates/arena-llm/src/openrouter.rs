//! OpenRouter chat-completions client
//!
//! One-shot and streaming completions against any OpenAI-compatible
//! `/chat/completions` endpoint, with a hard timeout per request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::provider::{LlmError, LlmRequest, LlmResponse, ModelClient, StreamSink};
use crate::sse::{SseDecoder, SseEvent};

/// Default API base
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// Hard limit for a one-shot completion
pub const COMPLETE_TIMEOUT: Duration = Duration::from_secs(30);
/// Hard limit for a streaming completion, body included
pub const STREAM_TIMEOUT: Duration = Duration::from_secs(60);

const REFERER: &str = "https://github.com/arena-rs/arena";
const TITLE: &str = "Arena";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    max_tokens: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenRouter client
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, OPENROUTER_BASE_URL)
    }

    /// Point at another OpenAI-compatible base URL (proxies, local servers)
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn send(
        &self,
        request: &LlmRequest,
        stream: bool,
        timeout: Duration,
    ) -> Result<reqwest::Response, LlmError> {
        let body = ChatRequest {
            model: &request.model,
            messages: [
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            stream,
        };

        tracing::debug!(model = %request.model, stream, "sending completion request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&request.model, timeout, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RemoteCall {
                model: request.model.clone(),
                status: Some(status.as_u16()),
                body,
            });
        }
        Ok(response)
    }

    async fn read_stream(
        &self,
        request: &LlmRequest,
        mut response: reqwest::Response,
        sink: &dyn StreamSink,
    ) -> Result<String, LlmError> {
        let mut decoder = SseDecoder::new();
        let mut text = String::new();

        while let Some(bytes) = response
            .chunk()
            .await
            .map_err(|e| transport_error(&request.model, STREAM_TIMEOUT, e))?
        {
            for event in decoder.push(&bytes) {
                match event {
                    SseEvent::Delta(delta) => {
                        sink.on_chunk(&delta);
                        text.push_str(&delta);
                    }
                    // remaining bytes are ignored once the marker arrives
                    SseEvent::Done => return Ok(text),
                }
            }
        }
        if let Some(SseEvent::Delta(delta)) = decoder.finish() {
            sink.on_chunk(&delta);
            text.push_str(&delta);
        }
        Ok(text)
    }
}

fn transport_error(model: &str, timeout: Duration, e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout {
            model: model.to_string(),
            secs: timeout.as_secs(),
        }
    } else {
        LlmError::RemoteCall {
            model: model.to_string(),
            status: e.status().map(|s| s.as_u16()),
            body: e.to_string(),
        }
    }
}

#[async_trait]
impl ModelClient for OpenRouterClient {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        let response = self.send(&request, false, COMPLETE_TIMEOUT).await?;

        let parsed: ChatResponse = response.json().await.map_err(|e| LlmError::RemoteCall {
            model: request.model.clone(),
            status: None,
            body: format!("invalid response body: {}", e),
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyResponse {
                model: request.model.clone(),
            })?;

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
        let outcome = match self.send(&request, true, STREAM_TIMEOUT).await {
            Ok(response) => self.read_stream(&request, response, sink).await,
            Err(e) => Err(e),
        };

        let outcome = outcome.and_then(|text| {
            if text.trim().is_empty() {
                Err(LlmError::EmptyResponse {
                    model: request.model.clone(),
                })
            } else {
                Ok(text)
            }
        });

        match outcome {
            Ok(content) => {
                sink.on_done();
                Ok(LlmResponse {
                    content,
                    model: request.model,
                    latency_ms: start.elapsed().as_millis() as u64,
                })
            }
            Err(e) => {
                tracing::warn!(model = %request.model, error = %e, "streaming completion failed");
                sink.on_error(&e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let req = LlmRequest::new("z-ai/glm-5", "persona", "question");
        let body = ChatRequest {
            model: &req.model,
            messages: [
                Message { role: "system", content: &req.system },
                Message { role: "user", content: &req.prompt },
            ],
            max_tokens: req.max_tokens,
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "z-ai/glm-5");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "question");
        assert_eq!(json["max_tokens"], 1024);
        assert!(json.get("stream").is_none());
    }

    #[test]
    fn test_base_url_normalised() {
        let client = OpenRouterClient::with_base_url("k", "http://localhost:9000/v1/");
        assert_eq!(client.endpoint(), "http://localhost:9000/v1/chat/completions");
        assert_eq!(OpenRouterClient::new("k").endpoint(), "https://openrouter.ai/api/v1/chat/completions");
    }
}
