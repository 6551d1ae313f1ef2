//! Model client trait and common types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Completion budget used when a request does not set one
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Errors from model clients
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LlmError {
    /// Non-2xx reply or transport failure; `status` is absent when no reply arrived
    #[error("{model} call failed{}: {body}", status_suffix(.status))]
    RemoteCall {
        model: String,
        status: Option<u16>,
        body: String,
    },

    #[error("{model} timed out after {secs}s")]
    Timeout { model: String, secs: u64 },

    #[error("Model \"{model}\" returned an empty response")]
    EmptyResponse { model: String },

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl LlmError {
    pub fn model(&self) -> Option<&str> {
        match self {
            LlmError::RemoteCall { model, .. }
            | LlmError::Timeout { model, .. }
            | LlmError::EmptyResponse { model } => Some(model),
            LlmError::NotConfigured(_) => None,
        }
    }
}

/// A single chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Model identifier on the routing API
    pub model: String,
    /// System prompt (persona or rubric)
    pub system: String,
    /// User message
    pub prompt: String,
    pub max_tokens: u32,
}

impl LlmRequest {
    pub fn new(model: &str, system: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            system: system.to_string(),
            prompt: prompt.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Completed model reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    /// Model that produced the reply
    pub model: String,
    pub latency_ms: u64,
}

/// Receives incremental output from a streaming completion
pub trait StreamSink: Send + Sync {
    fn on_chunk(&self, chunk: &str);

    fn on_done(&self) {}

    fn on_error(&self, _error: &LlmError) {}
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl StreamSink for DiscardSink {
    fn on_chunk(&self, _chunk: &str) {}
}

/// A chat completion backend
#[async_trait]
pub trait ModelClient: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// One-shot completion
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Streaming completion. Chunks go to `sink` as they arrive and the full
    /// text is returned at the end. Clients without native streaming deliver
    /// the whole reply as a single chunk.
    async fn complete_stream(
        &self,
        request: LlmRequest,
        sink: &dyn StreamSink,
    ) -> Result<LlmResponse, LlmError> {
        match self.complete(request).await {
            Ok(response) => {
                sink.on_chunk(&response.content);
                sink.on_done();
                Ok(response)
            }
            Err(e) => {
                sink.on_error(&e);
                Err(e)
            }
        }
    }
}
