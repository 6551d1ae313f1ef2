//! # Arena LLM
//!
//! Model access for arena battles.
//!
//! ## Clients
//!
//! | Client | Type | Key Required |
//! |--------|------|--------------|
//! | OpenRouter | API | `OPENROUTER_API_KEY` |
//! | Mock | Offline / testing | None |
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use arena_core::AgentName;
//! use arena_llm::{BattleStreamer, MockClient, NullRenderer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let streamer = BattleStreamer::new(Arc::new(MockClient::smart()));
//!     let responses = streamer
//!         .run([AgentName::Claude, AgentName::Grok], "Roast a semicolon.", &mut NullRenderer)
//!         .await
//!         .unwrap();
//!     assert_eq!(responses[1].agent, AgentName::Grok);
//! }
//! ```

pub mod agent_call;
pub mod config;
pub mod judge;
pub mod mock;
pub mod multiplex;
pub mod openrouter;
pub mod provider;
pub mod sse;
pub mod summarize;

pub use agent_call::call_agent;
pub use config::{ArenaConfig, ConfigError, KeyStatus, ProviderKind, DEFAULT_JUDGE_MODEL};
pub use judge::{build_user_prompt, Judge, JudgeError, JUDGE_SYSTEM_PROMPT};
pub use mock::{MockCall, MockClient, MockReply};
pub use multiplex::{
    AttemptOutcome, BattleStreamer, MultiplexError, NullRenderer, SidePhase, SideView,
    StreamRenderer, RENDER_TICK,
};
pub use openrouter::OpenRouterClient;
pub use provider::{
    DiscardSink, LlmError, LlmRequest, LlmResponse, ModelClient, StreamSink, DEFAULT_MAX_TOKENS,
};
pub use sse::{SseDecoder, SseEvent};
pub use summarize::{BattleSummary, Summarizer};
