//! Side-by-side streaming of two agents
//!
//! Each side runs its own attempt chain:
//!
//! ```text
//! StreamingPrimary ──ok──▶ Done
//!        │err
//!        ▼  (straight to NonStreamingFallback when there is no fallback model)
//! StreamingFallback ──ok──▶ Done
//!        │err
//!        ▼
//! NonStreamingFallback ──ok|err──▶ Done
//! ```
//!
//! Both chains and a fixed render tick share one task. Text buffers sit
//! behind a mutex and the renderer only ever sees cloned snapshots.

use arena_core::{AgentName, BattleResponse};
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::MissedTickBehavior;

use crate::agent_call::call_agent;
use crate::provider::{LlmError, LlmRequest, ModelClient, StreamSink};

/// Interval between combined renders
pub const RENDER_TICK: Duration = Duration::from_millis(100);

/// Multiplexer errors; model failures never surface here
#[derive(Debug, Error)]
pub enum MultiplexError {
    #[error("Render failed: {0}")]
    Render(#[from] io::Error),
}

/// Where a side is in its attempt chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidePhase {
    StreamingPrimary,
    StreamingFallback,
    NonStreamingFallback,
    Done,
}

/// Outcome of the attempt made in the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    Failed,
}

impl SidePhase {
    /// Next phase after an attempt
    pub fn advance(self, outcome: AttemptOutcome, has_fallback: bool) -> SidePhase {
        use AttemptOutcome::*;
        use SidePhase::*;
        match (self, outcome) {
            (Done, _) => Done,
            (_, Succeeded) => Done,
            (StreamingPrimary, Failed) if has_fallback => StreamingFallback,
            (StreamingPrimary, Failed) | (StreamingFallback, Failed) => NonStreamingFallback,
            (NonStreamingFallback, Failed) => Done,
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, SidePhase::StreamingPrimary | SidePhase::StreamingFallback)
    }
}

/// Consistent view of one side
#[derive(Debug, Clone, PartialEq)]
pub struct SideView {
    pub agent: AgentName,
    pub phase: SidePhase,
    pub text: String,
    /// Set once the side is done
    pub time_ms: Option<u64>,
}

impl SideView {
    fn new(agent: AgentName) -> Self {
        Self {
            agent,
            phase: SidePhase::StreamingPrimary,
            text: String::new(),
            time_ms: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase == SidePhase::Done
    }
}

/// Draws the two sides while they stream
pub trait StreamRenderer: Send {
    /// Called once before the first tick
    fn begin(&mut self, _agents: [AgentName; 2]) -> io::Result<()> {
        Ok(())
    }

    fn render(&mut self, sides: &[SideView; 2]) -> io::Result<()>;

    /// Called once after the final render
    fn finish(&mut self, _responses: &[BattleResponse; 2]) -> io::Result<()> {
        Ok(())
    }
}

/// Renderer for headless collection
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl StreamRenderer for NullRenderer {
    fn render(&mut self, _sides: &[SideView; 2]) -> io::Result<()> {
        Ok(())
    }
}

type SharedSide = Arc<Mutex<SideView>>;

fn with_side<T>(side: &SharedSide, f: impl FnOnce(&mut SideView) -> T) -> T {
    let mut guard = side.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

struct SideSink(SharedSide);

impl StreamSink for SideSink {
    fn on_chunk(&self, chunk: &str) {
        with_side(&self.0, |s| s.text.push_str(chunk));
    }
}

/// Runs two agents against one prompt
#[derive(Debug, Clone)]
pub struct BattleStreamer {
    client: Arc<dyn ModelClient>,
    tick: Duration,
}

impl BattleStreamer {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            tick: RENDER_TICK,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Stream both agents to completion.
    ///
    /// Always yields two responses in `agents` order; a side whose whole
    /// chain failed carries an error placeholder. Only a renderer failure is
    /// returned as an error.
    pub async fn run(
        &self,
        agents: [AgentName; 2],
        prompt: &str,
        renderer: &mut dyn StreamRenderer,
    ) -> Result<[BattleResponse; 2], MultiplexError> {
        let sides: [SharedSide; 2] = agents.map(|a| Arc::new(Mutex::new(SideView::new(a))));
        let client = self.client.as_ref();

        renderer.begin(agents)?;

        let both = async {
            tokio::join!(
                run_side(client, agents[0], prompt, &sides[0]),
                run_side(client, agents[1], prompt, &sides[1]),
            )
        };
        tokio::pin!(both);

        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let (left, right) = loop {
            tokio::select! {
                out = &mut both => break out,
                _ = ticker.tick() => renderer.render(&snapshot(&sides))?,
            }
        };

        renderer.render(&snapshot(&sides))?;
        let responses = [left, right];
        renderer.finish(&responses)?;
        Ok(responses)
    }
}

fn snapshot(sides: &[SharedSide; 2]) -> [SideView; 2] {
    [with_side(&sides[0], |s| s.clone()), with_side(&sides[1], |s| s.clone())]
}

async fn run_side(
    client: &dyn ModelClient,
    agent: AgentName,
    prompt: &str,
    side: &SharedSide,
) -> BattleResponse {
    let profile = agent.profile();
    let has_fallback = profile.fallback_model.is_some();
    let sink = SideSink(Arc::clone(side));
    let start = Instant::now();
    let mut first_error: Option<LlmError> = None;
    let mut phase = SidePhase::StreamingPrimary;

    loop {
        with_side(side, |s| {
            s.phase = phase;
            s.text.clear();
        });

        let attempt = match phase {
            SidePhase::Done => break,
            SidePhase::StreamingPrimary => stream_once(client, profile.model, profile.personality, prompt, &sink, start).await,
            SidePhase::StreamingFallback => match profile.fallback_model {
                Some(model) => stream_once(client, model, profile.personality, prompt, &sink, start).await,
                None => Err(LlmError::NotConfigured(format!("no fallback model for {}", agent))),
            },
            SidePhase::NonStreamingFallback => call_agent(client, agent, prompt).await,
        };

        match attempt {
            Ok(response) => {
                let next = phase.advance(AttemptOutcome::Succeeded, has_fallback);
                tracing::debug!(%agent, from = ?phase, to = ?next, time_ms = response.time_ms, "side finished");
                with_side(side, |s| {
                    s.phase = next;
                    s.text = response.response.clone();
                    s.time_ms = Some(response.time_ms);
                });
                return response;
            }
            Err(e) => {
                let next = phase.advance(AttemptOutcome::Failed, has_fallback);
                tracing::warn!(%agent, from = ?phase, to = ?next, error = %e, "side attempt failed");
                first_error.get_or_insert(e);
                phase = next;
            }
        }
    }

    let reason = first_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no response".to_string());
    let response = BattleResponse::placeholder(agent, &reason, start.elapsed().as_millis() as u64);
    with_side(side, |s| {
        s.phase = SidePhase::Done;
        s.text = response.response.clone();
        s.time_ms = Some(response.time_ms);
    });
    response
}

/// One streaming attempt; latency counts from `start`, when the side began,
/// so a fallback's time includes the failed primary
async fn stream_once(
    client: &dyn ModelClient,
    model: &str,
    system: &str,
    prompt: &str,
    sink: &SideSink,
    start: Instant,
) -> Result<BattleResponse, LlmError> {
    let agent = with_side(&sink.0, |s| s.agent);
    let response = client
        .complete_stream(LlmRequest::new(model, system, prompt), sink)
        .await?;
    Ok(BattleResponse::new(
        agent,
        response.content,
        start.elapsed().as_millis() as u64,
    ))
}
