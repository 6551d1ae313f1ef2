//! Session context shared by every command
//!
//! Owns the model client, judge, recorder and the current `GameState`. Each
//! step of a battle is a separate method so the menu can slot the audience
//! vote in between collecting replies and judging them.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use arena_anchor::{
    BattleRecorder, ContentStore, EvmLedger, FileLedger, LedgerBackend, LedgerError, PinataStore,
    Recording,
};
use arena_core::{
    report, AgentName, BattlePrompt, BattleResponse, BattleResult, Category, Difficulty,
    GameState, JudgeVerdict, PromptCatalog, Tournament,
};
use arena_llm::{
    ArenaConfig, BattleStreamer, BattleSummary, Judge, JudgeError, MockClient, ModelClient,
    OpenRouterClient, ProviderKind, StreamRenderer, Summarizer,
};

/// Where exported markdown reports go
pub const REPORTS_DIR: &str = "./reports";

/// Ratings of a pair before and after one battle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingChange {
    pub agent: AgentName,
    pub before: i32,
    pub after: i32,
}

/// A judged battle and how it moved the ratings
#[derive(Debug, Clone)]
pub struct Concluded {
    pub result: BattleResult,
    pub changes: [RatingChange; 2],
}

/// Build the model client the configuration asks for
pub fn build_client(config: &ArenaConfig) -> Result<Arc<dyn ModelClient>> {
    match config.provider {
        ProviderKind::Mock => Ok(Arc::new(
            MockClient::smart().with_chunk_delay(Duration::from_millis(15)),
        )),
        ProviderKind::OpenRouter => {
            let key = config.require_api_key()?;
            Ok(Arc::new(OpenRouterClient::with_base_url(key, &config.base_url)))
        }
    }
}

/// Build the recorder: an EVM ledger when the chain is configured, otherwise
/// the local file ledger when one is set, plus Pinata when a JWT is present
pub fn build_recorder(config: &ArenaConfig) -> Result<BattleRecorder> {
    let ledger: Option<Arc<dyn LedgerBackend>> = match (
        &config.rpc_url,
        &config.wallet_address,
        &config.contract_address,
        &config.ledger_file,
    ) {
        (Some(rpc), Some(wallet), Some(contract), _) => Some(Arc::new(
            EvmLedger::new(rpc.as_str(), wallet.as_str(), contract.as_str())
                .context("Failed to set up the EVM ledger")?,
        )),
        (_, _, _, Some(path)) => Some(Arc::new(FileLedger::new(path.clone()))),
        _ => None,
    };
    let store: Option<Arc<dyn ContentStore>> = config
        .pinata_jwt
        .as_deref()
        .map(|jwt| Arc::new(PinataStore::new(jwt)) as Arc<dyn ContentStore>);
    Ok(BattleRecorder::new(ledger, store))
}

/// Everything a session needs
pub struct Arena {
    streamer: BattleStreamer,
    judge: Judge,
    summarizer: Summarizer,
    recorder: BattleRecorder,
    catalog: PromptCatalog,
    state: GameState,
}

impl Arena {
    pub fn from_config(config: ArenaConfig) -> Result<Self> {
        let client = build_client(&config)?;
        let recorder = build_recorder(&config)?;
        Ok(Self::with_parts(&config, client, recorder))
    }

    pub fn with_parts(
        config: &ArenaConfig,
        client: Arc<dyn ModelClient>,
        recorder: BattleRecorder,
    ) -> Self {
        tracing::info!(
            provider = %config.provider,
            client = client.name(),
            judge = %config.judge_model,
            ledger = recorder.ledger_name().unwrap_or("none"),
            "arena ready"
        );
        Self {
            streamer: BattleStreamer::new(client.clone()),
            judge: Judge::with_model(client.clone(), &config.judge_model),
            summarizer: Summarizer::with_model(client, &config.judge_model),
            recorder,
            catalog: PromptCatalog::builtin(),
            state: GameState::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn recorder(&self) -> &BattleRecorder {
        &self.recorder
    }

    pub fn judge_model(&self) -> &str {
        self.judge.model()
    }

    /// A prompt for the category (`None` for any) at the difficulty
    pub fn pick_prompt(&self, category: Option<Category>, difficulty: Difficulty) -> Result<BattlePrompt> {
        self.catalog
            .select(category, difficulty, &mut rand::rng())
            .cloned()
            .ok_or_else(|| anyhow!("No {} prompt available", difficulty))
    }

    /// A bracket over the full roster, seeded at random
    pub fn new_tournament(&self, category: Option<Category>) -> Result<Tournament> {
        Ok(Tournament::create(AgentName::ALL, category, &mut rand::rng())?)
    }

    /// Both replies, drawn through the renderer while they stream
    pub async fn collect(
        &self,
        pair: [AgentName; 2],
        prompt: &BattlePrompt,
        renderer: &mut dyn StreamRenderer,
    ) -> Result<[BattleResponse; 2]> {
        Ok(self.streamer.run(pair, &prompt.prompt, renderer).await?)
    }

    pub async fn summarize(&self, responses: &[BattleResponse; 2]) -> [BattleSummary; 2] {
        self.summarizer.summarize_battle(responses).await
    }

    pub async fn judge(
        &self,
        prompt: &BattlePrompt,
        responses: &[BattleResponse; 2],
    ) -> Result<JudgeVerdict, JudgeError> {
        self.judge.judge(prompt, responses).await
    }

    /// Fold a judged battle into the standings, counting the audience vote
    pub fn conclude(
        &mut self,
        prompt: BattlePrompt,
        pair: [AgentName; 2],
        responses: [BattleResponse; 2],
        verdict: JudgeVerdict,
        vote: Option<AgentName>,
    ) -> Result<Concluded> {
        let judge_winner = verdict.winner;
        let result = BattleResult::assemble(prompt, pair, responses, verdict)?;
        let before = pair.map(|a| self.state.agent(a).elo);

        let mut next = self.state.apply_result(result.clone())?;
        if let Some(pick) = vote {
            next = next.record_vote(pick, judge_winner);
        }
        self.state = next;

        let changes = [0usize, 1].map(|i| RatingChange {
            agent: pair[i],
            before: before[i],
            after: self.state.agent(pair[i]).elo,
        });
        Ok(Concluded { result, changes })
    }

    /// Archive and record a battle, then attach the receipts in history
    pub async fn record(&mut self, result: &mut BattleResult) -> Result<Recording, LedgerError> {
        let recording = self.recorder.record(result).await?;
        let tx_hash = Some(recording.receipt.tx_hash.clone());
        let cid = recording.receipt.ipfs_cid.clone();
        result.attach_receipts(tx_hash.clone(), cid.clone());
        self.state = self.state.attach_receipts(result.id, tx_hash, cid);
        Ok(recording)
    }

    /// Gateway link for a content id, when a store is configured
    pub fn archive_link(&self, cid: &str) -> Option<String> {
        self.recorder.store().map(|s| s.link(cid))
    }
}

/// Write a battle report under `dir`, returning the file path
pub async fn export_battle_report(dir: &Path, result: &BattleResult) -> Result<std::path::PathBuf> {
    write_report(dir, &report::battle_report_name(result), &report::battle_report(result)).await
}

/// Write a tournament report under `dir`, returning the file path
pub async fn export_tournament_report(dir: &Path, tournament: &Tournament) -> Result<std::path::PathBuf> {
    write_report(
        dir,
        &report::tournament_report_name(tournament),
        &report::tournament_report(tournament),
    )
    .await
}

async fn write_report(dir: &Path, name: &str, body: &str) -> Result<std::path::PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(name);
    tokio::fs::write(&path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_llm::NullRenderer;

    fn offline() -> Arena {
        let config = ArenaConfig {
            provider: ProviderKind::Mock,
            judge_model: "judge-model".into(),
            ..Default::default()
        };
        Arena::with_parts(&config, Arc::new(MockClient::smart()), BattleRecorder::default())
    }

    #[test]
    fn test_openrouter_needs_key() {
        let config = ArenaConfig::default();
        assert!(build_client(&config).is_err());

        let config = ArenaConfig {
            provider: ProviderKind::Mock,
            ..Default::default()
        };
        assert_eq!(build_client(&config).unwrap().name(), "mock");
    }

    #[test]
    fn test_recorder_selection() {
        assert!(!build_recorder(&ArenaConfig::default()).unwrap().is_enabled());

        let config = ArenaConfig {
            ledger_file: Some("ledger.jsonl".into()),
            ..Default::default()
        };
        assert_eq!(build_recorder(&config).unwrap().ledger_name(), Some("file"));

        let config = ArenaConfig {
            rpc_url: Some("http://127.0.0.1:8545".into()),
            wallet_address: Some("0xfrom".into()),
            contract_address: Some("0xcontract".into()),
            ledger_file: Some("ledger.jsonl".into()),
            pinata_jwt: Some("jwt".into()),
            ..Default::default()
        };
        let recorder = build_recorder(&config).unwrap();
        assert_eq!(recorder.ledger_name(), Some("evm"));
        assert!(recorder.store().is_some());
    }

    #[tokio::test]
    async fn test_offline_battle_updates_standings() {
        let mut arena = offline();
        let pair = [AgentName::Claude, AgentName::Deepseek];
        let prompt = arena.pick_prompt(Some(Category::Riddle), Difficulty::Medium).unwrap();

        let responses = arena.collect(pair, &prompt, &mut NullRenderer).await.unwrap();
        let verdict = arena.judge(&prompt, &responses).await.unwrap();
        let winner = verdict.winner;
        let concluded = arena
            .conclude(prompt, pair, responses, verdict, Some(winner))
            .unwrap();

        assert_eq!(arena.state().battle_history().len(), 1);
        assert_eq!(arena.state().vote_stats().agreed_with_judge, 1);
        let won = concluded.changes.iter().find(|c| c.agent == winner).unwrap();
        assert_eq!((won.before, won.after), (1000, 1016));
    }

    #[tokio::test]
    async fn test_record_without_ledger_fails() {
        let mut arena = offline();
        let pair = [AgentName::Gpt, AgentName::Glm];
        let prompt = arena.pick_prompt(None, Difficulty::Easy).unwrap();
        let responses = arena.collect(pair, &prompt, &mut NullRenderer).await.unwrap();
        let verdict = arena.judge(&prompt, &responses).await.unwrap();
        let mut concluded = arena.conclude(prompt, pair, responses, verdict, None).unwrap();

        let err = arena.record(&mut concluded.result).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotConfigured(_)));
        assert!(!arena.state().battle_history()[0].is_recorded());
    }
}
