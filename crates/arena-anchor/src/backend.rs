//! Record types and the ledger / content-store traits

use arena_core::{AgentName, BattleResult, Category};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::LedgerError;

/// The part of a battle that goes on the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub battle_id: Uuid,
    pub winner: AgentName,
    pub loser: AgentName,
    /// Judge scores rounded to whole points
    pub winner_score: u8,
    pub loser_score: u8,
    pub category: Category,
    pub reasoning: String,
    /// Full battle archive, when uploaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipfs_cid: Option<String>,
}

fn rounded(score: Option<f64>) -> u8 {
    score.map(|s| s.round().clamp(0.0, u8::MAX as f64) as u8).unwrap_or(0)
}

impl BattleRecord {
    pub fn from_result(result: &BattleResult, ipfs_cid: Option<String>) -> Self {
        let winner = result.winner();
        let loser = result.loser();
        Self {
            battle_id: result.id,
            winner,
            loser,
            winner_score: rounded(result.verdict.score(winner)),
            loser_score: rounded(result.verdict.score(loser)),
            category: result.prompt.category,
            reasoning: result.verdict.reasoning.clone(),
            ipfs_cid,
        }
    }

    /// Compact JSON form used as the on-ledger payload
    pub fn to_payload(&self) -> Result<Vec<u8>, LedgerError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// SHA-256 of the payload, hex encoded
    pub fn digest(&self) -> Result<String, LedgerError> {
        Ok(hex::encode(Sha256::digest(self.to_payload()?)))
    }
}

/// Proof that a record was accepted by a ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    /// Backend that accepted the record
    pub backend: String,
    /// Transaction hash or equivalent reference
    pub tx_hash: String,
    /// Block number or entry number
    pub sequence: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipfs_cid: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only battle ledger.
///
/// Each call makes exactly one attempt; retries are the caller's business.
#[async_trait]
pub trait LedgerBackend: Send + Sync + std::fmt::Debug {
    async fn record(&self, record: &BattleRecord) -> Result<LedgerReceipt, LedgerError>;

    fn name(&self) -> &str;

    async fn is_healthy(&self) -> bool;
}

/// Content-addressed archive of full battles
#[async_trait]
pub trait ContentStore: Send + Sync + std::fmt::Debug {
    /// Upload a battle, returning its content identifier
    async fn put(&self, result: &BattleResult) -> Result<String, LedgerError>;

    /// Fetch a stored document; `None` when it does not exist
    async fn get(&self, cid: &str) -> Result<Option<serde_json::Value>, LedgerError>;

    /// Public link for a content identifier
    fn link(&self, cid: &str) -> String;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use arena_core::{BattlePrompt, BattleResponse, Difficulty, JudgeVerdict};

    pub(crate) fn sample_result() -> BattleResult {
        let pair = [AgentName::Kimi, AgentName::Claude];
        BattleResult::assemble(
            BattlePrompt::new(Category::Code, Difficulty::Easy, "FizzBuzz"),
            pair,
            [
                BattleResponse::new(AgentName::Kimi, "for i in 1..=100", 700),
                BattleResponse::new(AgentName::Claude, "match (i % 3, i % 5)", 900),
            ],
            JudgeVerdict::new(pair, AgentName::Claude, [6.4, 8.5], "Idiomatic.").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_record_from_result() {
        let result = sample_result();
        let record = BattleRecord::from_result(&result, Some("bafy".into()));
        assert_eq!(record.battle_id, result.id);
        assert_eq!(record.winner, AgentName::Claude);
        assert_eq!(record.loser, AgentName::Kimi);
        assert_eq!(record.winner_score, 9);
        assert_eq!(record.loser_score, 6);
        assert_eq!(record.category, Category::Code);

        let payload: serde_json::Value = serde_json::from_slice(&record.to_payload().unwrap()).unwrap();
        assert_eq!(payload["winner"], "claude");
        assert_eq!(payload["ipfs_cid"], "bafy");
        assert_eq!(record.digest().unwrap().len(), 64);
    }
}
