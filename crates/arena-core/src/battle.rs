//! Battle responses and the aggregated battle result

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::AgentName;
use crate::error::CoreError;
use crate::prompt::BattlePrompt;
use crate::verdict::JudgeVerdict;

/// One agent's answer to a battle prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResponse {
    pub agent: AgentName,
    /// Answer text, or an error placeholder when the agent could not answer
    pub response: String,
    /// Wall-clock latency in milliseconds
    pub time_ms: u64,
}

impl BattleResponse {
    pub fn new(agent: AgentName, response: impl Into<String>, time_ms: u64) -> Self {
        Self {
            agent,
            response: response.into(),
            time_ms,
        }
    }

    /// Placeholder recorded when every attempt for an agent failed
    pub fn placeholder(agent: AgentName, error: &str, time_ms: u64) -> Self {
        Self::new(agent, format!("[Error: {}]", error), time_ms)
    }

    pub fn is_placeholder(&self) -> bool {
        self.response.starts_with("[Error:")
    }
}

/// Everything known about a finished battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleResult {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub prompt: BattlePrompt,
    /// The competing pair, in selection order
    pub agents: [AgentName; 2],
    /// Responses in the same order as `agents`
    pub responses: [BattleResponse; 2],
    pub verdict: JudgeVerdict,
    /// Ledger transaction reference, once recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Content identifier of the stored record, once uploaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipfs_cid: Option<String>,
}

impl BattleResult {
    /// Assemble a result, ordering responses to match `agents`
    pub fn assemble(
        prompt: BattlePrompt,
        agents: [AgentName; 2],
        responses: [BattleResponse; 2],
        verdict: JudgeVerdict,
    ) -> Result<Self, CoreError> {
        let [a, b] = agents;
        if a == b {
            return Err(CoreError::SelfBattle(a));
        }
        for r in &responses {
            if !agents.contains(&r.agent) {
                return Err(CoreError::UnexpectedResponse(r.agent));
            }
        }
        if !agents.contains(&verdict.winner) {
            return Err(CoreError::WinnerNotInBattle {
                winner: verdict.winner,
                pair: agents,
            });
        }

        let [first, second] = responses;
        let ordered = if first.agent == a && second.agent == b {
            [first, second]
        } else if first.agent == b && second.agent == a {
            [second, first]
        } else if first.agent == a {
            return Err(CoreError::MissingResponse(b));
        } else {
            return Err(CoreError::MissingResponse(a));
        };

        Ok(Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            prompt,
            agents,
            responses: ordered,
            verdict,
            tx_hash: None,
            ipfs_cid: None,
        })
    }

    pub fn winner(&self) -> AgentName {
        self.verdict.winner
    }

    /// The agent in the pair that is not the winner
    pub fn loser(&self) -> AgentName {
        let [a, b] = self.agents;
        if self.verdict.winner == a {
            b
        } else {
            a
        }
    }

    pub fn response_for(&self, agent: AgentName) -> Option<&BattleResponse> {
        self.responses.iter().find(|r| r.agent == agent)
    }

    /// Attach external receipts; the only mutation allowed after assembly
    pub fn attach_receipts(&mut self, tx_hash: Option<String>, ipfs_cid: Option<String>) {
        if tx_hash.is_some() {
            self.tx_hash = tx_hash;
        }
        if ipfs_cid.is_some() {
            self.ipfs_cid = ipfs_cid;
        }
    }

    pub fn is_recorded(&self) -> bool {
        self.tx_hash.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Category, Difficulty};

    fn prompt() -> BattlePrompt {
        BattlePrompt::new(Category::Riddle, Difficulty::Easy, "Riddle me this")
    }

    fn verdict(winner: AgentName) -> JudgeVerdict {
        JudgeVerdict::new([AgentName::Gpt, AgentName::Glm], winner, [7.0, 5.0], "close").unwrap()
    }

    #[test]
    fn test_assemble_orders_responses_by_pair() {
        let result = BattleResult::assemble(
            prompt(),
            [AgentName::Gpt, AgentName::Glm],
            [
                BattleResponse::new(AgentName::Glm, "second", 20),
                BattleResponse::new(AgentName::Gpt, "first", 10),
            ],
            verdict(AgentName::Gpt),
        )
        .unwrap();

        assert_eq!(result.responses[0].agent, AgentName::Gpt);
        assert_eq!(result.responses[1].agent, AgentName::Glm);
        assert_eq!(result.winner(), AgentName::Gpt);
        assert_eq!(result.loser(), AgentName::Glm);
        assert!(!result.is_recorded());
    }

    #[test]
    fn test_assemble_rejects_mismatched_responses() {
        let err = BattleResult::assemble(
            prompt(),
            [AgentName::Gpt, AgentName::Glm],
            [
                BattleResponse::new(AgentName::Gpt, "a", 1),
                BattleResponse::new(AgentName::Gpt, "b", 1),
            ],
            verdict(AgentName::Gpt),
        )
        .unwrap_err();
        assert_eq!(err, CoreError::MissingResponse(AgentName::Glm));

        let err = BattleResult::assemble(
            prompt(),
            [AgentName::Gpt, AgentName::Glm],
            [
                BattleResponse::new(AgentName::Gpt, "a", 1),
                BattleResponse::new(AgentName::Kimi, "b", 1),
            ],
            verdict(AgentName::Gpt),
        )
        .unwrap_err();
        assert_eq!(err, CoreError::UnexpectedResponse(AgentName::Kimi));
    }

    #[test]
    fn test_attach_receipts() {
        let mut result = BattleResult::assemble(
            prompt(),
            [AgentName::Gpt, AgentName::Glm],
            [
                BattleResponse::new(AgentName::Gpt, "a", 1),
                BattleResponse::new(AgentName::Glm, "b", 1),
            ],
            verdict(AgentName::Glm),
        )
        .unwrap();

        result.attach_receipts(Some("0xabc".into()), None);
        assert_eq!(result.tx_hash.as_deref(), Some("0xabc"));
        assert!(result.ipfs_cid.is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("ipfs_cid").is_none());
    }

    #[test]
    fn test_placeholder() {
        let r = BattleResponse::placeholder(AgentName::Grok, "boom", 42);
        assert_eq!(r.response, "[Error: boom]");
        assert!(r.is_placeholder());
        assert_eq!(r.time_ms, 42);
    }
}
