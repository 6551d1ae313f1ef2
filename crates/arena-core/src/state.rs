//! Process-wide game state
//!
//! [`GameState`] is owned by the control loop and replaced wholesale: every
//! operation that changes it takes `&self` and returns the next state.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::agent::{Agent, AgentName};
use crate::battle::BattleResult;
use crate::elo;
use crate::error::CoreError;

/// How often the audience agreed with the judge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteStats {
    pub total_votes: u32,
    pub agreed_with_judge: u32,
}

impl VoteStats {
    /// Agreement percentage, `None` before the first vote
    pub fn agreement_rate(&self) -> Option<f64> {
        match self.total_votes {
            0 => None,
            n => Some(self.agreed_with_judge as f64 / n as f64 * 100.0),
        }
    }
}

/// Ratings, history and vote counters for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default = "full_roster", deserialize_with = "deserialize_roster")]
    agents: BTreeMap<AgentName, Agent>,
    battle_history: Vec<BattleResult>,
    vote_stats: VoteStats,
}

fn full_roster() -> BTreeMap<AgentName, Agent> {
    AgentName::ALL.into_iter().map(|n| (n, Agent::new(n))).collect()
}

/// Stored states may predate part of the roster; missing agents start fresh
fn deserialize_roster<'de, D>(deserializer: D) -> Result<BTreeMap<AgentName, Agent>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut agents = BTreeMap::<AgentName, Agent>::deserialize(deserializer)?;
    for name in AgentName::ALL {
        agents.entry(name).or_insert_with(|| Agent::new(name));
    }
    Ok(agents)
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// All agents at the starting rating, empty history
    pub fn new() -> Self {
        Self {
            agents: full_roster(),
            battle_history: Vec::new(),
            vote_stats: VoteStats::default(),
        }
    }

    pub fn agent(&self, name: AgentName) -> &Agent {
        // every roster entry is present after `new` or deserialization
        &self.agents[&name]
    }

    pub(crate) fn agent_mut(&mut self, name: AgentName) -> &mut Agent {
        self.agents.entry(name).or_insert_with(|| Agent::new(name))
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn battle_history(&self) -> &[BattleResult] {
        &self.battle_history
    }

    pub fn vote_stats(&self) -> VoteStats {
        self.vote_stats
    }

    pub(crate) fn push_history(&mut self, result: BattleResult) {
        self.battle_history.push(result);
    }

    /// Agents ordered by rating, best first; ties broken by wins
    pub fn leaderboard(&self) -> Vec<&Agent> {
        let mut agents: Vec<&Agent> = self.agents.values().collect();
        agents.sort_by(|a, b| b.elo.cmp(&a.elo).then(b.wins.cmp(&a.wins)));
        agents
    }

    /// Most recent battles, newest first
    pub fn recent_battles(&self, limit: usize) -> impl Iterator<Item = &BattleResult> {
        self.battle_history.iter().rev().take(limit)
    }

    /// Next state after a judged battle; see [`elo::update_game_state`]
    pub fn apply_result(&self, result: BattleResult) -> Result<GameState, CoreError> {
        elo::update_game_state(self, result)
    }

    /// Next state after an audience vote
    pub fn record_vote(&self, pick: AgentName, judge_winner: AgentName) -> GameState {
        let mut next = self.clone();
        next.vote_stats.total_votes += 1;
        if pick == judge_winner {
            next.vote_stats.agreed_with_judge += 1;
        }
        next
    }

    /// Next state with receipts attached to a battle already in history
    pub fn attach_receipts(
        &self,
        battle_id: uuid::Uuid,
        tx_hash: Option<String>,
        ipfs_cid: Option<String>,
    ) -> GameState {
        let mut next = self.clone();
        if let Some(result) = next.battle_history.iter_mut().find(|r| r.id == battle_id) {
            result.attach_receipts(tx_hash, ipfs_cid);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::INITIAL_ELO;
    use crate::battle::BattleResponse;
    use crate::prompt::{BattlePrompt, Category, Difficulty};
    use crate::verdict::JudgeVerdict;

    fn battle(a: AgentName, b: AgentName, winner: AgentName, difficulty: Difficulty) -> BattleResult {
        BattleResult::assemble(
            BattlePrompt::new(Category::Debate, difficulty, "Argue."),
            [a, b],
            [BattleResponse::new(a, "yes", 100), BattleResponse::new(b, "no", 120)],
            JudgeVerdict::new([a, b], winner, [8.0, 6.0], "better").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = GameState::new();
        assert_eq!(state.agents().count(), 8);
        assert!(state.agents().all(|a| a.elo == INITIAL_ELO && a.wins == 0 && a.losses == 0));
        assert!(state.battle_history().is_empty());
        assert_eq!(state.vote_stats(), VoteStats::default());
    }

    #[test]
    fn test_apply_result_medium_scenario() {
        let state = GameState::new();
        let before = state.clone();
        let next = state
            .apply_result(battle(AgentName::Claude, AgentName::Grok, AgentName::Claude, Difficulty::Medium))
            .unwrap();

        let a = next.agent(AgentName::Claude);
        let b = next.agent(AgentName::Grok);
        assert_eq!(a.elo, 1016);
        assert_eq!(b.elo, 984);
        assert_eq!((a.wins, a.losses), (1, 0));
        assert_eq!((b.wins, b.losses), (0, 1));
        assert_eq!(next.battle_history().len(), 1);

        // original untouched
        assert_eq!(state, before);
        assert_eq!(state.battle_history().len(), 0);
    }

    #[test]
    fn test_k_factor_follows_difficulty() {
        let state = GameState::new();
        let easy = state
            .apply_result(battle(AgentName::Gpt, AgentName::Kimi, AgentName::Kimi, Difficulty::Easy))
            .unwrap();
        let hard = state
            .apply_result(battle(AgentName::Gpt, AgentName::Kimi, AgentName::Kimi, Difficulty::Hard))
            .unwrap();
        assert_eq!(easy.agent(AgentName::Kimi).elo, 1008);
        assert_eq!(hard.agent(AgentName::Kimi).elo, 1024);
        assert_eq!(hard.agent(AgentName::Gpt).elo, 976);
    }

    #[test]
    fn test_leaderboard_and_recent() {
        let state = GameState::new()
            .apply_result(battle(AgentName::Glm, AgentName::Gpt, AgentName::Glm, Difficulty::Hard))
            .unwrap()
            .apply_result(battle(AgentName::Glm, AgentName::Kimi, AgentName::Glm, Difficulty::Easy))
            .unwrap();

        let board = state.leaderboard();
        assert_eq!(board[0].name, AgentName::Glm);
        assert_eq!(board.last().unwrap().name, AgentName::Gpt);

        let recent: Vec<_> = state.recent_battles(10).collect();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].agents[1], AgentName::Kimi);
    }

    #[test]
    fn test_record_vote() {
        let state = GameState::new();
        let next = state
            .record_vote(AgentName::Claude, AgentName::Claude)
            .record_vote(AgentName::Grok, AgentName::Claude);
        assert_eq!(next.vote_stats().total_votes, 2);
        assert_eq!(next.vote_stats().agreed_with_judge, 1);
        assert_eq!(next.vote_stats().agreement_rate(), Some(50.0));
        assert_eq!(state.vote_stats().total_votes, 0);
    }

    #[test]
    fn test_attach_receipts_in_history() {
        let result = battle(AgentName::Glm, AgentName::Gpt, AgentName::Glm, Difficulty::Hard);
        let id = result.id;
        let state = GameState::new().apply_result(result).unwrap();
        let next = state.attach_receipts(id, Some("0x1".into()), Some("bafy".into()));
        assert_eq!(next.battle_history()[0].tx_hash.as_deref(), Some("0x1"));
        assert!(state.battle_history()[0].tx_hash.is_none());
    }

    #[test]
    fn test_partial_roster_deserializes_to_full_roster() {
        let result = battle(AgentName::Kimi, AgentName::Grok, AgentName::Kimi, Difficulty::Medium);
        let state = GameState::new().apply_result(result).unwrap();

        let mut json = serde_json::to_value(&state).unwrap();
        let agents = json["agents"].as_object_mut().unwrap();
        agents.retain(|name, _| name == "kimi");
        let restored: GameState = serde_json::from_value(json).unwrap();

        assert_eq!(restored.agents().count(), 8);
        assert_eq!(restored.agent(AgentName::Kimi), state.agent(AgentName::Kimi));
        assert_eq!(restored.agent(AgentName::Gpt).elo, INITIAL_ELO);
        assert_eq!(restored.battle_history().len(), 1);

        let mut bare = serde_json::to_value(GameState::new()).unwrap();
        bare.as_object_mut().unwrap().remove("agents");
        let restored: GameState = serde_json::from_value(bare).unwrap();
        assert_eq!(restored.agent(AgentName::Minimax).elo, INITIAL_ELO);
    }
}
