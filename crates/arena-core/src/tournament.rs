//! Single-elimination tournament bracket
//!
//! Eight entrants, seven fixed match slots: four quarter-finals, two
//! semi-finals and the final. Which slots feed which is an explicit table,
//! and a later match only gets participants once both of its feeders have a
//! winner.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::agent::AgentName;
use crate::battle::BattleResult;
use crate::prompt::{Category, Difficulty};

/// Number of entrants in a bracket
pub const ENTRANTS: usize = 8;
/// Number of match slots in a bracket
pub const MATCH_COUNT: usize = 7;

/// Which two earlier slots supply each slot's participants
const FEEDERS: [Option<[usize; 2]>; MATCH_COUNT] = [
    None,
    None,
    None,
    None,
    Some([0, 1]),
    Some([2, 3]),
    Some([4, 5]),
];

/// Bracket errors
#[derive(Debug, Error, PartialEq)]
pub enum BracketError {
    #[error("Agent {0} is entered more than once")]
    DuplicateEntrant(AgentName),

    #[error("No match at index {0}")]
    NoSuchMatch(usize),

    #[error("Match {0} is waiting on earlier matches")]
    NotReady(u8),

    #[error("Match {0} already has a winner")]
    AlreadyDecided(u8),

    #[error("Result for {got:?} does not belong to match {match_number}")]
    WrongPair { match_number: u8, got: [AgentName; 2] },
}

/// Bracket round
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Round {
    QuarterFinal,
    SemiFinal,
    Final,
}

impl Round {
    pub const ALL: [Round; 3] = [Round::QuarterFinal, Round::SemiFinal, Round::Final];

    /// 1-based round number
    pub fn number(&self) -> u8 {
        match self {
            Round::QuarterFinal => 1,
            Round::SemiFinal => 2,
            Round::Final => 3,
        }
    }

    /// Banner label for a match in this round
    pub fn label(&self) -> &'static str {
        match self {
            Round::QuarterFinal => "Quarter-Final",
            Round::SemiFinal => "Semi-Final",
            Round::Final => "FINALS",
        }
    }

    /// Heading for the round as a whole
    pub fn plural_label(&self) -> &'static str {
        match self {
            Round::QuarterFinal => "Quarter-Finals",
            Round::SemiFinal => "Semi-Finals",
            Round::Final => "Finals",
        }
    }

    /// Stakes rise each round
    pub fn difficulty(&self) -> Difficulty {
        match self {
            Round::QuarterFinal => Difficulty::Easy,
            Round::SemiFinal => Difficulty::Medium,
            Round::Final => Difficulty::Hard,
        }
    }

    fn of_slot(index: usize) -> Round {
        match index {
            0..=3 => Round::QuarterFinal,
            4 | 5 => Round::SemiFinal,
            _ => Round::Final,
        }
    }
}

/// One slot in the bracket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentMatch {
    pub round: Round,
    /// 1-7, in play order
    pub match_number: u8,
    /// Unset until both feeders are decided
    pub participants: Option<[AgentName; 2]>,
    pub winner: Option<AgentName>,
    pub result: Option<BattleResult>,
}

impl TournamentMatch {
    fn empty(index: usize) -> Self {
        Self {
            round: Round::of_slot(index),
            match_number: index as u8 + 1,
            participants: None,
            winner: None,
            result: None,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }
}

/// An eight-agent knockout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Prompt category for every match, `None` for mixed
    pub category: Option<Category>,
    pub matches: [TournamentMatch; MATCH_COUNT],
    pub champion: Option<AgentName>,
}

impl Tournament {
    /// Seed a bracket from eight distinct agents in random order
    pub fn create<R: Rng + ?Sized>(
        entrants: [AgentName; ENTRANTS],
        category: Option<Category>,
        rng: &mut R,
    ) -> Result<Self, BracketError> {
        for (i, agent) in entrants.iter().enumerate() {
            if entrants[..i].contains(agent) {
                return Err(BracketError::DuplicateEntrant(*agent));
            }
        }

        let mut seeded = entrants;
        seeded.shuffle(rng);

        let mut matches: [TournamentMatch; MATCH_COUNT] = std::array::from_fn(TournamentMatch::empty);
        for (slot, pair) in matches.iter_mut().zip(seeded.chunks_exact(2)) {
            slot.participants = Some([pair[0], pair[1]]);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            category,
            matches,
            champion: None,
        })
    }

    /// Label used in banners and reports
    pub fn category_label(&self) -> &'static str {
        self.category.map(|c| c.as_str()).unwrap_or("mixed")
    }

    /// First undecided match, provided its participants are known
    pub fn next_playable_match(&self) -> Option<(usize, &TournamentMatch)> {
        let (index, slot) = self.matches.iter().enumerate().find(|(_, m)| !m.is_decided())?;
        slot.participants.map(|_| (index, slot))
    }

    pub fn matches_in_round(&self, round: Round) -> impl Iterator<Item = &TournamentMatch> {
        self.matches.iter().filter(move |m| m.round == round)
    }

    pub fn is_complete(&self) -> bool {
        self.champion.is_some()
    }

    /// Results of every decided match, in play order
    pub fn results(&self) -> impl Iterator<Item = &BattleResult> {
        self.matches.iter().filter_map(|m| m.result.as_ref())
    }

    /// Record the outcome of match `index` and return the next bracket.
    ///
    /// The result must be for the match's participants. Downstream matches
    /// whose feeders are now both decided get their participants, and
    /// deciding the final crowns the champion.
    pub fn advance(&self, index: usize, result: BattleResult) -> Result<Tournament, BracketError> {
        let slot = self.matches.get(index).ok_or(BracketError::NoSuchMatch(index))?;
        if slot.is_decided() {
            return Err(BracketError::AlreadyDecided(slot.match_number));
        }
        let participants = slot
            .participants
            .ok_or(BracketError::NotReady(slot.match_number))?;

        let [a, b] = result.agents;
        let same_pair = participants.contains(&a) && participants.contains(&b) && a != b;
        if !same_pair || !participants.contains(&result.winner()) {
            return Err(BracketError::WrongPair {
                match_number: slot.match_number,
                got: result.agents,
            });
        }

        let mut next = self.clone();
        let winner = result.winner();
        next.matches[index].winner = Some(winner);
        next.matches[index].result = Some(result);

        for i in 0..MATCH_COUNT {
            if next.matches[i].participants.is_some() {
                continue;
            }
            if let Some([f1, f2]) = FEEDERS[i] {
                if let (Some(w1), Some(w2)) = (next.matches[f1].winner, next.matches[f2].winner) {
                    next.matches[i].participants = Some([w1, w2]);
                }
            }
        }

        if next.matches[index].round == Round::Final {
            next.champion = Some(winner);
        }

        tracing::debug!(
            tournament = %next.id,
            match_number = next.matches[index].match_number,
            %winner,
            "bracket advanced"
        );
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::BattleResponse;
    use crate::prompt::BattlePrompt;
    use crate::verdict::JudgeVerdict;

    fn decided(pair: [AgentName; 2], winner: AgentName) -> BattleResult {
        BattleResult::assemble(
            BattlePrompt::new(Category::Roast, Difficulty::Easy, "Roast."),
            pair,
            [BattleResponse::new(pair[0], "a", 1), BattleResponse::new(pair[1], "b", 1)],
            JudgeVerdict::new(pair, winner, [7.0, 7.0], "tie-break").unwrap(),
        )
        .unwrap()
    }

    fn fresh() -> Tournament {
        Tournament::create(AgentName::ALL, Some(Category::Roast), &mut rand::rng()).unwrap()
    }

    #[test]
    fn test_create_seeds_quarter_finals() {
        let t = fresh();
        let mut seen: Vec<AgentName> = t
            .matches_in_round(Round::QuarterFinal)
            .flat_map(|m| m.participants.unwrap())
            .collect();
        seen.sort();
        assert_eq!(seen, AgentName::ALL.to_vec());
        assert!(t.matches[4..].iter().all(|m| m.participants.is_none()));
        assert_eq!(t.matches[6].round, Round::Final);
        assert_eq!(t.matches[6].match_number, 7);
        assert_eq!(t.category_label(), "roast");
    }

    #[test]
    fn test_duplicate_entrant_rejected() {
        let mut entrants = AgentName::ALL;
        entrants[7] = AgentName::Claude;
        let err = Tournament::create(entrants, None, &mut rand::rng()).unwrap_err();
        assert_eq!(err, BracketError::DuplicateEntrant(AgentName::Claude));
    }

    #[test]
    fn test_fresh_bracket_next_match() {
        let t = fresh();
        let (index, m) = t.next_playable_match().unwrap();
        assert_eq!(index, 0);
        assert_eq!(m.round, Round::QuarterFinal);
        assert!(m.participants.is_some());
    }

    #[test]
    fn test_semi_final_not_ready() {
        let t = fresh();
        let qf = decided(t.matches[0].participants.unwrap(), t.matches[0].participants.unwrap()[0]);
        assert_eq!(t.advance(4, qf).unwrap_err(), BracketError::NotReady(5));
    }

    #[test]
    fn test_result_must_match_pair() {
        let t = fresh();
        let [a, _] = t.matches[0].participants.unwrap();
        let [c, _] = t.matches[1].participants.unwrap();
        let err = t.advance(0, decided([a, c], a)).unwrap_err();
        assert!(matches!(err, BracketError::WrongPair { match_number: 1, .. }));
        assert_eq!(t.advance(9, decided([a, c], a)).unwrap_err(), BracketError::NoSuchMatch(9));
    }

    #[test]
    fn test_advance_is_functional() {
        let t = fresh();
        let pair = t.matches[0].participants.unwrap();
        let next = t.advance(0, decided(pair, pair[1])).unwrap();
        assert_eq!(next.matches[0].winner, Some(pair[1]));
        assert!(t.matches[0].winner.is_none());
        assert_eq!(
            next.advance(0, decided(pair, pair[0])).unwrap_err(),
            BracketError::AlreadyDecided(1)
        );
        // one QF decided: SF1 still waits on QF2
        assert!(next.matches[4].participants.is_none());
        assert_eq!(next.next_playable_match().unwrap().0, 1);
    }

    #[test]
    fn test_round_metadata() {
        assert_eq!(Round::QuarterFinal.label(), "Quarter-Final");
        assert_eq!(Round::SemiFinal.label(), "Semi-Final");
        assert_eq!(Round::Final.label(), "FINALS");
        assert_eq!(Round::QuarterFinal.difficulty(), Difficulty::Easy);
        assert_eq!(Round::SemiFinal.difficulty(), Difficulty::Medium);
        assert_eq!(Round::Final.difficulty(), Difficulty::Hard);
        assert_eq!(Round::Final.number(), 3);
    }
}
