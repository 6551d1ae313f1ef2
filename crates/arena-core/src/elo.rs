//! Elo rating engine
//!
//! Both sides are rated independently with the logistic expected score and
//! rounded on their own, so the winner's gain and the loser's loss may differ
//! by one point.

use crate::battle::BattleResult;
use crate::error::CoreError;
use crate::state::GameState;

/// New ratings after a decided battle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EloUpdate {
    pub new_winner_elo: i32,
    pub new_loser_elo: i32,
}

/// Expected score of a player rated `rating` against `opponent`
pub fn expected_score(rating: i32, opponent: i32) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((opponent - rating) as f64 / 400.0))
}

/// Rating after one game, `actual` being 1.0 for a win and 0.0 for a loss
pub fn rate(rating: i32, opponent: i32, actual: f64, k_factor: u32) -> i32 {
    let expected = expected_score(rating, opponent);
    (rating as f64 + k_factor as f64 * (actual - expected)).round() as i32
}

/// Ratings for both sides of a decided battle
pub fn calculate_elo(winner_elo: i32, loser_elo: i32, k_factor: u32) -> EloUpdate {
    EloUpdate {
        new_winner_elo: rate(winner_elo, loser_elo, 1.0, k_factor),
        new_loser_elo: rate(loser_elo, winner_elo, 0.0, k_factor),
    }
}

/// Apply a judged battle to the standings.
///
/// Returns a new state with the winner's rating and win count, the loser's
/// rating and loss count updated and the result appended to history. The
/// K-factor comes from the prompt difficulty. `state` is left untouched.
pub fn update_game_state(state: &GameState, result: BattleResult) -> Result<GameState, CoreError> {
    let winner = result.winner();
    if !result.agents.contains(&winner) {
        return Err(CoreError::WinnerNotInBattle {
            winner,
            pair: result.agents,
        });
    }
    let loser = result.loser();
    let k = result.prompt.k_factor();

    let mut next = state.clone();
    let winner_elo = state.agent(winner).elo;
    let loser_elo = state.agent(loser).elo;
    let update = calculate_elo(winner_elo, loser_elo, k);

    {
        let w = next.agent_mut(winner);
        w.elo = update.new_winner_elo;
        w.wins += 1;
    }
    {
        let l = next.agent_mut(loser);
        l.elo = update.new_loser_elo;
        l.losses += 1;
    }

    tracing::debug!(
        %winner,
        %loser,
        k,
        winner_elo = update.new_winner_elo,
        loser_elo = update.new_loser_elo,
        "ratings updated"
    );

    next.push_history(result);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_equal_ratings() {
        assert!((expected_score(1000, 1000) - 0.5).abs() < f64::EPSILON);
        let update = calculate_elo(1000, 1000, 32);
        assert_eq!(update.new_winner_elo, 1016);
        assert_eq!(update.new_loser_elo, 984);
    }

    #[test]
    fn test_upset_moves_more() {
        let favourite_wins = calculate_elo(1200, 1000, 32);
        let underdog_wins = calculate_elo(1000, 1200, 32);
        assert!(underdog_wins.new_winner_elo - 1000 > favourite_wins.new_winner_elo - 1200);
    }

    #[test]
    fn test_independent_rounding() {
        // 17 * 0.5 = 8.5 on both sides: 1008.5 rounds up, 991.5 rounds away from zero too
        let update = calculate_elo(1000, 1000, 17);
        assert_eq!(update.new_winner_elo, 1009);
        assert_eq!(update.new_loser_elo, 992);

        let update = calculate_elo(1000, 1013, 16);
        assert_eq!(update.new_winner_elo, 1008);
        assert_eq!(update.new_loser_elo, 1005);
    }

    proptest! {
        #[test]
        fn prop_winner_gains_loser_loses(w in 100i32..3000, l in 100i32..3000, k in 1u32..=64) {
            let update = calculate_elo(w, l, k);
            prop_assert!(update.new_winner_elo >= w);
            prop_assert!(update.new_loser_elo <= l);
            // sign follows the expected-score formula before rounding
            prop_assert!(k as f64 * (1.0 - expected_score(w, l)) > 0.0);
            prop_assert!(k as f64 * (0.0 - expected_score(l, w)) < 0.0);
        }

        #[test]
        fn prop_deltas_within_k(w in 100i32..3000, l in 100i32..3000, k in 1u32..=64) {
            let update = calculate_elo(w, l, k);
            prop_assert!(update.new_winner_elo - w <= k as i32);
            prop_assert!(l - update.new_loser_elo <= k as i32);
            // independent rounding never drifts more than one point from zero-sum
            let drift = (update.new_winner_elo - w) + (update.new_loser_elo - l);
            prop_assert!(drift.abs() <= 1);
        }

        #[test]
        fn prop_strict_change_when_close(w in 800i32..1200, l in 800i32..1200, k in 16u32..=48) {
            let update = calculate_elo(w, l, k);
            prop_assert!(update.new_winner_elo > w);
            prop_assert!(update.new_loser_elo < l);
        }
    }
}
