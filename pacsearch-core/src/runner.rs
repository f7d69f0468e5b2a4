//! Game runner - plays a maze game with a search agent against random opponents

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::agent::SearchAgent;
use crate::grid::Direction;
use crate::maze::{MazeState, Outcome};
use crate::search::SearchError;
use crate::state::{GameStateView, CONTROLLING_AGENT};

/// Record of a finished (or move-capped) game
#[derive(Clone, Debug, Serialize)]
pub struct GameRecord {
    pub outcome: Outcome,
    pub score: f32,
    /// Forager moves played
    pub moves: usize,
    /// Forager action history
    pub actions: Vec<Direction>,
    /// Successor states generated across all searches
    pub expansions: u64,
}

impl GameRecord {
    pub fn won(&self) -> bool {
        self.outcome == Outcome::Won
    }
}

/// Play until the game ends or the forager has made `max_moves` moves.
///
/// Opponents pick uniformly among their legal actions using `opponent_rng`.
pub fn play_game(
    initial: MazeState,
    agent: &mut SearchAgent<MazeState>,
    opponent_rng: &mut ChaCha8Rng,
    max_moves: usize,
) -> Result<GameRecord, SearchError> {
    let mut state = initial;
    let mut actions = Vec::new();
    let mut expansions = 0;

    while !state.is_over() && actions.len() < max_moves {
        let action = agent.get_action(&state)?.unwrap_or(Direction::Stop);
        expansions += agent.last_stats().expansions;
        state = state.successor(CONTROLLING_AGENT, action);
        actions.push(action);

        for opponent in 1..state.num_agents() {
            if state.is_over() {
                break;
            }
            let choices = state.legal_actions(opponent);
            if let Some(&choice) = choices.choose(opponent_rng) {
                state = state.successor(opponent, choice);
            }
        }
    }

    tracing::debug!(
        "Game finished: {:?} score={} moves={}",
        state.outcome,
        state.score,
        actions.len()
    );

    Ok(GameRecord {
        outcome: state.outcome,
        score: state.score,
        moves: actions.len(),
        actions,
        expansions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::maze::SMALL_MAZE;
    use rand::SeedableRng;

    #[test]
    fn test_play_game_respects_move_cap() {
        let state = MazeState::parse(SMALL_MAZE).unwrap();
        let mut agent = SearchAgent::from_config(AgentConfig::alpha_beta(1)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let record = play_game(state, &mut agent, &mut rng, 3).unwrap();
        assert!(record.moves <= 3);
        assert_eq!(record.actions.len(), record.moves);
        assert!(record.expansions > 0);
    }

    #[test]
    fn test_lone_forager_clears_corridor() {
        let state = MazeState::parse("%%%%%%\n%P...%\n%%%%%%").unwrap();
        let mut agent = SearchAgent::from_config(AgentConfig::minimax(1)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let record = play_game(state, &mut agent, &mut rng, 20).unwrap();
        assert!(record.won());
        assert_eq!(record.moves, 3);
        assert!(record.actions.iter().all(|a| *a == Direction::East));
    }

    #[test]
    fn test_games_reproducible_with_seed() {
        let play = || {
            let state = MazeState::parse(SMALL_MAZE).unwrap();
            let mut agent = SearchAgent::from_config(AgentConfig::expectimax(1).with_seed(3)).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(11);
            play_game(state, &mut agent, &mut rng, 30).unwrap()
        };
        let a = play();
        let b = play();
        assert_eq!(a.actions, b.actions);
        assert_eq!(a.score, b.score);
    }
}
