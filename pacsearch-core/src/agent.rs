//! Search agent: a configured policy bound to an evaluator and RNG

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::{AgentConfig, ConfigError};
use crate::eval::{Evaluator, Features};
use crate::search::{search, SearchError, SearchOutcome, SearchStats};
use crate::state::GameStateView;

/// Seed used when the config does not name one
const DEFAULT_SEED: u64 = 42;

/// Agent that picks actions for the controlling agent by tree search
pub struct SearchAgent<S> {
    config: AgentConfig,
    evaluator: Box<dyn Evaluator<S>>,
    rng: ChaCha8Rng,
    last_stats: SearchStats,
}

impl<S: GameStateView> SearchAgent<S> {
    pub fn new(config: AgentConfig, evaluator: Box<dyn Evaluator<S>>) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed.unwrap_or(DEFAULT_SEED));
        Ok(Self {
            config,
            evaluator,
            rng,
            last_stats: SearchStats::default(),
        })
    }

    /// Counters from the most recent search
    pub fn last_stats(&self) -> SearchStats {
        self.last_stats
    }

    /// Run a full search from `state`
    pub fn search(&mut self, state: &S) -> Result<SearchOutcome<S::Action>, SearchError> {
        let outcome = search(
            state,
            self.config.policy,
            self.config.chance,
            self.config.depth,
            &*self.evaluator,
            &mut self.rng,
        )?;
        self.last_stats = outcome.stats;
        Ok(outcome)
    }

    /// Best action for the controlling agent (None when it cannot move)
    pub fn get_action(&mut self, state: &S) -> Result<Option<S::Action>, SearchError> {
        Ok(self.search(state)?.result.action)
    }
}

impl<S: GameStateView + Features + 'static> SearchAgent<S> {
    /// Build the agent with the evaluation named in `config`
    pub fn from_config(config: AgentConfig) -> Result<Self, ConfigError> {
        let evaluator = config.evaluation.build(&config.weights);
        Self::new(config, evaluator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::{MazeState, SMALL_MAZE};

    #[test]
    fn test_agent_rejects_zero_depth() {
        let result = SearchAgent::<MazeState>::from_config(AgentConfig::minimax(0));
        assert!(matches!(result, Err(ConfigError::InvalidDepth)));
    }

    #[test]
    fn test_agent_returns_action() {
        let state = MazeState::parse(SMALL_MAZE).unwrap();
        let mut agent = SearchAgent::from_config(AgentConfig::alpha_beta(2)).unwrap();
        let action = agent.get_action(&state).unwrap();
        assert!(action.is_some());
        assert!(agent.last_stats().expansions > 0);
    }

    #[test]
    fn test_same_seed_same_choices() {
        let state = MazeState::parse(SMALL_MAZE).unwrap();
        let mut a = SearchAgent::from_config(AgentConfig::expectimax(2).with_seed(5)).unwrap();
        let mut b = SearchAgent::from_config(AgentConfig::expectimax(2).with_seed(5)).unwrap();
        for _ in 0..5 {
            assert_eq!(a.search(&state).unwrap(), b.search(&state).unwrap());
        }
    }

    #[test]
    fn test_custom_evaluator() {
        let state = MazeState::parse(SMALL_MAZE).unwrap();
        let flat = |_: &MazeState| 1.0f32;
        let mut agent = SearchAgent::new(AgentConfig::minimax(1), Box::new(flat)).unwrap();
        let outcome = agent.search(&state).unwrap();
        assert_eq!(outcome.result.utility, 1.0);
    }
}
