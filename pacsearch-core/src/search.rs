//! Depth-limited adversarial search
//!
//! Minimax, alpha-beta and expectimax share one recursive skeleton:
//! `maximize` for the controlling agent and `resolve_opponent` for every
//! other agent. Policies differ only in how an opponent node combines its
//! children, which is captured by [`OpponentRule`].

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::eval::{EvalError, Evaluator};
use crate::state::{search_actions, GameStateView, Turn, CONTROLLING_AGENT};

// ============================================================================
// TYPES
// ============================================================================

/// Search policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Opponents minimize
    Minimax,
    /// Minimax with alpha-beta pruning
    AlphaBeta,
    /// Opponents act uniformly at random
    Expectimax,
}

pub const POLICIES: [Policy; 3] = [Policy::Minimax, Policy::AlphaBeta, Policy::Expectimax];

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Policy::Minimax => "minimax",
            Policy::AlphaBeta => "alpha_beta",
            Policy::Expectimax => "expectimax",
        };
        f.write_str(name)
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "minimax" => Ok(Policy::Minimax),
            "alpha_beta" | "alphabeta" => Ok(Policy::AlphaBeta),
            "expectimax" => Ok(Policy::Expectimax),
            other => Err(format!(
                "unknown policy '{}' (expected minimax, alpha_beta or expectimax)",
                other
            )),
        }
    }
}

/// How expectimax resolves an opponent node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanceModel {
    /// Follow one uniformly sampled action
    #[default]
    Sample,
    /// Uniform average over every action
    Average,
}

/// Utility of a node and the action that achieves it.
///
/// `action` is `None` only where the node was evaluated without expanding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchResult<A> {
    pub utility: f32,
    pub action: Option<A>,
}

impl<A> SearchResult<A> {
    fn leaf(utility: f32) -> Self {
        Self {
            utility,
            action: None,
        }
    }
}

/// Node counters for one search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Successor states generated
    pub expansions: u64,
    /// Evaluator calls
    pub evaluations: u64,
}

/// Root result plus counters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchOutcome<A> {
    pub result: SearchResult<A>,
    pub stats: SearchStats,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Evaluation(#[from] EvalError),

    #[error("state reports zero agents")]
    NoAgents,
}

// ============================================================================
// OPPONENT RULES
// ============================================================================

/// Combination rule applied at opponent nodes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OpponentRule {
    Min,
    PrunedMin,
    UniformSample,
    UniformAverage,
}

impl OpponentRule {
    fn for_policy(policy: Policy, chance: ChanceModel) -> Self {
        match (policy, chance) {
            (Policy::Minimax, _) => OpponentRule::Min,
            (Policy::AlphaBeta, _) => OpponentRule::PrunedMin,
            (Policy::Expectimax, ChanceModel::Sample) => OpponentRule::UniformSample,
            (Policy::Expectimax, ChanceModel::Average) => OpponentRule::UniformAverage,
        }
    }

    fn prunes(self) -> bool {
        self == OpponentRule::PrunedMin
    }
}

/// Alpha-beta window
#[derive(Clone, Copy, Debug)]
struct Window {
    alpha: f32,
    beta: f32,
}

impl Window {
    const OPEN: Window = Window {
        alpha: f32::NEG_INFINITY,
        beta: f32::INFINITY,
    };
}

// ============================================================================
// ENTRY POINT
// ============================================================================

/// Choose an action for the controlling agent.
///
/// `depth_limit` counts full plies. A limit of 0 evaluates `state` without
/// expanding anything.
pub fn search<S, E>(
    state: &S,
    policy: Policy,
    chance: ChanceModel,
    depth_limit: u32,
    evaluator: &E,
    rng: &mut ChaCha8Rng,
) -> Result<SearchOutcome<S::Action>, SearchError>
where
    S: GameStateView,
    E: Evaluator<S> + ?Sized,
{
    if state.num_agents() == 0 {
        return Err(SearchError::NoAgents);
    }

    let mut searcher = Searcher {
        depth_limit,
        rule: OpponentRule::for_policy(policy, chance),
        evaluator,
        rng,
        stats: SearchStats::default(),
    };
    let result = searcher.value(state, Turn::ROOT, Window::OPEN)?;
    let stats = searcher.stats;

    tracing::debug!(
        "{} depth={} value={} action={:?} expansions={} evaluations={}",
        policy,
        depth_limit,
        result.utility,
        result.action,
        stats.expansions,
        stats.evaluations
    );

    Ok(SearchOutcome { result, stats })
}

// ============================================================================
// RECURSION
// ============================================================================

struct Searcher<'a, E: ?Sized> {
    depth_limit: u32,
    rule: OpponentRule,
    evaluator: &'a E,
    rng: &'a mut ChaCha8Rng,
    stats: SearchStats,
}

impl<'a, E: ?Sized> Searcher<'a, E> {
    fn value<S>(&mut self, state: &S, turn: Turn, window: Window) -> Result<SearchResult<S::Action>, SearchError>
    where
        S: GameStateView,
        E: Evaluator<S>,
    {
        if turn.depth >= self.depth_limit {
            return self.cutoff(state);
        }
        if turn.is_controlling() {
            self.maximize(state, turn, window)
        } else {
            self.resolve_opponent(state, turn, window)
        }
    }

    fn maximize<S>(&mut self, state: &S, turn: Turn, mut window: Window) -> Result<SearchResult<S::Action>, SearchError>
    where
        S: GameStateView,
        E: Evaluator<S>,
    {
        let actions = search_actions(state, CONTROLLING_AGENT);
        if actions.is_empty() {
            return self.cutoff(state);
        }

        let next = turn.next(state.num_agents());
        let mut best = SearchResult::leaf(f32::NEG_INFINITY);

        for action in actions {
            let child = self.expand(state, CONTROLLING_AGENT, action);
            let utility = self.value(&child, next, window)?.utility;

            // Ties keep the earlier action
            if best.action.is_none() || utility > best.utility {
                best = SearchResult {
                    utility,
                    action: Some(action),
                };
            }

            if self.rule.prunes() {
                window.alpha = window.alpha.max(best.utility);
                if best.utility >= window.beta {
                    break;
                }
            }
        }

        Ok(best)
    }

    fn resolve_opponent<S>(&mut self, state: &S, turn: Turn, mut window: Window) -> Result<SearchResult<S::Action>, SearchError>
    where
        S: GameStateView,
        E: Evaluator<S>,
    {
        let actions = search_actions(state, turn.agent);
        if actions.is_empty() {
            return self.cutoff(state);
        }

        let next = turn.next(state.num_agents());

        match self.rule {
            OpponentRule::Min | OpponentRule::PrunedMin => {
                let mut best = SearchResult::leaf(f32::INFINITY);

                for action in actions {
                    let child = self.expand(state, turn.agent, action);
                    let utility = self.value(&child, next, window)?.utility;

                    if best.action.is_none() || utility < best.utility {
                        best = SearchResult {
                            utility,
                            action: Some(action),
                        };
                    }

                    if self.rule.prunes() {
                        window.beta = window.beta.min(best.utility);
                        if best.utility <= window.alpha {
                            break;
                        }
                    }
                }

                Ok(best)
            }
            OpponentRule::UniformSample => {
                let action = actions[self.rng.gen_range(0..actions.len())];
                let child = self.expand(state, turn.agent, action);
                let utility = self.value(&child, next, window)?.utility;
                Ok(SearchResult {
                    utility,
                    action: Some(action),
                })
            }
            OpponentRule::UniformAverage => {
                let mut total = 0.0f32;
                for &action in &actions {
                    let child = self.expand(state, turn.agent, action);
                    total += self.value(&child, next, window)?.utility;
                }
                // Opposite infinities cancel to NaN
                let utility = total / actions.len() as f32;
                if utility.is_nan() {
                    return Err(EvalError::NotANumber.into());
                }
                // Every action is equally likely; report the first
                Ok(SearchResult {
                    utility,
                    action: actions.first().copied(),
                })
            }
        }
    }

    fn expand<S: GameStateView>(&mut self, state: &S, agent: usize, action: S::Action) -> S {
        self.stats.expansions += 1;
        state.successor(agent, action)
    }

    fn cutoff<S>(&mut self, state: &S) -> Result<SearchResult<S::Action>, SearchError>
    where
        S: GameStateView,
        E: Evaluator<S>,
    {
        self.stats.evaluations += 1;
        let utility = self.evaluator.evaluate(state)?;
        if utility.is_nan() {
            return Err(EvalError::NotANumber.into());
        }
        Ok(SearchResult::leaf(utility))
    }
}
