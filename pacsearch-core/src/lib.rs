//! pacsearch core - adversarial game-tree search
//!
//! This crate provides:
//! - A state abstraction any turn-ordered multi-agent game can implement
//! - Minimax, alpha-beta and expectimax search over one shared skeleton
//! - Pluggable evaluation with a feature-based default heuristic
//! - A configurable search agent
//! - A small maze game and game runner to drive the engine end to end

pub mod grid;
pub mod state;
pub mod eval;
pub mod search;
pub mod config;
pub mod agent;
pub mod maze;
pub mod runner;

// Re-exports for convenient access
pub use grid::{Direction, Pos, DIRECTIONS, manhattan};
pub use state::{GameStateView, Turn, CONTROLLING_AGENT, search_actions};
pub use eval::{
    EvalError, EvaluationKind, Evaluator, FeatureEvaluator, Features, HeuristicWeights,
    ScoreEvaluator, feature_score,
};
pub use search::{
    search, ChanceModel, Policy, SearchError, SearchOutcome, SearchResult, SearchStats, POLICIES,
};
pub use config::{AgentConfig, ConfigError};
pub use agent::SearchAgent;
pub use maze::{LayoutError, MazeState, Outcome, SMALL_MAZE};
pub use runner::{play_game, GameRecord};
