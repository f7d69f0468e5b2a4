//! Agent configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::eval::{EvaluationKind, HeuristicWeights};
use crate::search::{ChanceModel, Policy};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("search depth must be at least 1 ply")]
    InvalidDepth,
}

/// Search agent configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Search policy
    pub policy: Policy,
    /// Full plies searched before evaluating
    pub depth: u32,
    /// Opponent model for expectimax
    pub chance: ChanceModel,
    /// Evaluation used at the search horizon
    pub evaluation: EvaluationKind,
    /// Weights for the feature heuristic
    pub weights: HeuristicWeights,
    /// Random seed for reproducibility (None = default seed)
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            policy: Policy::Minimax,
            depth: 2,
            chance: ChanceModel::Sample,
            evaluation: EvaluationKind::Better,
            weights: HeuristicWeights::default(),
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn minimax(depth: u32) -> Self {
        Self {
            policy: Policy::Minimax,
            depth,
            ..Default::default()
        }
    }

    pub fn alpha_beta(depth: u32) -> Self {
        Self {
            policy: Policy::AlphaBeta,
            depth,
            ..Default::default()
        }
    }

    pub fn expectimax(depth: u32) -> Self {
        Self {
            policy: Policy::Expectimax,
            depth,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_evaluation(mut self, evaluation: EvaluationKind) -> Self {
        self.evaluation = evaluation;
        self
    }

    pub fn with_chance(mut self, chance: ChanceModel) -> Self {
        self.chance = chance;
        self
    }

    /// Reject configurations that cannot drive a search
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 {
            return Err(ConfigError::InvalidDepth);
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
