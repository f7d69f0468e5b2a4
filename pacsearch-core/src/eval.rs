//! Position evaluation

use crate::grid::{manhattan, Pos};
use serde::{Deserialize, Serialize};

/// Evaluation failure. Always fatal for the search that hit it.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("evaluation returned NaN")]
    NotANumber,

    #[error("evaluation failed: {0}")]
    Failed(String),
}

/// Maps a state to a scalar utility (higher is better for the controlling agent)
pub trait Evaluator<S> {
    fn evaluate(&self, state: &S) -> Result<f32, EvalError>;
}

impl<S, F> Evaluator<S> for F
where
    F: Fn(&S) -> f32,
{
    fn evaluate(&self, state: &S) -> Result<f32, EvalError> {
        Ok(self(state))
    }
}

/// Primitive positional features the default heuristic is built from
pub trait Features {
    /// Where the controlling agent stands
    fn agent_position(&self) -> Pos;
    /// Remaining targets (food)
    fn targets(&self) -> Vec<Pos>;
    /// Opponent positions
    fn threats(&self) -> Vec<Pos>;
    /// Current game score
    fn score(&self) -> f32;
}

// ============================================================================
// HEURISTICS
// ============================================================================

/// Weights for the feature-based heuristic
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicWeights {
    /// Returned when a threat shares the agent's cell
    pub caught_value: f32,
    /// Returned when no targets remain
    pub cleared_value: f32,
    /// Scale of the reciprocal threat-distance penalty
    pub threat_weight: f32,
    /// Scale of the reciprocal target-distance bonus
    pub target_weight: f32,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            caught_value: -999.0,
            cleared_value: 999.0,
            threat_weight: 1.0,
            target_weight: 1.0,
        }
    }
}

/// Default heuristic over [`Features`]
#[derive(Clone, Debug, Default)]
pub struct FeatureEvaluator {
    pub weights: HeuristicWeights,
}

impl FeatureEvaluator {
    pub fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }
}

impl<S: Features> Evaluator<S> for FeatureEvaluator {
    fn evaluate(&self, state: &S) -> Result<f32, EvalError> {
        Ok(feature_score(state, &self.weights))
    }
}

/// Score the game plainly
#[derive(Clone, Copy, Debug, Default)]
pub struct ScoreEvaluator;

impl<S: Features> Evaluator<S> for ScoreEvaluator {
    fn evaluate(&self, state: &S) -> Result<f32, EvalError> {
        Ok(state.score())
    }
}

/// Heuristic combining game score with reciprocal distance shaping.
///
/// Short-circuits to `caught_value` when a threat sits on the agent and to
/// `cleared_value` when every target is gone. Each reciprocal term is zero
/// when its distance sum is zero.
pub fn feature_score<S: Features>(state: &S, weights: &HeuristicWeights) -> f32 {
    let position = state.agent_position();

    let mut threat_distance = 0;
    for threat in state.threats() {
        let dist = manhattan(position, threat);
        if dist == 0 {
            return weights.caught_value;
        }
        threat_distance += dist;
    }

    let targets = state.targets();
    if targets.is_empty() {
        return weights.cleared_value;
    }
    let target_distance: i32 = targets.iter().map(|t| manhattan(*t, position)).sum();

    let penalty = if threat_distance == 0 {
        0.0
    } else {
        1.0 / threat_distance as f32
    };
    let bonus = if target_distance == 0 {
        0.0
    } else {
        targets.len() as f32 / target_distance as f32
    };

    state.score() - weights.threat_weight * penalty + weights.target_weight * bonus
}

/// Named evaluation selectable from configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    #[default]
    Better,
    Score,
}

impl EvaluationKind {
    pub fn build<S: Features + 'static>(self, weights: &HeuristicWeights) -> Box<dyn Evaluator<S>> {
        match self {
            EvaluationKind::Better => Box::new(FeatureEvaluator::new(weights.clone())),
            EvaluationKind::Score => Box::new(ScoreEvaluator),
        }
    }
}

impl std::str::FromStr for EvaluationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "better" => Ok(EvaluationKind::Better),
            "score" => Ok(EvaluationKind::Score),
            other => Err(format!("unknown evaluation '{}' (expected better or score)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Snapshot {
        agent: Pos,
        targets: Vec<Pos>,
        threats: Vec<Pos>,
        score: f32,
    }

    impl Features for Snapshot {
        fn agent_position(&self) -> Pos {
            self.agent
        }
        fn targets(&self) -> Vec<Pos> {
            self.targets.clone()
        }
        fn threats(&self) -> Vec<Pos> {
            self.threats.clone()
        }
        fn score(&self) -> f32 {
            self.score
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            agent: Pos::new(0, 0),
            targets: vec![Pos::new(2, 0), Pos::new(0, 2)],
            threats: vec![Pos::new(3, 3)],
            score: 10.0,
        }
    }

    #[test]
    fn test_caught_short_circuits() {
        let mut s = snapshot();
        s.threats.push(Pos::new(0, 0));
        let value = feature_score(&s, &HeuristicWeights::default());
        assert_eq!(value, -999.0);
    }

    #[test]
    fn test_cleared_short_circuits() {
        let mut s = snapshot();
        s.targets.clear();
        assert_eq!(feature_score(&s, &HeuristicWeights::default()), 999.0);
    }

    #[test]
    fn test_smooth_terms() {
        // score 10, threat distance 6, target distances 2 + 2 with 2 targets
        let value = feature_score(&snapshot(), &HeuristicWeights::default());
        let expected = 10.0 - 1.0 / 6.0 + 2.0 / 4.0;
        assert!((value - expected).abs() < 1e-5, "{} != {}", value, expected);
    }

    #[test]
    fn test_no_threats_means_no_penalty() {
        let mut s = snapshot();
        s.threats.clear();
        let value = feature_score(&s, &HeuristicWeights::default());
        assert!((value - 10.5).abs() < 1e-5);
    }

    #[test]
    fn test_closure_is_evaluator() {
        let eval = |s: &Snapshot| s.score * 2.0;
        assert_eq!(eval.evaluate(&snapshot()).unwrap(), 20.0);
    }

    #[test]
    fn test_evaluation_kind_parse() {
        assert_eq!("Better".parse::<EvaluationKind>().unwrap(), EvaluationKind::Better);
        assert_eq!("score".parse::<EvaluationKind>().unwrap(), EvaluationKind::Score);
        assert!("greedy".parse::<EvaluationKind>().is_err());
    }

    #[test]
    fn test_score_evaluator() {
        let eval = EvaluationKind::Score.build::<Snapshot>(&HeuristicWeights::default());
        assert_eq!(eval.evaluate(&snapshot()).unwrap(), 10.0);
    }
}
