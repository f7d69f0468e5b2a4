//! Game state abstraction consumed by the search engine
//!
//! The engine never owns game rules. Anything that can enumerate legal
//! actions, produce successor states and report its agent count can be
//! searched.

use std::fmt::Debug;

/// Agent the engine chooses actions for. Opponents are `1..num_agents`.
pub const CONTROLLING_AGENT: usize = 0;

/// Capabilities the search engine requires from a game state.
///
/// States are treated as immutable snapshots: `successor` must return a new
/// state and leave `self` untouched.
pub trait GameStateView: Sized {
    type Action: Copy + Eq + Debug;

    /// Legal actions for `agent`, in a deterministic order.
    ///
    /// Order decides tie-breaks, so it must be reproducible.
    /// An empty list marks a terminal state for that agent.
    fn legal_actions(&self, agent: usize) -> Vec<Self::Action>;

    /// State after `agent` plays `action`
    fn successor(&self, agent: usize, action: Self::Action) -> Self;

    /// Total number of agents, controlling agent included
    fn num_agents(&self) -> usize;

    /// Whether `action` is the reserved no-op
    fn is_stay(_action: &Self::Action) -> bool {
        false
    }
}

/// Actions worth expanding for `agent`.
///
/// The controlling agent never considers the stay action; opponents use
/// their legal set unfiltered.
pub fn search_actions<S: GameStateView>(state: &S, agent: usize) -> Vec<S::Action> {
    let mut actions = state.legal_actions(agent);
    if agent == CONTROLLING_AGENT {
        actions.retain(|a| !S::is_stay(a));
    }
    actions
}

// ============================================================================
// TURN ORDER
// ============================================================================

/// Position in the turn order: who moves next and how many full plies
/// have been completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Turn {
    pub agent: usize,
    pub depth: u32,
}

impl Turn {
    /// Controlling agent to move, no plies completed
    pub const ROOT: Turn = Turn {
        agent: CONTROLLING_AGENT,
        depth: 0,
    };

    pub fn is_controlling(&self) -> bool {
        self.agent == CONTROLLING_AGENT
    }

    /// Turn after the current agent moves.
    ///
    /// Once the last agent has moved the controlling agent is up again and
    /// a ply is complete.
    pub fn next(self, num_agents: usize) -> Turn {
        if self.agent + 1 >= num_agents {
            Turn {
                agent: CONTROLLING_AGENT,
                depth: self.depth + 1,
            }
        } else {
            Turn {
                agent: self.agent + 1,
                depth: self.depth,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Act {
        Go,
        Wait,
    }

    struct Fixed;

    impl GameStateView for Fixed {
        type Action = Act;

        fn legal_actions(&self, _agent: usize) -> Vec<Act> {
            vec![Act::Wait, Act::Go, Act::Wait]
        }

        fn successor(&self, _agent: usize, _action: Act) -> Self {
            Fixed
        }

        fn num_agents(&self) -> usize {
            2
        }

        fn is_stay(action: &Act) -> bool {
            *action == Act::Wait
        }
    }

    #[test]
    fn test_turn_advance_three_agents() {
        let t = Turn::ROOT;
        let t = t.next(3);
        assert_eq!(t, Turn { agent: 1, depth: 0 });
        let t = t.next(3);
        assert_eq!(t, Turn { agent: 2, depth: 0 });
        let t = t.next(3);
        assert_eq!(t, Turn { agent: 0, depth: 1 });
        assert!(t.is_controlling());
    }

    #[test]
    fn test_turn_advance_single_agent() {
        assert_eq!(Turn::ROOT.next(1), Turn { agent: 0, depth: 1 });
    }

    #[test]
    fn test_stay_filtered_for_controlling_agent_only() {
        assert_eq!(search_actions(&Fixed, CONTROLLING_AGENT), vec![Act::Go]);
        assert_eq!(search_actions(&Fixed, 1), vec![Act::Wait, Act::Go, Act::Wait]);
    }
}
