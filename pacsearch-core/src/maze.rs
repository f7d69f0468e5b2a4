//! Maze game: a grid with walls, food, one forager and roaming opponents
//!
//! Agent 0 is the forager. Opponents take indices 1.. in the reading order
//! of the layout.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::eval::Features;
use crate::grid::{Direction, Pos, DIRECTIONS};
use crate::state::{GameStateView, CONTROLLING_AGENT};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Score lost per forager move
pub const TIME_PENALTY: f32 = 1.0;
/// Score for each food eaten
pub const FOOD_REWARD: f32 = 10.0;
/// Bonus for clearing the maze
pub const WIN_REWARD: f32 = 500.0;
/// Penalty for being caught
pub const LOSE_PENALTY: f32 = 500.0;

/// Built-in layout with two opponents
pub const SMALL_MAZE: &str = "\
%%%%%%%%%%
%P...%..G%
%.%%.%.%.%
%........%
%.%%%%.%.%
%....G...%
%%%%%%%%%%";

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout is empty")]
    Empty,

    #[error("row {row} has width {found}, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },

    #[error("unknown layout character '{ch}' at ({x}, {y})")]
    UnknownCell { ch: char, x: usize, y: usize },

    #[error("layout needs exactly one 'P', found {0}")]
    ForagerCount(usize),
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Ongoing,
    Won,
    Lost,
}

#[derive(Debug)]
struct Walls {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Walls {
    /// Cells outside the grid count as walls
    fn contains(&self, pos: Pos) -> bool {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= self.width || pos.y as usize >= self.height {
            return true;
        }
        self.cells[pos.y as usize * self.width + pos.x as usize]
    }
}

/// Maze state (clone to advance)
#[derive(Clone, Debug)]
pub struct MazeState {
    /// Shared between all successors
    walls: Arc<Walls>,

    /// Agent positions, forager first
    agents: Vec<Pos>,

    /// Remaining food
    food: FxHashSet<Pos>,

    pub score: f32,
    pub outcome: Outcome,
}

impl MazeState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Parse a text layout: `%` wall, `.` food, `P` forager, `G` opponent,
    /// space for an empty cell.
    pub fn parse(layout: &str) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = layout.lines().filter(|l| !l.trim().is_empty()).collect();
        if rows.is_empty() {
            return Err(LayoutError::Empty);
        }

        let width = rows[0].chars().count();
        let height = rows.len();
        let mut cells = vec![false; width * height];
        let mut food = FxHashSet::default();
        let mut foragers = Vec::new();
        let mut opponents = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(LayoutError::Ragged { row: y, expected: width, found });
            }
            for (x, ch) in row.chars().enumerate() {
                let pos = Pos::new(x as i32, y as i32);
                match ch {
                    '%' => cells[y * width + x] = true,
                    '.' => {
                        food.insert(pos);
                    }
                    'P' => foragers.push(pos),
                    'G' => opponents.push(pos),
                    ' ' => {}
                    _ => return Err(LayoutError::UnknownCell { ch, x, y }),
                }
            }
        }

        if foragers.len() != 1 {
            return Err(LayoutError::ForagerCount(foragers.len()));
        }

        let mut agents = foragers;
        agents.extend(opponents);

        let mut state = Self {
            walls: Arc::new(Walls { width, height, cells }),
            agents,
            food,
            score: 0.0,
            outcome: Outcome::Ongoing,
        };
        state.check_capture();
        Ok(state)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn forager(&self) -> Pos {
        self.agents[CONTROLLING_AGENT]
    }

    pub fn opponents(&self) -> &[Pos] {
        &self.agents[1..]
    }

    pub fn food_count(&self) -> usize {
        self.food.len()
    }

    pub fn is_wall(&self, pos: Pos) -> bool {
        self.walls.contains(pos)
    }

    pub fn width(&self) -> usize {
        self.walls.width
    }

    pub fn height(&self) -> usize {
        self.walls.height
    }

    pub fn is_over(&self) -> bool {
        self.outcome != Outcome::Ongoing
    }

    // ========================================================================
    // RULES
    // ========================================================================

    /// Compass moves from `pos` that do not hit a wall
    fn open_moves(&self, pos: Pos) -> impl Iterator<Item = Direction> + '_ {
        DIRECTIONS
            .into_iter()
            .filter(move |d| *d != Direction::Stop && !self.is_wall(pos.step(*d)))
    }

    fn check_capture(&mut self) {
        if self.outcome != Outcome::Ongoing {
            return;
        }
        let forager = self.forager();
        if self.opponents().contains(&forager) {
            self.score -= LOSE_PENALTY;
            self.outcome = Outcome::Lost;
        }
    }
}

// ============================================================================
// SEARCH INTERFACE
// ============================================================================

impl GameStateView for MazeState {
    type Action = Direction;

    fn legal_actions(&self, agent: usize) -> Vec<Direction> {
        if self.is_over() || agent >= self.agents.len() {
            return Vec::new();
        }
        let mut moves: Vec<Direction> = self.open_moves(self.agents[agent]).collect();
        if agent == CONTROLLING_AGENT || moves.is_empty() {
            moves.push(Direction::Stop);
        }
        moves
    }

    /// Moves into walls leave the agent in place
    fn successor(&self, agent: usize, action: Direction) -> Self {
        let mut next = self.clone();
        if self.is_over() || agent >= self.agents.len() {
            return next;
        }

        let from = self.agents[agent];
        let to = from.step(action);
        if !self.is_wall(to) {
            next.agents[agent] = to;
        }

        if agent == CONTROLLING_AGENT {
            next.score -= TIME_PENALTY;
            if next.food.remove(&next.agents[agent]) {
                next.score += FOOD_REWARD;
                if next.food.is_empty() {
                    next.score += WIN_REWARD;
                    next.outcome = Outcome::Won;
                    return next;
                }
            }
        }

        next.check_capture();
        next
    }

    fn num_agents(&self) -> usize {
        self.agents.len()
    }

    fn is_stay(action: &Direction) -> bool {
        *action == Direction::Stop
    }
}

impl Features for MazeState {
    fn agent_position(&self) -> Pos {
        self.forager()
    }

    fn targets(&self) -> Vec<Pos> {
        let mut food: Vec<Pos> = self.food.iter().copied().collect();
        food.sort();
        food
    }

    fn threats(&self) -> Vec<Pos> {
        self.opponents().to_vec()
    }

    fn score(&self) -> f32 {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORRIDOR: &str = "\
%%%%%%
%P.. %
%%%%G%
%%%%%%";

    #[test]
    fn test_parse_small_maze() {
        let state = MazeState::parse(SMALL_MAZE).unwrap();
        assert_eq!(state.num_agents(), 3);
        assert_eq!(state.forager(), Pos::new(1, 1));
        assert_eq!(state.opponents(), &[Pos::new(8, 1), Pos::new(5, 5)]);
        assert_eq!(state.width(), 10);
        assert_eq!(state.height(), 7);
        assert!(state.food_count() > 0);
        assert_eq!(state.outcome, Outcome::Ongoing);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(MazeState::parse("").unwrap_err(), LayoutError::Empty);
        assert_eq!(
            MazeState::parse("%%%\n%P%%").unwrap_err(),
            LayoutError::Ragged { row: 1, expected: 3, found: 4 }
        );
        assert_eq!(
            MazeState::parse("%P#").unwrap_err(),
            LayoutError::UnknownCell { ch: '#', x: 2, y: 0 }
        );
        assert_eq!(MazeState::parse("%..%").unwrap_err(), LayoutError::ForagerCount(0));
        assert_eq!(MazeState::parse("%PP%").unwrap_err(), LayoutError::ForagerCount(2));
    }

    #[test]
    fn test_legal_actions() {
        let state = MazeState::parse(CORRIDOR).unwrap();
        assert_eq!(state.legal_actions(0), vec![Direction::East, Direction::Stop]);
        assert_eq!(state.legal_actions(1), vec![Direction::North]);
        assert!(state.legal_actions(2).is_empty());
    }

    #[test]
    fn test_eating_food() {
        let state = MazeState::parse(CORRIDOR).unwrap();
        let next = state.successor(0, Direction::East);
        assert_eq!(next.forager(), Pos::new(2, 1));
        assert_eq!(next.score, FOOD_REWARD - TIME_PENALTY);
        assert_eq!(next.food_count(), 1);
        // Parent state untouched
        assert_eq!(state.food_count(), 2);
        assert_eq!(state.score, 0.0);
    }

    #[test]
    fn test_clearing_wins() {
        let state = MazeState::parse(CORRIDOR).unwrap();
        let state = state.successor(0, Direction::East).successor(0, Direction::East);
        assert_eq!(state.outcome, Outcome::Won);
        assert_eq!(state.score, 2.0 * (FOOD_REWARD - TIME_PENALTY) + WIN_REWARD);
        assert!(state.legal_actions(0).is_empty());
    }

    #[test]
    fn test_capture_loses() {
        let state = MazeState::parse("%%%%%\n%P G%\n%%%%%").unwrap();
        let state = state.successor(1, Direction::West);
        assert_eq!(state.outcome, Outcome::Ongoing);
        let state = state.successor(0, Direction::East);
        assert_eq!(state.outcome, Outcome::Lost);
        assert_eq!(state.score, -TIME_PENALTY - LOSE_PENALTY);
        assert!(state.legal_actions(1).is_empty());
    }

    #[test]
    fn test_features() {
        let state = MazeState::parse(CORRIDOR).unwrap();
        assert_eq!(state.agent_position(), Pos::new(1, 1));
        assert_eq!(state.targets(), vec![Pos::new(2, 1), Pos::new(3, 1)]);
        assert_eq!(state.threats(), vec![Pos::new(4, 2)]);
    }
}
