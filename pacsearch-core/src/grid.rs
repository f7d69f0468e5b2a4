//! Grid geometry with integer cell coordinates

use serde::{Deserialize, Serialize};

/// Cell coordinates (x grows east, y grows south)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbor one step in `direction` (`Stop` returns self)
    pub fn step(&self, direction: Direction) -> Pos {
        let (dx, dy) = direction.delta();
        Pos::new(self.x + dx, self.y + dy)
    }
}

/// Manhattan (taxicab) distance between two cells
pub fn manhattan(a: Pos, b: Pos) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Movement direction. `Stop` is the no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Stop,
}

/// Iteration order used for legal action generation
pub const DIRECTIONS: [Direction; 5] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
    Direction::Stop,
];

impl Direction {
    /// Offset vector (dx, dy)
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Stop => (0, 0),
        }
    }
}
