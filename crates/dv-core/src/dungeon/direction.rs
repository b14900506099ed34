//! Compass directions and door openings

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Side of a room a door opens on
///
/// Grid and local coordinates are y-up: North increases y.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All directions in index order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// The facing direction on the other side of a door
    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Grid step taken when leaving a room through this side
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Stable slot for per-direction tables
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }
}

/// A door opening, centered at `(x, y)` in the room's local frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorSpec {
    pub direction: Direction,
    pub x: u32,
    pub y: u32,
}

impl DoorSpec {
    pub const fn new(direction: Direction, x: u32, y: u32) -> Self {
        Self { direction, x, y }
    }

    /// Door centered on the given side of a `width` x `height` footprint
    pub const fn centered(direction: Direction, width: u32, height: u32) -> Self {
        let (x, y) = match direction {
            Direction::North => (width / 2, height),
            Direction::South => (width / 2, 0),
            Direction::East => (width, height / 2),
            Direction::West => (0, height / 2),
        };
        Self { direction, x, y }
    }
}
