//! World Components
//!
//! Grid positions, cardinal directions, and the static world: bounds,
//! obstacles and the home base.

use serde::{Deserialize, Serialize};
use sim_events::Coord;
use std::collections::BTreeSet;
use std::fmt;

use crate::error::SetupError;

/// A grid cell. Ordered by x, then y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell in a direction (may lie outside the grid).
    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// One unit toward `target`: x-axis first, y-axis once x is aligned.
    pub fn step_toward(self, target: Position) -> Self {
        if self.x != target.x {
            Self::new(self.x + (target.x - self.x).signum(), self.y)
        } else if self.y != target.y {
            Self::new(self.x, self.y + (target.y - self.y).signum())
        } else {
            self
        }
    }

    /// One unit toward `target` along the y-axis only.
    pub fn step_toward_y(self, target: Position) -> Self {
        Self::new(self.x, self.y + (target.y - self.y).signum())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<Coord> for Position {
    fn from(c: Coord) -> Self {
        Self::new(c.x, c.y)
    }
}

impl From<Position> for Coord {
    fn from(p: Position) -> Self {
        Coord::new(p.x, p.y)
    }
}

/// Cardinal direction. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    South,
    North,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::South,
        Direction::North,
        Direction::East,
        Direction::West,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::South => (0, 1),
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

/// Grid dimensions: valid cells are `[0, width) x [0, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub width: i32,
    pub height: i32,
}

impl GridBounds {
    pub fn new(width: i32, height: i32) -> Result<Self, SetupError> {
        if width <= 0 || height <= 0 {
            return Err(SetupError::EmptyGrid { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn contains(&self, p: Position) -> bool {
        (0..self.width).contains(&p.x) && (0..self.height).contains(&p.y)
    }

    pub fn clamp(&self, p: Position) -> Position {
        Position::new(p.x.clamp(0, self.width - 1), p.y.clamp(0, self.height - 1))
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    pub fn check(&self, what: &str, p: Position) -> Result<(), SetupError> {
        if self.contains(p) {
            Ok(())
        } else {
            Err(SetupError::OutOfBounds {
                what: what.to_string(),
                position: p,
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Static world shared read-only by every agent
#[derive(Debug, Clone)]
pub struct World {
    bounds: GridBounds,
    base: Position,
    obstacles: BTreeSet<Position>,
}

impl World {
    pub fn new(
        bounds: GridBounds,
        base: Position,
        obstacles: impl IntoIterator<Item = Position>,
    ) -> Result<Self, SetupError> {
        bounds.check("base", base)?;
        let obstacles: BTreeSet<Position> = obstacles.into_iter().collect();
        for &obstacle in &obstacles {
            bounds.check("obstacle", obstacle)?;
        }
        if obstacles.contains(&base) {
            return Err(SetupError::OnObstacle {
                what: "base".into(),
                position: base,
            });
        }
        Ok(Self {
            bounds,
            base,
            obstacles,
        })
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn base(&self) -> Position {
        self.base
    }

    pub fn obstacles(&self) -> impl Iterator<Item = Position> + '_ {
        self.obstacles.iter().copied()
    }

    pub fn is_obstacle(&self, p: Position) -> bool {
        self.obstacles.contains(&p)
    }

    /// In bounds and not an obstacle.
    pub fn is_passable(&self, p: Position) -> bool {
        self.bounds.contains(p) && !self.is_obstacle(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_toward_prefers_x() {
        let from = Position::new(2, 2);
        assert_eq!(from.step_toward(Position::new(5, 0)), Position::new(3, 2));
        assert_eq!(from.step_toward(Position::new(2, 0)), Position::new(2, 1));
        assert_eq!(from.step_toward(Position::new(0, 9)), Position::new(1, 2));
        assert_eq!(from.step_toward(from), from);
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(Position::new(0, 0).manhattan(Position::new(3, -4)), 7);
        assert_eq!(Position::new(5, 5).manhattan(Position::new(5, 5)), 0);
    }

    #[test]
    fn test_bounds() {
        let bounds = GridBounds::new(10, 5).unwrap();
        assert!(bounds.contains(Position::new(0, 0)));
        assert!(bounds.contains(Position::new(9, 4)));
        assert!(!bounds.contains(Position::new(10, 0)));
        assert!(!bounds.contains(Position::new(0, -1)));
        assert_eq!(bounds.clamp(Position::new(-3, 8)), Position::new(0, 4));
        assert_eq!(bounds.center(), Position::new(5, 2));
        assert!(GridBounds::new(0, 5).is_err());
    }

    #[test]
    fn test_world_rejects_bad_base() {
        let bounds = GridBounds::new(4, 4).unwrap();
        assert!(World::new(bounds, Position::new(4, 0), []).is_err());
        assert!(World::new(bounds, Position::new(1, 1), [Position::new(1, 1)]).is_err());

        let world = World::new(bounds, Position::new(1, 1), [Position::new(2, 2)]).unwrap();
        assert!(world.is_obstacle(Position::new(2, 2)));
        assert!(!world.is_passable(Position::new(2, 2)));
        assert!(!world.is_passable(Position::new(-1, 2)));
        assert!(world.is_passable(Position::new(3, 3)));
    }
}
