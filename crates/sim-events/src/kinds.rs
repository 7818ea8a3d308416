//! Shared Vocabulary
//!
//! Grid coordinates, resource kinds, strategy kinds and their fixed
//! properties. Both the simulation and anything reading its output agree on
//! these.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RGB display colour handed to renderers.
pub type Rgb = [u8; 3];

/// A grid cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Kind of entity placed in the resource registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Crystal,
    Metal,
    AncientStructure,
    /// Impassable terrain marker, never collectible
    Obstacle,
}

impl ResourceKind {
    /// Value credited when the resource is collected.
    pub fn value(self) -> u32 {
        match self {
            ResourceKind::Crystal => 10,
            ResourceKind::Metal => 20,
            ResourceKind::AncientStructure => 50,
            ResourceKind::Obstacle => 0,
        }
    }

    /// Number of co-located agents needed to complete a collection.
    /// Zero for kinds that can never be collected.
    pub fn required_agents(self) -> u32 {
        match self {
            ResourceKind::Crystal | ResourceKind::Metal => 1,
            ResourceKind::AncientStructure => 2,
            ResourceKind::Obstacle => 0,
        }
    }

    pub fn is_collectible(self) -> bool {
        self.required_agents() > 0
    }

    pub fn color(self) -> Rgb {
        match self {
            ResourceKind::Crystal => [0, 255, 255],
            ResourceKind::Metal => [192, 192, 192],
            ResourceKind::AncientStructure => [139, 69, 19],
            ResourceKind::Obstacle => [255, 0, 0],
        }
    }

    /// The kinds that can be spawned as collectibles.
    pub fn collectibles() -> &'static [ResourceKind] {
        &[
            ResourceKind::Crystal,
            ResourceKind::Metal,
            ResourceKind::AncientStructure,
        ]
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Crystal => write!(f, "crystal"),
            ResourceKind::Metal => write!(f, "metal"),
            ResourceKind::AncientStructure => write!(f, "ancient_structure"),
            ResourceKind::Obstacle => write!(f, "obstacle"),
        }
    }
}

/// Fixed decision policy of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Simple,
    GoalBased,
    StateBased,
    Cooperative,
    Bdi,
}

impl StrategyKind {
    pub fn color(self) -> Rgb {
        match self {
            StrategyKind::Simple => [0, 0, 255],
            StrategyKind::GoalBased => [255, 192, 203],
            StrategyKind::StateBased => [0, 255, 255],
            StrategyKind::Cooperative => [255, 140, 0],
            StrategyKind::Bdi => [128, 0, 128],
        }
    }

    /// Returns all strategy variants in roster order.
    pub fn all() -> &'static [StrategyKind] {
        &[
            StrategyKind::Simple,
            StrategyKind::GoalBased,
            StrategyKind::StateBased,
            StrategyKind::Cooperative,
            StrategyKind::Bdi,
        ]
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Simple => write!(f, "simple"),
            StrategyKind::GoalBased => write!(f, "goal_based"),
            StrategyKind::StateBased => write!(f, "state_based"),
            StrategyKind::Cooperative => write!(f, "cooperative"),
            StrategyKind::Bdi => write!(f, "bdi"),
        }
    }
}

/// Error for parsing a kind name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseKindError(pub String);

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown kind: '{}'", self.0)
    }
}

impl std::error::Error for ParseKindError {}

impl FromStr for StrategyKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "simple" => Ok(StrategyKind::Simple),
            "goal_based" | "goal" => Ok(StrategyKind::GoalBased),
            "state_based" | "state" => Ok(StrategyKind::StateBased),
            "cooperative" => Ok(StrategyKind::Cooperative),
            "bdi" => Ok(StrategyKind::Bdi),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}
