//! Configuration System
//!
//! Loads setup parameters from a TOML file so runs can be tuned without
//! recompiling. Every section falls back to the reference setup.

use serde::{Deserialize, Serialize};
use sim_events::{Coord, ResourceKind, StrategyKind};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "storm_sim.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub grid: GridConfig,
    pub resources: ResourceConfig,
    pub storm: StormConfig,
    pub behavior: BehaviorConfig,
    /// Empty means the reference roster for this grid
    pub agents: Vec<AgentSpec>,
}

/// Run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Tick budget; the run stops once this many ticks have elapsed
    pub max_ticks: u64,
    pub seed: u64,
    /// Ticks between snapshot files (0 disables them)
    pub snapshot_interval: u64,
    /// Ticks per wall-clock second (0 runs unpaced)
    pub frame_rate: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_ticks: 100,
            seed: 42,
            snapshot_interval: 0,
            frame_rate: 0,
        }
    }
}

/// Grid layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
    pub obstacle_count: usize,
    /// Defaults to the grid centre
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<Coord>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 30,
            height: 20,
            obstacle_count: 10,
            base: None,
        }
    }
}

impl GridConfig {
    pub fn base_or_center(&self) -> Coord {
        self.base
            .unwrap_or_else(|| Coord::new(self.width / 2, self.height / 2))
    }
}

/// How many collectibles of each kind to scatter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub crystal: usize,
    pub metal: usize,
    pub ancient_structure: usize,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            crystal: 5,
            metal: 3,
            ancient_structure: 2,
        }
    }
}

impl ResourceConfig {
    /// Configured count for a collectible kind; obstacles come from the grid.
    pub fn count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Crystal => self.crystal,
            ResourceKind::Metal => self.metal,
            ResourceKind::AncientStructure => self.ancient_structure,
            ResourceKind::Obstacle => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.crystal + self.metal + self.ancient_structure
    }
}

/// Storm timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StormConfig {
    pub enabled: bool,
    /// Calm delay is drawn uniformly from `[min_delay, max_delay]`
    pub min_delay: u64,
    pub max_delay: u64,
    pub duration: u64,
    /// Extra calm ticks after a storm before the next delay is drawn
    pub cooldown_ticks: u64,
}

impl Default for StormConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_delay: 25,
            max_delay: 50,
            duration: 5,
            cooldown_ticks: 15,
        }
    }
}

impl StormConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Coordination tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Manhattan radius within which cooperative agents join others
    pub assist_radius: u32,
    /// Ticks a claimant holds position waiting for helpers
    pub structure_patience: u32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            assist_radius: 4,
            structure_patience: 10,
        }
    }
}

/// One roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub strategy: StrategyKind,
    /// Defaults to the agent's base
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Coord>,
    /// Defaults to the grid base
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Coord>,
}

impl AgentSpec {
    pub fn new(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            start: None,
            base: None,
        }
    }

    pub fn at(mut self, start: Coord) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_base(mut self, base: Coord) -> Self {
        self.base = Some(base);
        self
    }
}

/// The reference roster: one agent per strategy at the grid base, the
/// goal-based agent one cell east of it.
pub fn default_roster(grid: &GridConfig) -> Vec<AgentSpec> {
    let base = grid.base_or_center();
    StrategyKind::all()
        .iter()
        .map(|&strategy| match strategy {
            StrategyKind::GoalBased if base.x + 1 < grid.width => {
                AgentSpec::new(strategy).at(Coord::new(base.x + 1, base.y))
            }
            _ => AgentSpec::new(strategy),
        })
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            grid: GridConfig::default(),
            resources: ResourceConfig::default(),
            storm: StormConfig::default(),
            behavior: BehaviorConfig::default(),
            agents: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from the default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", DEFAULT_CONFIG_PATH, e);
            Self::default()
        })
    }

    /// The configured roster, or the reference roster when none is given.
    pub fn roster(&self) -> Vec<AgentSpec> {
        if self.agents.is_empty() {
            default_roster(&self.grid)
        } else {
            self.agents.clone()
        }
    }

    /// Replaces the roster with one agent per strategy, all starting at the
    /// shared base.
    pub fn set_strategies(&mut self, strategies: &[StrategyKind]) {
        self.agents = strategies.iter().map(|&s| AgentSpec::new(s)).collect();
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects setups that cannot produce a valid first tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        if grid.width <= 0 || grid.height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                grid.width, grid.height
            )));
        }
        let in_bounds = |c: Coord| (0..grid.width).contains(&c.x) && (0..grid.height).contains(&c.y);

        let base = grid.base_or_center();
        if !in_bounds(base) {
            return Err(ConfigError::Invalid(format!("base {} is outside the grid", base)));
        }
        for (i, spec) in self.roster().iter().enumerate() {
            for c in spec.start.iter().chain(spec.base.iter()) {
                if !in_bounds(*c) {
                    return Err(ConfigError::Invalid(format!(
                        "agent #{} ({}) position {} is outside the grid",
                        i + 1,
                        spec.strategy,
                        c
                    )));
                }
            }
        }

        let cells = grid.width as usize * grid.height as usize;
        if grid.obstacle_count >= cells {
            return Err(ConfigError::Invalid(format!(
                "{} obstacles do not fit on {} cells",
                grid.obstacle_count, cells
            )));
        }

        let storm = &self.storm;
        if storm.enabled {
            if storm.min_delay > storm.max_delay {
                return Err(ConfigError::Invalid(format!(
                    "storm min_delay {} exceeds max_delay {}",
                    storm.min_delay, storm.max_delay
                )));
            }
            if storm.min_delay == 0 || storm.duration == 0 {
                return Err(ConfigError::Invalid(
                    "storm delay and duration must be at least one tick".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.simulation.max_ticks, 100);
        assert_eq!(config.grid.width, 30);
        assert_eq!(config.grid.base_or_center(), Coord::new(15, 10));
        assert_eq!(config.resources.total(), 10);
        assert!(config.agents.is_empty());

        let roster = config.roster();
        assert_eq!(roster.len(), 5);
        assert_eq!(roster[1].strategy, StrategyKind::GoalBased);
        assert_eq!(roster[1].start, Some(Coord::new(16, 10)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [grid]
            width = 12
            height = 8

            [storm]
            enabled = false

            [[agents]]
            strategy = "state_based"
            start = { x = 1, y = 2 }
            "#,
        )
        .unwrap();

        assert_eq!(config.grid.width, 12);
        assert_eq!(config.grid.obstacle_count, 10);
        assert!(!config.storm.enabled);
        assert_eq!(config.storm.duration, 5);
        assert_eq!(config.agents.len(), 1);
        assert_eq!(config.agents[0].strategy, StrategyKind::StateBased);
        assert_eq!(config.agents[0].start, Some(Coord::new(1, 2)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_set_strategies() {
        let mut config = Config::default();
        let strategies: Vec<StrategyKind> = "bdi,goal-based,bdi"
            .split(',')
            .map(|s| s.parse().unwrap())
            .collect();
        config.set_strategies(&strategies);

        let roster = config.roster();
        assert_eq!(roster.len(), 3);
        assert_eq!(roster[1].strategy, StrategyKind::GoalBased);
        assert!(roster.iter().all(|a| a.start.is_none() && a.base.is_none()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resource_counts() {
        let resources = ResourceConfig::default();
        let per_kind: usize = ResourceKind::collectibles()
            .iter()
            .map(|&k| resources.count(k))
            .sum();
        assert_eq!(per_kind, resources.total());
        assert_eq!(resources.count(ResourceKind::Metal), 3);
        assert_eq!(resources.count(ResourceKind::Obstacle), 0);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::default();
        config.grid.width = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.agents = vec![AgentSpec::new(StrategyKind::Simple).at(Coord::new(30, 0))];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.grid.base = Some(Coord::new(-1, 3));
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storm.min_delay = 60;
        assert!(config.validate().is_err());

        // the reference roster follows a custom grid
        let mut config = Config::default();
        config.grid.width = 6;
        config.grid.height = 4;
        config.grid.obstacle_count = 2;
        assert!(config.validate().is_ok());
        assert_eq!(config.roster()[1].start, Some(Coord::new(4, 2)));

        let mut config = Config::default();
        config.grid.obstacle_count = 600;
        assert!(config.validate().is_err());

        // a disabled storm is not checked
        let mut config = Config::default();
        config.storm = StormConfig {
            min_delay: 9,
            max_delay: 1,
            ..StormConfig::disabled()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            Config::from_toml("[grid]\nwidth = \"wide\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Config::load("does/not/exist.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
