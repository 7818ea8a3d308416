//! Snapshot Types
//!
//! A snapshot captures the complete state of the simulation at a tick
//! boundary: renderers read positions and flags from it, and the simulation
//! can be rebuilt from it to continue the run.

use serde::{Deserialize, Serialize};

use crate::{Coord, ResourceKind, Rgb, StrategyKind};

/// `snap_` plus the zero-padded sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Static grid description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: i32,
    pub height: i32,
    pub base: Coord,
    #[serde(default)]
    pub obstacles: Vec<Coord>,
}

/// Phase of the storm controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StormPhase {
    Calm,
    Storming,
}

/// Storm controller state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormSnapshot {
    pub phase: StormPhase,
    /// Number of storms started so far
    pub incursions: u64,
    /// Tick at which the controller next acts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_transition: Option<u64>,
}

/// Resource snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub resource_id: usize,
    pub position: Coord,
    pub kind: ResourceKind,
    pub color: Rgb,
    pub value: u32,
    pub required_agents: u32,
    pub collected: bool,
}

/// Agent control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeSnapshot {
    Foraging,
    Fleeing,
}

/// Pending multi-agent claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSnapshot {
    pub resource_id: usize,
    pub waited: u32,
}

/// Status of a blackboard or belief entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    Available,
    Collected,
}

/// One blackboard or belief entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellEntry {
    pub position: Coord,
    pub status: CellStatus,
}

/// Strategy-specific memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum MemorySnapshot {
    Simple,
    GoalBased {
        #[serde(default)]
        worklist: Vec<usize>,
    },
    StateBased {
        #[serde(default)]
        visited: Vec<Coord>,
    },
    Cooperative,
    Bdi {
        #[serde(default)]
        beliefs: Vec<CellEntry>,
    },
}

/// Full agent snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: String,
    pub strategy: StrategyKind,
    pub color: Rgb,
    pub position: Coord,
    pub base: Coord,
    pub resources_collected: u32,
    pub in_storm: bool,
    pub mode: ModeSnapshot,
    #[serde(default)]
    pub sheltered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim: Option<ClaimSnapshot>,
    pub memory: MemorySnapshot,
}

/// Scheduler entry: when a process is next resumed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub process: String,
    pub next_due: u64,
}

/// Complete world snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub snapshot_id: String,
    /// Next tick to be executed
    pub tick: u64,
    pub triggered_by: String,
    pub grid: GridSnapshot,
    pub storm: StormSnapshot,
    pub resources: Vec<ResourceSnapshot>,
    pub agents: Vec<AgentSnapshot>,
    #[serde(default)]
    pub blackboard: Vec<CellEntry>,
    #[serde(default)]
    pub processes: Vec<ProcessSnapshot>,
    #[serde(default)]
    pub next_event_sequence: u64,
}

impl WorldSnapshot {
    /// Number of resources still waiting to be collected.
    pub fn uncollected_count(&self) -> usize {
        self.resources
            .iter()
            .filter(|r| r.kind.is_collectible() && !r.collected)
            .count()
    }

    /// Total value credited to agents so far.
    pub fn total_collected_value(&self) -> u32 {
        self.agents.iter().map(|a| a.resources_collected).sum()
    }

    pub fn agent(&self, agent_id: &str) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.agent_id == agent_id)
    }
}
