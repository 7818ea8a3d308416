//! Agent Components
//!
//! Per-agent state: position, base, storm mode, pending claims, and the
//! strategy-specific memory.

use sim_events::{CellStatus, StrategyKind};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use super::resource::{ResourceId, ResourceRegistry};
use super::world::Position;

/// Roster index of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub usize);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent_{:03}", self.0 + 1)
    }
}

/// Control mode. `Fleeing` overrides the strategy until the base is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Foraging,
    Fleeing,
}

/// Intention to complete a multi-agent resource, waiting for helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingClaim {
    pub resource: ResourceId,
    /// Ticks spent holding position on the claim
    pub waited: u32,
}

impl PendingClaim {
    pub fn new(resource: ResourceId) -> Self {
        Self {
            resource,
            waited: 0,
        }
    }
}

/// Strategy tag plus the memory each strategy keeps
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyState {
    Simple,
    GoalBased {
        /// Resources still to visit, front is the current target
        worklist: VecDeque<ResourceId>,
    },
    StateBased {
        visited: BTreeSet<Position>,
    },
    Cooperative,
    Bdi {
        beliefs: BTreeMap<Position, CellStatus>,
    },
}

impl StrategyState {
    /// Fresh memory for a strategy. Goal-based agents snapshot the
    /// uncollected resources at construction.
    pub fn new(kind: StrategyKind, registry: &ResourceRegistry) -> Self {
        match kind {
            StrategyKind::Simple => StrategyState::Simple,
            StrategyKind::GoalBased => StrategyState::GoalBased {
                worklist: registry.pending_ids().collect(),
            },
            StrategyKind::StateBased => StrategyState::StateBased {
                visited: BTreeSet::new(),
            },
            StrategyKind::Cooperative => StrategyState::Cooperative,
            StrategyKind::Bdi => StrategyState::Bdi {
                beliefs: BTreeMap::new(),
            },
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyState::Simple => StrategyKind::Simple,
            StrategyState::GoalBased { .. } => StrategyKind::GoalBased,
            StrategyState::StateBased { .. } => StrategyKind::StateBased,
            StrategyState::Cooperative => StrategyKind::Cooperative,
            StrategyState::Bdi { .. } => StrategyKind::Bdi,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub position: Position,
    pub base: Position,
    /// Total value credited to this agent
    pub resources_collected: u32,
    /// Written only by the storm controller
    pub in_storm: bool,
    pub mode: Mode,
    /// Reached base during the current storm; cleared once the storm is over
    pub sheltered: bool,
    pub claim: Option<PendingClaim>,
    pub state: StrategyState,
}

impl Agent {
    pub fn new(id: AgentId, position: Position, base: Position, state: StrategyState) -> Self {
        Self {
            id,
            position,
            base,
            resources_collected: 0,
            in_storm: false,
            mode: Mode::Foraging,
            sheltered: false,
            claim: None,
            state,
        }
    }

    pub fn strategy(&self) -> StrategyKind {
        self.state.kind()
    }

    pub fn is_at_base(&self) -> bool {
        self.position == self.base
    }

    pub fn is_fleeing(&self) -> bool {
        self.mode == Mode::Fleeing
    }

    /// True if holding a pending claim on `resource`.
    pub fn is_claiming(&self, resource: ResourceId) -> bool {
        self.claim.map_or(false, |c| c.resource == resource)
    }

    /// Goal-based worklist, if this agent has one.
    pub fn worklist(&self) -> Option<&VecDeque<ResourceId>> {
        match &self.state {
            StrategyState::GoalBased { worklist } => Some(worklist),
            _ => None,
        }
    }

    /// BDI beliefs, if this agent has them.
    pub fn beliefs(&self) -> Option<&BTreeMap<Position, CellStatus>> {
        match &self.state {
            StrategyState::Bdi { beliefs } => Some(beliefs),
            _ => None,
        }
    }
}
