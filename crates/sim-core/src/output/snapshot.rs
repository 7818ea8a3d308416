//! Snapshot Generation
//!
//! Captures the simulation at a tick boundary, writes snapshots to disk, and
//! rebuilds a simulation from one.

use rand::rngs::SmallRng;
use sim_events::{
    generate_snapshot_id, AgentSnapshot, CellEntry, ClaimSnapshot, GridSnapshot, MemorySnapshot,
    ModeSnapshot, ProcessSnapshot, ResourceSnapshot, StormSnapshot, WorldSnapshot,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::components::agent::{Agent, AgentId, Mode, PendingClaim, StrategyState};
use crate::components::blackboard::Blackboard;
use crate::components::resource::{ResourceId, ResourceRegistry};
use crate::components::world::{GridBounds, Position, World};
use crate::config::Config;
use crate::error::SetupError;
use crate::events::PendingEvents;
use crate::scheduler::{ProcessId, Scheduler, SimulationClock};
use crate::setup::check_placement;
use crate::simulation::Simulation;
use crate::systems::StormController;

/// Snapshot persistence or restore failure
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot describes an invalid world: {0}")]
    Setup(#[from] SetupError),

    #[error("snapshot is inconsistent: {0}")]
    Mismatch(String),
}

/// Tracks snapshot ids and the snapshot interval
#[derive(Debug, Clone)]
pub struct SnapshotGenerator {
    next_snapshot_id: u64,
    snapshot_interval: u64,
    last_snapshot_tick: Option<u64>,
}

impl SnapshotGenerator {
    /// An interval of 0 disables periodic snapshots.
    pub fn new(snapshot_interval: u64) -> Self {
        Self {
            next_snapshot_id: 1,
            snapshot_interval,
            last_snapshot_tick: None,
        }
    }

    pub fn should_snapshot(&self, current_tick: u64) -> bool {
        self.snapshot_interval > 0
            && current_tick % self.snapshot_interval == 0
            && self.last_snapshot_tick != Some(current_tick)
    }

    pub fn next_id(&mut self) -> String {
        let id = generate_snapshot_id(self.next_snapshot_id);
        self.next_snapshot_id += 1;
        id
    }

    pub fn mark_snapshot(&mut self, tick: u64) {
        self.last_snapshot_tick = Some(tick);
    }
}

/// Generate a complete world snapshot
pub fn generate_snapshot(sim: &Simulation, snapshot_id: &str, triggered_by: &str) -> WorldSnapshot {
    let world = sim.world();
    let bounds = world.bounds();

    let resources = sim
        .registry()
        .all()
        .iter()
        .map(|r| ResourceSnapshot {
            resource_id: r.id.0,
            position: r.position.into(),
            kind: r.kind,
            color: r.kind.color(),
            value: r.value,
            required_agents: r.required_agents,
            collected: r.collected,
        })
        .collect();

    let agents = sim.agents().iter().map(agent_snapshot).collect();

    WorldSnapshot {
        snapshot_id: snapshot_id.to_string(),
        tick: sim.now(),
        triggered_by: triggered_by.to_string(),
        grid: GridSnapshot {
            width: bounds.width,
            height: bounds.height,
            base: world.base().into(),
            obstacles: world.obstacles().map(Into::into).collect(),
        },
        storm: StormSnapshot {
            phase: sim.storm().phase(),
            incursions: sim.storm().incursions(),
            next_transition: sim.scheduler().next_due(ProcessId::Storm),
        },
        resources,
        agents,
        blackboard: cell_entries(sim.blackboard().iter()),
        processes: sim
            .scheduler()
            .entries()
            .map(|(process, next_due)| ProcessSnapshot {
                process: process.to_string(),
                next_due,
            })
            .collect(),
        next_event_sequence: sim.next_event_sequence,
    }
}

fn agent_snapshot(agent: &Agent) -> AgentSnapshot {
    let memory = match &agent.state {
        StrategyState::Simple => MemorySnapshot::Simple,
        StrategyState::GoalBased { worklist } => MemorySnapshot::GoalBased {
            worklist: worklist.iter().map(|id| id.0).collect(),
        },
        StrategyState::StateBased { visited } => MemorySnapshot::StateBased {
            visited: visited.iter().map(|&p| p.into()).collect(),
        },
        StrategyState::Cooperative => MemorySnapshot::Cooperative,
        StrategyState::Bdi { beliefs } => MemorySnapshot::Bdi {
            beliefs: cell_entries(beliefs.iter().map(|(&p, &s)| (p, s))),
        },
    };

    AgentSnapshot {
        agent_id: agent.id.to_string(),
        strategy: agent.strategy(),
        color: agent.strategy().color(),
        position: agent.position.into(),
        base: agent.base.into(),
        resources_collected: agent.resources_collected,
        in_storm: agent.in_storm,
        mode: match agent.mode {
            Mode::Foraging => ModeSnapshot::Foraging,
            Mode::Fleeing => ModeSnapshot::Fleeing,
        },
        sheltered: agent.sheltered,
        claim: agent.claim.map(|c| ClaimSnapshot {
            resource_id: c.resource.0,
            waited: c.waited,
        }),
        memory,
    }
}

fn cell_entries(
    entries: impl Iterator<Item = (Position, sim_events::CellStatus)>,
) -> Vec<CellEntry> {
    entries
        .map(|(position, status)| CellEntry {
            position: position.into(),
            status,
        })
        .collect()
}

/// Rebuilds a simulation from a snapshot. Storm timing and coordination
/// tuning come from `config`; the random generator is taken as given, so a
/// clone of the original run's generator continues it exactly.
pub fn restore_simulation(
    snapshot: &WorldSnapshot,
    config: &Config,
    rng: SmallRng,
) -> Result<Simulation, SnapshotError> {
    let grid = &snapshot.grid;
    let bounds = GridBounds::new(grid.width, grid.height)?;

    let mut registry = ResourceRegistry::new();
    for (i, r) in snapshot.resources.iter().enumerate() {
        if r.resource_id != i {
            return Err(SnapshotError::Mismatch(format!(
                "resource #{} carries id {}",
                i, r.resource_id
            )));
        }
        let id = registry.register(r.position.into(), r.kind);
        registry.set_collected(id, r.collected);
    }

    let world = World::new(bounds, grid.base.into(), registry.obstacle_positions())?;
    let listed: BTreeSet<Position> = grid.obstacles.iter().map(|&c| c.into()).collect();
    if !listed.iter().copied().eq(world.obstacles()) {
        return Err(SnapshotError::Mismatch(
            "grid obstacles differ from obstacle resources".into(),
        ));
    }

    let agents = snapshot
        .agents
        .iter()
        .enumerate()
        .map(|(i, a)| restore_agent(AgentId(i), a, &world, &registry))
        .collect::<Result<Vec<_>, _>>()?;
    if agents.is_empty() {
        return Err(SetupError::EmptyRoster.into());
    }

    let mut blackboard = Blackboard::new();
    for entry in &snapshot.blackboard {
        blackboard.publish(entry.position.into(), entry.status);
    }

    let storm = StormController::resume_from(
        config.storm.clone(),
        snapshot.storm.phase,
        snapshot.storm.incursions,
    );

    let mut scheduler = Scheduler::new();
    for idx in 0..agents.len() {
        scheduler.register(ProcessId::Agent(idx), snapshot.tick);
    }
    if let Some(due) = snapshot.storm.next_transition {
        scheduler.register(ProcessId::Storm, due);
    }
    for entry in &snapshot.processes {
        let process: ProcessId = entry.process.parse().map_err(SnapshotError::Mismatch)?;
        if let ProcessId::Agent(idx) = process {
            if idx >= agents.len() {
                return Err(SnapshotError::Mismatch(format!(
                    "process {} has no agent",
                    entry.process
                )));
            }
        }
        scheduler.register(process, entry.next_due);
    }
    if storm.is_enabled() && scheduler.next_due(ProcessId::Storm).is_none() {
        return Err(SnapshotError::Mismatch("storm process is missing".into()));
    }

    Ok(Simulation {
        world,
        registry,
        agents,
        blackboard,
        storm,
        scheduler,
        clock: SimulationClock::starting_at(snapshot.tick),
        behavior: config.behavior.clone(),
        rng,
        events: PendingEvents::new(),
        next_event_sequence: snapshot.next_event_sequence.max(1),
    })
}

fn restore_agent(
    id: AgentId,
    snapshot: &AgentSnapshot,
    world: &World,
    registry: &ResourceRegistry,
) -> Result<Agent, SnapshotError> {
    let position = Position::from(snapshot.position);
    let base = Position::from(snapshot.base);
    check_placement(world, &format!("{} position", id), position)?;
    check_placement(world, &format!("{} base", id), base)?;

    let known = |resource_id: usize| {
        if resource_id < registry.len() {
            Ok(ResourceId(resource_id))
        } else {
            Err(SnapshotError::Mismatch(format!(
                "{} refers to unknown resource {}",
                id, resource_id
            )))
        }
    };

    let state = match &snapshot.memory {
        MemorySnapshot::Simple => StrategyState::Simple,
        MemorySnapshot::GoalBased { worklist } => StrategyState::GoalBased {
            worklist: worklist
                .iter()
                .map(|&r| known(r))
                .collect::<Result<VecDeque<_>, _>>()?,
        },
        MemorySnapshot::StateBased { visited } => StrategyState::StateBased {
            visited: visited.iter().map(|&c| c.into()).collect(),
        },
        MemorySnapshot::Cooperative => StrategyState::Cooperative,
        MemorySnapshot::Bdi { beliefs } => StrategyState::Bdi {
            beliefs: beliefs
                .iter()
                .map(|e| (e.position.into(), e.status))
                .collect::<BTreeMap<_, _>>(),
        },
    };
    if state.kind() != snapshot.strategy {
        return Err(SnapshotError::Mismatch(format!(
            "{} is {} but carries {} memory",
            id,
            snapshot.strategy,
            state.kind()
        )));
    }

    let claim = match &snapshot.claim {
        Some(c) => Some(PendingClaim {
            resource: known(c.resource_id)?,
            waited: c.waited,
        }),
        None => None,
    };

    Ok(Agent {
        id,
        position,
        base,
        resources_collected: snapshot.resources_collected,
        in_storm: snapshot.in_storm,
        mode: match snapshot.mode {
            ModeSnapshot::Foraging => Mode::Foraging,
            ModeSnapshot::Fleeing => Mode::Fleeing,
        },
        sheltered: snapshot.sheltered,
        claim,
        state,
    })
}

/// Write snapshot to file
pub fn write_snapshot(snapshot: &WorldSnapshot, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read a snapshot written by `write_snapshot`
pub fn read_snapshot(path: impl AsRef<Path>) -> Result<WorldSnapshot, SnapshotError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write snapshot to `<output_dir>/snapshots/<snapshot_id>.json`
pub fn write_snapshot_to_dir(
    snapshot: &WorldSnapshot,
    output_dir: impl AsRef<Path>,
) -> Result<PathBuf, SnapshotError> {
    let dir = output_dir.as_ref().join("snapshots");
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{}.json", snapshot.snapshot_id));
    write_snapshot(snapshot, &path)?;
    Ok(path)
}

/// Write current state (overwrites each time)
pub fn write_current_state(
    snapshot: &WorldSnapshot,
    output_dir: impl AsRef<Path>,
) -> Result<(), SnapshotError> {
    write_snapshot(snapshot, output_dir.as_ref().join("current_state.json"))
}
