//! Simulation
//!
//! Owns the world, the registry, every agent, the blackboard and the storm,
//! and steps them through the scheduler one tick at a time.
//!
//! Within a tick:
//! 1. agents due this tick take their turn, in roster order
//! 2. the storm controller acts, if due
//! 3. coordination: BDI agents merge the blackboard into their beliefs, then
//!    cooperative agents assist, each in roster order
//! 4. the clock advances
//!
//! Every mutation is applied inside the acting agent's turn, so later agents
//! in the same tick see it.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use sim_events::{
    generate_event_id, CellStatus, Coord, Event, EventKind, StrategyKind, WorldSnapshot,
};

use crate::components::agent::{Agent, AgentId, Mode, StrategyState};
use crate::components::blackboard::Blackboard;
use crate::components::resource::{ResourceId, ResourceRegistry};
use crate::components::world::{Position, World};
use crate::config::{BehaviorConfig, Config, StormConfig};
use crate::error::SetupError;
use crate::events::PendingEvents;
use crate::output::snapshot::{generate_snapshot, restore_simulation, SnapshotError};
use crate::scheduler::{ProcessId, Scheduler, SimulationClock};
use crate::setup::{self, check_placement};
use crate::systems::{
    assist_target, collect_at, decide, merge_beliefs, Action, CollectOutcome, ForagePlan,
    StormController, TurnOrder, WorldView,
};

pub struct Simulation {
    pub(crate) world: World,
    pub(crate) registry: ResourceRegistry,
    pub(crate) agents: Vec<Agent>,
    pub(crate) blackboard: Blackboard,
    pub(crate) storm: StormController,
    pub(crate) scheduler: Scheduler,
    pub(crate) clock: SimulationClock,
    pub(crate) behavior: BehaviorConfig,
    pub(crate) rng: SmallRng,
    pub(crate) events: PendingEvents,
    pub(crate) next_event_sequence: u64,
}

impl Simulation {
    /// Assembles a simulation at tick 0. Every agent is due immediately; the
    /// first storm delay is drawn here when storms are enabled.
    pub fn new(
        world: World,
        registry: ResourceRegistry,
        agents: Vec<Agent>,
        storm: StormConfig,
        behavior: BehaviorConfig,
        mut rng: SmallRng,
    ) -> Result<Self, SetupError> {
        if agents.is_empty() {
            return Err(SetupError::EmptyRoster);
        }
        for agent in &agents {
            check_placement(&world, &format!("{} position", agent.id), agent.position)?;
            check_placement(&world, &format!("{} base", agent.id), agent.base)?;
        }

        let mut scheduler = Scheduler::new();
        for idx in 0..agents.len() {
            scheduler.register(ProcessId::Agent(idx), 0);
        }
        let storm = StormController::new(storm);
        if storm.is_enabled() {
            let delay = storm.draw_delay(&mut rng);
            scheduler.register(ProcessId::Storm, delay);
            tracing::debug!("First storm due at tick {}", delay);
        }

        Ok(Self {
            world,
            registry,
            agents,
            blackboard: Blackboard::new(),
            storm,
            scheduler,
            clock: SimulationClock::new(),
            behavior,
            rng,
            events: PendingEvents::new(),
            next_event_sequence: 1,
        })
    }

    /// Generates the world and roster from a configuration, seeded from
    /// `config.simulation.seed`.
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let mut rng = SmallRng::seed_from_u64(config.simulation.seed);
        let (world, registry) = setup::create_world(config, &mut rng)?;
        let agents = setup::spawn_agents(&config.roster(), &world, &registry)?;
        Self::new(
            world,
            registry,
            agents,
            config.storm.clone(),
            config.behavior.clone(),
            rng,
        )
    }

    /// Runs one tick.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        for process in self.scheduler.due_at(now) {
            match process {
                ProcessId::Agent(idx) => {
                    self.take_turn(idx);
                    self.scheduler.suspend(process, now, 1);
                }
                ProcessId::Storm => {
                    let (wait, kind) = self.storm.advance(&mut self.agents, &mut self.rng);
                    self.emit(kind);
                    self.scheduler.suspend(process, now, wait);
                }
            }
        }

        for idx in 0..self.agents.len() {
            if self.agents[idx].strategy() == StrategyKind::Bdi {
                self.update_beliefs(idx);
            }
        }
        for idx in 0..self.agents.len() {
            if self.agents[idx].strategy() == StrategyKind::Cooperative {
                self.assist(idx);
            }
        }

        self.clock.advance();
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Merges the blackboard into a BDI agent's beliefs. No-op for other
    /// strategies.
    pub fn update_beliefs(&mut self, idx: usize) {
        if let Some(StrategyState::Bdi { beliefs }) = self.agents.get_mut(idx).map(|a| &mut a.state) {
            merge_beliefs(beliefs, &self.blackboard);
        }
    }

    /// Moves a cooperative agent onto a nearby agent's cell. Returns true if
    /// the agent moved.
    pub fn assist(&mut self, idx: usize) -> bool {
        let Some(target) = assist_target(&self.agents, idx, self.behavior.assist_radius) else {
            return false;
        };
        let position = self.agents[target].position;
        if position == self.agents[idx].position {
            return false;
        }
        self.agents[idx].position = position;

        let helper_id = self.agents[idx].id;
        let target_id = self.agents[target].id;
        tracing::debug!("{} joins {} at {}", helper_id, target_id, position);
        self.emit(EventKind::Assisted {
            helper_id: helper_id.to_string(),
            target_id: target_id.to_string(),
            position: position.into(),
        });
        true
    }

    fn take_turn(&mut self, idx: usize) {
        self.expire_claim(idx);
        self.observe_storm(idx);

        let view = WorldView {
            world: &self.world,
            registry: &self.registry,
        };
        let action = decide(&self.agents[idx], &view, &mut self.rng);

        match action {
            Action::Flee { to } => {
                self.move_agent(idx, to);
                self.check_shelter(idx);
            }
            Action::Forage(plan) => match plan.order {
                TurnOrder::CollectThenMove => {
                    self.collect(idx, plan);
                    // a claim opened this turn holds the agent in place
                    if self.agents[idx].claim.is_none() {
                        if let Some(step) = plan.step {
                            self.move_agent(idx, step);
                        }
                    }
                }
                TurnOrder::MoveThenCollect => {
                    if let Some(step) = plan.step {
                        self.move_agent(idx, step);
                        if let StrategyState::StateBased { visited } = &mut self.agents[idx].state {
                            visited.insert(step);
                        }
                    }
                    self.collect(idx, plan);
                }
            },
        }
    }

    /// Drops a claim that has been held for `structure_patience` turns.
    fn expire_claim(&mut self, idx: usize) {
        let patience = self.behavior.structure_patience;
        let agent = &mut self.agents[idx];
        let Some(claim) = agent.claim else {
            return;
        };
        if claim.waited < patience {
            return;
        }
        agent.claim = None;
        if let StrategyState::GoalBased { worklist } = &mut agent.state {
            if let Some(i) = worklist.iter().position(|&id| id == claim.resource) {
                if let Some(id) = worklist.remove(i) {
                    worklist.push_back(id);
                }
            }
        }

        let agent_id = agent.id;
        tracing::warn!(
            "{} gives up on {} after {} ticks",
            agent_id,
            claim.resource,
            claim.waited
        );
        self.abandon(agent_id, claim.resource, "patience");
    }

    /// Storm bookkeeping at the start of a turn: enter `Fleeing` on a new
    /// incursion, leave it on reaching base.
    fn observe_storm(&mut self, idx: usize) {
        let agent = &mut self.agents[idx];
        if !agent.in_storm {
            agent.sheltered = false;
        }
        if agent.in_storm && !agent.sheltered && agent.mode == Mode::Foraging {
            agent.mode = Mode::Fleeing;
            let agent_id = agent.id;
            if let Some(claim) = agent.claim.take() {
                self.abandon(agent_id, claim.resource, "storm");
            }
        }
        self.check_shelter(idx);
    }

    fn check_shelter(&mut self, idx: usize) {
        let agent = &mut self.agents[idx];
        if !(agent.is_fleeing() && agent.is_at_base()) {
            return;
        }
        agent.mode = Mode::Foraging;
        agent.sheltered = true;
        let (agent_id, position) = (agent.id, agent.position);
        tracing::debug!("{} sheltered at {}", agent_id, position);
        self.emit(EventKind::Sheltered {
            agent_id: agent_id.to_string(),
            position: position.into(),
        });
    }

    /// Leaving a cell releases any claim held on it.
    fn move_agent(&mut self, idx: usize, to: Position) {
        let agent = &mut self.agents[idx];
        if agent.position != to {
            agent.position = to;
            agent.claim = None;
        }
    }

    fn collect(&mut self, idx: usize, plan: ForagePlan) {
        let outcome = collect_at(&mut self.agents, idx, &mut self.registry, plan.filter);
        let agent_id = self.agents[idx].id;
        let position = self.agents[idx].position;
        let strategy = self.agents[idx].strategy();

        match outcome {
            CollectOutcome::Nothing => {
                // a believed resource that is no longer there
                if let StrategyState::Bdi { beliefs } = &mut self.agents[idx].state {
                    if beliefs.get(&position) == Some(&CellStatus::Available) {
                        beliefs.insert(position, CellStatus::Collected);
                        self.blackboard.publish(position, CellStatus::Collected);
                    }
                }
            }
            CollectOutcome::Collected { resource, value } => {
                let kind = self.resource_kind(resource);
                tracing::debug!("{} collected {} worth {} at {}", agent_id, resource, value, position);
                match strategy {
                    StrategyKind::StateBased => self.blackboard.publish(position, CellStatus::Collected),
                    StrategyKind::Bdi => self.believe_collected(idx, position),
                    _ => {}
                }
                self.prune_worklist(idx);
                if let Some(kind) = kind {
                    self.emit(EventKind::ResourceCollected {
                        agent_id: agent_id.to_string(),
                        resource_id: resource.0,
                        kind,
                        position: position.into(),
                        value,
                    });
                }
            }
            CollectOutcome::ClaimOpened { resource } => {
                tracing::debug!("{} claims {} at {}", agent_id, resource, position);
                if strategy == StrategyKind::StateBased {
                    self.blackboard.publish(position, CellStatus::Available);
                }
                self.emit(EventKind::ClaimOpened {
                    agent_id: agent_id.to_string(),
                    resource_id: resource.0,
                    position: position.into(),
                });
            }
            CollectOutcome::ClaimHeld { .. } => {}
            CollectOutcome::Completed {
                resource,
                participants,
                value,
            } => {
                tracing::debug!(
                    "{} completed by {} agents at {}",
                    resource,
                    participants.len(),
                    position
                );
                self.blackboard.publish(position, CellStatus::Collected);
                for participant in &participants {
                    self.believe_collected(participant.0, position);
                    self.prune_worklist(participant.0);
                }
                self.emit(EventKind::StructureCompleted {
                    resource_id: resource.0,
                    position: position.into(),
                    participants: participants.iter().map(|p| p.to_string()).collect(),
                    value,
                });
            }
        }
    }

    fn resource_kind(&self, id: ResourceId) -> Option<sim_events::ResourceKind> {
        self.registry.get(id).map(|r| r.kind)
    }

    fn believe_collected(&mut self, idx: usize, position: Position) {
        if let StrategyState::Bdi { beliefs } = &mut self.agents[idx].state {
            beliefs.insert(position, CellStatus::Collected);
        }
    }

    /// Drops collected entries from a goal-based worklist.
    fn prune_worklist(&mut self, idx: usize) {
        let registry = &self.registry;
        if let StrategyState::GoalBased { worklist } = &mut self.agents[idx].state {
            worklist.retain(|&id| !registry.is_collected(id));
        }
    }

    fn abandon(&mut self, agent_id: AgentId, resource: ResourceId, reason: &str) {
        self.emit(EventKind::ClaimAbandoned {
            agent_id: agent_id.to_string(),
            resource_id: resource.0,
            reason: reason.to_string(),
        });
    }

    fn emit(&mut self, kind: EventKind) {
        let id = generate_event_id(self.next_event_sequence);
        self.next_event_sequence += 1;
        self.events.push(Event::new(id, self.clock.now(), kind));
    }

    /// Captures the current tick boundary.
    pub fn snapshot(&self, snapshot_id: &str, triggered_by: &str) -> WorldSnapshot {
        generate_snapshot(self, snapshot_id, triggered_by)
    }

    /// Rebuilds a simulation from a snapshot; see `restore_simulation`.
    pub fn restore(
        snapshot: &WorldSnapshot,
        config: &Config,
        rng: SmallRng,
    ) -> Result<Self, SnapshotError> {
        restore_simulation(snapshot, config, rng)
    }

    /// Takes every event raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    /// Next tick to run.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, idx: usize) -> Option<&Agent> {
        self.agents.get(idx)
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn storm(&self) -> &StormController {
        &self.storm
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn behavior(&self) -> &BehaviorConfig {
        &self.behavior
    }

    /// Current generator state; clone it to replay from this point.
    pub fn rng(&self) -> &SmallRng {
        &self.rng
    }

    /// Sum of every agent's credited value.
    pub fn total_collected(&self) -> u32 {
        self.agents.iter().map(|a| a.resources_collected).sum()
    }

    /// Positions of every agent, in roster order.
    pub fn positions(&self) -> Vec<Coord> {
        self.agents.iter().map(|a| a.position.into()).collect()
    }
}
