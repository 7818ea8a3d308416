//! Agent Spawning
//!
//! Turns the configured roster into agents. Roster order is the turn order
//! for the whole run.

use std::collections::BTreeMap;
use std::fmt;

use crate::components::agent::{Agent, AgentId, StrategyState};
use crate::components::resource::ResourceRegistry;
use crate::components::world::{Position, World};
use crate::config::AgentSpec;
use crate::error::SetupError;

/// Spawn one agent per roster entry. Bases default to the world base and
/// starts default to the agent's base.
pub fn spawn_agents(
    roster: &[AgentSpec],
    world: &World,
    registry: &ResourceRegistry,
) -> Result<Vec<Agent>, SetupError> {
    if roster.is_empty() {
        return Err(SetupError::EmptyRoster);
    }

    roster
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let id = AgentId(i);
            let base = spec.base.map(Position::from).unwrap_or(world.base());
            let start = spec.start.map(Position::from).unwrap_or(base);
            check_placement(world, &format!("{} base", id), base)?;
            check_placement(world, &format!("{} start", id), start)?;
            Ok(Agent::new(
                id,
                start,
                base,
                StrategyState::new(spec.strategy, registry),
            ))
        })
        .collect()
}

/// In bounds and off every obstacle.
pub fn check_placement(world: &World, what: &str, position: Position) -> Result<(), SetupError> {
    world.bounds().check(what, position)?;
    if world.is_obstacle(position) {
        return Err(SetupError::OnObstacle {
            what: what.to_string(),
            position,
        });
    }
    Ok(())
}

/// Roster counts per strategy
#[derive(Debug)]
pub struct SpawnSummary {
    pub total_agents: usize,
    pub by_strategy: BTreeMap<String, usize>,
}

pub fn get_spawn_summary(agents: &[Agent]) -> SpawnSummary {
    let mut by_strategy = BTreeMap::new();
    for agent in agents {
        *by_strategy.entry(agent.strategy().to_string()).or_insert(0) += 1;
    }
    SpawnSummary {
        total_agents: agents.len(),
        by_strategy,
    }
}

impl fmt::Display for SpawnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} agents", self.total_agents)?;
        let parts: Vec<String> = self
            .by_strategy
            .iter()
            .map(|(strategy, count)| format!("{} {}", count, strategy))
            .collect();
        if !parts.is_empty() {
            write!(f, " ({})", parts.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::world::GridBounds;
    use sim_events::{Coord, StrategyKind};

    fn world() -> World {
        World::new(
            GridBounds::new(8, 8).unwrap(),
            Position::new(4, 4),
            [Position::new(1, 1)],
        )
        .unwrap()
    }

    #[test]
    fn test_spawn_defaults_to_base() {
        let roster = vec![
            AgentSpec::new(StrategyKind::Simple),
            AgentSpec::new(StrategyKind::GoalBased).at(Coord::new(5, 4)),
            AgentSpec::new(StrategyKind::Bdi).with_base(Coord::new(0, 7)),
        ];
        let agents = spawn_agents(&roster, &world(), &ResourceRegistry::new()).unwrap();

        assert_eq!(agents.len(), 3);
        assert_eq!(agents[0].position, Position::new(4, 4));
        assert_eq!(agents[1].position, Position::new(5, 4));
        assert_eq!(agents[1].base, Position::new(4, 4));
        assert_eq!(agents[2].position, Position::new(0, 7));
        assert_eq!(agents[2].id, AgentId(2));

        let summary = get_spawn_summary(&agents);
        assert_eq!(summary.total_agents, 3);
        assert_eq!(summary.to_string(), "3 agents (1 bdi, 1 goal_based, 1 simple)");
    }

    #[test]
    fn test_spawn_rejects_bad_placement() {
        let world = world();
        let registry = ResourceRegistry::new();

        let roster = vec![AgentSpec::new(StrategyKind::Simple).at(Coord::new(1, 1))];
        assert!(matches!(
            spawn_agents(&roster, &world, &registry),
            Err(SetupError::OnObstacle { .. })
        ));

        let roster = vec![AgentSpec::new(StrategyKind::Simple).with_base(Coord::new(8, 0))];
        assert!(matches!(
            spawn_agents(&roster, &world, &registry),
            Err(SetupError::OutOfBounds { .. })
        ));

        assert!(matches!(
            spawn_agents(&[], &world, &registry),
            Err(SetupError::EmptyRoster)
        ));
    }
}
