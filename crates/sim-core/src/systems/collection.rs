//! Collection System
//!
//! Resolves one agent's collection attempt at its current cell. Single-agent
//! resources are taken outright; multi-agent resources go through pending
//! claims and complete once enough claimants share the cell.
//!
//! Mutations land immediately, so agents later in the roster observe them in
//! the same tick.

use sim_events::ResourceKind;

use crate::components::agent::{Agent, AgentId, PendingClaim};
use crate::components::resource::{ResourceId, ResourceRegistry};

/// Result of a collection attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectOutcome {
    /// No eligible resource at the cell
    Nothing,
    /// Single-agent resource taken
    Collected { resource: ResourceId, value: u32 },
    /// First claim on a multi-agent resource
    ClaimOpened { resource: ResourceId },
    /// Still waiting for helpers
    ClaimHeld { resource: ResourceId },
    /// Multi-agent resource completed; the completing agent is listed first
    Completed {
        resource: ResourceId,
        participants: Vec<AgentId>,
        value: u32,
    },
}

/// Attempt collection for `agents[idx]` at its position. At most one resource
/// is affected: the first eligible entry in registry order.
pub fn collect_at(
    agents: &mut [Agent],
    idx: usize,
    registry: &mut ResourceRegistry,
    filter: Option<ResourceKind>,
) -> CollectOutcome {
    let position = agents[idx].position;
    let Some(target) = registry.find_collectible_at(position, filter) else {
        return CollectOutcome::Nothing;
    };
    let (resource, value, required) = (target.id, target.value, target.required_agents);

    if required <= 1 {
        registry.mark_collected(resource);
        agents[idx].resources_collected += value;
        return CollectOutcome::Collected { resource, value };
    }

    let helpers: Vec<usize> = agents
        .iter()
        .enumerate()
        .filter(|&(j, other)| j != idx && other.position == position && other.is_claiming(resource))
        .map(|(j, _)| j)
        .take(required as usize - 1)
        .collect();

    if helpers.len() + 1 < required as usize {
        let agent = &mut agents[idx];
        if let Some(claim) = agent.claim.as_mut().filter(|c| c.resource == resource) {
            claim.waited += 1;
            return CollectOutcome::ClaimHeld { resource };
        }
        agent.claim = Some(PendingClaim::new(resource));
        return CollectOutcome::ClaimOpened { resource };
    }

    registry.mark_collected(resource);
    let share = value / required;
    let remainder = value % required;

    let mut participants = Vec::with_capacity(required as usize);
    agents[idx].resources_collected += share + remainder;
    participants.push(agents[idx].id);
    for &j in &helpers {
        agents[j].resources_collected += share;
        participants.push(agents[j].id);
    }

    // the resource is gone, so every claim on it lapses
    for agent in agents.iter_mut() {
        if agent.is_claiming(resource) {
            agent.claim = None;
        }
    }

    CollectOutcome::Completed {
        resource,
        participants,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::StrategyState;
    use crate::components::world::Position;
    use sim_events::StrategyKind;

    fn agent_at(id: usize, x: i32, y: i32, registry: &ResourceRegistry) -> Agent {
        Agent::new(
            AgentId(id),
            Position::new(x, y),
            Position::new(0, 0),
            StrategyState::new(StrategyKind::Cooperative, registry),
        )
    }

    #[test]
    fn test_single_agent_collection() {
        let mut registry = ResourceRegistry::new();
        let crystal = registry.register(Position::new(2, 2), ResourceKind::Crystal);
        let mut agents = vec![agent_at(0, 2, 2, &registry), agent_at(1, 2, 2, &registry)];

        assert_eq!(
            collect_at(&mut agents, 0, &mut registry, None),
            CollectOutcome::Collected {
                resource: crystal,
                value: 10
            }
        );
        // first claim wins; the second agent finds nothing
        assert_eq!(collect_at(&mut agents, 1, &mut registry, None), CollectOutcome::Nothing);
        assert_eq!(agents[0].resources_collected, 10);
        assert_eq!(agents[1].resources_collected, 0);
        assert!(registry.is_collected(crystal));
    }

    #[test]
    fn test_filter_and_registry_order() {
        let mut registry = ResourceRegistry::new();
        let metal = registry.register(Position::new(1, 1), ResourceKind::Metal);
        let crystal = registry.register(Position::new(1, 1), ResourceKind::Crystal);
        let mut agents = vec![agent_at(0, 1, 1, &registry)];

        assert_eq!(
            collect_at(&mut agents, 0, &mut registry, Some(ResourceKind::Crystal)),
            CollectOutcome::Collected {
                resource: crystal,
                value: 10
            }
        );
        assert_eq!(
            collect_at(&mut agents, 0, &mut registry, None),
            CollectOutcome::Collected {
                resource: metal,
                value: 20
            }
        );
        assert_eq!(agents[0].resources_collected, 30);
    }

    #[test]
    fn test_structure_needs_two_claimants() {
        let mut registry = ResourceRegistry::new();
        let structure = registry.register(Position::new(4, 4), ResourceKind::AncientStructure);
        let mut agents = vec![
            agent_at(0, 4, 4, &registry),
            agent_at(1, 0, 0, &registry),
            agent_at(2, 4, 4, &registry),
        ];

        assert_eq!(
            collect_at(&mut agents, 0, &mut registry, None),
            CollectOutcome::ClaimOpened {
                resource: structure
            }
        );
        assert_eq!(
            collect_at(&mut agents, 0, &mut registry, None),
            CollectOutcome::ClaimHeld {
                resource: structure
            }
        );
        assert_eq!(agents[0].claim.unwrap().waited, 1);
        assert!(!registry.is_collected(structure));

        assert_eq!(
            collect_at(&mut agents, 2, &mut registry, None),
            CollectOutcome::Completed {
                resource: structure,
                participants: vec![AgentId(2), AgentId(0)],
                value: 50,
            }
        );
        assert!(registry.is_collected(structure));
        assert_eq!(agents[0].resources_collected, 25);
        assert_eq!(agents[2].resources_collected, 25);
        assert!(agents.iter().all(|a| a.claim.is_none()));
    }

    #[test]
    fn test_co_located_without_claim_does_not_complete() {
        let mut registry = ResourceRegistry::new();
        let structure = registry.register(Position::new(4, 4), ResourceKind::AncientStructure);
        let mut agents = vec![agent_at(0, 4, 4, &registry), agent_at(1, 4, 4, &registry)];

        // neither has claimed yet: the first opens, the second completes
        assert!(matches!(
            collect_at(&mut agents, 0, &mut registry, None),
            CollectOutcome::ClaimOpened { .. }
        ));
        assert!(matches!(
            collect_at(&mut agents, 1, &mut registry, None),
            CollectOutcome::Completed { .. }
        ));
        assert_eq!(
            agents[0].resources_collected + agents[1].resources_collected,
            registry.get(structure).unwrap().value
        );
    }

    #[test]
    fn test_obstacles_are_never_collected() {
        let mut registry = ResourceRegistry::new();
        registry.register(Position::new(0, 0), ResourceKind::Obstacle);
        let mut agents = vec![agent_at(0, 0, 0, &registry)];
        assert_eq!(collect_at(&mut agents, 0, &mut registry, None), CollectOutcome::Nothing);
    }
}
