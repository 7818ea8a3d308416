//! Coordination
//!
//! Cross-agent operations run once per tick after every process has acted:
//! BDI belief merging from the blackboard and cooperative assists.

use sim_events::{CellStatus, StrategyKind};
use std::collections::BTreeMap;

use crate::components::agent::Agent;
use crate::components::blackboard::Blackboard;
use crate::components::world::Position;

/// Index of the agent a cooperative helper at `idx` should join.
///
/// Candidates are the other agents within `radius` (Manhattan, inclusive).
/// The first claimant in roster order wins, then the first candidate.
pub fn assist_target(agents: &[Agent], idx: usize, radius: u32) -> Option<usize> {
    let helper = agents.get(idx)?;
    if helper.strategy() != StrategyKind::Cooperative || helper.is_fleeing() || helper.claim.is_some() {
        return None;
    }

    let candidates: Vec<usize> = agents
        .iter()
        .enumerate()
        .filter(|&(j, other)| j != idx && helper.position.manhattan(other.position) <= radius)
        .map(|(j, _)| j)
        .collect();

    candidates
        .iter()
        .copied()
        .find(|&j| agents[j].claim.is_some())
        .or_else(|| candidates.first().copied())
}

/// Overlays the blackboard on an agent's own beliefs; published entries win.
pub fn merge_beliefs(beliefs: &mut BTreeMap<Position, CellStatus>, board: &Blackboard) {
    beliefs.extend(board.iter());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::{AgentId, Mode, PendingClaim, StrategyState};
    use crate::components::resource::{ResourceId, ResourceRegistry};

    fn agent(id: usize, kind: StrategyKind, x: i32, y: i32) -> Agent {
        let registry = ResourceRegistry::new();
        Agent::new(
            AgentId(id),
            Position::new(x, y),
            Position::new(0, 0),
            StrategyState::new(kind, &registry),
        )
    }

    #[test]
    fn test_assist_prefers_claimants() {
        let mut agents = vec![
            agent(0, StrategyKind::Cooperative, 5, 5),
            agent(1, StrategyKind::Simple, 6, 5),
            agent(2, StrategyKind::GoalBased, 5, 8),
            agent(3, StrategyKind::Bdi, 9, 9),
        ];
        assert_eq!(assist_target(&agents, 0, 4), Some(1));

        agents[2].claim = Some(PendingClaim::new(ResourceId(0)));
        assert_eq!(assist_target(&agents, 0, 4), Some(2));

        // radius is inclusive; (9, 9) is eight away
        agents[2].claim = None;
        agents[1].position = Position::new(0, 0);
        agents[2].position = Position::new(0, 1);
        assert_eq!(assist_target(&agents, 0, 8), Some(3));
        assert_eq!(assist_target(&agents, 0, 7), None);
    }

    #[test]
    fn test_only_free_cooperative_agents_assist() {
        let mut agents = vec![
            agent(0, StrategyKind::Cooperative, 5, 5),
            agent(1, StrategyKind::Simple, 6, 5),
        ];
        assert_eq!(assist_target(&agents, 1, 4), None);

        agents[0].mode = Mode::Fleeing;
        assert_eq!(assist_target(&agents, 0, 4), None);

        agents[0].mode = Mode::Foraging;
        agents[0].claim = Some(PendingClaim::new(ResourceId(2)));
        assert_eq!(assist_target(&agents, 0, 4), None);
    }

    #[test]
    fn test_merge_beliefs_blackboard_wins() {
        let mut beliefs = BTreeMap::new();
        beliefs.insert(Position::new(1, 1), CellStatus::Available);
        beliefs.insert(Position::new(2, 2), CellStatus::Available);

        let mut board = Blackboard::new();
        board.publish(Position::new(1, 1), CellStatus::Collected);
        board.publish(Position::new(3, 0), CellStatus::Available);

        merge_beliefs(&mut beliefs, &board);
        assert_eq!(beliefs.len(), 3);
        assert_eq!(beliefs[&Position::new(1, 1)], CellStatus::Collected);
        assert_eq!(beliefs[&Position::new(2, 2)], CellStatus::Available);
    }
}
