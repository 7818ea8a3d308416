//! Strategy Dispatch
//!
//! `decide` maps an agent and a read-only view of the world to the action it
//! takes this turn. It never mutates anything; the simulation applies the
//! returned action.
//!
//! Turn sequences:
//! - Simple: collect (crystals only), then random step
//! - Cooperative: collect, then random step
//! - GoalBased: step toward the first uncollected worklist entry, then collect
//! - StateBased: step to an unvisited neighbour, then collect
//! - BDI: step toward the first cell believed available (random step
//!   otherwise), then collect
//!
//! Agents holding a pending claim skip their step and draw no randomness.

use rand::Rng;
use sim_events::{CellStatus, ResourceKind};

use crate::components::agent::{Agent, StrategyState};
use crate::components::resource::ResourceRegistry;
use crate::components::world::{Position, World};

use super::movement::{directed_step, explore_step, flee_step, random_step};

/// Read-only state a strategy may consult
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    pub world: &'a World,
    pub registry: &'a ResourceRegistry,
}

/// Whether collection happens before or after the step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOrder {
    CollectThenMove,
    MoveThenCollect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForagePlan {
    pub order: TurnOrder,
    /// `None` means stay put
    pub step: Option<Position>,
    /// Restricts which resource kind may be collected
    pub filter: Option<ResourceKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Storm override: one step toward base, no collection
    Flee { to: Position },
    Forage(ForagePlan),
}

pub fn decide<R: Rng + ?Sized>(agent: &Agent, view: &WorldView<'_>, rng: &mut R) -> Action {
    if agent.is_fleeing() {
        return Action::Flee {
            to: flee_step(view.world, agent.position, agent.base, rng),
        };
    }

    let holding = agent.claim.is_some();
    let plan = match &agent.state {
        StrategyState::Simple => ForagePlan {
            order: TurnOrder::CollectThenMove,
            step: (!holding).then(|| random_step(view.world, agent.position, rng)),
            filter: Some(ResourceKind::Crystal),
        },
        StrategyState::Cooperative => ForagePlan {
            order: TurnOrder::CollectThenMove,
            step: (!holding).then(|| random_step(view.world, agent.position, rng)),
            filter: None,
        },
        StrategyState::GoalBased { worklist } => {
            let target = worklist
                .iter()
                .filter_map(|&id| view.registry.get(id))
                .find(|r| !r.collected)
                .map(|r| r.position);
            ForagePlan {
                order: TurnOrder::MoveThenCollect,
                step: (!holding).then(|| match target {
                    Some(target) => directed_step(view.world, agent.position, target, rng),
                    None => random_step(view.world, agent.position, rng),
                }),
                filter: None,
            }
        }
        StrategyState::StateBased { visited } => ForagePlan {
            order: TurnOrder::MoveThenCollect,
            step: if holding {
                None
            } else {
                explore_step(view.world, agent.position, visited, rng)
            },
            filter: None,
        },
        StrategyState::Bdi { beliefs } => {
            let target = beliefs
                .iter()
                .find(|(_, status)| **status == CellStatus::Available)
                .map(|(&p, _)| p);
            ForagePlan {
                order: TurnOrder::MoveThenCollect,
                step: (!holding).then(|| match target {
                    Some(target) => directed_step(view.world, agent.position, target, rng),
                    None => random_step(view.world, agent.position, rng),
                }),
                filter: None,
            }
        }
    };
    Action::Forage(plan)
}
