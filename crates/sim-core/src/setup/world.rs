//! World Setup
//!
//! Builds the grid, scatters obstacles and collectibles from the configured
//! counts. Obstacles never land on the base or on an agent's start or base
//! cell; collectibles never land on obstacles.

use rand::seq::SliceRandom;
use rand::Rng;
use sim_events::ResourceKind;
use std::collections::BTreeSet;

use crate::components::resource::ResourceRegistry;
use crate::components::world::{GridBounds, Position, World};
use crate::config::Config;
use crate::error::SetupError;

/// Create the world and its resource registry. Obstacles are registered
/// first, then crystals, metals and ancient structures.
pub fn create_world<R: Rng + ?Sized>(
    config: &Config,
    rng: &mut R,
) -> Result<(World, ResourceRegistry), SetupError> {
    let grid = &config.grid;
    let bounds = GridBounds::new(grid.width, grid.height)?;
    let base = Position::from(grid.base_or_center());
    bounds.check("base", base)?;

    let mut reserved = BTreeSet::from([base]);
    for spec in config.roster() {
        let agent_base = spec.base.map(Position::from).unwrap_or(base);
        reserved.insert(agent_base);
        reserved.insert(spec.start.map(Position::from).unwrap_or(agent_base));
    }

    let free: Vec<Position> = cells(bounds).filter(|p| !reserved.contains(p)).collect();
    if grid.obstacle_count > free.len() {
        return Err(SetupError::NoRoom {
            what: "obstacles".into(),
            count: grid.obstacle_count,
            free: free.len(),
        });
    }

    let mut obstacles: Vec<Position> = free
        .choose_multiple(rng, grid.obstacle_count)
        .copied()
        .collect();
    obstacles.sort();

    let mut registry = ResourceRegistry::new();
    for &position in &obstacles {
        registry.register(position, ResourceKind::Obstacle);
    }

    let world = World::new(bounds, base, registry.obstacle_positions())?;
    let open: Vec<Position> = cells(bounds).filter(|&p| world.is_passable(p)).collect();

    for &kind in ResourceKind::collectibles() {
        let count = config.resources.count(kind);
        for _ in 0..count {
            let Some(&position) = open.choose(rng) else {
                return Err(SetupError::NoRoom {
                    what: kind.to_string(),
                    count,
                    free: 0,
                });
            };
            registry.register(position, kind);
        }
    }

    tracing::debug!(
        "World {}x{}: base {}, {} obstacles, {} collectibles",
        bounds.width,
        bounds.height,
        base,
        obstacles.len(),
        registry.uncollected_count()
    );

    Ok((world, registry))
}

/// Every cell of the grid, row by row.
fn cells(bounds: GridBounds) -> impl Iterator<Item = Position> {
    (0..bounds.height).flat_map(move |y| (0..bounds.width).map(move |x| Position::new(x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentSpec;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use sim_events::{Coord, StrategyKind};

    #[test]
    fn test_default_world() {
        let config = Config::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let (world, registry) = create_world(&config, &mut rng).unwrap();

        assert_eq!(world.base(), Position::new(15, 10));
        assert_eq!(world.obstacles().count(), 10);
        assert_eq!(registry.len(), 20);
        assert_eq!(registry.uncollected_count(), 10);

        // obstacles avoid the base and the goal-based start
        assert!(!world.is_obstacle(Position::new(15, 10)));
        assert!(!world.is_obstacle(Position::new(16, 10)));
        for resource in registry.all() {
            if resource.kind.is_collectible() {
                assert!(world.is_passable(resource.position));
            }
        }
    }

    #[test]
    fn test_same_seed_same_world() {
        let config = Config::default();
        let (a, ra) = create_world(&config, &mut SmallRng::seed_from_u64(9)).unwrap();
        let (b, rb) = create_world(&config, &mut SmallRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.obstacles().collect::<Vec<_>>(), b.obstacles().collect::<Vec<_>>());
        assert_eq!(ra.all(), rb.all());
    }

    #[test]
    fn test_no_room_for_obstacles() {
        let mut config = Config::default();
        config.grid.width = 2;
        config.grid.height = 2;
        config.grid.base = Some(Coord::new(0, 0));
        config.grid.obstacle_count = 4;
        config.agents = vec![AgentSpec::new(StrategyKind::Simple)];
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(matches!(
            create_world(&config, &mut rng),
            Err(SetupError::NoRoom { .. })
        ));

        // every free cell blocked; collectibles all share the base
        config.grid.obstacle_count = 3;
        let (world, registry) = create_world(&config, &mut rng).unwrap();
        assert_eq!(world.obstacles().count(), 3);
        assert!(registry
            .all()
            .iter()
            .filter(|r| r.kind.is_collectible())
            .all(|r| r.position == Position::new(0, 0)));
    }
}
