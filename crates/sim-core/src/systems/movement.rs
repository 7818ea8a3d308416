//! Movement System
//!
//! Step rules shared by the strategies. Every function returns the next
//! cell; the caller applies it. No step ever lands outside the grid or on an
//! obstacle.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

use crate::components::world::{Direction, Position, World};

/// Uniform cardinal step. A step off the edge or onto an obstacle leaves the
/// agent where it is.
pub fn random_step<R: Rng + ?Sized>(world: &World, from: Position, rng: &mut R) -> Position {
    let Some(&direction) = Direction::ALL.choose(rng) else {
        return from;
    };
    let target = world.bounds().clamp(from.offset(direction));
    if world.is_obstacle(target) {
        from
    } else {
        target
    }
}

/// First unvisited passable neighbour in shuffled direction order.
pub fn explore_step<R: Rng + ?Sized>(
    world: &World,
    from: Position,
    visited: &BTreeSet<Position>,
    rng: &mut R,
) -> Option<Position> {
    let mut directions = Direction::ALL;
    directions.shuffle(rng);
    directions
        .iter()
        .map(|&d| from.offset(d))
        .find(|&p| world.is_passable(p) && !visited.contains(&p))
}

/// Greedy step toward a target: x-axis first, then the y-axis. No path is
/// planned around obstacles; when both axis steps are blocked the agent takes
/// a random step instead, so a blocked target never freezes it.
pub fn directed_step<R: Rng + ?Sized>(
    world: &World,
    from: Position,
    target: Position,
    rng: &mut R,
) -> Position {
    if from == target {
        return from;
    }

    let along_x = (from.x != target.x).then(|| from.step_toward(target));
    let along_y = (from.y != target.y).then(|| from.step_toward_y(target));

    along_x
        .into_iter()
        .chain(along_y)
        .find(|&p| world.is_passable(p))
        .unwrap_or_else(|| random_step(world, from, rng))
}

/// Return-to-base step.
pub fn flee_step<R: Rng + ?Sized>(
    world: &World,
    from: Position,
    base: Position,
    rng: &mut R,
) -> Position {
    directed_step(world, from, base, rng)
}
