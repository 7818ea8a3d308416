//! Resource Registry
//!
//! Typed collectibles and obstacle markers. Entries are registered once at
//! setup and never removed; `collected` is a permanent terminal flag.

use serde::{Deserialize, Serialize};
use sim_events::ResourceKind;
use std::fmt;

use super::world::Position;

/// Index of a resource in registry order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub usize);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "res_{:03}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub position: Position,
    pub kind: ResourceKind,
    pub value: u32,
    pub required_agents: u32,
    pub collected: bool,
}

impl Resource {
    pub fn new(id: ResourceId, position: Position, kind: ResourceKind) -> Self {
        Self {
            id,
            position,
            kind,
            value: kind.value(),
            required_agents: kind.required_agents(),
            collected: false,
        }
    }

    /// Uncollected and of a collectible kind.
    pub fn is_available(&self) -> bool {
        !self.collected && self.kind.is_collectible()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: Vec<Resource>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, position: Position, kind: ResourceKind) -> ResourceId {
        let id = ResourceId(self.resources.len());
        self.resources.push(Resource::new(id, position, kind));
        id
    }

    pub fn get(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(id.0)
    }

    pub fn all(&self) -> &[Resource] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// First available resource at `position` in registry order,
    /// optionally restricted to one kind.
    pub fn find_collectible_at(
        &self,
        position: Position,
        kind: Option<ResourceKind>,
    ) -> Option<&Resource> {
        self.resources.iter().find(|r| {
            r.position == position && r.is_available() && kind.map_or(true, |k| r.kind == k)
        })
    }

    /// Marks a resource collected. Returns true only on the first call for
    /// a collectible resource; later calls are no-ops.
    pub fn mark_collected(&mut self, id: ResourceId) -> bool {
        match self.resources.get_mut(id.0) {
            Some(r) if r.is_available() => {
                r.collected = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_collected(&self, id: ResourceId) -> bool {
        self.get(id).map_or(false, |r| r.collected)
    }

    pub fn uncollected_count(&self) -> usize {
        self.resources.iter().filter(|r| r.is_available()).count()
    }

    pub fn obstacle_at(&self, position: Position) -> bool {
        self.resources
            .iter()
            .any(|r| r.kind == ResourceKind::Obstacle && r.position == position)
    }

    pub fn obstacle_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.resources
            .iter()
            .filter(|r| r.kind == ResourceKind::Obstacle)
            .map(|r| r.position)
    }

    /// Uncollected collectibles in registry order.
    pub fn pending_ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.resources
            .iter()
            .filter(|r| r.is_available())
            .map(|r| r.id)
    }

    /// Restores the collected flag of a registered resource.
    pub(crate) fn set_collected(&mut self, id: ResourceId, collected: bool) {
        if let Some(r) = self.resources.get_mut(id.0) {
            r.collected = collected && r.kind.is_collectible();
        }
    }
}
