//! Blackboard
//!
//! Shared read/write map through which agents publish what they found at a
//! cell. Owned by the simulation; agents never read each other's memory.

use sim_events::CellStatus;
use std::collections::BTreeMap;

use super::world::Position;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blackboard {
    entries: BTreeMap<Position, CellStatus>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the latest status of a cell, replacing any earlier entry.
    pub fn publish(&mut self, position: Position, status: CellStatus) {
        self.entries.insert(position, status);
    }

    /// Copy of every entry, ordered by position.
    pub fn snapshot(&self) -> BTreeMap<Position, CellStatus> {
        self.entries.clone()
    }

    pub fn status_at(&self, position: Position) -> Option<CellStatus> {
        self.entries.get(&position).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, CellStatus)> + '_ {
        self.entries.iter().map(|(p, s)| (*p, *s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
