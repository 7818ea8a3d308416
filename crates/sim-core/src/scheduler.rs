//! Scheduler
//!
//! Cooperative, single-threaded stepping. Each process records the tick it
//! next wants to run; a tick resumes every process due at that tick, in
//! registration order. Agents are registered in roster order and the storm
//! last, so the storm always acts after every agent.

use std::fmt;
use std::str::FromStr;

use crate::components::agent::AgentId;

/// A schedulable unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessId {
    /// Roster index
    Agent(usize),
    Storm,
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Agent(idx) => write!(f, "{}", AgentId(*idx)),
            ProcessId::Storm => write!(f, "storm"),
        }
    }
}

impl FromStr for ProcessId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "storm" {
            return Ok(ProcessId::Storm);
        }
        s.strip_prefix("agent_")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|&n| n >= 1)
            .map(|n| ProcessId::Agent(n - 1))
            .ok_or_else(|| format!("unknown process '{}'", s))
    }
}

/// Current simulated time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationClock {
    now: u64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now: u64) -> Self {
        Self { now }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn advance(&mut self) {
        self.now += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    entries: Vec<(ProcessId, u64)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a process first due at `due`. Re-registering replaces the due
    /// tick but keeps the original position in the order.
    pub fn register(&mut self, id: ProcessId, due: u64) {
        match self.entries.iter_mut().find(|(p, _)| *p == id) {
            Some(entry) => entry.1 = due,
            None => self.entries.push((id, due)),
        }
    }

    /// Processes due at `now`, in registration order.
    pub fn due_at(&self, now: u64) -> Vec<ProcessId> {
        self.entries
            .iter()
            .filter(|(_, due)| *due == now)
            .map(|(p, _)| *p)
            .collect()
    }

    /// Puts a process to sleep for `ticks` (at least one).
    pub fn suspend(&mut self, id: ProcessId, now: u64, ticks: u64) {
        if let Some(entry) = self.entries.iter_mut().find(|(p, _)| *p == id) {
            entry.1 = now + ticks.max(1);
        }
    }

    pub fn next_due(&self, id: ProcessId) -> Option<u64> {
        self.entries.iter().find(|(p, _)| *p == id).map(|(_, due)| *due)
    }

    pub fn entries(&self) -> impl Iterator<Item = (ProcessId, u64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
