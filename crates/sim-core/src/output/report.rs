//! Termination Report
//!
//! Per-agent totals at the end of a run, printed as text and written as
//! JSON.

use serde::Serialize;
use sim_events::StrategyKind;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::simulation::Simulation;

use super::snapshot::SnapshotError;

/// Report output file name
pub const REPORT_FILE: &str = "report.json";

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub agent_id: String,
    pub strategy: StrategyKind,
    pub resources_collected: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub ticks_run: u64,
    pub final_tick: u64,
    pub storms: u64,
    pub agents: Vec<AgentReport>,
    pub total_collected: u32,
    pub uncollected_remaining: usize,
}

impl SimulationReport {
    pub fn from_simulation(sim: &Simulation, ticks_run: u64) -> Self {
        let agents: Vec<AgentReport> = sim
            .agents()
            .iter()
            .map(|a| AgentReport {
                agent_id: a.id.to_string(),
                strategy: a.strategy(),
                resources_collected: a.resources_collected,
            })
            .collect();

        Self {
            ticks_run,
            final_tick: sim.now(),
            storms: sim.storm().incursions(),
            total_collected: agents.iter().map(|a| a.resources_collected).sum(),
            agents,
            uncollected_remaining: sim.registry().uncollected_count(),
        }
    }

    /// Highest total, first in roster order on ties.
    pub fn leader(&self) -> Option<&AgentReport> {
        self.agents
            .iter()
            .rev()
            .max_by_key(|a| a.resources_collected)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Report")?;
        writeln!(f, "=================")?;
        writeln!(f, "Ticks run: {}", self.ticks_run)?;
        writeln!(f, "Storms: {}", self.storms)?;
        writeln!(f)?;
        for agent in &self.agents {
            writeln!(
                f,
                "  {} ({:<11}) collected {}",
                agent.agent_id,
                agent.strategy.to_string(),
                agent.resources_collected
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Total collected: {}", self.total_collected)?;
        if let Some(leader) = self.leader().filter(|a| a.resources_collected > 0) {
            writeln!(f, "Top collector: {} ({})", leader.agent_id, leader.strategy)?;
        }
        write!(f, "Uncollected resources: {}", self.uncollected_remaining)
    }
}
