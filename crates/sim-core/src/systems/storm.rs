//! Storm Controller
//!
//! The only writer of `Agent::in_storm`. Alternates between calm and
//! storming; the scheduler resumes it whenever its wait runs out.

use rand::Rng;
use sim_events::{EventKind, StormPhase};

use crate::components::agent::Agent;
use crate::config::StormConfig;

#[derive(Debug, Clone)]
pub struct StormController {
    config: StormConfig,
    phase: StormPhase,
    incursions: u64,
}

impl StormController {
    pub fn new(config: StormConfig) -> Self {
        Self {
            config,
            phase: StormPhase::Calm,
            incursions: 0,
        }
    }

    /// Rebuilds a controller mid-run.
    pub fn resume_from(config: StormConfig, phase: StormPhase, incursions: u64) -> Self {
        Self {
            config,
            phase,
            incursions,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn phase(&self) -> StormPhase {
        self.phase
    }

    pub fn incursions(&self) -> u64 {
        self.incursions
    }

    pub fn is_storming(&self) -> bool {
        self.phase == StormPhase::Storming
    }

    /// Uniform calm delay in `[min_delay, max_delay]`.
    pub fn draw_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        let min = self.config.min_delay;
        let max = self.config.max_delay.max(min);
        rng.gen_range(min..=max)
    }

    /// Performs the next transition. Returns how many ticks to wait before
    /// the following one, and the event describing this one.
    pub fn advance<R: Rng + ?Sized>(&mut self, agents: &mut [Agent], rng: &mut R) -> (u64, EventKind) {
        match self.phase {
            StormPhase::Calm => {
                self.phase = StormPhase::Storming;
                self.incursions += 1;
                set_storm_flag(agents, true);
                tracing::info!(
                    "Storm #{} rolls in for {} ticks",
                    self.incursions,
                    self.config.duration
                );
                (
                    self.config.duration.max(1),
                    EventKind::StormStarted {
                        incursion: self.incursions,
                    },
                )
            }
            StormPhase::Storming => {
                self.phase = StormPhase::Calm;
                set_storm_flag(agents, false);
                let wait = self.config.cooldown_ticks + self.draw_delay(rng);
                tracing::info!("Storm #{} passes; next in {} ticks", self.incursions, wait);
                (
                    wait.max(1),
                    EventKind::StormEnded {
                        incursion: self.incursions,
                    },
                )
            }
        }
    }
}

fn set_storm_flag(agents: &mut [Agent], in_storm: bool) {
    for agent in agents {
        agent.in_storm = in_storm;
    }
}
