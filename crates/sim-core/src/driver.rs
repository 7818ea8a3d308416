//! Driver
//!
//! The top-level loop: stop check, one tick, event logging, presentation,
//! optional frame pacing. Rendering itself lives behind `Presenter`.

use sim_events::WorldSnapshot;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::SimError;
use crate::events::EventLogger;
use crate::output::snapshot::{write_snapshot_to_dir, SnapshotGenerator};
use crate::simulation::Simulation;

/// Receives read-only snapshots at tick boundaries
pub trait Presenter {
    /// Whether a snapshot should be built for this tick boundary.
    fn frame_due(&self, _tick: u64) -> bool {
        true
    }

    fn present(&mut self, snapshot: &WorldSnapshot) -> Result<(), SimError>;

    /// Checked before every tick; true ends the run.
    fn stop_requested(&self) -> bool {
        false
    }
}

/// Headless runs: never wants a frame
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn frame_due(&self, _tick: u64) -> bool {
        false
    }

    fn present(&mut self, _snapshot: &WorldSnapshot) -> Result<(), SimError> {
        Ok(())
    }
}

/// Writes a JSON snapshot every `interval` ticks
#[derive(Debug)]
pub struct SnapshotPresenter {
    output_dir: PathBuf,
    schedule: SnapshotGenerator,
    written: Vec<PathBuf>,
}

impl SnapshotPresenter {
    pub fn new(output_dir: impl Into<PathBuf>, interval: u64) -> Self {
        Self {
            output_dir: output_dir.into(),
            schedule: SnapshotGenerator::new(interval),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Presenter for SnapshotPresenter {
    fn frame_due(&self, tick: u64) -> bool {
        self.schedule.should_snapshot(tick)
    }

    fn present(&mut self, snapshot: &WorldSnapshot) -> Result<(), SimError> {
        let path = write_snapshot_to_dir(snapshot, &self.output_dir)?;
        tracing::debug!(
            "Wrote {} (tick {}, {} collected, {} remaining)",
            path.display(),
            snapshot.tick,
            snapshot.total_collected_value(),
            snapshot.uncollected_count()
        );
        self.schedule.mark_snapshot(snapshot.tick);
        self.written.push(path);
        Ok(())
    }
}

pub struct Driver<P: Presenter> {
    presenter: P,
    logger: EventLogger,
    max_ticks: u64,
    frame_interval: Option<Duration>,
    frames: SnapshotGenerator,
}

impl<P: Presenter> Driver<P> {
    /// Runs until the simulation clock reaches `max_ticks`.
    pub fn new(presenter: P, logger: EventLogger, max_ticks: u64) -> Self {
        Self {
            presenter,
            logger,
            max_ticks,
            frame_interval: None,
            frames: SnapshotGenerator::new(0),
        }
    }

    /// Paces the loop to `frame_rate` ticks per second; 0 runs unpaced.
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_interval =
            (frame_rate > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(frame_rate)));
        self
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn logger(&self) -> &EventLogger {
        &self.logger
    }

    /// Steps the simulation and returns how many ticks ran.
    pub fn run(&mut self, sim: &mut Simulation) -> Result<u64, SimError> {
        let mut ticks_run = 0;
        while sim.now() < self.max_ticks {
            if self.presenter.stop_requested() {
                tracing::info!("Stop requested at tick {}", sim.now());
                break;
            }

            sim.tick();
            ticks_run += 1;
            self.logger.log_batch(&sim.drain_events())?;

            let tick = sim.now();
            if self.presenter.frame_due(tick) {
                let snapshot = sim.snapshot(&self.frames.next_id(), "frame");
                self.presenter.present(&snapshot)?;
            }

            if let Some(interval) = self.frame_interval {
                std::thread::sleep(interval);
            }
        }
        self.logger.flush()?;
        Ok(ticks_run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    /// Records ticks and asks to stop after a fixed number of frames
    struct Recorder {
        ticks: Vec<u64>,
        stop_after: usize,
    }

    impl Presenter for Recorder {
        fn present(&mut self, snapshot: &WorldSnapshot) -> Result<(), SimError> {
            self.ticks.push(snapshot.tick);
            Ok(())
        }

        fn stop_requested(&self) -> bool {
            self.ticks.len() >= self.stop_after
        }
    }

    #[test]
    fn test_driver_respects_budget() {
        let mut sim = Simulation::from_config(&Config::default()).unwrap();
        let mut driver = Driver::new(NullPresenter, EventLogger::null(), 30);
        assert_eq!(driver.run(&mut sim).unwrap(), 30);
        assert_eq!(sim.now(), 30);
        // budget already spent
        assert_eq!(driver.run(&mut sim).unwrap(), 0);
    }

    #[test]
    fn test_driver_stops_on_request() {
        let mut sim = Simulation::from_config(&Config::default()).unwrap();
        let recorder = Recorder {
            ticks: Vec::new(),
            stop_after: 4,
        };
        let mut driver = Driver::new(recorder, EventLogger::null(), 100);
        assert_eq!(driver.run(&mut sim).unwrap(), 4);
        assert_eq!(driver.presenter().ticks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_snapshot_presenter_interval() {
        let dir = tempfile::tempdir().unwrap();
        let mut sim = Simulation::from_config(&Config::default()).unwrap();
        let presenter = SnapshotPresenter::new(dir.path(), 10);
        let mut driver = Driver::new(presenter, EventLogger::null(), 25);
        driver.run(&mut sim).unwrap();

        let written = driver.presenter().written();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|p| p.exists()));
    }
}
