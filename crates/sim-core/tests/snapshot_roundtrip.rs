//! Snapshot restore tests
//!
//! A simulation restored from a JSON snapshot, with the generator state
//! carried over, continues exactly like the original.

use sim_core::config::Config;
use sim_core::output::{read_snapshot, write_snapshot_to_dir};
use sim_core::Simulation;
use sim_events::WorldSnapshot;

fn config() -> Config {
    let mut config = Config::default();
    config.simulation.seed = 99;
    config.storm.min_delay = 10;
    config.storm.max_delay = 20;
    config
}

#[test]
fn test_restored_run_continues_identically() {
    let config = config();
    let mut original = Simulation::from_config(&config).unwrap();
    original.run(37);
    original.drain_events();

    let snapshot = original.snapshot("snap_000001", "test");
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: WorldSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, snapshot);

    let mut restored = Simulation::restore(&parsed, &config, original.rng().clone()).unwrap();
    assert_eq!(restored.now(), 37);
    assert_eq!(restored.snapshot("snap_000001", "test"), snapshot);

    for _ in 0..60 {
        original.tick();
        restored.tick();
        assert_eq!(original.drain_events(), restored.drain_events());
    }
    assert_eq!(
        original.snapshot("end", "test"),
        restored.snapshot("end", "test")
    );
}

#[test]
fn test_restore_mid_storm() {
    let config = config();
    let mut original = Simulation::from_config(&config).unwrap();
    while !original.storm().is_storming() {
        original.tick();
    }
    original.tick();

    let snapshot = original.snapshot("storm", "test");
    let mut restored = Simulation::restore(&snapshot, &config, original.rng().clone()).unwrap();
    assert!(restored.storm().is_storming());
    assert!(restored.agents().iter().all(|a| a.in_storm));

    original.run(30);
    restored.run(30);
    assert_eq!(original.positions(), restored.positions());
    assert_eq!(original.storm().incursions(), restored.storm().incursions());
}

#[test]
fn test_snapshot_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = Simulation::from_config(&config()).unwrap();
    sim.run(12);

    let snapshot = sim.snapshot("snap_000002", "test");
    let path = write_snapshot_to_dir(&snapshot, dir.path()).unwrap();
    assert!(path.ends_with("snapshots/snap_000002.json"));
    assert_eq!(read_snapshot(&path).unwrap(), snapshot);
}
