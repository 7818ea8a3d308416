//! Output
//!
//! World snapshots, restore, and the end-of-run report.

pub mod report;
pub mod snapshot;

pub use report::{AgentReport, SimulationReport, REPORT_FILE};
pub use snapshot::{
    generate_snapshot, read_snapshot, restore_simulation, write_current_state, write_snapshot,
    write_snapshot_to_dir, SnapshotError, SnapshotGenerator,
};
