//! Error Types
//!
//! Setup failures are reported before the first tick. Ticking itself has no
//! error path.

use thiserror::Error;

use crate::components::Position;
use crate::config::ConfigError;
use crate::output::SnapshotError;

/// The world or roster could not be built.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: i32, height: i32 },

    #[error("{what} {position} lies outside the {width}x{height} grid")]
    OutOfBounds {
        what: String,
        position: Position,
        width: i32,
        height: i32,
    },

    #[error("{what} {position} is on an obstacle")]
    OnObstacle { what: String, position: Position },

    #[error("cannot place {count} {what} on {free} free cells")]
    NoRoom {
        what: String,
        count: usize,
        free: usize,
    },

    #[error("agent roster is empty")]
    EmptyRoster,
}

/// Any failure surfaced by the binary.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
