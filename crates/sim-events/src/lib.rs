//! Shared event and snapshot types for the storm foraging simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Renderers and log readers depend on it without pulling in the engine.

pub mod event;
pub mod kinds;
pub mod snapshot;

// Re-export vocabulary types
pub use kinds::{Coord, ParseKindError, ResourceKind, Rgb, StrategyKind};

// Re-export event types
pub use event::{generate_event_id, Event, EventKind, EventType};

// Re-export snapshot types
pub use snapshot::{
    generate_snapshot_id, AgentSnapshot, CellEntry, CellStatus, ClaimSnapshot, GridSnapshot,
    MemorySnapshot, ModeSnapshot, ProcessSnapshot, ResourceSnapshot, StormPhase, StormSnapshot,
    WorldSnapshot,
};
