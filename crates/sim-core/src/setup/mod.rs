//! World Setup
//!
//! World generation and agent spawning.

pub mod agents;
pub mod world;

pub use agents::*;
pub use world::*;
