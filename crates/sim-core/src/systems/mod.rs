//! Simulation Systems
//!
//! Movement rules, collection, strategy dispatch, the storm controller and
//! the cross-agent coordination phase.

pub mod collection;
pub mod coordination;
pub mod movement;
pub mod storm;
pub mod strategy;

pub use collection::{collect_at, CollectOutcome};
pub use coordination::{assist_target, merge_beliefs};
pub use movement::{directed_step, explore_step, flee_step, random_step};
pub use storm::StormController;
pub use strategy::{decide, Action, ForagePlan, TurnOrder, WorldView};
