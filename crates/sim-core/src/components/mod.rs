//! Components
//!
//! World, resources, agents and the shared blackboard.

pub mod agent;
pub mod blackboard;
pub mod resource;
pub mod world;

pub use agent::*;
pub use blackboard::*;
pub use resource::*;
pub use world::*;
