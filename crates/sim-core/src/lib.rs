//! Storm foraging simulation: agents with fixed strategies forage a grid,
//! share multi-agent finds, and run home whenever a storm rolls in.

pub mod components;
pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod output;
pub mod scheduler;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use config::Config;
pub use driver::{Driver, NullPresenter, Presenter, SnapshotPresenter};
pub use error::{SetupError, SimError};
pub use simulation::Simulation;
