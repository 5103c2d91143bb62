pub mod model;

pub mod config;
pub mod id;
pub mod market;
pub mod runtime;
pub mod scenario;
pub mod sim;

#[cfg(test)]
mod testutil;

pub use config::SingularityConfig;
pub use id::IdGenerator;
pub use model::{GameTime, PlayerAction, SingularityPhase};
pub use runtime::{BusMessage, RuntimeError, SingularityRuntime};
pub use scenario::Scenario;
pub use sim::{Coordinator, Simulation, TickReport};
