//! Workload scenarios shared by the criterion benches and the tests.
//!
//! - **Particles**: high entity count, deferred destroy/create every tick, cross-phase events
//! - **Status effects**: components toggled on and off, constantly reindexing the queries

pub mod particles;
pub mod status;

pub use particles::{ParticleConfig, ParticleScenario};
pub use status::{StatusConfig, StatusScenario};

use tickwork::ecs::Error;

/// A self-contained world plus schedule that can be stepped one tick at a time.
pub trait Scenario {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// The number of live entities.
    fn entity_count(&self) -> usize;

    /// Register the systems and create the initial population.
    fn setup(&mut self) -> Result<(), Error>;

    /// Run one tick.
    fn update(&mut self) -> Result<(), Error>;

    /// Remove every entity.
    fn teardown(&mut self);
}
