//! `tickwork` is the execution core of an entity component system: per entity component data,
//! incrementally maintained queries and phased systems run once per tick.
//!
//! ```rust,ignore
//! use tickwork::{Component, ecs::{Options, Schedule, Tick, World}};
//!
//! #[derive(Component)]
//! struct Position(f32);
//!
//! let mut world = World::new();
//! let mut schedule = Schedule::new();
//! schedule.add_system::<Position, _>(&mut world, Options::new(), |call| {
//!     call.get_mut::<Position>()?.0 += call.dt().as_secs_f32();
//!     Ok(())
//! })?;
//!
//! let entity = world.create_entity();
//! world.add(entity, Position(0.0))?;
//! schedule.run(&mut world, Tick::default())?;
//! ```

// Lets the derive macros refer to `::tickwork` from inside this crate.
extern crate self as tickwork;

pub mod core;
pub mod ecs;

pub use tickwork_macros::{Component, Event};
