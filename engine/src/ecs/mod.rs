//! The entity component system: component storage, reactive queries, phased systems and events.
//!
//! # Architecture
//!
//! ```text
//!  World ─────────────────────────────────────────────┐
//!   ├── component::Registry   type ─► bit position     │
//!   ├── records               state, Bitmask, data, tags
//!   ├── queries               Key ─► Query { masks, Results }
//!   ├── lifecycle queues      creating / destroying    │
//!   └── event::Queue          pending events           │
//!                                                      │
//!  Schedule ── run(&mut World, Tick) ─────────────────┘
//!   ├── phases                Phase { systems }
//!   └── event::Listeners      per phase subscriptions
//! ```
//!
//! The [`World`] owns all entity data and the live queries; the [`Schedule`] owns the logic that
//! runs over them. Keeping the two apart lets a running system borrow the world mutably while
//! the schedule walks its own system list.

pub mod bitmask;
pub mod component;
pub mod entity;
pub mod error;
pub mod event;
pub mod query;
pub mod schedule;
pub mod system;
pub mod time;
pub(crate) mod util;
pub mod world;

pub use bitmask::Bitmask;
pub use component::Component;
pub use entity::{Entity, State};
pub use error::Error;
pub use event::Event;
pub use query::{Filter, Query};
pub use schedule::{Options, Schedule};
pub use system::Call;
pub use time::{Clock, Tick};
pub use world::{Config, World};
