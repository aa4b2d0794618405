//! Systems: per-entity callbacks bound to a query and run once per tick.
//!
//! # Overview
//!
//! A [`System`] pairs a live query with a callback. Each time its phase runs, the system walks the
//! query's current results and invokes the callback once per eligible entity, passing a [`Call`]
//! record that carries the entity, its position in the pass, the tick timing and mutable access to
//! the world:
//!
//! ```rust,ignore
//! schedule.add_system::<(Position, Velocity), _>(&mut world, Options::new(), |call| {
//!     let velocity = *call.get::<Velocity>()?;
//!     let position = call.get_mut::<Position>()?;
//!     position.x += velocity.dx * call.dt().as_secs_f32();
//!     Ok(())
//! })?;
//! ```
//!
//! # Iteration
//!
//! ```text
//!  results: [ e3 | e7 | e1 | ── ]        snapshot: slot_len = 4
//!              │    │    │    └─ tombstone, skipped
//!              ▼    ▼    ▼
//!  call:    { entity: e3, index: 0 } ─► callback(&mut call)
//!           { entity: e7, index: 1 } ─► callback(&mut call)
//!           { entity: e1, index: 2 } ─► callback(&mut call)
//! ```
//!
//! - The pass covers the slots present when it started. Entities that start matching during the
//!   pass are appended past that point and are first visited next tick.
//! - Every slot is re-read before use, so an entity that stops matching (or is destroyed
//!   immediately) by an earlier callback of the same pass is skipped.
//! - Only entities whose state is `Creating`, `Created` or `Destroying` are visited. Entities
//!   created or destroyed this tick therefore get exactly one pass before going live or going
//!   away.
//! - One [`Call`] is built per pass and updated in place for each entity; callbacks receive it by
//!   `&mut` and cannot keep it past their return.
//!
//! A callback error stops the pass and is returned wrapped in [`Error::System`].

mod call;

pub use call::Call;

use crate::ecs::{
    error::Error,
    query,
    schedule::phase,
    time::Tick,
    world::World,
};

/// A system identifier, unique within its schedule.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct a new system Id from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this system if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// The callback type of a system.
pub type Callback = Box<dyn FnMut(&mut Call<'_>) -> Result<(), Error>>;

/// A callback bound to a query and a phase.
pub struct System {
    id: Id,
    name: String,
    phase: phase::Name,
    query: query::Id,
    callback: Callback,
}

impl System {
    /// Create a system over an already registered query.
    pub fn new(
        id: Id,
        name: impl Into<String>,
        phase: phase::Name,
        query: query::Id,
        callback: Callback,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            phase,
            query,
            callback,
        }
    }

    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The display name used in logs and errors.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn phase(&self) -> &phase::Name {
        &self.phase
    }

    /// The query whose results the system iterates.
    #[inline]
    pub fn query(&self) -> query::Id {
        self.query
    }

    /// Run one pass over the system's query.
    pub fn run(&mut self, world: &mut World, tick: Tick) -> Result<(), Error> {
        let Some(query) = world.query_results_mut(self.query) else {
            return Ok(());
        };
        let total = query.len();
        if total == 0 {
            return Ok(());
        }

        let results = query.results_mut();
        results.pin();
        let slots = results.slot_len();

        let outcome = {
            let mut call = Call::new(world, self.query, slots, total, tick);
            self.visit(&mut call, slots)
        };

        if let Some(query) = world.query_results_mut(self.query) {
            query.results_mut().unpin();
        }

        outcome.map_err(|source| {
            log::error!("system `{}` failed: {source}", self.name);
            Error::System {
                system: self.name.clone(),
                source: Box::new(source),
            }
        })
    }

    fn visit(&mut self, call: &mut Call<'_>, slots: usize) -> Result<(), Error> {
        for slot in 0..slots {
            let Some(entity) = call.visible_at(slot) else {
                continue;
            };
            call.advance(entity, slot);
            (self.callback)(call)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("System")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("query", &self.query)
            .finish()
    }
}
