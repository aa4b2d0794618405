//! Entity management for the ECS (Entity Component System).
//!
//! This module provides the entity handle, its lifecycle [`State`] and the [`Allocator`] that
//! hands out entity identifiers.
//!
//! # Architecture
//!
//! - **[`Entity`]**: A handle combining an [`Id`] and a [`Generation`]. The ID identifies the
//!   entity slot, while the generation tracks how many times that slot has been reused, so a
//!   handle kept past its entity's destruction is detected instead of aliasing a newer entity.
//!
//! - **[`Allocator`]**: Manages entity ID allocation and recycling. Freed ids are queued in a
//!   dead pool and reused oldest first.
//!
//! - **[`State`]**: Where an entity is in its deferred lifecycle.
//!
//! - **[`Ref`]** / **[`RefMut`]**: Views of one entity within a world, offering the entity
//!   scoped operations (`add`, `get`, `destroy`, tags, ...).
//!
//! # Lifecycle
//!
//! ```text
//!   create_entity()          end of tick
//!  ───────────────► Creating ───────────► Created
//!                      │                     │
//!                      │ destroy()           │ destroy()
//!                      ▼                     ▼
//!                  Destroying ──end of tick──► Destroyed (removed)
//!
//!  destroy_immediately(): any live state ──► Destroyed (removed)
//! ```
//!
//! While a world has never registered a query, nothing can be iterating its entities, so both
//! transitions apply immediately instead of waiting for the end of tick.

mod reference;

use crossbeam::queue::SegQueue;

/// Export the reference module for entity references.
pub use reference::{Ref, RefMut};

/// The lifecycle state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Created during the current tick; becomes [`State::Created`] at the end of tick.
    Creating,
    /// Live.
    Created,
    /// Destruction requested; the entity is removed at the end of tick.
    Destroying,
    /// Removed from the world. Reported for stale handles.
    Destroyed,
    /// The handle was never issued by this world.
    Error,
}

impl State {
    /// True for the states a system visits: live entities, plus entities being created or
    /// destroyed this tick (which get exactly one pass).
    #[inline]
    pub fn is_visible(&self) -> bool {
        matches!(self, State::Creating | State::Created | State::Destroying)
    }
}

/// The generation of an entity, used to track whether an entity is the active entity in a world.
/// The generation starts at `FIRST` and is incremented each time the `id` is freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    /// The first generation of an entity.
    const FIRST: Self = Self(0);

    /// Get the next generation from the current.
    #[inline]
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// An entity identifier, the slot index of the entity in its world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl From<u32> for Id {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// An entity in the ECS.
/// A world contains at most one live entity for a given `id`; the `generation` tells whether
/// this handle still refers to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    /// The unique identifier of the entity.
    id: Id,

    /// The generation of the entity.
    generation: Generation,
}

impl Entity {
    /// A handle no allocator ever issues.
    pub(crate) const DANGLING: Self = Self::new_with_generation(Id(u32::MAX), Generation::FIRST);

    /// Construct a new entity with just an id. This will default to the first generation.
    ///
    /// This is primarily used for testing.
    #[inline]
    pub(crate) fn new(id: impl Into<Id>) -> Self {
        Self::new_with_generation(id.into(), Generation::FIRST)
    }

    /// Construct a new entity with an id and known generation.
    #[inline]
    pub(crate) const fn new_with_generation(id: Id, generation: Generation) -> Self {
        Self { id, generation }
    }

    /// Get the id of this entity.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the generation of this entity.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Get the index of this entity if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.id.0 as usize
    }
}

/// An allocator for entities.
///
/// Allocates unique entity IDs and recycles freed ones. Freeing bumps the slot's generation so
/// any handle to the previous occupant no longer matches.
#[derive(Default, Debug)]
pub struct Allocator {
    /// Current generation of each ID slot ever handed out, indexed by entity ID.
    generations: Vec<Generation>,

    /// Pool of IDs available for reuse, oldest first.
    dead_pool: SegQueue<Id>,
}

impl Allocator {
    /// Construct a new entity allocator starting from ID 0.
    #[inline]
    pub const fn new() -> Self {
        Self {
            generations: Vec::new(),
            dead_pool: SegQueue::new(),
        }
    }

    /// Allocate a new entity, either by reusing a freed ID from the dead pool or by allocating a
    /// new one.
    pub fn alloc(&mut self) -> Entity {
        if let Some(id) = self.dead_pool.pop() {
            return Entity::new_with_generation(id, self.generations[id.0 as usize]);
        }

        let id = Id(self.generations.len() as u32);
        self.generations.push(Generation::FIRST);
        Entity::new(id)
    }

    /// Free an entity for reuse. Freeing a stale handle is ignored.
    pub fn free(&mut self, entity: Entity) {
        if !self.is_current(entity) {
            return;
        }
        let slot = &mut self.generations[entity.index()];
        *slot = slot.next();
        self.dead_pool.push(entity.id);
    }

    /// True if the handle's ID was ever handed out by this allocator.
    #[inline]
    pub fn is_issued(&self, entity: Entity) -> bool {
        entity.index() < self.generations.len()
    }

    /// True if the handle carries the current generation of its slot.
    #[inline]
    pub fn is_current(&self, entity: Entity) -> bool {
        self.generations.get(entity.index()) == Some(&entity.generation)
    }
}
