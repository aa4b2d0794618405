//! Component management for the ECS.
//!
//! Components are the plain data records attached to entities. Each distinct component type is
//! given a small integer [`Id`] by the owning world's [`Registry`]; that id is the bit the type
//! occupies in entity and query [`Bitmask`](crate::ecs::bitmask::Bitmask)s and the key under which
//! an entity's instance is stored in its [`Components`] collection.
//!
//! ## Architecture
//!
//! - [`Component`]: The trait all component types implement, with optional lifecycle hooks
//! - [`Id`]: The registry assigned identity of a component type
//! - [`Registry`]: Per-world registration and lookup of component types
//! - [`Spec`]: A sorted, de-duplicated set of component ids
//! - [`IntoSpec`]: Names a component type, or a tuple of them, as a [`Spec`]
//! - [`Components`]: The per-entity component collection
//!
//! ## Usage
//!
//! ```ignore
//! use tickwork::ecs::component::{Component, Registry};
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32 }
//!
//! let registry = Registry::new();
//! let pos_id = registry.register::<Position>();
//! assert_eq!(registry.register::<Position>(), pos_id);
//! ```

use std::any::Any;
use std::hash::Hash;

mod registry;
mod spec;
mod storage;

pub use registry::Registry;
pub use spec::{IntoSpec, Spec};
pub use storage::Components;

use crate::ecs::entity::Entity;

/// A component identifier. This is the bit position of a component type within a world.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct a new component Id from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this component if it were to live in indexable storage (e.g. Vec or a
    /// bitmask).
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Id {
    #[inline]
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

/// A trait representing a component in the ECS.
///
/// Most components derive it with `#[derive(Component)]`. Implement it by hand to observe the
/// lifecycle of an instance; every hook defaults to a no-op. The hooks are called by the world at
/// the matching mutation point, including when an entity is destroyed with components still
/// attached:
///
/// 1. [`before_add`](Self::before_add) before the instance is stored
/// 2. [`after_add`](Self::after_add) once the entity's queries reflect the new component
/// 3. [`before_remove`](Self::before_remove) while the instance is still attached
/// 4. [`after_remove`](Self::after_remove) once the entity's queries no longer see it
///
/// Adding a type the entity already has swaps the instance: the new one gets `before_add`, the
/// old one gets `before_remove` while still attached and `after_remove` once swapped out, then
/// the new one gets `after_add`. Queries do not change.
pub trait Component: 'static + Send + Sync {
    fn before_add(&mut self, _entity: Entity) {}

    fn after_add(&mut self, _entity: Entity) {}

    fn before_remove(&mut self, _entity: Entity) {}

    fn after_remove(&mut self, _entity: Entity) {}
}

/// Object safe view of a stored component. Implemented for every [`Component`].
pub(crate) trait Erased: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn before_remove(&mut self, entity: Entity);

    fn after_remove(&mut self, entity: Entity);

    fn after_add(&mut self, entity: Entity);
}

impl<C: Component> Erased for C {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    #[inline]
    fn before_remove(&mut self, entity: Entity) {
        Component::before_remove(self, entity);
    }

    #[inline]
    fn after_remove(&mut self, entity: Entity) {
        Component::after_remove(self, entity);
    }

    #[inline]
    fn after_add(&mut self, entity: Entity) {
        Component::after_add(self, entity);
    }
}
