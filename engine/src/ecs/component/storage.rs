use std::collections::HashMap;

use crate::ecs::component::{Component, Erased, Id};

/// The component collection of one entity: at most one instance per component type, keyed by the
/// registry id of the type.
#[derive(Default)]
pub struct Components {
    values: HashMap<Id, Box<dyn Erased>>,
}

impl Components {
    /// Create an empty collection.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if an instance is stored under `id`.
    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        self.values.contains_key(&id)
    }

    /// Get the instance stored under `id` as `C`.
    ///
    /// Returns `None` if nothing is stored under `id` or if the stored value is not a `C`.
    #[inline]
    pub fn get<C: Component>(&self, id: Id) -> Option<&C> {
        self.values.get(&id)?.as_any().downcast_ref::<C>()
    }

    /// Get the instance stored under `id` as a mutable `C`.
    #[inline]
    pub fn get_mut<C: Component>(&mut self, id: Id) -> Option<&mut C> {
        self.values.get_mut(&id)?.as_any_mut().downcast_mut::<C>()
    }

    /// The number of stored components.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no component is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate the ids of the stored components, in no particular order.
    #[inline]
    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.values.keys().copied()
    }

    /// Store a value, returning the instance it replaced.
    #[inline]
    pub(crate) fn insert(&mut self, id: Id, value: Box<dyn Erased>) -> Option<Box<dyn Erased>> {
        self.values.insert(id, value)
    }

    /// Take the value stored under `id` out of the collection.
    #[inline]
    pub(crate) fn take(&mut self, id: Id) -> Option<Box<dyn Erased>> {
        self.values.remove(&id)
    }

    /// Mutable access to the erased value stored under `id`, used to run lifecycle hooks.
    #[inline]
    pub(crate) fn erased_mut(&mut self, id: Id) -> Option<&mut Box<dyn Erased>> {
        self.values.get_mut(&id)
    }

    /// Drain every stored value.
    #[inline]
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (Id, Box<dyn Erased>)> + '_ {
        self.values.drain()
    }
}

impl std::fmt::Debug for Components {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}
