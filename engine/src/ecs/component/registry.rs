use std::{
    any::TypeId,
    sync::RwLock,
    sync::atomic::{AtomicU32, Ordering},
};

use dashmap::DashMap;

use crate::ecs::component::{Component, Id, IntoSpec, Spec};

/// A component registry. This hands out the integer identity of each component type used by one
/// world.
///
/// Every world owns its own registry, so independent worlds (and tests) never compete for bit
/// positions. Lookups through `&self` are lock-free via `DashMap`, which lets shared borrows of
/// the world resolve types without needing exclusive access. Ids are never recycled.
pub struct Registry {
    /// Map from TypeId to component Id.
    type_map: DashMap<TypeId, Id>,

    /// The type names of registered components, indexed by id. Diagnostics only.
    names: RwLock<Vec<&'static str>>,

    /// Next available component identifier.
    next_id: AtomicU32,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a new component registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            type_map: DashMap::new(),
            names: RwLock::new(Vec::new()),
            next_id: AtomicU32::new(0),
        }
    }

    /// Register a component type and get its identifier.
    ///
    /// If the component type is already registered, returns the existing ID. Otherwise, allocates
    /// the next ID.
    pub fn register<C: Component>(&self) -> Id {
        let type_id = TypeId::of::<C>();

        // Fast path: already registered
        if let Some(id) = self.type_map.get(&type_id) {
            return *id;
        }

        *self
            .type_map
            .entry(type_id)
            .or_insert_with(|| {
                let id_value = self.next_id.fetch_add(1, Ordering::Relaxed);

                let mut names = self.names.write().unwrap_or_else(|e| e.into_inner());
                let index = id_value as usize;
                if index >= names.len() {
                    names.resize(index + 1, "");
                }
                names[index] = std::any::type_name::<C>();

                Id(id_value)
            })
            .value()
    }

    /// Get the component ID for a provided type `C`, if registered.
    #[inline]
    pub fn get<C: Component>(&self) -> Option<Id> {
        let type_id = TypeId::of::<C>();
        self.type_map.get(&type_id).map(|entry| *entry.value())
    }

    /// Get the type name recorded for a component ID.
    pub fn name(&self, id: Id) -> Option<&'static str> {
        let names = self.names.read().unwrap_or_else(|e| e.into_inner());
        names.get(id.index()).copied()
    }

    /// The number of registered component types.
    #[inline]
    pub fn len(&self) -> usize {
        self.type_map.len()
    }

    /// Returns true if no component type has been registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.type_map.is_empty()
    }

    /// Get a component specification for a generic type `IS` which implements [`IntoSpec`],
    /// registering any type seen for the first time.
    #[inline]
    pub fn spec<IS: IntoSpec>(&self) -> Spec {
        IS::into_spec(self)
    }
}
