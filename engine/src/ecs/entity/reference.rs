use crate::ecs::{
    component::Component,
    entity::{Entity, State},
    error::Error,
    world::World,
};

/// A reference to an entity with read-only access to its components.
/// The lifetime `'w` ensures that the reference does not outlive the world it points into.
pub struct Ref<'w> {
    /// The world holding the entity.
    world: &'w World,
    /// The entity this reference points to.
    entity: Entity,
}

impl<'w> Ref<'w> {
    #[inline]
    pub(crate) const fn new(world: &'w World, entity: Entity) -> Self {
        Self { world, entity }
    }

    /// Get the entity this reference points to.
    #[inline]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    #[inline]
    pub fn state(&self) -> State {
        self.world.state(self.entity)
    }

    #[inline]
    pub fn has<C: Component>(&self) -> bool {
        self.world.has::<C>(self.entity)
    }

    /// Get a reference to a component on this entity.
    #[inline]
    pub fn get<C: Component>(&self) -> Result<&'w C, Error> {
        self.world.get::<C>(self.entity)
    }

    #[inline]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.world.has_tag(self.entity, tag)
    }
}

/// A mutable reference to an entity, offering the entity scoped world operations.
/// The lifetime `'w` ensures that the reference does not outlive the world it points into.
pub struct RefMut<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl<'w> RefMut<'w> {
    #[inline]
    pub(crate) fn new(world: &'w mut World, entity: Entity) -> Self {
        Self { world, entity }
    }

    #[inline]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    #[inline]
    pub fn state(&self) -> State {
        self.world.state(self.entity)
    }

    #[inline]
    pub fn has<C: Component>(&self) -> bool {
        self.world.has::<C>(self.entity)
    }

    #[inline]
    pub fn get<C: Component>(&self) -> Result<&C, Error> {
        self.world.get::<C>(self.entity)
    }

    #[inline]
    pub fn get_mut<C: Component>(&mut self) -> Result<&mut C, Error> {
        self.world.get_mut::<C>(self.entity)
    }

    /// Add a component, replacing any instance of the same type.
    #[inline]
    pub fn add<C: Component>(&mut self, component: C) -> Result<&mut Self, Error> {
        self.world.add(self.entity, component)?;
        Ok(self)
    }

    #[inline]
    pub fn remove<C: Component>(&mut self) -> Option<C> {
        self.world.remove::<C>(self.entity)
    }

    #[inline]
    pub fn add_tag(&mut self, tag: impl Into<String>) -> Result<&mut Self, Error> {
        self.world.add_tag(self.entity, tag)?;
        Ok(self)
    }

    #[inline]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.world.has_tag(self.entity, tag)
    }

    #[inline]
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.world.remove_tag(self.entity, tag)
    }

    /// Destroy the entity at the end of the tick.
    #[inline]
    pub fn destroy(self) {
        self.world.destroy(self.entity);
    }

    /// Remove the entity now.
    #[inline]
    pub fn destroy_immediately(self) {
        self.world.destroy_immediately(self.entity);
    }
}
