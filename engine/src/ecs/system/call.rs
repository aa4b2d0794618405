use std::time::Duration;

use crate::ecs::{
    component::Component,
    entity::{Entity, State},
    error::Error,
    event::Event,
    query,
    schedule::phase,
    time::Tick,
    world::World,
};

/// The record a system callback receives for each entity of a pass.
///
/// A single `Call` is reused for every entity of the pass: the entity and position fields are
/// overwritten before each invocation. Entity scoped operations (`get`, `add`, `destroy`, ...)
/// act on the current [`entity`](Self::entity); [`world_mut`](Self::world_mut) reaches any other
/// entity.
pub struct Call<'w> {
    world: &'w mut World,
    query: query::Id,
    entity: Entity,
    slot: usize,
    slots: usize,
    index: usize,
    next: usize,
    total: usize,
    tick: Tick,
}

impl<'w> Call<'w> {
    pub(crate) fn new(world: &'w mut World, query: query::Id, slots: usize, total: usize, tick: Tick) -> Self {
        Self {
            world,
            query,
            entity: Entity::DANGLING,
            slot: 0,
            slots,
            index: 0,
            next: 0,
            total,
            tick,
        }
    }

    /// The entity in `slot` of the pass, if it is still there and eligible for a visit.
    pub(crate) fn visible_at(&self, slot: usize) -> Option<Entity> {
        let entity = self.world.query_results(self.query)?.results().slot(slot)?;
        self.world.state(entity).is_visible().then_some(entity)
    }

    /// Point the record at the entity found in `slot`.
    #[inline]
    pub(crate) fn advance(&mut self, entity: Entity, slot: usize) {
        self.entity = entity;
        self.slot = slot;
        self.index = self.next;
        self.next += 1;
    }

    /// The entity being visited.
    #[inline]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// The position of the entity within this pass, starting at 0.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The number of entities the query matched when the pass started.
    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    #[inline]
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Whether no other entity is left to visit in this pass.
    ///
    /// Looks at the remaining slots as they are now, so entities removed or destroyed earlier in
    /// the pass (or by this callback) no longer count. May therefore be true while
    /// `index + 1 < total`.
    pub fn is_last(&self) -> bool {
        (self.slot + 1..self.slots).all(|slot| self.visible_at(slot).is_none())
    }

    /// Time elapsed since the previous tick.
    #[inline]
    pub fn dt(&self) -> Duration {
        self.tick.dt
    }

    /// Total time elapsed.
    #[inline]
    pub fn time(&self) -> Duration {
        self.tick.time
    }

    #[inline]
    pub fn tick(&self) -> Tick {
        self.tick
    }

    #[inline]
    pub fn world(&self) -> &World {
        &*self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut *self.world
    }

    /// The lifecycle state of the entity.
    #[inline]
    pub fn state(&self) -> State {
        self.world.state(self.entity)
    }

    #[inline]
    pub fn has<C: Component>(&self) -> bool {
        self.world.has::<C>(self.entity)
    }

    /// Get a component of the entity, failing if it is absent.
    #[inline]
    pub fn get<C: Component>(&self) -> Result<&C, Error> {
        self.world.get::<C>(self.entity)
    }

    #[inline]
    pub fn get_mut<C: Component>(&mut self) -> Result<&mut C, Error> {
        self.world.get_mut::<C>(self.entity)
    }

    #[inline]
    pub fn try_get<C: Component>(&self) -> Option<&C> {
        self.world.try_get::<C>(self.entity)
    }

    #[inline]
    pub fn add<C: Component>(&mut self, component: C) -> Result<(), Error> {
        self.world.add(self.entity, component)
    }

    #[inline]
    pub fn remove<C: Component>(&mut self) -> Option<C> {
        self.world.remove::<C>(self.entity)
    }

    #[inline]
    pub fn add_tag(&mut self, tag: impl Into<String>) -> Result<(), Error> {
        self.world.add_tag(self.entity, tag)
    }

    #[inline]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.world.has_tag(self.entity, tag)
    }

    #[inline]
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.world.remove_tag(self.entity, tag)
    }

    /// Destroy the entity at the end of the tick. The rest of the pass still sees it.
    #[inline]
    pub fn destroy(&mut self) {
        self.world.destroy(self.entity);
    }

    /// Remove the entity now.
    #[inline]
    pub fn destroy_immediately(&mut self) {
        self.world.destroy_immediately(self.entity);
    }

    /// Queue an event for the first phase listening to `E`.
    #[inline]
    pub fn emit<E: Event>(&mut self, event: E) {
        self.world.events_mut().emit(event);
    }

    /// Queue an event for `phase`.
    #[inline]
    pub fn emit_to<E: Event>(&mut self, phase: impl Into<phase::Name>, event: E) {
        self.world.events_mut().emit_to(phase, event);
    }
}

impl std::fmt::Debug for Call<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Call")
            .field("entity", &self.entity)
            .field("index", &self.index)
            .field("total", &self.total)
            .field("tick", &self.tick)
            .finish()
    }
}
