//! The World is the central container for all entities, components and queries in the ECS.
//!
//! A `World` manages the lifecycle of entities and their component data, and keeps every live
//! query's result set current as that data changes.
//!
//! # Architecture
//!
//! The World coordinates several subsystems:
//! - **Entity Allocator**: Manages entity ID allocation and reuse
//! - **Records**: Per entity lifecycle state, component [`Bitmask`], component storage and tags
//! - **Component Registry**: The world's own component type identities
//! - **Query Index**: The live queries, de-duplicated by [`Key`], plus the tables that pick the
//!   queries a mutation can affect
//! - **Lifecycle Queues**: Entities waiting for the end of tick to go live or go away
//! - **Event Queue**: Events waiting for their phase
//!
//! ```text
//!  add(e, Velocity)
//!    ├─► Velocity::before_add
//!    ├─► store, set bit in e's mask
//!    ├─► re-evaluate universal queries and queries naming Velocity
//!    └─► Velocity::after_add
//! ```
//!
//! # Deferred Lifecycle
//!
//! Once a query exists, something may be iterating its results, so entity creation and
//! destruction are deferred: new entities are `Creating` and destroyed ones `Destroying` until
//! the schedule calls [`World::finish_creation`] and [`World::finish_destruction`] at the end of
//! the tick. Both still take part in queries meanwhile. [`World::destroy_immediately`] bypasses
//! the queue.
//!
//! # Example
//!
//! ```ignore
//! use tickwork::ecs::{query::Filter, world::World};
//!
//! let mut world = World::new();
//! let moving = world.query(&Filter::new().all::<(Position, Velocity)>());
//!
//! let entity = world.create_entity();
//! world.add(entity, Position { x: 0.0, y: 0.0 })?;
//! world.add(entity, Velocity { dx: 1.0, dy: 0.0 })?;
//!
//! assert!(world.query_results(moving).unwrap().contains(entity));
//! ```

mod index;

use std::{collections::HashSet, marker::PhantomData};

use crate::ecs::{
    bitmask::Bitmask,
    component::{self, Component, Components},
    entity::{self, Entity, State},
    error::Error,
    event,
    query::{self, Filter, Key, Query},
};

use index::Index;

/// World construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Initial capacity of the event queue.
    pub event_capacity: usize,

    /// Tombstones a query result set tolerates before compacting.
    pub compaction_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_capacity: 64,
            compaction_threshold: 64,
        }
    }
}

/// Everything the world knows about one live entity.
#[derive(Debug)]
struct Record {
    entity: Entity,
    state: State,
    mask: Bitmask,
    components: Components,
    tags: HashSet<String>,
}

/// The entity, component and query store.
pub struct World {
    config: Config,

    /// Component type identities of this world.
    registry: component::Registry,

    /// Entity ID allocation and recycling.
    allocator: entity::Allocator,

    /// Entity records indexed by entity ID. `None` for free IDs.
    records: Vec<Option<Record>>,

    /// The number of live records.
    live: usize,

    /// Live queries.
    index: Index,

    /// Entities created since the last creation flush.
    creating: Vec<Entity>,

    /// Entities destroyed since the last destruction flush.
    destroying: Vec<Entity>,

    /// True once a query has been registered; from then on lifecycle changes wait for the flush.
    deferred: bool,

    /// Whether the systems driving this world declare a phase. `None` until the first system.
    phased: Option<bool>,

    /// Events waiting for their phase.
    events: event::Queue,

    /// Marker to make World !Send. World must stay on the thread that runs its schedule.
    _not_send: PhantomData<*mut ()>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create an empty world with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty world.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            registry: component::Registry::new(),
            allocator: entity::Allocator::new(),
            records: Vec::new(),
            live: 0,
            index: Index::default(),
            creating: Vec::new(),
            destroying: Vec::new(),
            deferred: false,
            phased: None,
            events: event::Queue::with_capacity(config.event_capacity),
            _not_send: PhantomData,
        }
    }

    /// Record that a system with (`true`) or without (`false`) a phase now drives this world.
    ///
    /// Returns false, leaving the world untouched, when the other kind was registered first.
    pub(crate) fn claim_phasing(&mut self, phased: bool) -> bool {
        match self.phased {
            Some(expected) => expected == phased,
            None => {
                self.phased = Some(phased);
                true
            }
        }
    }

    /// The component registry of this world.
    #[inline]
    pub fn components(&self) -> &component::Registry {
        &self.registry
    }

    /// Register a component type ahead of its first use.
    #[inline]
    pub fn register_component<C: Component>(&self) -> component::Id {
        self.registry.register::<C>()
    }

    /// Create an entity with no components.
    ///
    /// The entity is `Creating` until the next creation flush, or `Created` straight away if no
    /// query was ever registered. It is evaluated against every query right away, so queries that
    /// accept an empty component set (an empty filter, `max`, `different`) include it.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.allocator.alloc();
        let state = if self.deferred {
            State::Creating
        } else {
            State::Created
        };

        let index = entity.index();
        if index >= self.records.len() {
            self.records.resize_with(index + 1, || None);
        }
        let record = self.records[index].insert(Record {
            entity,
            state,
            mask: Bitmask::new(),
            components: Components::new(),
            tags: HashSet::new(),
        });
        self.live += 1;

        self.index.evaluate_all(entity, &record.mask);
        if self.deferred {
            self.creating.push(entity);
        }
        entity
    }

    /// The lifecycle state of `entity`.
    ///
    /// `Error` for a handle this world never issued, `Destroyed` for one whose entity has been
    /// removed.
    pub fn state(&self, entity: Entity) -> State {
        if !self.allocator.is_issued(entity) {
            return State::Error;
        }
        self.record(entity)
            .map_or(State::Destroyed, |record| record.state)
    }

    /// Returns true if `entity` is in the world, whatever its lifecycle state.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.record(entity).is_some()
    }

    /// The number of entities in the world.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if the world holds no entity.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate the entities in the world, by ID.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.records.iter().flatten().map(|record| record.entity)
    }

    /// Add a component to `entity`, replacing any instance of the same type.
    ///
    /// Runs `before_add` on the new value, stores it, updates every query that can observe the
    /// change and finally runs `after_add` on the stored value. A replaced instance gets
    /// `before_remove` before the swap and `after_remove` after it; queries are unaffected by a
    /// replacement.
    pub fn add<C: Component>(&mut self, entity: Entity, mut component: C) -> Result<(), Error> {
        if !self.contains(entity) {
            return Err(Error::NoSuchEntity(entity));
        }
        let id = self.registry.register::<C>();
        component.before_add(entity);

        let record = Self::record_mut(&mut self.records, &self.allocator, entity)
            .ok_or(Error::NoSuchEntity(entity))?;

        let replacing = record.mask.is_set(id.index());
        if replacing {
            if let Some(current) = record.components.erased_mut(id) {
                current.before_remove(entity);
            }
        }
        if let Some(mut replaced) = record.components.insert(id, Box::new(component)) {
            replaced.after_remove(entity);
        }
        if !replacing {
            record.mask.set(id.index());
            self.index.reindex(entity, id, &record.mask);
        }

        if let Some(stored) = record.components.erased_mut(id) {
            stored.after_add(entity);
        }
        Ok(())
    }

    /// Remove the `C` component of `entity` and return it.
    ///
    /// Returns `None` without side effects if the entity does not carry a `C` (including when
    /// `C` was never registered).
    pub fn remove<C: Component>(&mut self, entity: Entity) -> Option<C> {
        let id = self.registry.get::<C>()?;
        let record = Self::record_mut(&mut self.records, &self.allocator, entity)?;

        record.components.erased_mut(id)?.before_remove(entity);
        let mut removed = record.components.take(id)?;
        record.mask.clear(id.index());
        self.index.reindex(entity, id, &record.mask);
        removed.after_remove(entity);

        removed.into_any().downcast::<C>().ok().map(|boxed| *boxed)
    }

    /// Returns true if `entity` carries a `C`.
    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        match (self.registry.get::<C>(), self.record(entity)) {
            (Some(id), Some(record)) => record.mask.is_set(id.index()),
            _ => false,
        }
    }

    /// Get the `C` component of `entity`.
    ///
    /// Fails with [`Error::MissingComponent`] if the entity lacks it; check with
    /// [`has`](Self::has) first when absence is expected.
    pub fn get<C: Component>(&self, entity: Entity) -> Result<&C, Error> {
        let record = self.record(entity).ok_or(Error::NoSuchEntity(entity))?;
        self.registry
            .get::<C>()
            .and_then(|id| record.components.get::<C>(id))
            .ok_or_else(|| Error::missing::<C>(entity))
    }

    /// Get the `C` component of `entity` mutably.
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> Result<&mut C, Error> {
        let record = Self::record_mut(&mut self.records, &self.allocator, entity)
            .ok_or(Error::NoSuchEntity(entity))?;
        self.registry
            .get::<C>()
            .and_then(|id| record.components.get_mut::<C>(id))
            .ok_or_else(|| Error::missing::<C>(entity))
    }

    /// Get the `C` component of `entity`, if present.
    #[inline]
    pub fn try_get<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.get::<C>(entity).ok()
    }

    /// The ids of the component types `entity` carries.
    pub fn component_ids(&self, entity: Entity) -> Option<impl Iterator<Item = component::Id> + '_> {
        self.record(entity)
            .map(|record| record.mask.ones().map(|bit| component::Id::new(bit as u32)))
    }

    /// Tag `entity`. Tags do not take part in queries.
    pub fn add_tag(&mut self, entity: Entity, tag: impl Into<String>) -> Result<(), Error> {
        let record = Self::record_mut(&mut self.records, &self.allocator, entity)
            .ok_or(Error::NoSuchEntity(entity))?;
        record.tags.insert(tag.into());
        Ok(())
    }

    pub fn has_tag(&self, entity: Entity, tag: &str) -> bool {
        self.record(entity)
            .is_some_and(|record| record.tags.contains(tag))
    }

    /// Remove a tag. Returns true if the entity had it.
    pub fn remove_tag(&mut self, entity: Entity, tag: &str) -> bool {
        Self::record_mut(&mut self.records, &self.allocator, entity)
            .is_some_and(|record| record.tags.remove(tag))
    }

    /// Iterate the tags of `entity`.
    pub fn tags(&self, entity: Entity) -> impl Iterator<Item = &str> + '_ {
        self.record(entity)
            .into_iter()
            .flat_map(|record| record.tags.iter().map(String::as_str))
    }

    /// Destroy `entity` at the next destruction flush.
    ///
    /// The entity becomes `Destroying` and stays in its queries until then, so systems later in
    /// the tick still see it. Destroying an entity that is already on its way out, or is gone, is
    /// a no-op. Without any registered query the entity is removed straight away.
    pub fn destroy(&mut self, entity: Entity) {
        if !self.deferred {
            self.destroy_immediately(entity);
            return;
        }
        let Some(record) = Self::record_mut(&mut self.records, &self.allocator, entity) else {
            return;
        };
        if matches!(record.state, State::Creating | State::Created) {
            record.state = State::Destroying;
            self.destroying.push(entity);
        }
    }

    /// Remove `entity`, its components and its query memberships now.
    ///
    /// Every component gets `before_remove` while the entity is still in its queries and
    /// `after_remove` once it has left them. Unknown and stale handles are ignored.
    pub fn destroy_immediately(&mut self, entity: Entity) {
        if !self.allocator.is_current(entity) {
            return;
        }
        let Some(mut record) = self.records.get_mut(entity.index()).and_then(Option::take) else {
            return;
        };

        for id in record.mask.ones() {
            if let Some(value) = record.components.erased_mut(component::Id::new(id as u32)) {
                value.before_remove(entity);
            }
        }
        self.index.forget(entity);
        for (_, mut value) in record.components.drain() {
            value.after_remove(entity);
        }

        self.live -= 1;
        self.allocator.free(entity);
    }

    /// Make every entity created since the last call live. Returns how many went live.
    pub fn finish_creation(&mut self) -> usize {
        let mut count = 0;
        for entity in std::mem::take(&mut self.creating) {
            if let Some(record) = Self::record_mut(&mut self.records, &self.allocator, entity) {
                if record.state == State::Creating {
                    record.state = State::Created;
                    count += 1;
                }
            }
        }
        count
    }

    /// Remove every entity destroyed since the last call. Returns how many were removed.
    pub fn finish_destruction(&mut self) -> usize {
        let mut count = 0;
        for entity in std::mem::take(&mut self.destroying) {
            if self.state(entity) == State::Destroying {
                self.destroy_immediately(entity);
                count += 1;
            }
        }
        count
    }

    /// The number of entities waiting for the creation and the destruction flush.
    #[inline]
    pub fn pending(&self) -> (usize, usize) {
        (self.creating.len(), self.destroying.len())
    }

    /// Get the live query for `filter`, registering it on first use.
    ///
    /// Filters with the same canonical [`Key`] share one query. A new query is populated from
    /// every entity in the world.
    pub fn query(&mut self, filter: &Filter) -> query::Id {
        self.query_key(filter.key(&self.registry))
    }

    /// Get the live query for a canonical key, registering it on first use.
    pub fn query_key(&mut self, key: Key) -> query::Id {
        if let Some(id) = self.index.find(&key) {
            return id;
        }

        let mut query = Query::new(key, self.config.compaction_threshold);
        for record in self.records.iter().flatten() {
            query.evaluate(record.entity, &record.mask);
        }
        log::debug!(
            "registered query {} with {} matches: {:?}",
            self.index.len(),
            query.len(),
            query.key()
        );

        self.deferred = true;
        self.index.insert(query)
    }

    /// The live query registered under `id`.
    #[inline]
    pub fn query_results(&self, id: query::Id) -> Option<&Query> {
        self.index.get(id)
    }

    #[inline]
    pub(crate) fn query_results_mut(&mut self, id: query::Id) -> Option<&mut Query> {
        self.index.get_mut(id)
    }

    /// The number of live queries.
    #[inline]
    pub fn query_count(&self) -> usize {
        self.index.len()
    }

    /// Get a read-only view of `entity`.
    pub fn entity(&self, entity: Entity) -> Option<entity::Ref<'_>> {
        self.contains(entity)
            .then(|| entity::Ref::new(self, entity))
    }

    /// Get a mutable view of `entity`.
    pub fn entity_mut(&mut self, entity: Entity) -> Option<entity::RefMut<'_>> {
        if self.contains(entity) {
            Some(entity::RefMut::new(self, entity))
        } else {
            None
        }
    }

    /// The pending event queue.
    #[inline]
    pub fn events(&self) -> &event::Queue {
        &self.events
    }

    #[inline]
    pub fn events_mut(&mut self) -> &mut event::Queue {
        &mut self.events
    }

    fn record(&self, entity: Entity) -> Option<&Record> {
        if !self.allocator.is_current(entity) {
            return None;
        }
        self.records.get(entity.index())?.as_ref()
    }

    /// Field level lookup, so callers can keep using the query index while holding the record.
    fn record_mut<'a>(
        records: &'a mut [Option<Record>],
        allocator: &entity::Allocator,
        entity: Entity,
    ) -> Option<&'a mut Record> {
        if !allocator.is_current(entity) {
            return None;
        }
        records.get_mut(entity.index())?.as_mut()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.live)
            .field("components", &self.registry.len())
            .field("queries", &self.index.len())
            .field("pending", &self.pending())
            .field("events", &self.events.len())
            .finish()
    }
}

// World is intentionally !Send and !Sync:
// - !Send: World must stay on the thread where it was created
// - !Sync: World holds no synchronization, all access goes through `&mut self`
// The _not_send marker ensures both.

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use tickwork_macros::Component;

    use super::*;

    #[derive(Component, Debug, PartialEq)]
    struct Position(i32);

    #[derive(Component, Debug, PartialEq)]
    struct Velocity(i32);

    #[derive(Component)]
    struct Frozen;

    type Journal = Arc<std::sync::Mutex<Vec<(&'static str, &'static str)>>>;

    /// Records the hooks it receives, under its label, in a shared journal.
    struct Tracked {
        label: &'static str,
        journal: Journal,
    }

    impl Tracked {
        fn new(label: &'static str, journal: &Journal) -> Self {
            Self {
                label,
                journal: Arc::clone(journal),
            }
        }

        fn log(&self, hook: &'static str) {
            self.journal.lock().unwrap().push((self.label, hook));
        }
    }

    impl Component for Tracked {
        fn before_add(&mut self, _entity: Entity) {
            self.log("before_add");
        }

        fn after_add(&mut self, _entity: Entity) {
            self.log("after_add");
        }

        fn before_remove(&mut self, _entity: Entity) {
            self.log("before_remove");
        }

        fn after_remove(&mut self, _entity: Entity) {
            self.log("after_remove");
        }
    }

    #[test]
    fn queries_react_to_add_and_remove() {
        // Given
        let mut world = World::new();
        let moving = world.query(&Filter::new().all::<Position>());
        let entity = world.create_entity();
        let size = |world: &World| world.query_results(moving).unwrap().len();

        // Then
        assert_eq!(size(&world), 0);

        // When
        world.add(entity, Position(1)).unwrap();

        // Then
        assert_eq!(size(&world), 1);

        // When
        assert_eq!(world.remove::<Position>(entity), Some(Position(1)));

        // Then
        assert_eq!(size(&world), 0);
    }

    #[test]
    fn universal_query_tracks_component_count() {
        // Given
        let mut world = World::new();
        let rich = world.query(&Filter::new().min(2));
        let entity = world.create_entity();
        let matches = |world: &World| world.query_results(rich).unwrap().contains(entity);

        // When
        world.add(entity, Position(0)).unwrap();

        // Then
        assert!(!matches(&world));

        // When
        world.add(entity, Frozen).unwrap();

        // Then
        assert!(matches(&world));

        // When
        world.remove::<Position>(entity);

        // Then
        assert!(!matches(&world));
    }

    #[test]
    fn exact_and_bounded_queries_follow_every_mutation() {
        // Given
        let mut world = World::new();
        let only = world.query(&Filter::new().only::<Position>());
        let different = world.query(&Filter::new().different::<Position>());
        let bare = world.query(&Filter::new().max(0));
        let entity = world.create_entity();
        let matches = |world: &World| {
            let contains = |id| world.query_results(id).unwrap().contains(entity);
            (contains(only), contains(different), contains(bare))
        };

        // Then: an empty entity is included as soon as it is created
        assert_eq!(matches(&world), (false, true, true));

        // When
        world.add(entity, Position(1)).unwrap();

        // Then
        assert_eq!(matches(&world), (true, false, false));

        // When: a component outside the constraint changes the answer too
        world.add(entity, Velocity(1)).unwrap();

        // Then
        assert_eq!(matches(&world), (false, true, false));

        // When
        world.remove::<Velocity>(entity);

        // Then
        assert_eq!(matches(&world), (true, false, false));
    }

    #[test]
    fn same_is_only_under_another_name() {
        // Given
        let mut world = World::new();
        let only = world.query(&Filter::new().only::<(Position, Velocity)>());
        let same = world.query(&Filter::new().same::<(Velocity, Position)>());

        // Then
        assert_eq!(only, same);
    }

    #[test]
    fn bounded_queries_include_entities_that_predate_them() {
        // Given
        let mut world = World::new();
        let empty = world.create_entity();
        let placed = world.create_entity();
        world.add(placed, Position(0)).unwrap();

        // When
        let bare = world.query(&Filter::new().max(0));
        let different = world.query(&Filter::new().different::<Position>());

        // Then
        let results = world.query_results(bare).unwrap();
        assert!(results.contains(empty) && !results.contains(placed));
        let results = world.query_results(different).unwrap();
        assert!(results.contains(empty) && !results.contains(placed));
    }

    #[test]
    fn identical_filters_share_a_query() {
        // Given
        let mut world = World::new();

        // When
        let first = world.query(&Filter::new().all::<(Position, Velocity)>());
        let second = world.query(&Filter::new().all::<(Velocity, Position, Velocity)>());
        let other = world.query(&Filter::new().any::<(Position, Velocity)>());

        // Then
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(world.query_count(), 2);
    }

    #[test]
    fn new_query_sees_existing_entities() {
        // Given
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.add(a, Position(1)).unwrap();
        world.add(b, Position(2)).unwrap();
        world.add(b, Frozen).unwrap();

        // When
        let id = world.query(&Filter::new().all::<Position>().none::<Frozen>());

        // Then
        assert_eq!(world.query_results(id).unwrap().entities(), vec![a]);
    }

    #[test]
    fn empty_filter_includes_new_entities() {
        let mut world = World::new();
        let everything = world.query(&Filter::new());

        let entity = world.create_entity();

        assert!(world.query_results(everything).unwrap().contains(entity));
    }

    #[test]
    fn lifecycle_is_immediate_until_a_query_exists() {
        // Given
        let mut world = World::new();

        // When
        let early = world.create_entity();

        // Then
        assert_eq!(world.state(early), State::Created);
        assert_eq!(world.pending(), (0, 0));

        // When
        world.destroy(early);

        // Then
        assert_eq!(world.state(early), State::Destroyed);
        assert!(world.is_empty());
    }

    #[test]
    fn lifecycle_is_deferred_once_a_query_exists() {
        // Given
        let mut world = World::new();
        let id = world.query(&Filter::new().all::<Position>());

        // When
        let entity = world.create_entity();
        world.add(entity, Position(0)).unwrap();

        // Then
        assert_eq!(world.state(entity), State::Creating);
        assert_eq!(world.finish_creation(), 1);
        assert_eq!(world.state(entity), State::Created);

        // When
        world.destroy(entity);
        world.destroy(entity);

        // Then - still visible to queries until the flush
        assert_eq!(world.state(entity), State::Destroying);
        assert!(world.query_results(id).unwrap().contains(entity));
        assert_eq!(world.finish_destruction(), 1);
        assert_eq!(world.state(entity), State::Destroyed);
        assert!(world.query_results(id).unwrap().is_empty());
        assert!(!world.contains(entity));
    }

    #[test]
    fn entity_created_and_destroyed_in_one_tick_never_goes_live() {
        // Given
        let mut world = World::new();
        world.query(&Filter::new());
        let entity = world.create_entity();

        // When
        world.destroy(entity);
        let created = world.finish_creation();
        let destroyed = world.finish_destruction();

        // Then
        assert_eq!((created, destroyed), (0, 1));
        assert_eq!(world.pending(), (0, 0));
        assert_eq!(world.state(entity), State::Destroyed);
    }

    #[test]
    fn destroy_immediately_removes_everything() {
        // Given
        let mut world = World::new();
        let id = world.query(&Filter::new().all::<Position>());
        let entity = world.create_entity();
        world.add(entity, Position(3)).unwrap();
        world.add_tag(entity, "player").unwrap();

        // When
        world.destroy_immediately(entity);

        // Then
        assert_eq!(world.state(entity), State::Destroyed);
        assert!(world.query_results(id).unwrap().is_empty());
        assert!(!world.has_tag(entity, "player"));
        assert!(matches!(world.get::<Position>(entity), Err(Error::NoSuchEntity(_))));
        assert_eq!(world.finish_creation(), 0);
    }

    #[test]
    fn recycled_ids_do_not_resurrect_stale_handles() {
        // Given
        let mut world = World::new();
        let old = world.create_entity();
        world.add(old, Position(1)).unwrap();
        world.destroy_immediately(old);

        // When
        let new = world.create_entity();

        // Then
        assert_eq!(old.id(), new.id());
        assert_eq!(world.state(old), State::Destroyed);
        assert_eq!(world.state(new), State::Created);
        assert!(!world.has::<Position>(new));
        assert!(world.add(old, Velocity(1)).is_err());
    }

    #[test]
    fn state_of_foreign_handle_is_error() {
        let world = World::new();

        assert_eq!(world.state(Entity::new(42)), State::Error);
    }

    #[test]
    fn get_missing_component_fails() {
        // Given
        let mut world = World::new();
        let entity = world.create_entity();
        world.add(entity, Position(1)).unwrap();

        // Then
        assert!(matches!(
            world.get::<Velocity>(entity),
            Err(Error::MissingComponent { .. })
        ));
        assert!(world.try_get::<Velocity>(entity).is_none());
        assert_eq!(world.get::<Position>(entity).unwrap(), &Position(1));

        // When
        world.get_mut::<Position>(entity).unwrap().0 = 9;

        // Then
        assert_eq!(world.try_get::<Position>(entity), Some(&Position(9)));
    }

    #[test]
    fn removing_absent_components_is_a_noop() {
        // Given
        let mut world = World::new();
        let entity = world.create_entity();

        // Then - never registered
        assert_eq!(world.remove::<Velocity>(entity), None);
        assert!(world.components().get::<Velocity>().is_none());

        // Then - registered but absent
        world.register_component::<Frozen>();
        assert!(world.remove::<Frozen>(entity).is_none());
        assert!(world.contains(entity));
    }

    #[test]
    fn re_adding_replaces_the_instance() {
        // Given
        let mut world = World::new();
        let id = world.query(&Filter::new().all::<Position>());
        let entity = world.create_entity();

        // When
        world.add(entity, Position(1)).unwrap();
        world.add(entity, Position(2)).unwrap();

        // Then
        assert_eq!(world.get::<Position>(entity).unwrap(), &Position(2));
        assert_eq!(world.component_ids(entity).unwrap().count(), 1);
        assert_eq!(world.query_results(id).unwrap().len(), 1);
    }

    #[test]
    fn hooks_run_at_each_mutation_point() {
        // Given
        let journal = Journal::default();
        let mut world = World::new();
        let entity = world.create_entity();

        // When
        world.add(entity, Tracked::new("first", &journal)).unwrap();
        world.remove::<Tracked>(entity);
        world.add(entity, Tracked::new("second", &journal)).unwrap();
        world.destroy_immediately(entity);

        // Then
        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                ("first", "before_add"),
                ("first", "after_add"),
                ("first", "before_remove"),
                ("first", "after_remove"),
                ("second", "before_add"),
                ("second", "after_add"),
                ("second", "before_remove"),
                ("second", "after_remove"),
            ]
        );
    }

    #[test]
    fn replacing_an_instance_detaches_the_old_one_first() {
        // Given
        let journal = Journal::default();
        let mut world = World::new();
        let id = world.query(&Filter::new().all::<Tracked>());
        let entity = world.create_entity();
        world.add(entity, Tracked::new("old", &journal)).unwrap();
        journal.lock().unwrap().clear();

        // When
        world.add(entity, Tracked::new("new", &journal)).unwrap();

        // Then
        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                ("new", "before_add"),
                ("old", "before_remove"),
                ("old", "after_remove"),
                ("new", "after_add"),
            ]
        );
        assert_eq!(world.get::<Tracked>(entity).unwrap().label, "new");
        assert!(world.query_results(id).unwrap().contains(entity));
    }

    #[test]
    fn after_add_sees_the_query_update() {
        // Given
        static SEEN: AtomicUsize = AtomicUsize::new(0);

        struct Counted;
        impl Component for Counted {
            fn after_add(&mut self, _entity: Entity) {
                SEEN.fetch_add(1, Ordering::SeqCst);
            }
        }

        let mut world = World::new();
        let id = world.query(&Filter::new().all::<Counted>());
        let entity = world.create_entity();

        // When
        world.add(entity, Counted).unwrap();

        // Then
        assert_eq!(SEEN.load(Ordering::SeqCst), 1);
        assert!(world.query_results(id).unwrap().contains(entity));
    }

    #[test]
    fn tags() {
        // Given
        let mut world = World::new();
        let entity = world.create_entity();

        // When
        world.add_tag(entity, "enemy").unwrap();
        world.add_tag(entity, String::from("boss")).unwrap();

        // Then
        assert!(world.has_tag(entity, "enemy"));
        assert_eq!(world.tags(entity).count(), 2);
        assert!(world.remove_tag(entity, "enemy"));
        assert!(!world.remove_tag(entity, "enemy"));
        assert!(!world.has_tag(entity, "enemy"));
    }

    #[test]
    fn entity_views() {
        // Given
        let mut world = World::new();
        let entity = world.create_entity();

        // When
        {
            let mut view = world.entity_mut(entity).unwrap();
            view.add(Position(4)).unwrap();
            view.add_tag("hero").unwrap();
        }

        // Then
        let view = world.entity(entity).unwrap();
        assert_eq!(view.get::<Position>().unwrap(), &Position(4));
        assert!(view.has_tag("hero"));
        assert_eq!(view.state(), State::Created);
        assert_eq!(world.entities().collect::<Vec<_>>(), vec![entity]);
    }
}
