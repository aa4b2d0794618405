//! Reactive queries: declarative component filters whose matching entity sets are kept current
//! as components are added and removed.
//!
//! # Architecture
//!
//! The query system is built on three main concepts:
//!
//! - **[`Filter`]**: The builder a caller declares constraints with (`all`, `any`, `none`,
//!   `only`, `different`, `min`, `max`).
//!
//! - **[`Key`]**: The canonical form of a filter. Type lists are resolved to component ids,
//!   sorted and de-duplicated, so two declarations of the same constraint share one key, and
//!   therefore one live query in the world.
//!
//! - **[`Query`]**: The compiled filter (one [`Bitmask`] per category, the count bounds and the
//!   set of *relevant* components) together with its live [`Results`].
//!
//! ```text
//!  Filter ──key()──► Key ──World::query()──► query::Id ──► Query { masks, results }
//!                     │                                        ▲
//!                     └── existing key? reuse the same Id ─────┘
//! ```
//!
//! # Maintenance
//!
//! The world re-evaluates an entity against a query whenever the entity's component set changes
//! in a way the query can observe:
//!
//! - A query naming components only through `all`/`any`/`none` is re-evaluated when one of those
//!   components is added or removed.
//! - A *universal* query (`only`, `different`, `min` or `max`) depends on the whole component
//!   set, so it is re-evaluated on every add and remove.
//!
//! # Usage
//!
//! ```rust,ignore
//! let id = world.query(&Filter::new().all::<(Position, Velocity)>().none::<Frozen>());
//!
//! for entity in world.query_results(id).iter() {
//!     // ...
//! }
//! ```

mod filter;
mod result;

pub use filter::{Filter, Key};
pub use result::Results;

use crate::ecs::{bitmask::Bitmask, component, entity::Entity};

/// The world assigned identity of a live query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct a query id from its index in the world's query table.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The index of this query in indexable storage.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A compiled filter and the entities currently matching it.
#[derive(Debug)]
pub struct Query {
    /// The canonical key this query was compiled from.
    key: Key,

    /// Components that must all be present.
    all: Bitmask,

    /// Components of which at least one must be present. Empty means no constraint.
    any: Bitmask,

    /// Components that must all be absent.
    none: Bitmask,

    /// The exact component set an entity must have.
    only: Option<Bitmask>,

    /// A component set an entity must not have exactly.
    different: Option<Bitmask>,

    /// Inclusive component count bounds.
    min: Option<usize>,
    max: Option<usize>,

    /// Union of `all`, `any` and `none`.
    relevant: Bitmask,

    /// True when matching depends on the whole component set.
    universal: bool,

    /// The live result set.
    results: Results,
}

impl Query {
    /// Compile a query from its canonical key. `compaction_threshold` configures the result set.
    pub fn new(key: Key, compaction_threshold: usize) -> Self {
        let all = Bitmask::from_ids(key.all.ids());
        let any = Bitmask::from_ids(key.any.ids());
        let none = Bitmask::from_ids(key.none.ids());

        let mut relevant = all.clone();
        for id in key.any.ids().iter().chain(key.none.ids()) {
            relevant.set(id.index());
        }

        Self {
            only: key.only.as_ref().map(|spec| Bitmask::from_ids(spec.ids())),
            different: key.different.as_ref().map(|spec| Bitmask::from_ids(spec.ids())),
            min: key.min,
            max: key.max,
            universal: key.is_universal(),
            all,
            any,
            none,
            relevant,
            key,
            results: Results::new(compaction_threshold),
        }
    }

    /// Compile a filter against a registry.
    #[inline]
    pub fn compile(filter: &Filter, registry: &component::Registry, compaction_threshold: usize) -> Self {
        Self::new(filter.key(registry), compaction_threshold)
    }

    /// The canonical key of this query.
    #[inline]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Test a component set against the compiled constraints.
    ///
    /// Checks short-circuit in the order all, none, any, only, different, then the count bounds.
    pub fn matches(&self, mask: &Bitmask) -> bool {
        if !mask.contains(&self.all) {
            return false;
        }
        if mask.intersects(&self.none) {
            return false;
        }
        if !self.any.is_empty() && !mask.intersects(&self.any) {
            return false;
        }
        if let Some(only) = &self.only {
            if !mask.equals(only) {
                return false;
            }
        }
        if let Some(different) = &self.different {
            if mask.equals(different) {
                return false;
            }
        }
        if self.min.is_some() || self.max.is_some() {
            let count = mask.count();
            if self.min.is_some_and(|min| count < min) || self.max.is_some_and(|max| count > max) {
                return false;
            }
        }
        true
    }

    /// True if matching depends on the entity's whole component set.
    #[inline]
    pub fn is_universal(&self) -> bool {
        self.universal
    }

    /// True if adding or removing component `id` can change whether an entity matches.
    #[inline]
    pub fn is_relevant(&self, id: component::Id) -> bool {
        self.universal || self.relevant.is_set(id.index())
    }

    /// The components named by `all`, `any` or `none`.
    #[inline]
    pub fn relevant(&self) -> impl Iterator<Item = component::Id> + '_ {
        self.relevant.ones().map(|index| component::Id::new(index as u32))
    }

    /// Bring `entity`'s membership in line with `mask`. Returns true if membership changed.
    pub(crate) fn evaluate(&mut self, entity: Entity, mask: &Bitmask) -> bool {
        if self.matches(mask) {
            self.results.insert(entity)
        } else {
            self.results.remove(entity)
        }
    }

    /// Drop `entity` from the results regardless of its components.
    #[inline]
    pub(crate) fn forget(&mut self, entity: Entity) -> bool {
        self.results.remove(entity)
    }

    /// The live result set.
    #[inline]
    pub fn results(&self) -> &Results {
        &self.results
    }

    #[inline]
    pub(crate) fn results_mut(&mut self) -> &mut Results {
        &mut self.results
    }

    /// Iterate the matching entities in match order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.results.iter()
    }

    /// Snapshot the matching entities in match order.
    #[inline]
    pub fn entities(&self) -> Vec<Entity> {
        self.results.iter().collect()
    }

    /// The earliest matching entity.
    #[inline]
    pub fn first(&self) -> Option<Entity> {
        self.results.first()
    }

    /// The number of matching entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no entity matches.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns true if `entity` currently matches.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.results.contains(entity)
    }
}
