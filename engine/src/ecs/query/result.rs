//! The live, ordered result set of a query.
//!
//! # Layout
//!
//! ```text
//! slots:     [ e3 | ── | e7 | e1 | ── | e9 ]    ── = tombstone left by a removal
//! positions: { e3: 0, e7: 2, e1: 3, e9: 5 }
//! ```
//!
//! Entities are appended when they (re-)match and replaced by a tombstone when they stop
//! matching, so both operations are O(1) and the iteration order is the order in which entities
//! most recently started matching.
//!
//! Systems walk the set by slot index and re-read the slot on every step. Removals made while a
//! pass is running only turn slots into tombstones, and a pass stops at the slot count it started
//! with, so entities appended mid-pass are left for the next tick. Compaction (dropping the
//! tombstones) moves slots, so it is suppressed while any pass holds a [`pin`](Results::pin).

use std::collections::HashMap;

use crate::ecs::entity::Entity;

/// The ordered set of entities currently matching a query.
#[derive(Debug)]
pub struct Results {
    /// Matching entities in match order, with tombstones for removed ones.
    slots: Vec<Option<Entity>>,

    /// The slot of every matching entity.
    positions: HashMap<Entity, usize>,

    /// The number of running passes over the slots.
    pins: u32,

    /// Tombstone count that triggers compaction.
    threshold: usize,
}

impl Results {
    /// Create an empty result set compacting once more than `threshold` tombstones accumulate
    /// (and they outnumber the live entries).
    pub fn new(threshold: usize) -> Self {
        Self {
            slots: Vec::new(),
            positions: HashMap::new(),
            pins: 0,
            threshold,
        }
    }

    /// The number of matching entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if no entity matches.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns true if `entity` is in the set.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.positions.contains_key(&entity)
    }

    /// Iterate the matching entities in match order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// The earliest matching entity still in the set.
    #[inline]
    pub fn first(&self) -> Option<Entity> {
        self.iter().next()
    }

    /// The entity in slot `index`, or `None` for a tombstone or an index past the end.
    #[inline]
    pub fn slot(&self, index: usize) -> Option<Entity> {
        self.slots.get(index).copied().flatten()
    }

    /// The number of slots, tombstones included.
    #[inline]
    pub fn slot_len(&self) -> usize {
        self.slots.len()
    }

    /// Add an entity. Returns false (and changes nothing) if it is already present.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.positions.contains_key(&entity) {
            return false;
        }
        self.positions.insert(entity, self.slots.len());
        self.slots.push(Some(entity));
        true
    }

    /// Remove an entity. Returns false (and changes nothing) if it is not present.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let Some(index) = self.positions.remove(&entity) else {
            return false;
        };
        self.slots[index] = None;
        self.maybe_compact();
        true
    }

    /// Hold the slot layout stable while a pass walks it.
    #[inline]
    pub(crate) fn pin(&mut self) {
        self.pins += 1;
    }

    /// Release a [`pin`](Self::pin), compacting if it was the last one and enough tombstones
    /// accumulated.
    #[inline]
    pub(crate) fn unpin(&mut self) {
        debug_assert!(self.pins > 0, "unbalanced result set unpin");
        self.pins = self.pins.saturating_sub(1);
        self.maybe_compact();
    }

    /// Drop all tombstones now, unless a pass is running.
    pub fn compact(&mut self) {
        if self.pins > 0 || self.slots.len() == self.positions.len() {
            return;
        }
        self.slots.retain(Option::is_some);
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(entity) = slot {
                self.positions.insert(*entity, index);
            }
        }
    }

    fn maybe_compact(&mut self) {
        let tombstones = self.slots.len() - self.positions.len();
        if tombstones > self.threshold && tombstones > self.positions.len() {
            self.compact();
        }
    }
}
