//! Growable component signature masks.
//!
//! A [`Bitmask`] is the set of component ids attached to an entity, and also the compiled form of
//! each constraint list of a [`Query`](crate::ecs::query::Query). Every comparison behaves as if
//! the shorter of the two masks were zero-extended, so masks built at different times (before and
//! after new component types were registered) always compare correctly.
//!
//! The backing store is a [`FixedBitSet`], which keeps the bits in machine words and counts them
//! with a per-word popcount.

use fixedbitset::FixedBitSet;

use crate::ecs::component;

/// A growable set of bits, one per component id.
#[derive(Debug, Clone, Default)]
pub struct Bitmask {
    bits: FixedBitSet,
}

impl Bitmask {
    /// An empty mask.
    #[inline]
    pub const fn new() -> Self {
        Self {
            bits: FixedBitSet::new(),
        }
    }

    /// Build a mask with exactly the given component ids set.
    pub fn from_ids(ids: &[component::Id]) -> Self {
        let mut mask = Self::new();
        for id in ids {
            mask.set(id.index());
        }
        mask
    }

    /// Set bit `index`, growing the mask if needed. Existing bits are preserved.
    #[inline]
    pub fn set(&mut self, index: usize) {
        if index >= self.bits.len() {
            self.bits.grow(index + 1);
        }
        self.bits.insert(index);
    }

    /// Clear bit `index`. Clearing past the end is a no-op.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        if index < self.bits.len() {
            self.bits.set(index, false);
        }
    }

    /// Check whether bit `index` is set.
    #[inline]
    pub fn is_set(&self, index: usize) -> bool {
        self.bits.contains(index)
    }

    /// True if every bit of `other` is also set in `self` ("all of").
    #[inline]
    pub fn contains(&self, other: &Bitmask) -> bool {
        self.bits.is_superset(&other.bits)
    }

    /// True if at least one bit is set in both masks ("any of").
    #[inline]
    pub fn intersects(&self, other: &Bitmask) -> bool {
        !self.bits.is_disjoint(&other.bits)
    }

    /// True if both masks hold exactly the same bits ("exactly").
    #[inline]
    pub fn equals(&self, other: &Bitmask) -> bool {
        self.contains(other) && other.contains(self)
    }

    /// The number of set bits.
    #[inline]
    pub fn count(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// True if no bit is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    /// Iterate the indexes of the set bits in ascending order.
    #[inline]
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.ones()
    }
}

impl PartialEq for Bitmask {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Bitmask {}
