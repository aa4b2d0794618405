use std::collections::HashMap;

use crate::ecs::{
    bitmask::Bitmask,
    component,
    entity::Entity,
    query::{self, Key, Query},
};

/// The live queries of a world and the lookup tables that decide which of them a mutation can
/// affect.
///
/// ```text
/// queries:      [ q0: all(A)  | q1: all(A,B) none(C) | q2: min(2) ]
/// by_component: A ─► [q0, q1]   B ─► [q1]   C ─► [q1]
/// universal:    [q2]
/// ```
#[derive(Debug, Default)]
pub(crate) struct Index {
    /// Every live query, indexed by its id.
    queries: Vec<Query>,

    /// Canonical key to query id, so identical filters share one query.
    keys: HashMap<Key, query::Id>,

    /// For each component id, the non-universal queries naming it.
    by_component: Vec<Vec<query::Id>>,

    /// Queries re-evaluated on every mutation.
    universal: Vec<query::Id>,
}

impl Index {
    /// Look up the query registered for `key`.
    #[inline]
    pub fn find(&self, key: &Key) -> Option<query::Id> {
        self.keys.get(key).copied()
    }

    /// Register a new query. The caller guarantees `key` is not registered yet and populates the
    /// results afterwards.
    pub fn insert(&mut self, query: Query) -> query::Id {
        let id = query::Id::new(self.queries.len() as u32);

        if query.is_universal() {
            self.universal.push(id);
        } else {
            for component in query.relevant() {
                let index = component.index();
                if index >= self.by_component.len() {
                    self.by_component.resize_with(index + 1, Vec::new);
                }
                self.by_component[index].push(id);
            }
        }

        self.keys.insert(query.key().clone(), id);
        self.queries.push(query);
        id
    }

    /// The number of live queries.
    #[inline]
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    #[inline]
    pub fn get(&self, id: query::Id) -> Option<&Query> {
        self.queries.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: query::Id) -> Option<&mut Query> {
        self.queries.get_mut(id.index())
    }

    /// Re-evaluate `entity` against every query that can observe a change of `component`.
    pub fn reindex(&mut self, entity: Entity, component: component::Id, mask: &Bitmask) {
        if let Some(named) = self.by_component.get(component.index()) {
            for id in named {
                self.queries[id.index()].evaluate(entity, mask);
            }
        }
        for id in &self.universal {
            self.queries[id.index()].evaluate(entity, mask);
        }
    }

    /// Evaluate `entity` against every query.
    pub fn evaluate_all(&mut self, entity: Entity, mask: &Bitmask) {
        for query in &mut self.queries {
            query.evaluate(entity, mask);
        }
    }

    /// Remove `entity` from every query.
    pub fn forget(&mut self, entity: Entity) {
        for query in &mut self.queries {
            query.forget(entity);
        }
    }
}
