use crate::{
    all_tuples,
    ecs::component::{Component, Id, Registry},
};

/// A specification for a set of component types.
/// This is a sorted, de-duplicated vector of component IDs, so it can be used as a Hash key:
/// listing the same types in any order, or listing a type twice, yields an equal spec.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Spec {
    ids: Vec<Id>,
}

impl Spec {
    /// An empty component specification.
    pub const EMPTY: Self = Spec { ids: Vec::new() };

    /// Canonicalize `ids` into a spec.
    #[inline]
    pub fn new(ids: impl Into<Vec<Id>>) -> Self {
        let mut ids = ids.into();
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    /// Get the component IDs in this specification.
    #[inline]
    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// The ids present in either spec. Used to fold repeated filter clauses into one.
    pub fn union(&self, other: &Spec) -> Self {
        Self::new([self.ids.as_slice(), other.ids.as_slice()].concat())
    }

    /// Returns true if this spec is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of component IDs in this spec.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

impl From<Vec<Id>> for Spec {
    #[inline]
    fn from(value: Vec<Id>) -> Self {
        Spec::new(value)
    }
}

/// Trait for converting a type into a component specification (`Spec`).
///
/// Implemented for every [`Component`], for `()` and for tuples of up to 26 `IntoSpec` types, so
/// `(Position, Velocity)` names both components.
pub trait IntoSpec {
    /// Convert the type into a component specification, registering unseen types.
    fn into_spec(registry: &Registry) -> Spec;
}

impl IntoSpec for () {
    fn into_spec(_registry: &Registry) -> Spec {
        Spec::EMPTY
    }
}

impl<C: Component> IntoSpec for C {
    fn into_spec(registry: &Registry) -> Spec {
        Spec::new([registry.register::<C>()])
    }
}

macro_rules! tuple_spec {
    ($($name: ident),*) => {
        impl<$($name: IntoSpec),*> IntoSpec for ($($name,)*) {
            fn into_spec(registry: &Registry) -> Spec {
                let mut ids = Vec::new();
                $(
                    ids.extend(<$name>::into_spec(registry).ids());
                )*
                Spec::new(ids)
            }
        }
    }
}

all_tuples!(tuple_spec);
