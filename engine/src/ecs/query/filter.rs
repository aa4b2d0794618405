//! Declarative query constraints and their canonical key.

use crate::ecs::component::{IntoSpec, Registry, Spec};

/// Resolves a component type (or tuple of types) to its spec, registering unseen types.
type SpecFn = fn(&Registry) -> Spec;

/// A declarative description of the entities a query matches.
///
/// Each method narrows the filter; a filter with no constraints matches every entity.
///
/// ```rust,ignore
/// // Everything that moves and is not frozen.
/// let moving = Filter::new().all::<(Position, Velocity)>().none::<Frozen>();
///
/// // Entities carrying exactly a Position, nothing else.
/// let bare = Filter::new().only::<Position>();
///
/// // Entities with at least two components of any kind.
/// let rich = Filter::new().min(2);
/// ```
///
/// The same constraint declared twice (in any order, with any duplication) compiles to the same
/// [`Key`], so the world keeps a single live index for both.
#[derive(Clone, Default)]
pub struct Filter {
    all: Vec<SpecFn>,
    any: Vec<SpecFn>,
    none: Vec<SpecFn>,
    only: Option<Vec<SpecFn>>,
    different: Option<Vec<SpecFn>>,
    min: Option<usize>,
    max: Option<usize>,
}

impl Filter {
    /// A filter matching every entity.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require every component in `S`.
    pub fn all<S: IntoSpec>(mut self) -> Self {
        self.all.push(S::into_spec);
        self
    }

    /// Require at least one of the components in `S`.
    pub fn any<S: IntoSpec>(mut self) -> Self {
        self.any.push(S::into_spec);
        self
    }

    /// Reject entities carrying any of the components in `S`.
    pub fn none<S: IntoSpec>(mut self) -> Self {
        self.none.push(S::into_spec);
        self
    }

    /// Require exactly the components in `S`, and nothing else.
    pub fn only<S: IntoSpec>(mut self) -> Self {
        self.only.get_or_insert_with(Vec::new).push(S::into_spec);
        self
    }

    /// Alias of [`only`](Self::only).
    #[inline]
    pub fn same<S: IntoSpec>(self) -> Self {
        self.only::<S>()
    }

    /// Reject entities whose component set is exactly `S`.
    pub fn different<S: IntoSpec>(mut self) -> Self {
        self.different.get_or_insert_with(Vec::new).push(S::into_spec);
        self
    }

    /// Require at least `count` components of any type.
    pub fn min(mut self, count: usize) -> Self {
        self.min = Some(count);
        self
    }

    /// Require at most `count` components of any type.
    pub fn max(mut self, count: usize) -> Self {
        self.max = Some(count);
        self
    }

    /// Resolve the filter's types against `registry` into its canonical key.
    pub fn key(&self, registry: &Registry) -> Key {
        let resolve = |fns: &[SpecFn]| {
            fns.iter()
                .fold(Spec::EMPTY, |spec, f| spec.union(&f(registry)))
        };
        Key {
            all: resolve(&self.all),
            any: resolve(&self.any),
            none: resolve(&self.none),
            only: self.only.as_deref().map(resolve),
            different: self.different.as_deref().map(resolve),
            min: self.min,
            max: self.max,
        }
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("all", &self.all.len())
            .field("any", &self.any.len())
            .field("none", &self.none.len())
            .field("only", &self.only.as_ref().map(Vec::len))
            .field("different", &self.different.as_ref().map(Vec::len))
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}

/// The canonical, structural form of a [`Filter`]: one sorted, de-duplicated id list per
/// constraint category plus the count bounds. Equal keys denote the same query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Key {
    pub all: Spec,
    pub any: Spec,
    pub none: Spec,
    pub only: Option<Spec>,
    pub different: Option<Spec>,
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Key {
    /// A key that requires every component of `spec`; the form systems register.
    #[inline]
    pub fn all_of(spec: Spec) -> Self {
        Self {
            all: spec,
            ..Default::default()
        }
    }

    /// True if the key uses a constraint that depends on the whole component set (only,
    /// different, min or max) rather than on named components.
    #[inline]
    pub fn is_universal(&self) -> bool {
        self.only.is_some() || self.different.is_some() || self.min.is_some() || self.max.is_some()
    }
}
