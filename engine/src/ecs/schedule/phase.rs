//! Phases: named, ordered buckets of systems and event listeners within one tick.
//!
//! # Architecture
//!
//! ```text
//! Schedule
//!   ├── Phase "input"   ─► systems: [read_keys]        listeners: [..]
//!   ├── Phase "logic"   ─► systems: [ai, movement]     listeners: [..]
//!   └── Phase "render"  ─► systems: [draw]             listeners: [on_damage]
//! ```
//!
//! A phase is identified by its [`Name`]. Names are plain strings, so phases can be declared
//! ad hoc (`"logic"`) or through label types generated by [`define_phase!`], which convert into
//! the same names and cannot be misspelled.
//!
//! # Execution Model
//!
//! [`Phase::run`] runs the phase's systems one after the other, in registration order. Once the
//! last system returns, the schedule drains the events that belong to the phase (see
//! [`event`](crate::ecs::event)).

use std::{borrow::Cow, fmt};

use crate::ecs::{error::Error, system, time::Tick, world::World};

/// The name of a phase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(Cow<'static, str>);

/// The implicit phase of unphased systems and of listeners registered without a phase.
pub const DEFAULT: Name = Name(Cow::Borrowed("default"));

impl Name {
    /// Construct a phase name.
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The name of the phase identified by label `L`.
    #[inline]
    pub fn of<L: Label>() -> Self {
        Self(Cow::Borrowed(L::name()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Name {
    #[inline]
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for Name {
    #[inline]
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl From<&Name> for Name {
    #[inline]
    fn from(value: &Name) -> Self {
        value.clone()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A marker trait for phase label types.
///
/// The easiest way to define phase labels is with the [`define_phase!`] macro:
///
/// ```rust,ignore
/// define_phase!(Input, Logic, Render);
///
/// schedule.add_system::<Position, _>(&mut world, Options::new().phase(Logic), movement)?;
/// ```
///
/// For custom behavior, implement the trait manually along with `From<MyPhase> for Name`:
///
/// ```rust,ignore
/// struct MyPhase;
///
/// impl Label for MyPhase {
///     fn name() -> &'static str { "my-phase" }
/// }
///
/// impl From<MyPhase> for Name {
///     fn from(_: MyPhase) -> Name { Name::of::<MyPhase>() }
/// }
/// ```
pub trait Label: 'static {
    /// Returns the phase name this label stands for.
    fn name() -> &'static str;
}

/// Defines one or more phase label types.
///
/// For each identifier, the macro generates:
///
/// ```rust,ignore
/// #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
/// pub struct Logic;
///
/// impl Label for Logic {
///     fn name() -> &'static str { "Logic" }
/// }
///
/// impl From<Logic> for Name { .. }
/// ```
#[macro_export]
macro_rules! define_phase {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
            pub struct $name;

            impl $crate::ecs::schedule::phase::Label for $name {
                #[inline]
                fn name() -> &'static str {
                    stringify!($name)
                }
            }

            impl ::core::convert::From<$name> for $crate::ecs::schedule::phase::Name {
                #[inline]
                fn from(_: $name) -> Self {
                    $crate::ecs::schedule::phase::Name::of::<$name>()
                }
            }
        )*
    };
}

/// A named execution stage holding systems in registration order.
pub struct Phase {
    name: Name,
    systems: Vec<system::System>,
}

impl Phase {
    /// Create an empty phase.
    #[inline]
    pub fn new(name: Name) -> Self {
        Self {
            name,
            systems: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Append a system; it runs after every system added before it.
    #[inline]
    pub fn add_system(&mut self, system: system::System) {
        self.systems.push(system);
    }

    /// The number of systems in the phase.
    #[inline]
    pub fn systems_len(&self) -> usize {
        self.systems.len()
    }

    /// Run every system of the phase once, stopping at the first failure.
    pub fn run(&mut self, world: &mut World, tick: Tick) -> Result<(), Error> {
        for system in &mut self.systems {
            system.run(world, tick)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phase")
            .field("name", &self.name)
            .field("systems", &self.systems.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// An ordered list of phase names, used to configure the run order of a
/// [`Schedule`](super::Schedule).
///
/// ```rust,ignore
/// define_phase!(Input, Logic, Render);
///
/// let order = Sequence::new().then(Input).then(Logic).then(Render);
/// schedule.set_phase_order(order);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    phases: Vec<Name>,
}

impl Sequence {
    /// Creates a new empty phase sequence.
    #[inline]
    pub fn new() -> Self {
        Self { phases: Vec::new() }
    }

    /// Adds a phase to the end of the sequence. A phase already in the sequence keeps its first
    /// position.
    #[inline]
    pub fn then(mut self, phase: impl Into<Name>) -> Self {
        let phase = phase.into();
        if !self.phases.contains(&phase) {
            self.phases.push(phase);
        }
        self
    }

    /// Returns the phases in this sequence.
    #[inline]
    pub fn phases(&self) -> &[Name] {
        &self.phases
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

impl<N: Into<Name>> FromIterator<N> for Sequence {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        iter.into_iter().fold(Sequence::new(), |sequence, name| sequence.then(name))
    }
}

impl IntoIterator for Sequence {
    type Item = Name;
    type IntoIter = std::vec::IntoIter<Name>;

    fn into_iter(self) -> Self::IntoIter {
        self.phases.into_iter()
    }
}
