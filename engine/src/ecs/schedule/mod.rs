//! Schedule management for organizing and executing systems in ordered phases.
//!
//! This module provides the [`Schedule`] container, which owns the systems and event listeners of
//! a world, groups them into named [`Phase`]s and runs one full tick at a time.
//!
//! # Architecture
//!
//! ```text
//! Schedule
//!   ├── Phase "Input"   ─► [read_input]
//!   ├── Phase "Logic"   ─► [ai, movement]          events drained after the phase
//!   ├── Phase "Events"  ─► listeners only
//!   └── Phase "Render"  ─► [draw]
//!                                                  then: finish_creation,
//!                                                        finish_destruction,
//!                                                        clear the event queue
//! ```
//!
//! # Phase Order
//!
//! The effective order is the configured order ([`Schedule::set_phase_order`]) restricted to
//! phases that exist, followed by every unlisted phase in the order it was first used. A
//! schedule whose systems declare no phase runs them all in the single [`phase::DEFAULT`] phase.
//!
//! Either every system declares a phase or none does. The rule holds per [`World`]: it covers
//! every schedule registering systems against the same world, and registering a system that
//! breaks it fails with [`Error::MixedPhases`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use tickwork::define_phase;
//! use tickwork::ecs::schedule::{Options, Schedule, Sequence};
//!
//! define_phase!(Input, Logic, Render);
//!
//! let mut schedule = Schedule::new();
//! schedule.set_phase_order(Sequence::new().then(Input).then(Logic).then(Render));
//! schedule.add_system::<Position, _>(&mut world, Options::new().phase(Logic).name("move"), |call| {
//!     call.get_mut::<Position>()?.x += 1.0;
//!     Ok(())
//! })?;
//!
//! let mut clock = Clock::fixed(SIXTY_FPS);
//! loop {
//!     schedule.run(&mut world, clock.next())?;
//! }
//! ```

pub mod phase;

pub use phase::{Label, Phase, Sequence};

use crate::ecs::{
    component::IntoSpec,
    error::Error,
    event::{Event, Listeners},
    query::Filter,
    system::{self, Call, System},
    time::Tick,
    world::World,
};

/// Registration options of a system.
#[derive(Debug, Clone, Default)]
pub struct Options {
    phase: Option<phase::Name>,
    name: Option<String>,
}

impl Options {
    /// No phase, generated name.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the system in `phase`.
    #[inline]
    pub fn phase(mut self, phase: impl Into<phase::Name>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    /// The display name used in logs and errors.
    #[inline]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A container for organizing systems and listeners into ordered phases.
///
/// `Schedule` is `!Send` and `!Sync` like the world it drives: systems and listeners are plain
/// boxed closures and run on the calling thread.
#[derive(Default)]
pub struct Schedule {
    /// Phases in the order they were first used.
    phases: Vec<Phase>,

    /// The configured phase order.
    order: Sequence,

    /// The effective run order, as indices into `phases`.
    plan: Vec<usize>,

    /// The number of systems ever registered.
    systems: u32,

    /// Event subscriptions per phase.
    listeners: Listeners,
}

impl Schedule {
    /// Creates a new empty schedule.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system over every entity carrying all the components of `S`.
    ///
    /// The query is shared with any other system or caller that declared the same component set.
    pub fn add_system<S, F>(
        &mut self,
        world: &mut World,
        options: Options,
        callback: F,
    ) -> Result<system::Id, Error>
    where
        S: IntoSpec,
        F: FnMut(&mut Call<'_>) -> Result<(), Error> + 'static,
    {
        self.add_query_system(world, &Filter::new().all::<S>(), options, callback)
    }

    /// Register a system over the entities matching `filter`.
    pub fn add_query_system<F>(
        &mut self,
        world: &mut World,
        filter: &Filter,
        options: Options,
        callback: F,
    ) -> Result<system::Id, Error>
    where
        F: FnMut(&mut Call<'_>) -> Result<(), Error> + 'static,
    {
        let Options { phase, name } = options;
        let name = name.unwrap_or_else(|| format!("system-{}", self.systems));

        if !world.claim_phasing(phase.is_some()) {
            log::error!("rejected system `{name}`: phased and unphased systems cannot be mixed");
            return Err(Error::MixedPhases { system: name });
        }

        let phase = phase.unwrap_or(phase::DEFAULT);
        let query = world.query(filter);
        let id = system::Id::new(self.systems);
        self.systems += 1;

        log::debug!("registered system `{name}` in phase `{phase}` over query {query:?}");
        self.phase_mut(&phase)
            .add_system(System::new(id, name, phase, query, Box::new(callback)));
        Ok(id)
    }

    /// Subscribe `callback` to events of type `E` delivered to `phase`. Use [`phase::DEFAULT`]
    /// for unphased schedules.
    pub fn add_listener<E, F>(&mut self, phase: impl Into<phase::Name>, callback: F)
    where
        E: Event,
        F: FnMut(&mut World, &E) -> Result<(), Error> + 'static,
    {
        let phase = phase.into();
        log::debug!(
            "registered listener for `{}` in phase `{phase}`",
            std::any::type_name::<E>()
        );
        self.phase_mut(&phase);
        self.listeners.add(phase, callback);
    }

    /// Configure the phase run order. Phases missing from `order` run after the listed ones, in
    /// the order they were first used; listed phases that have nothing registered are ignored.
    pub fn set_phase_order<I, N>(&mut self, order: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<phase::Name>,
    {
        self.order = order.into_iter().collect();
        self.replan();
        log::debug!("phase order set to {:?}", self.phase_order());
    }

    /// The effective phase run order.
    pub fn phase_order(&self) -> Vec<&phase::Name> {
        self.plan.iter().map(|&i| self.phases[i].name()).collect()
    }

    /// Returns a reference to the named phase, if it exists.
    pub fn phase(&self, name: impl Into<phase::Name>) -> Option<&Phase> {
        let name = name.into();
        self.phases.iter().find(|phase| *phase.name() == name)
    }

    /// Returns the number of phases in the schedule.
    #[inline]
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// Returns the number of registered systems.
    #[inline]
    pub fn system_count(&self) -> usize {
        self.systems as usize
    }

    /// Returns the event subscriptions.
    #[inline]
    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    /// Run one tick.
    ///
    /// For each phase in order: run its systems, then drain its events. Afterwards entities
    /// created this tick go live, entities destroyed this tick are removed and the event queue
    /// is cleared.
    ///
    /// The first system or listener error is returned immediately. The remaining systems,
    /// phases and the end of tick steps are skipped for this tick.
    pub fn run(&mut self, world: &mut World, tick: Tick) -> Result<(), Error> {
        for &index in &self.plan {
            let phase = &mut self.phases[index];
            phase.run(world, tick)?;
            self.listeners.process_phase(phase.name(), world)?;
        }

        let created = world.finish_creation();
        let destroyed = world.finish_destruction();
        let discarded = world.events().len();
        world.events_mut().clear();

        log::trace!(
            "tick at {:?}: {created} created, {destroyed} destroyed, {discarded} events discarded",
            tick.time
        );
        Ok(())
    }

    /// Find or create the named phase.
    fn phase_mut(&mut self, name: &phase::Name) -> &mut Phase {
        let index = match self.phases.iter().position(|phase| phase.name() == name) {
            Some(index) => index,
            None => {
                self.phases.push(Phase::new(name.clone()));
                self.replan();
                self.phases.len() - 1
            }
        };
        &mut self.phases[index]
    }

    fn replan(&mut self) {
        let mut plan = Vec::with_capacity(self.phases.len());
        for name in self.order.phases() {
            if let Some(index) = self.phases.iter().position(|phase| phase.name() == name) {
                plan.push(index);
            }
        }
        for index in 0..self.phases.len() {
            if !plan.contains(&index) {
                plan.push(index);
            }
        }
        self.plan = plan;
    }
}

impl std::fmt::Debug for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schedule")
            .field("order", &self.phase_order())
            .field("phases", &self.phases)
            .field("listeners", &self.listeners)
            .finish()
    }
}
