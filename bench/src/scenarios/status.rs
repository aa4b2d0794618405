//! Status effects.
//!
//! Every entity has [`Health`]. Each tick a share of them catch fire or freeze, burning entities
//! lose health and report it through a [`Damaged`] event, and effects wear off again. The marker
//! components come and go constantly, so the cost measured here is mostly query reindexing:
//!
//! - `(Health, Burning)` for the burn system
//! - `Health` without `Burning` for ignition
//! - `any(Burning, Frozen)` for the effect tally
//! - `min: 2` components, a universal query re-evaluated on every change

use std::{cell::Cell, rc::Rc};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tickwork::{
    define_phase,
    ecs::{Clock, Error, Filter, Options, Schedule, World, query, schedule::phase::Name, time::SIXTY_FPS},
};

use crate::{
    components::{Burning, Damaged, Frozen, Health},
    scenarios::Scenario,
};

define_phase!(Effects, Resolve);

pub struct StatusConfig {
    pub entity_count: usize,
    /// Probability for an entity to catch fire on a given tick.
    pub ignite_chance: f64,
    /// Probability for a burning or frozen entity to recover on a given tick.
    pub recover_chance: f64,
    pub seed: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            entity_count: 10_000,
            ignite_chance: 0.05,
            recover_chance: 0.2,
            seed: 777,
        }
    }
}

pub struct StatusScenario {
    config: StatusConfig,
    world: World,
    schedule: Schedule,
    clock: Clock,
    affected: Option<query::Id>,
    crowded: Option<query::Id>,
    damage: Rc<Cell<i64>>,
}

impl StatusScenario {
    pub fn new() -> Self {
        Self::with_config(StatusConfig::default())
    }

    pub fn with_config(config: StatusConfig) -> Self {
        Self {
            config,
            world: World::new(),
            schedule: Schedule::new(),
            clock: Clock::fixed(SIXTY_FPS),
            affected: None,
            crowded: None,
            damage: Rc::default(),
        }
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Entities currently burning or frozen.
    pub fn affected(&self) -> usize {
        self.count(self.affected)
    }

    /// Entities carrying at least two components.
    pub fn crowded(&self) -> usize {
        self.count(self.crowded)
    }

    /// Total damage reported since setup.
    pub fn damage(&self) -> i64 {
        self.damage.get()
    }

    fn count(&self, id: Option<query::Id>) -> usize {
        id.and_then(|id| self.world.query_results(id))
            .map_or(0, |query| query.len())
    }

    fn build_schedule(&mut self) -> Result<(), Error> {
        let world = &mut self.world;
        let schedule = &mut self.schedule;
        schedule.set_phase_order([Name::from(Effects), Name::from(Resolve)]);

        let ignite = self.config.ignite_chance;
        let recover = self.config.recover_chance;
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        schedule.add_query_system(
            world,
            &Filter::new().all::<Health>().none::<Burning>(),
            Options::new().phase(Effects).name("ignite"),
            move |call| {
                if call.has::<Frozen>() {
                    if rng.gen_bool(recover) {
                        call.remove::<Frozen>();
                    }
                } else if rng.gen_bool(ignite) {
                    call.add(Burning)?;
                } else if rng.gen_bool(ignite) {
                    call.add(Frozen)?;
                }
                Ok(())
            },
        )?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(1));
        schedule.add_system::<(Health, Burning), _>(
            world,
            Options::new().phase(Effects).name("burn"),
            move |call| {
                let health = call.get_mut::<Health>()?;
                health.current = (health.current - 1).max(0);
                call.emit(Damaged { amount: 1 });
                if rng.gen_bool(recover) {
                    call.remove::<Burning>();
                }
                Ok(())
            },
        )?;

        let total = Rc::clone(&self.damage);
        schedule.add_listener(Resolve, move |_: &mut World, damaged: &Damaged| {
            total.set(total.get() + i64::from(damaged.amount));
            Ok(())
        });

        self.affected = Some(world.query(&Filter::new().any::<(Burning, Frozen)>()));
        self.crowded = Some(world.query(&Filter::new().min(2)));
        Ok(())
    }
}

impl Default for StatusScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for StatusScenario {
    fn name(&self) -> &'static str {
        "status"
    }

    fn description(&self) -> &'static str {
        "marker components toggled every tick across overlapping queries"
    }

    fn entity_count(&self) -> usize {
        self.world.len()
    }

    fn setup(&mut self) -> Result<(), Error> {
        self.build_schedule()?;
        for _ in 0..self.config.entity_count {
            let entity = self.world.create_entity();
            self.world.add(entity, Health::new(1_000))?;
        }
        self.world.finish_creation();
        Ok(())
    }

    fn update(&mut self) -> Result<(), Error> {
        let tick = self.clock.next();
        self.schedule.run(&mut self.world, tick)
    }

    fn teardown(&mut self) {
        let entities: Vec<_> = self.world.entities().collect();
        for entity in entities {
            self.world.destroy_immediately(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> StatusScenario {
        StatusScenario::with_config(StatusConfig {
            entity_count: 1_000,
            ignite_chance: 0.2,
            ..Default::default()
        })
    }

    #[test]
    fn effects_come_and_go() {
        // Given
        let mut scenario = small();
        scenario.setup().unwrap();
        assert_eq!(scenario.affected(), 0);
        assert_eq!(scenario.crowded(), 0);

        // When
        for _ in 0..30 {
            scenario.update().unwrap();
        }

        // Then
        assert!(scenario.affected() > 0);
        assert!(scenario.affected() < 1_000);
        assert!(scenario.damage() > 0);
        assert_eq!(scenario.entity_count(), 1_000);
        assert!(scenario.world().events().is_empty());
    }

    #[test]
    fn tallies_agree_with_components() {
        // Given
        let mut scenario = small();
        scenario.setup().unwrap();

        // When
        for _ in 0..10 {
            scenario.update().unwrap();
        }

        // Then
        let world = scenario.world();
        let affected = world
            .entities()
            .filter(|&e| world.has::<Burning>(e) || world.has::<Frozen>(e))
            .count();
        assert_eq!(scenario.affected(), affected);
        // Burning and Frozen never coexist, so the only crowded entities are affected ones
        assert_eq!(scenario.crowded(), affected);
    }

    #[test]
    fn teardown_empties_every_query() {
        let mut scenario = small();
        scenario.setup().unwrap();
        scenario.update().unwrap();
        scenario.teardown();
        assert!(scenario.world().is_empty());
        assert_eq!(scenario.affected(), 0);
        assert_eq!(scenario.crowded(), 0);
    }
}
