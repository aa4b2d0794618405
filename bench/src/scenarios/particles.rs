//! Particle churn.
//!
//! A steady population of short lived particles:
//!
//! - `Update` moves particles, decays their lifetime, fades their color and destroys the expired
//!   ones, emitting an [`Expired`] event for each
//! - `Respawn` has no system, only a listener that replaces every expired particle with a fresh
//!   one at the spot where it died
//!
//! Every tick therefore exercises iteration, deferred destruction, deferred creation, query
//! reindexing of new entities and event routing across phases.

use std::{cell::Cell, rc::Rc};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tickwork::{
    define_phase,
    ecs::{
        Clock, Entity, Error, Filter, Options, Schedule, World, schedule::phase::Name,
        time::SIXTY_FPS,
    },
};

use crate::{
    components::{Color, Expired, Frozen, Lifetime, Position, Velocity},
    scenarios::Scenario,
};

define_phase!(Update, Respawn);

pub struct ParticleConfig {
    /// Size of the population kept alive.
    pub particle_count: usize,
    /// Fixed clock step in nanoseconds.
    pub step: u64,
    pub seed: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            particle_count: 100_000,
            step: SIXTY_FPS,
            seed: 12345,
        }
    }
}

/// Produces particles with random motion, lifetime and color.
struct Factory(ChaCha8Rng);

impl Factory {
    fn new(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    fn spawn(&mut self, world: &mut World, at: Position) -> Result<Entity, Error> {
        let rng = &mut self.0;
        let entity = world.create_entity();
        world.add(entity, at)?;
        world.add(
            entity,
            Velocity::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)),
        )?;
        world.add(entity, Lifetime::new(rng.gen_range(0.1..2.0)))?;
        world.add(
            entity,
            Color {
                r: rng.r#gen(),
                g: rng.r#gen(),
                b: rng.r#gen(),
                a: u8::MAX,
            },
        )?;
        Ok(entity)
    }

    fn spawn_anywhere(&mut self, world: &mut World) -> Result<Entity, Error> {
        let at = Position::new(self.0.gen_range(-100.0..100.0), self.0.gen_range(-100.0..100.0));
        self.spawn(world, at)
    }
}

pub struct ParticleScenario {
    config: ParticleConfig,
    world: World,
    schedule: Schedule,
    clock: Clock,
    expired: Rc<Cell<usize>>,
}

impl ParticleScenario {
    pub fn new() -> Self {
        Self::with_config(ParticleConfig::default())
    }

    pub fn with_config(config: ParticleConfig) -> Self {
        let clock = Clock::fixed(config.step);
        Self {
            config,
            world: World::new(),
            schedule: Schedule::new(),
            clock,
            expired: Rc::default(),
        }
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The number of particles that expired during the last update.
    #[inline]
    pub fn expired(&self) -> usize {
        self.expired.get()
    }

    fn build_schedule(&mut self) -> Result<(), Error> {
        let world = &mut self.world;
        let schedule = &mut self.schedule;
        schedule.set_phase_order([Name::from(Update), Name::from(Respawn)]);

        schedule.add_query_system(
            world,
            &Filter::new().all::<(Position, Velocity)>().none::<Frozen>(),
            Options::new().phase(Update).name("movement"),
            |call| {
                let dt = call.dt().as_secs_f32();
                let velocity = *call.get::<Velocity>()?;
                let position = call.get_mut::<Position>()?;
                position.x += velocity.x * dt;
                position.y += velocity.y * dt;
                Ok(())
            },
        )?;

        schedule.add_system::<(Lifetime, Position), _>(
            world,
            Options::new().phase(Update).name("lifetime"),
            |call| {
                let dt = call.dt().as_secs_f32();
                let lifetime = call.get_mut::<Lifetime>()?;
                lifetime.remaining -= dt;
                if lifetime.remaining <= 0.0 {
                    let at = *call.get::<Position>()?;
                    call.emit(Expired { x: at.x, y: at.y });
                    call.destroy();
                }
                Ok(())
            },
        )?;

        schedule.add_system::<(Lifetime, Color), _>(
            world,
            Options::new().phase(Update).name("fade"),
            |call| {
                let fraction = call.get::<Lifetime>()?.fraction();
                call.get_mut::<Color>()?.a = (fraction * f32::from(u8::MAX)) as u8;
                Ok(())
            },
        )?;

        let mut factory = Factory::new(self.config.seed.wrapping_add(1));
        let counter = Rc::clone(&self.expired);
        schedule.add_listener(Respawn, move |world: &mut World, expired: &Expired| {
            counter.set(counter.get() + 1);
            factory.spawn(world, Position::new(expired.x, expired.y))?;
            Ok(())
        });
        Ok(())
    }
}

impl Default for ParticleScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for ParticleScenario {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn description(&self) -> &'static str {
        "short lived particles destroyed and respawned every tick"
    }

    fn entity_count(&self) -> usize {
        self.world.len()
    }

    fn setup(&mut self) -> Result<(), Error> {
        self.build_schedule()?;
        let mut factory = Factory::new(self.config.seed);
        for _ in 0..self.config.particle_count {
            factory.spawn_anywhere(&mut self.world)?;
        }
        // Promote the initial population before the first measured tick
        self.world.finish_creation();
        Ok(())
    }

    fn update(&mut self) -> Result<(), Error> {
        let tick = self.clock.next();
        self.expired.set(0);
        self.schedule.run(&mut self.world, tick)
    }

    fn teardown(&mut self) {
        let entities: Vec<_> = self.world.entities().collect();
        for entity in entities {
            self.world.destroy_immediately(entity);
        }
    }
}
