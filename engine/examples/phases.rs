//! A tiny arena: drones drift around, take damage when they leave the arena, and are replaced
//! when they break. Run with `cargo run --example phases`.
//!
//! Shows phased systems, cross-phase events, deferred creation and destruction, tags, and the
//! channel logger.

use std::{cell::Cell, rc::Rc};

use log::LevelFilter;
use tickwork::{
    Component, Event,
    core::log::ChannelLogger,
    define_phase,
    ecs::{Clock, Error, Filter, Options, Schedule, World, schedule::Sequence, time::SIXTY_FPS},
};

#[derive(Component, Debug, Clone, Copy)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Component, Debug, Clone, Copy)]
struct Velocity {
    x: f32,
    y: f32,
}

#[derive(Component, Debug)]
struct Hull(i32);

/// Drones outside the arena carry this until they fly back in.
#[derive(Component, Debug)]
struct OutOfBounds;

#[derive(Event, Debug)]
struct Broken {
    x: f32,
    y: f32,
}

define_phase!(Input, Logic, Events, Render);

const ARENA: f32 = 10.0;
const TICKS: usize = 240;

fn spawn(world: &mut World, x: f32, y: f32, seed: u32) -> Result<(), Error> {
    let angle = seed as f32 * 2.399;
    let entity = world.create_entity();
    world.add(entity, Position { x, y })?;
    world.add(
        entity,
        Velocity {
            x: angle.cos() * 4.0,
            y: angle.sin() * 4.0,
        },
    )?;
    world.add(entity, Hull(30))?;
    world.add_tag(entity, "drone")
}

fn main() -> Result<(), Error> {
    let (logger, records) = ChannelLogger::with_receiver(LevelFilter::Debug);
    if logger.install().is_err() {
        eprintln!("a logger is already installed");
    }

    let mut world = World::new();
    let mut schedule = Schedule::new();
    schedule.set_phase_order(Sequence::new().then(Input).then(Logic).then(Events).then(Render));

    // Logic: move, then flag drones outside the arena
    schedule.add_system::<(Position, Velocity), _>(&mut world, Options::new().phase(Logic).name("move"), |call| {
        let dt = call.dt().as_secs_f32();
        let velocity = *call.get::<Velocity>()?;
        let position = call.get_mut::<Position>()?;
        position.x += velocity.x * dt;
        position.y += velocity.y * dt;
        let outside = position.x.abs() > ARENA || position.y.abs() > ARENA;
        match (outside, call.has::<OutOfBounds>()) {
            (true, false) => call.add(OutOfBounds)?,
            (false, true) => {
                call.remove::<OutOfBounds>();
            }
            _ => {}
        }
        Ok(())
    })?;

    // Logic: drones out of bounds wear down, turn around and eventually break
    schedule.add_system::<(Hull, OutOfBounds), _>(&mut world, Options::new().phase(Logic).name("wear"), |call| {
        let hull = call.get_mut::<Hull>()?;
        hull.0 -= 1;
        if hull.0 <= 0 {
            let at = *call.get::<Position>()?;
            call.emit(Broken { x: at.x, y: at.y });
            call.destroy();
        } else {
            let velocity = call.get_mut::<Velocity>()?;
            velocity.x = -velocity.x;
            velocity.y = -velocity.y;
        }
        Ok(())
    })?;

    // Events: replace every broken drone with a new one at the center
    let spawned = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&spawned);
    schedule.add_listener(Events, move |world: &mut World, broken: &Broken| {
        counter.set(counter.get() + 1);
        println!("drone broke at ({:.1}, {:.1}), launching a new one", broken.x, broken.y);
        spawn(world, 0.0, 0.0, 100 + counter.get())
    });

    // Render: one summary line per second, on the last entity of the pass
    let everything = Filter::new().all::<Position>();
    schedule.add_query_system(&mut world, &everything, Options::new().phase(Render).name("report"), |call| {
        if call.is_last() && call.tick().time.as_millis() % 1000 < 17 {
            let outside = call
                .world()
                .entities()
                .filter(|&e| call.world().has::<OutOfBounds>(e))
                .count();
            println!(
                "t={:>5.2}s drones={} outside={}",
                call.time().as_secs_f32(),
                call.total(),
                outside
            );
        }
        Ok(())
    })?;

    // Input: nothing to read in a headless demo, the phase only holds the order
    schedule.add_system::<Hull, _>(&mut world, Options::new().phase(Input).name("input"), |_| Ok(()))?;

    for i in 0..12 {
        spawn(&mut world, 0.0, 0.0, i)?;
    }

    let mut clock = Clock::fixed(SIXTY_FPS);
    for _ in 0..TICKS {
        schedule.run(&mut world, clock.next())?;
    }

    println!("{} drones alive, {} replaced", world.len(), spawned.get());
    for record in records.try_iter().take(12) {
        println!("[{}] {}: {}", record.level, record.target, record.message);
    }
    Ok(())
}
