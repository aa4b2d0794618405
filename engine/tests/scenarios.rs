//! End to end behavior of a world driven by a schedule.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    sync::{Arc, Mutex},
};

use tickwork::{
    Component, Event, define_phase,
    ecs::{
        self, Bitmask, Clock, Entity, Error, Filter, Options, Schedule, State, Tick, World,
        component, schedule::Sequence, time::SIXTY_FPS,
    },
};

#[derive(Component, Debug, Clone, Copy, PartialEq)]
struct Position(f32);

#[derive(Component, Debug, Clone, Copy, PartialEq)]
struct Velocity(f32);

#[derive(Component, Debug, Default)]
struct Frozen;

#[derive(Event, Debug, Clone, PartialEq)]
struct Hit(u32);

define_phase!(Input, Logic, Events, Render, Cleanup);

type Log = Rc<RefCell<Vec<String>>>;

fn run(schedule: &mut Schedule, world: &mut World) {
    schedule.run(world, Tick::default()).unwrap();
}

#[test]
fn bitmask_laws() {
    // Given
    let ids = |raw: &[u32]| raw.iter().copied().map(component::Id::new).collect::<Vec<_>>();
    let small = Bitmask::from_ids(&ids(&[1, 3]));
    let large = Bitmask::from_ids(&ids(&[1, 3, 200]));
    let empty = Bitmask::new();

    // Then: comparisons zero-extend the shorter mask
    assert!(large.contains(&small));
    assert!(!small.contains(&large));
    assert!(small.contains(&empty));
    assert!(small.intersects(&large));
    assert!(!small.intersects(&empty));
    assert!(!small.equals(&large));
    assert!(small.equals(&Bitmask::from_ids(&ids(&[3, 1]))));
    assert_eq!(large.count(), 3);
    assert_eq!(large.ones().collect::<Vec<_>>(), vec![1, 3, 200]);

    // When: bits are cleared beyond the shorter length
    let mut trimmed = large.clone();
    trimmed.clear(200);
    trimmed.clear(5_000);

    // Then
    assert!(trimmed.equals(&small));
    assert!(small.equals(&trimmed));
}

#[test]
fn component_ids_are_stable() {
    // Given
    let world = World::new();

    // When
    let position = world.register_component::<Position>();
    let velocity = world.register_component::<Velocity>();

    // Then
    assert_ne!(position, velocity);
    assert_eq!(world.register_component::<Position>(), position);
    assert_eq!(world.components().get::<Velocity>(), Some(velocity));
    assert_eq!(world.components().len(), 2);
}

#[test]
fn equal_filters_share_one_query() {
    // Given
    let mut world = World::new();

    // When
    let first = world.query(&Filter::new().all::<(Position, Velocity)>().none::<Frozen>());
    let second = world.query(&Filter::new().none::<Frozen>().all::<(Velocity, Position)>());
    let other = world.query(&Filter::new().all::<(Position, Velocity)>());

    // Then
    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(world.query_count(), 2);
}

#[test]
fn queries_follow_component_changes() {
    // Given
    let mut world = World::new();
    let moving = world.query(&Filter::new().all::<(Position, Velocity)>().none::<Frozen>());
    let entity = world.create_entity();
    let contains = |world: &World| world.query_results(moving).unwrap().contains(entity);

    // When / Then
    world.add(entity, Position(0.0)).unwrap();
    assert!(!contains(&world));
    world.add(entity, Velocity(1.0)).unwrap();
    assert!(contains(&world));
    world.add(entity, Frozen).unwrap();
    assert!(!contains(&world));
    world.remove::<Frozen>(entity);
    assert!(contains(&world));
    world.remove::<Position>(entity);
    assert!(!contains(&world));
}

#[test]
fn universal_query_counts_components() {
    // Given
    let mut world = World::new();
    let crowded = world.query(&Filter::new().min(2));
    let entity = world.create_entity();
    let contains = |world: &World| world.query_results(crowded).unwrap().contains(entity);

    // When / Then
    world.add(entity, Position(0.0)).unwrap();
    assert!(!contains(&world));
    world.add(entity, Frozen).unwrap();
    assert!(contains(&world));
    world.remove::<Position>(entity);
    assert!(!contains(&world));
}

#[test]
fn exact_component_sets_drive_systems() {
    // Given
    let mut world = World::new();
    let mut schedule = Schedule::new();
    let seen: Rc<RefCell<Vec<(&str, Entity)>>> = Rc::default();
    for (name, filter) in [
        ("only", Filter::new().only::<Position>()),
        ("different", Filter::new().different::<Position>()),
        ("bare", Filter::new().max(0)),
    ] {
        let record = Rc::clone(&seen);
        schedule
            .add_query_system(&mut world, &filter, Options::new().name(name), move |call| {
                record.borrow_mut().push((name, call.entity()));
                Ok(())
            })
            .unwrap();
    }
    let empty = world.create_entity();
    let still = world.create_entity();
    world.add(still, Position(0.0)).unwrap();
    let moving = world.create_entity();
    world.add(moving, Position(0.0)).unwrap();
    world.add(moving, Velocity(1.0)).unwrap();

    // When
    run(&mut schedule, &mut world);

    // Then
    assert_eq!(
        *seen.borrow(),
        vec![("only", still), ("different", empty), ("different", moving), ("bare", empty)]
    );

    // When: the moving entity stops
    seen.borrow_mut().clear();
    world.remove::<Velocity>(moving);
    run(&mut schedule, &mut world);

    // Then
    assert_eq!(
        *seen.borrow(),
        vec![("only", still), ("only", moving), ("different", empty), ("bare", empty)]
    );
}

#[test]
fn lifecycle_is_deferred_to_the_end_of_the_tick() {
    // Given
    let mut world = World::new();
    let mut schedule = Schedule::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let record = Rc::clone(&seen);
    schedule
        .add_system::<Position, _>(&mut world, Options::new(), move |call| {
            record.borrow_mut().push((call.entity(), call.state()));
            Ok(())
        })
        .unwrap();
    let entity = world.create_entity();
    world.add(entity, Position(0.0)).unwrap();
    assert_eq!(world.state(entity), State::Creating);

    // When
    run(&mut schedule, &mut world);

    // Then: the creating entity got its pass, then went live
    assert_eq!(*seen.borrow(), vec![(entity, State::Creating)]);
    assert_eq!(world.state(entity), State::Created);

    // When
    world.destroy(entity);

    // Then
    assert_eq!(world.state(entity), State::Destroying);
    run(&mut schedule, &mut world);
    assert_eq!(seen.borrow().last(), Some(&(entity, State::Destroying)));
    assert_eq!(world.state(entity), State::Destroyed);
    assert!(!world.contains(entity));
}

#[test]
fn destroying_the_current_entity_keeps_the_pass_intact() {
    // Given
    let mut world = World::new();
    let mut schedule = Schedule::new();
    let visited = Rc::new(Cell::new(0));
    let count = Rc::clone(&visited);
    schedule
        .add_system::<Position, _>(&mut world, Options::new(), |call| {
            call.destroy();
            Ok(())
        })
        .unwrap();
    schedule
        .add_system::<Position, _>(&mut world, Options::new(), move |call| {
            assert_eq!(call.state(), State::Destroying);
            assert!(call.has::<Position>());
            count.set(count.get() + 1);
            Ok(())
        })
        .unwrap();
    for i in 0..5 {
        let entity = world.create_entity();
        world.add(entity, Position(i as f32)).unwrap();
    }

    // When
    run(&mut schedule, &mut world);

    // Then
    assert_eq!(visited.get(), 5);
    assert!(world.is_empty());
}

#[test]
fn entities_created_mid_pass_wait_for_the_next_tick() {
    // Given
    let mut world = World::new();
    let mut schedule = Schedule::new();
    let visits = Rc::new(Cell::new(0));
    let count = Rc::clone(&visits);
    schedule
        .add_system::<Position, _>(&mut world, Options::new(), move |call| {
            count.set(count.get() + 1);
            let child = call.world_mut().create_entity();
            call.world_mut().add(child, Position(1.0))?;
            Ok(())
        })
        .unwrap();
    let root = world.create_entity();
    world.add(root, Position(0.0)).unwrap();

    // When
    run(&mut schedule, &mut world);

    // Then: the child joined the query but was not visited by the pass in progress
    assert_eq!(visits.get(), 1);
    assert_eq!(world.len(), 2);

    // When
    run(&mut schedule, &mut world);

    // Then
    assert_eq!(visits.get(), 3);
    assert_eq!(world.len(), 4);
}

#[test]
fn phases_run_in_the_configured_order() {
    // Given
    let mut world = World::new();
    let entity = world.create_entity();
    world.add(entity, Position(0.0)).unwrap();
    let mut schedule = Schedule::new();
    let log = Log::default();
    let phases: [(ecs::schedule::phase::Name, &str); 5] = [
        (Render.into(), "render"),
        (Cleanup.into(), "cleanup"),
        (Input.into(), "input"),
        (Events.into(), "events"),
        (Logic.into(), "logic"),
    ];
    for (phase, label) in phases {
        let log = Rc::clone(&log);
        schedule
            .add_system::<Position, _>(&mut world, Options::new().phase(phase).name(label), move |_| {
                log.borrow_mut().push(label.to_string());
                Ok(())
            })
            .unwrap();
    }

    // When
    schedule.set_phase_order(
        Sequence::new()
            .then(Input)
            .then(Logic)
            .then(Events)
            .then(Render)
            .then(Cleanup),
    );
    run(&mut schedule, &mut world);

    // Then
    assert_eq!(*log.borrow(), vec!["input", "logic", "events", "render", "cleanup"]);
}

#[test]
fn events_are_gated_by_phase() {
    // Given
    let mut world = World::new();
    let entity = world.create_entity();
    world.add(entity, Position(0.0)).unwrap();
    let mut schedule = Schedule::new();
    schedule.set_phase_order(Sequence::new().then(Logic).then(Events).then(Render));
    schedule
        .add_system::<Position, _>(&mut world, Options::new().phase(Logic), |call| {
            call.emit(Hit(7));
            Ok(())
        })
        .unwrap();
    let fired = Rc::new(RefCell::new(Vec::new()));
    let events = Rc::clone(&fired);
    schedule.add_listener(Events, move |_: &mut World, hit: &Hit| {
        events.borrow_mut().push(hit.clone());
        Ok(())
    });
    let rendered = Rc::new(Cell::new(0));
    let render = Rc::clone(&rendered);
    schedule.add_listener(Render, move |_: &mut World, _: &Hit| {
        render.set(render.get() + 1);
        Ok(())
    });

    // When
    run(&mut schedule, &mut world);

    // Then
    assert_eq!(*fired.borrow(), vec![Hit(7)]);
    assert_eq!(rendered.get(), 0);
    assert!(world.events().is_empty());
}

#[test]
fn addressed_events_reach_their_phase() {
    // Given
    let mut world = World::new();
    let mut schedule = Schedule::new();
    let fired = Rc::new(RefCell::new(Vec::new()));
    for phase in ["a", "b"] {
        let fired = Rc::clone(&fired);
        schedule.add_listener(phase, move |_: &mut World, hit: &Hit| {
            fired.borrow_mut().push((phase, hit.0));
            Ok(())
        });
    }
    world.events_mut().emit_to("b", Hit(1));
    world.events_mut().emit(Hit(2));

    // When
    run(&mut schedule, &mut world);

    // Then
    assert_eq!(*fired.borrow(), vec![("a", 2), ("b", 1)]);
}

#[test]
fn nothing_leaks_across_ticks() {
    // Given
    let mut world = World::new();
    let mut schedule = Schedule::new();
    schedule
        .add_system::<(Position, Velocity), _>(&mut world, Options::new().phase(Logic), |call| {
            let dt = call.dt().as_secs_f32();
            let velocity = call.get::<Velocity>()?.0;
            let position = call.get_mut::<Position>()?;
            position.0 += velocity * dt;
            if position.0 > 1.0 {
                call.emit(Hit(call.index() as u32));
                call.destroy();
            }
            Ok(())
        })
        .unwrap();
    schedule.add_listener(Cleanup, |world: &mut World, _: &Hit| {
        let entity = world.create_entity();
        world.add(entity, Position(0.0))?;
        world.add(entity, Velocity(10.0))
    });
    for i in 0..10_000 {
        let entity = world.create_entity();
        world.add(entity, Position(0.0)).unwrap();
        world.add(entity, Velocity(1.0 + (i % 50) as f32)).unwrap();
    }
    let mut clock = Clock::fixed(SIXTY_FPS);

    // When / Then
    for _ in 0..100 {
        schedule.run(&mut world, clock.next()).unwrap();
        assert!(world.events().is_empty());
        assert_eq!(world.pending(), (0, 0));
        assert_eq!(world.len(), 10_000);
    }
}

#[test]
fn mixing_phased_and_unphased_systems_fails() {
    // Given
    let mut world = World::new();
    let mut schedule = Schedule::new();
    schedule
        .add_system::<Position, _>(&mut world, Options::new().phase(Logic), |_| Ok(()))
        .unwrap();

    // When
    let result = schedule.add_system::<Position, _>(&mut world, Options::new().name("loose"), |_| Ok(()));

    // Then
    assert!(matches!(result, Err(Error::MixedPhases { ref system }) if system == "loose"));
}

#[test]
fn missing_component_aborts_the_tick() {
    // Given
    let mut world = World::new();
    let mut schedule = Schedule::new();
    schedule
        .add_system::<Position, _>(&mut world, Options::new().name("needs-velocity"), |call| {
            call.get::<Velocity>()?;
            Ok(())
        })
        .unwrap();
    let entity = world.create_entity();
    world.add(entity, Position(0.0)).unwrap();

    // When
    let result = schedule.run(&mut world, Tick::default());

    // Then
    match result {
        Err(Error::System { system, source }) => {
            assert_eq!(system, "needs-velocity");
            assert!(matches!(*source, Error::MissingComponent { entity: e, .. } if e == entity));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(world.state(entity), State::Creating);
}

/// Records every hook call into a shared journal.
struct Journal(Arc<Mutex<Vec<&'static str>>>);

impl ecs::Component for Journal {
    fn before_add(&mut self, _: Entity) {
        self.push("before_add");
    }

    fn after_add(&mut self, _: Entity) {
        self.push("after_add");
    }

    fn before_remove(&mut self, _: Entity) {
        self.push("before_remove");
    }

    fn after_remove(&mut self, _: Entity) {
        self.push("after_remove");
    }
}

impl Journal {
    fn push(&self, hook: &'static str) {
        if let Ok(mut journal) = self.0.lock() {
            journal.push(hook);
        }
    }
}

#[test]
fn hooks_run_around_every_mutation() {
    // Given
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut world = World::new();
    let mut schedule = Schedule::new();
    schedule.add_system::<Journal, _>(&mut world, Options::new(), |_| Ok(())).unwrap();
    let entity = world.create_entity();

    // When
    world.add(entity, Journal(Arc::clone(&journal))).unwrap();
    world.destroy(entity);
    assert_eq!(*journal.lock().unwrap(), vec!["before_add", "after_add"]);
    run(&mut schedule, &mut world);

    // Then: deferred destruction still runs the remove hooks
    assert_eq!(
        *journal.lock().unwrap(),
        vec!["before_add", "after_add", "before_remove", "after_remove"]
    );
}
