use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

use crate::ecs::{error::Error, event::Event, schedule::phase, world::World};

/// A type erased listener callback. The payload is downcast back to the listener's event type.
type Callback = Box<dyn FnMut(&mut World, &dyn Any) -> Result<(), Error>>;

struct Listener {
    callback: Callback,
}

/// Event subscriptions grouped by phase and event type.
#[derive(Default)]
pub struct Listeners {
    by_phase: HashMap<phase::Name, HashMap<TypeId, Vec<Listener>>>,
    count: usize,
}

impl Listeners {
    /// Create an empty listener registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `callback` to events of type `E` delivered to `phase`. Listeners of one phase
    /// and type are called in subscription order.
    pub fn add<E, F>(&mut self, phase: phase::Name, mut callback: F)
    where
        E: Event,
        F: FnMut(&mut World, &E) -> Result<(), Error> + 'static,
    {
        let callback: Callback = Box::new(move |world, payload| match payload.downcast_ref::<E>() {
            Some(event) => callback(world, event),
            None => Ok(()),
        });

        self.by_phase
            .entry(phase)
            .or_default()
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Listener { callback });
        self.count += 1;
    }

    /// The total number of subscriptions.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if nothing is subscribed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if `phase` has a listener for `E`.
    pub fn has<E: Event>(&self, phase: &phase::Name) -> bool {
        self.by_phase
            .get(phase)
            .is_some_and(|types| types.contains_key(&TypeId::of::<E>()))
    }

    /// Deliver the queued events that belong to `phase`.
    ///
    /// Works on a snapshot of the world's queue. A snapshotted event belongs to `phase` if it was
    /// addressed to it, or if it is unaddressed and `phase` has a listener for its type. Those
    /// events are passed to each matching listener and consumed; the rest stay queued ahead of
    /// anything emitted during the drain.
    ///
    /// The first listener error stops delivery and is returned; undelivered events stay queued.
    pub fn process_phase(&mut self, phase: &phase::Name, world: &mut World) -> Result<(), Error> {
        let mut snapshot = world.events_mut().take();
        if snapshot.is_empty() {
            world.events_mut().restore(snapshot);
            return Ok(());
        }

        let mut subscribed = self.by_phase.get_mut(phase);
        let mut failure = None;

        snapshot.retain(|event| {
            if failure.is_some() {
                return true;
            }
            let listeners = subscribed
                .as_deref_mut()
                .and_then(|types| types.get_mut(&event.type_id));
            match &event.phase {
                Some(target) if target != phase => return true,
                None if listeners.is_none() => return true,
                _ => {}
            }

            for listener in listeners.into_iter().flatten() {
                if let Err(source) = (listener.callback)(world, event.payload.as_ref()) {
                    log::error!("listener for `{}` in phase `{phase}` failed: {source}", event.type_name);
                    failure = Some(Error::Listener {
                        event: event.type_name,
                        source: Box::new(source),
                    });
                    break;
                }
            }
            false
        });

        world.events_mut().restore(snapshot);
        failure.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("phases", &self.by_phase.keys().collect::<Vec<_>>())
            .field("count", &self.count)
            .finish()
    }
}
