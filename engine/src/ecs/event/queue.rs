use std::any::{Any, TypeId};

use crate::ecs::{event::Event, schedule::phase};

/// One queued event with its routing information.
pub(crate) struct Pending {
    /// The phase the event is addressed to, or `None` for the first subscribing phase.
    pub phase: Option<phase::Name>,
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub payload: Box<dyn Any + Send + Sync>,
}

/// The world's pending events, in emission order.
pub struct Queue {
    pending: Vec<Pending>,
}

impl Default for Queue {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl Queue {
    /// Create an empty queue with room for `capacity` events before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
        }
    }

    /// Queue an event for the first phase with a listener for `E`.
    pub fn emit<E: Event>(&mut self, event: E) {
        self.push(None, event);
    }

    /// Queue an event for the listeners of `phase` only.
    pub fn emit_to<E: Event>(&mut self, phase: impl Into<phase::Name>, event: E) {
        self.push(Some(phase.into()), event);
    }

    /// The number of queued events.
    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The number of queued events of type `E`.
    pub fn count<E: Event>(&self) -> usize {
        let type_id = TypeId::of::<E>();
        self.pending.iter().filter(|p| p.type_id == type_id).count()
    }

    /// Iterate the queued events of type `E` in emission order.
    pub fn iter<E: Event>(&self) -> impl Iterator<Item = &E> + '_ {
        self.pending
            .iter()
            .filter_map(|pending| pending.payload.downcast_ref::<E>())
    }

    /// Discard every queued event.
    #[inline]
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Take the queued events out, leaving the queue empty for events emitted meanwhile.
    #[inline]
    pub(crate) fn take(&mut self) -> Vec<Pending> {
        std::mem::take(&mut self.pending)
    }

    /// Put back the undelivered part of a snapshot, ahead of the events emitted since it was
    /// taken.
    pub(crate) fn restore(&mut self, mut snapshot: Vec<Pending>) {
        snapshot.append(&mut self.pending);
        self.pending = snapshot;
    }

    fn push<E: Event>(&mut self, phase: Option<phase::Name>, event: E) {
        self.pending.push(Pending {
            phase,
            type_id: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
            payload: Box::new(event),
        });
    }
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.pending.iter().map(|p| (p.type_name, &p.phase)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use tickwork_macros::Event;

    use super::*;

    #[derive(Event, Debug, PartialEq)]
    struct Ping(u32);

    #[derive(Event)]
    struct Pong;

    #[test]
    fn emit_keeps_order_per_type() {
        // Given
        let mut queue = Queue::with_capacity(4);

        // When
        queue.emit(Ping(1));
        queue.emit(Pong);
        queue.emit_to("render", Ping(2));

        // Then
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.count::<Ping>(), 2);
        assert_eq!(queue.iter::<Ping>().collect::<Vec<_>>(), vec![&Ping(1), &Ping(2)]);
    }

    #[test]
    fn restore_puts_snapshot_first() {
        // Given
        let mut queue = Queue::default();
        queue.emit(Ping(1));
        let snapshot = queue.take();

        // When - emitted while the snapshot was out
        queue.emit(Ping(2));
        queue.restore(snapshot);

        // Then
        assert_eq!(queue.iter::<Ping>().collect::<Vec<_>>(), vec![&Ping(1), &Ping(2)]);

        // When
        queue.clear();

        // Then
        assert!(queue.is_empty());
    }
}
