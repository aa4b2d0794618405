//! Phase scoped publish/subscribe between systems.
//!
//! # Overview
//!
//! Events are plain values. Systems and listeners emit them into the world's [`Queue`]; the
//! schedule drains the queue after each phase's systems have run, dispatching every queued event
//! to the [`Listeners`] registered for that phase.
//!
//! - **Unaddressed** events ([`Queue::emit`]) are claimed by the first phase, in run order, that
//!   has a listener for their type. Every listener of that phase sees the event once and the
//!   event is consumed, so later phases never see it.
//! - **Addressed** events ([`Queue::emit_to`]) are delivered to the listeners of the named phase
//!   only, and consumed there even if that phase has no listener for them.
//!
//! Each drain works on a snapshot of the queue: events emitted by a listener while the drain is
//! running wait for the next phase (or the next drain of the same phase in a later tick).
//! Whatever is still queued when the tick ends is discarded.
//!
//! ```text
//!  Logic system ──emit(Damage)──► Queue [Damage]
//!                                  │
//!  drain(Logic)   no Damage listener, keep
//!  drain(Events)  on_damage(..) ──► consumed
//!  drain(Render)  (nothing left)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use tickwork::ecs::Event;
//!
//! #[derive(Event)]
//! struct Damage { target: Entity, amount: u32 }
//!
//! schedule.add_listener::<Damage, _>(Events, |world, damage| {
//!     world.get_mut::<Health>(damage.target)?.0 -= damage.amount;
//!     Ok(())
//! });
//!
//! // Inside a system
//! call.emit(Damage { target, amount: 5 });
//! ```

mod listener;
mod queue;

pub use listener::Listeners;
pub use queue::Queue;

/// Marker trait for event types.
///
/// Events must be:
/// - `'static`: No borrowed data
/// - `Send + Sync`: Events are stored next to the world's other data
pub trait Event: 'static + Send + Sync {}
