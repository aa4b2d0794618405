//! Log capture for hosts and tests.
//!
//! The crate logs through the [`log`](::log) facade: `debug!` when queries, systems, listeners
//! and phase orders are registered, `trace!` with the lifecycle counts of every tick and
//! `error!` when a system or listener fails. Any `log` backend can display those records;
//! [`ChannelLogger`] forwards them over a channel instead, so a host UI or a test can consume
//! them.

mod channel;

pub use channel::{ChannelLogger, LogMessage};
