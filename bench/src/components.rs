//! Components shared by the benchmark scenarios.
//!
//! They are deliberately small and plain so that the measurements track the cost of the world's
//! bookkeeping (query reindexing, deferred lifecycle, event routing) rather than user logic.

use tickwork::{Component, Event};

#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Remaining lifetime in seconds.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    pub remaining: f32,
    pub initial: f32,
}

impl Lifetime {
    pub const fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds,
            initial: seconds,
        }
    }

    /// Fraction of the lifetime still left, in `0.0..=1.0`.
    #[inline]
    pub fn fraction(&self) -> f32 {
        if self.initial <= 0.0 {
            0.0
        } else {
            (self.remaining / self.initial).clamp(0.0, 1.0)
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub const fn new(max: i32) -> Self {
        Self { current: max, max }
    }
}

/// Marker carried by entities that are temporarily excluded from movement.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Frozen;

/// Marker toggled on entities taking damage over time.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Burning;

/// Emitted when a particle expires.
#[derive(Event, Debug, Clone, Copy)]
pub struct Expired {
    pub x: f32,
    pub y: f32,
}

/// Emitted when a burning entity loses health.
#[derive(Event, Debug, Clone, Copy)]
pub struct Damaged {
    pub amount: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifetime_fraction() {
        let mut lifetime = Lifetime::new(2.0);
        assert_eq!(lifetime.fraction(), 1.0);
        lifetime.remaining = 0.5;
        assert_eq!(lifetime.fraction(), 0.25);
        lifetime.remaining = -1.0;
        assert_eq!(lifetime.fraction(), 0.0);
        assert_eq!(Lifetime::new(0.0).fraction(), 0.0);
    }
}
