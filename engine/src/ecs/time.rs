use std::time::{Duration, Instant};

pub const SIXTY_FPS: u64 = 16_666_666;
pub const ONE_FPS: u64 = 1_000_000_000;

/// The timing of one tick, passed to [`Schedule::run`](crate::ecs::Schedule::run) and exposed to
/// every system call.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Tick {
    /// The time delta since the last tick.
    pub dt: Duration,
    /// The total elapsed time since the first tick.
    pub time: Duration,
}

impl Tick {
    #[inline]
    pub const fn new(dt: Duration, time: Duration) -> Self {
        Self { dt, time }
    }
}

/// A Clock produces successive [`Tick`]s, either from wall time or from a fixed step.
///
/// A wall clock measures the delta since the previous tick on every call to
/// [`next`](Self::next). A fixed clock advances by exactly its step, which makes runs
/// reproducible (tests, replays, headless simulation).
#[derive(Debug, Copy, Clone)]
pub struct Clock {
    // The instant the previous tick was produced
    instant: Instant,
    /// The step of a fixed clock in nanoseconds, `None` for a wall clock.
    fixed_step: Option<u64>,
    /// The total elapsed time
    time: Duration,
    /// Wall time accumulated towards the next fixed step, see [`has_fixed`](Self::has_fixed).
    accumulator: u64,
}

impl Clock {
    /// Construct a clock measuring wall time, starting now.
    pub fn new() -> Self {
        Self {
            instant: Instant::now(),
            fixed_step: None,
            time: Duration::ZERO,
            accumulator: 0,
        }
    }

    /// Construct a clock advancing by `step` nanoseconds per tick.
    pub fn fixed(step: u64) -> Self {
        Self {
            fixed_step: Some(step),
            ..Self::new()
        }
    }

    /// Produce the next tick, capturing the delta since the previous one and updating the
    /// cumulative time.
    pub fn next(&mut self) -> Tick {
        let dt = match self.fixed_step {
            Some(step) => Duration::from_nanos(step),
            None => {
                let delta = self.instant.elapsed();
                self.instant = Instant::now();
                self.accumulator += delta.as_nanos() as u64;
                delta
            }
        };
        self.time += dt;
        Tick::new(dt, self.time)
    }

    /// Determine whether a wall clock has accumulated at least `step` nanoseconds since the last
    /// [`consume_fixed`](Self::consume_fixed), for hosts mixing variable and fixed updates.
    pub fn has_fixed(&self, step: u64) -> bool {
        self.accumulator >= step
    }

    /// Consume one fixed step from the accumulator.
    pub fn consume_fixed(&mut self, step: u64) {
        self.accumulator = self.accumulator.saturating_sub(step);
    }

    /// The total elapsed time.
    #[inline]
    pub fn time(&self) -> Duration {
        self.time
    }

    /// Reset the clock to now with zeroed accumulator. This is useful for situations where the
    /// simulation is paused and resumed.
    pub fn reset_now(&mut self) {
        self.instant = Instant::now();
        self.accumulator = 0;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
