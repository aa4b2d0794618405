//! Tick timing: run a schedule for a number of ticks and summarize how long each one took.

use std::{
    fmt,
    time::{Duration, Instant},
};

use tickwork::ecs::{Clock, Error, Schedule, World};

/// Summary of a series of measured ticks.
#[derive(Debug, Clone, Default)]
pub struct TickStats {
    /// Sorted tick durations.
    samples: Vec<Duration>,
    total: Duration,
}

impl TickStats {
    pub fn from_samples(mut samples: Vec<Duration>) -> Self {
        samples.sort_unstable();
        let total = samples.iter().sum();
        Self { samples, total }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn min(&self) -> Duration {
        self.samples.first().copied().unwrap_or_default()
    }

    pub fn max(&self) -> Duration {
        self.samples.last().copied().unwrap_or_default()
    }

    pub fn average(&self) -> Duration {
        match u32::try_from(self.samples.len()) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(count) => self.total / count,
        }
    }

    /// The `p`th percentile, `p` clamped to `0..=100`.
    pub fn percentile(&self, p: usize) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let index = (self.samples.len() * p.min(100) / 100).min(self.samples.len() - 1);
        self.samples[index]
    }

    #[inline]
    pub fn median(&self) -> Duration {
        self.percentile(50)
    }

    #[inline]
    pub fn p99(&self) -> Duration {
        self.percentile(99)
    }

    /// Ticks per second at the average tick duration.
    pub fn rate(&self) -> f64 {
        let average = self.average();
        if average.is_zero() {
            0.0
        } else {
            1.0 / average.as_secs_f64()
        }
    }
}

impl fmt::Display for TickStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = |d: Duration| d.as_secs_f64() * 1000.0;
        write!(
            f,
            "{} ticks, avg: {:.3}ms ({:.1}/s), median: {:.3}ms, p99: {:.3}ms, max: {:.3}ms",
            self.count(),
            ms(self.average()),
            self.rate(),
            ms(self.median()),
            ms(self.p99()),
            ms(self.max()),
        )
    }
}

/// Run `ticks` ticks of `schedule` against `world`, with tick timing taken from `clock`, and
/// measure the wall time of each run.
pub fn measure_ticks(
    schedule: &mut Schedule,
    world: &mut World,
    clock: &mut Clock,
    ticks: usize,
) -> Result<TickStats, Error> {
    let mut samples = Vec::with_capacity(ticks);
    for _ in 0..ticks {
        let tick = clock.next();
        let start = Instant::now();
        schedule.run(world, tick)?;
        samples.push(start.elapsed());
    }
    Ok(TickStats::from_samples(samples))
}
