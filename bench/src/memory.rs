//! Heap profiling for the benchmark scenarios, backed by dhat.
//!
//! Profiling is compiled in only with the `memory_profiling` feature:
//!
//! ```bash
//! cargo bench -p tickwork_bench --features memory_profiling
//! ```
//!
//! The heap profile is written to `dhat-heap.json`, which can be loaded into
//! <https://nnethercote.github.io/dh_view/dh_view.html>.

use std::fmt;

/// Heap usage observed while profiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub bytes_allocated: u64,
    pub allocations: u64,
    pub peak_bytes: u64,
}

impl MemoryStats {
    /// Bytes allocated per entity, zero for an empty population.
    pub fn bytes_per_entity(&self, entities: usize) -> f64 {
        per_entity(self.bytes_allocated, entities)
    }

    pub fn allocations_per_entity(&self, entities: usize) -> f64 {
        per_entity(self.allocations, entities)
    }
}

fn per_entity(value: u64, entities: usize) -> f64 {
    if entities == 0 {
        0.0
    } else {
        value as f64 / entities as f64
    }
}

impl fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "allocated: {} bytes ({} allocs), peak: {} bytes",
            self.bytes_allocated, self.allocations, self.peak_bytes
        )
    }
}

/// An active heap profile. Only one may exist at a time.
pub struct Profiler {
    #[cfg(feature = "memory_profiling")]
    _inner: dhat::Profiler,
}

impl Profiler {
    pub fn start() -> Self {
        Self {
            #[cfg(feature = "memory_profiling")]
            _inner: dhat::Profiler::new_heap(),
        }
    }

    /// Stop profiling. Without the `memory_profiling` feature the stats are all zero.
    pub fn finish(self) -> MemoryStats {
        #[cfg(feature = "memory_profiling")]
        {
            let stats = dhat::HeapStats::get();
            MemoryStats {
                bytes_allocated: stats.total_bytes,
                allocations: stats.total_blocks,
                peak_bytes: stats.max_bytes as u64,
            }
        }
        #[cfg(not(feature = "memory_profiling"))]
        MemoryStats::default()
    }
}

/// Run `f` under a heap profile.
pub fn measure<F, R>(f: F) -> (R, MemoryStats)
where
    F: FnOnce() -> R,
{
    let profiler = Profiler::start();
    let result = f();
    (result, profiler.finish())
}
