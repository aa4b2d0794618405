//! Benchmarks for tickwork.
//!
//! - **Micro benchmarks** (`benches/ecs_micro.rs`): entity creation, component churn and the
//!   query reindexing it triggers, system passes, deferred lifecycle flushes
//! - **Scenarios** (`benches/ecs_scenarios.rs`): whole ticks of the workloads in [`scenarios`]
//! - **Heap profiling** through dhat, see [`memory`]
//! - **Tick timing** summaries, see [`frame_timer`]
//!
//! ```bash
//! cargo bench -p tickwork_bench
//! cargo bench -p tickwork_bench -- reindex
//! cargo bench -p tickwork_bench --features memory_profiling
//! ```
//!
//! Criterion writes its reports to `target/criterion/`.

pub mod components;
pub mod frame_timer;
pub mod memory;
pub mod scenarios;
