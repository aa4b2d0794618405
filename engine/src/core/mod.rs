//! Host facing utilities that sit next to the ECS.

pub mod log;
