//! Core module hosting the simulation clock and shared randomness.
pub mod plugin;
pub mod rng;

pub use plugin::CorePlugin;
