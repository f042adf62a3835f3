//! Scene tags, line-of-sight traces and the demo world.
pub mod components;
pub mod plugin;
pub mod systems;
pub mod trace;

pub use plugin::WorldPlugin;
