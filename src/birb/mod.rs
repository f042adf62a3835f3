//! The Stubborn Birb: launch planning, flight state machine, damage and cues.
pub mod behaviour;
pub mod components;
pub mod config;
pub mod effects;
pub mod errors;
pub mod events;
pub mod plugin;
pub mod steering;
pub mod systems;
pub mod targeting;

pub use plugin::BirbPlugin;
