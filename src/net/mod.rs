//! Network identity, ownership and the RPC channel birbs talk through.
pub mod messages;
pub mod plugin;
pub mod systems;

pub use plugin::NetPlugin;
