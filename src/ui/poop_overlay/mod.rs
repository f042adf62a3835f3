// src/ui/poop_overlay/mod.rs
//
// Full-screen splatter shown to a player a birb has just pooped on.
//
// - Spawns from a `Pooping` RPC addressed to this client
// - Two randomly placed decals, faded out over the overlay lifetime
// - Reuses an existing overlay root, or creates and later removes its own

pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::PoopOverlayPlugin;
