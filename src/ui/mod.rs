// src/ui/mod.rs
//
// Screen-space UI. Currently only the overlay a birb leaves behind.

pub mod poop_overlay;

pub use poop_overlay::PoopOverlayPlugin;
