// src/ui/poop_overlay/components.rs
//
// Overlay components and the decal layout roll.

use bevy::prelude::*;
use rand::Rng;

use crate::core::rng::GameRng;

/// Highest z-order a decal may roll.
pub const MAX_DECAL_ORDER: i32 = 999_999;

/// Full-screen UI root overlays are parented to.
#[derive(Component, Debug, Default)]
pub struct OverlayRoot;

/// Root made for a single overlay. Never shared with later overlays.
#[derive(Component, Debug, Default)]
pub struct TemporaryOverlayRoot;

/// One splatter overlay and the timer that fades it out.
#[derive(Component, Debug)]
pub struct PoopOverlay {
    lifetime: Timer,
    /// Root created just for this overlay, removed together with it.
    pub temporary_root: Option<Entity>,
}

impl PoopOverlay {
    pub fn new(lifetime_secs: f32, temporary_root: Option<Entity>) -> Self {
        Self {
            lifetime: Timer::from_seconds(lifetime_secs, TimerMode::Once),
            temporary_root,
        }
    }

    pub fn tick(&mut self, delta: std::time::Duration) {
        self.lifetime.tick(delta);
    }

    pub fn is_finished(&self) -> bool {
        self.lifetime.is_finished()
    }

    /// Fully opaque until the last second, then linear to zero.
    pub fn opacity(&self) -> f32 {
        self.lifetime.remaining_secs().clamp(0.0, 1.0)
    }
}

/// A decal inside an overlay.
#[derive(Component, Debug)]
pub struct PoopDecal {
    pub overlay: Entity,
    pub base_opacity: f32,
}

/// Ranges a decal is rolled from. Sizes and offsets are screen fractions.
#[derive(Debug, Clone, Copy)]
pub struct DecalStyle {
    pub texture: &'static str,
    pub opacity: (f32, f32),
    pub size: (f32, f32),
}

pub const BIG_SPLAT: DecalStyle = DecalStyle {
    texture: "textures/birb_poop/poop2.png",
    opacity: (0.7, 0.9),
    size: (0.6, 0.9),
};

pub const SMALL_SPLAT: DecalStyle = DecalStyle {
    texture: "textures/birb_poop/poop1.png",
    opacity: (0.4, 0.7),
    size: (0.4, 0.7),
};

/// Concrete placement for one decal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecalLayout {
    pub opacity: f32,
    pub size: f32,
    pub left: f32,
    pub top: f32,
    pub order: i32,
}

impl DecalStyle {
    pub fn roll(&self, rng: &mut GameRng) -> DecalLayout {
        DecalLayout {
            opacity: rng.range_f32(self.opacity.0, self.opacity.1),
            size: rng.range_f32(self.size.0, self.size.1),
            left: rng.range_f32(0.0, 0.7),
            top: rng.range_f32(0.0, 0.7),
            order: rng.rng().gen_range(0..MAX_DECAL_ORDER),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn rolls_stay_in_range() {
        let mut rng = GameRng::from_seed(Some(8));
        for _ in 0..100 {
            let big = BIG_SPLAT.roll(&mut rng);
            assert!((0.7..=0.9).contains(&big.opacity));
            assert!((0.6..=0.9).contains(&big.size));
            assert!((0.0..=0.7).contains(&big.left));
            assert!((0.0..=0.7).contains(&big.top));
            assert!((0..MAX_DECAL_ORDER).contains(&big.order));

            let small = SMALL_SPLAT.roll(&mut rng);
            assert!((0.4..=0.7).contains(&small.opacity));
            assert!((0.4..=0.7).contains(&small.size));
        }
    }

    #[test]
    fn overlay_fades_over_last_second() {
        let mut overlay = PoopOverlay::new(5.0, None);
        assert_eq!(overlay.opacity(), 1.0);

        overlay.tick(Duration::from_secs_f32(4.5));
        assert!((overlay.opacity() - 0.5).abs() < 1e-4);
        assert!(!overlay.is_finished());

        overlay.tick(Duration::from_secs_f32(1.0));
        assert_eq!(overlay.opacity(), 0.0);
        assert!(overlay.is_finished());
    }
}
