use std::f32::consts::PI;

use super::SceneBounds;

/// The ring stack size is fixed; complexity does not apply.
pub const RING_COUNT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    pub index: usize,
    pub base_radius: f32,
    pub offset: glam::Vec2,
    pub scale: f32,
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RingStack {
    pub rings: Vec<Ring>,
    /// Vertical distance between neighbors at full expansion.
    pub spacing: f32,
    /// Ellipse height as a fraction of its width.
    pub tilt: f32,
}

pub fn build(bounds: &SceneBounds) -> RingStack {
    let radius = bounds.min_dim() * 0.3;
    let half = (RING_COUNT as f32 - 1.0) / 2.0;
    let rings = (0..RING_COUNT)
        .map(|index| {
            // Sphere profile: widest in the middle of the stack.
            let latitude = PI * (index as f32 + 0.5) / RING_COUNT as f32;
            Ring {
                index,
                base_radius: radius * (0.35 + 0.65 * latitude.sin()),
                offset: glam::Vec2::ZERO,
                scale: 1.0,
                rotation: 0.0,
            }
        })
        .collect();
    RingStack {
        rings,
        spacing: radius * 0.9 / half,
        tilt: 0.32,
    }
}

impl RingStack {
    /// Signed position of ring `index` in the stack, in [-1, 1].
    pub fn lane(index: usize) -> f32 {
        let half = (RING_COUNT as f32 - 1.0) / 2.0;
        (index as f32 - half) / half
    }
}
