use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::SceneBounds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    pub anchor: Vec2,
    pub base_radius: f32,
    pub max_radius: f32,
    pub wobble_frequency: f32,
    pub wobble_phase: f32,
    /// Blend between the primary (0) and secondary (1) colors.
    pub color_mix: f32,
    pub position: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FluidPool {
    pub blobs: Vec<Blob>,
    pub time: f32,
    pub wobble: f32,
}

pub fn build<R: Rng + ?Sized>(bounds: &SceneBounds, complexity: u32, rng: &mut R) -> FluidPool {
    let count = (complexity as usize / 10).max(3);
    let min_dim = bounds.min_dim();
    let blobs = (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * TAU + rng.gen_range(-0.3..0.3);
            let anchor = Vec2::from_angle(angle) * min_dim * rng.gen_range(0.08..0.22);
            let base_radius = min_dim * rng.gen_range(0.05..0.09);
            Blob {
                anchor,
                base_radius,
                max_radius: base_radius * rng.gen_range(2.2..3.2),
                wobble_frequency: rng.gen_range(0.4..1.1),
                wobble_phase: rng.gen_range(0.0..TAU),
                color_mix: i as f32 / (count - 1) as f32,
                position: anchor,
                radius: base_radius,
            }
        })
        .collect();
    FluidPool {
        blobs,
        time: 0.0,
        wobble: min_dim * 0.02,
    }
}
