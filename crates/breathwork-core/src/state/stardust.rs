use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::SceneBounds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mote {
    /// Resting spot with empty lungs, scattered near the bottom.
    pub start: Vec2,
    /// Resting spot with full lungs, clustered in the upper half.
    pub end: Vec2,
    pub position: Vec2,
    pub size: f32,
    pub brightness: f32,
    /// Fraction of each phase to wait before moving, in [0, 0.3).
    pub delay: f32,
    pub twinkle: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StarField {
    pub motes: Vec<Mote>,
}

pub fn build<R: Rng + ?Sized>(bounds: &SceneBounds, complexity: u32, rng: &mut R) -> StarField {
    let half = bounds.size * 0.5;
    let cluster_radius = bounds.min_dim() * 0.18;
    let cluster_center = Vec2::new(0.0, -half.y * 0.35);
    let motes = (0..complexity as usize * 3)
        .map(|_| {
            let start = Vec2::new(
                rng.gen_range(-0.45..0.45) * bounds.size.x,
                half.y * rng.gen_range(0.55..0.92),
            );
            // sqrt keeps the cluster uniformly dense instead of center-heavy
            let r = cluster_radius * rng.gen::<f32>().sqrt();
            let end = cluster_center + Vec2::from_angle(rng.gen_range(0.0..TAU)) * r;
            Mote {
                start,
                end,
                position: start,
                size: rng.gen_range(1.0..3.0),
                brightness: rng.gen_range(0.5..1.0),
                delay: rng.gen_range(0.0..0.3),
                twinkle: rng.gen_range(0.0..TAU),
            }
        })
        .collect();
    StarField { motes }
}
