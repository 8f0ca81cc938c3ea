use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::SceneBounds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogLayer {
    pub position: Vec2,
    pub radius: f32,
    pub drift_speed: f32,
    pub drift_radius: f32,
    pub drift_phase: f32,
    pub density: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoronaRay {
    pub angle: f32,
    /// Length relative to the sun radius at full light.
    pub reach: f32,
    pub width: f32,
    pub flicker_phase: f32,
}

/// Eclipse scene: a sun behind a moon disk, corona rays and drifting fog.
#[derive(Debug, Clone, PartialEq)]
pub struct Sky {
    pub fog: Vec<FogLayer>,
    pub rays: Vec<CoronaRay>,
    pub sun_radius: f32,
    pub light: f32,
    pub time: f32,
}

pub fn build<R: Rng + ?Sized>(bounds: &SceneBounds, complexity: u32, rng: &mut R) -> Sky {
    let half = bounds.size * 0.5;
    let min_dim = bounds.min_dim();
    let fog = (0..3 + complexity as usize / 20)
        .map(|_| FogLayer {
            position: Vec2::new(
                rng.gen_range(-0.8..0.8) * half.x,
                rng.gen_range(-0.8..0.8) * half.y,
            ),
            radius: min_dim * rng.gen_range(0.3..0.6),
            drift_speed: rng.gen_range(0.05..0.2),
            drift_radius: min_dim * rng.gen_range(0.03..0.1),
            drift_phase: rng.gen_range(0.0..TAU),
            density: 0.85,
        })
        .collect();
    let ray_count = 12 + complexity as usize / 10;
    let rays = (0..ray_count)
        .map(|i| CoronaRay {
            angle: i as f32 / ray_count as f32 * TAU + rng.gen_range(-0.08..0.08),
            reach: rng.gen_range(1.6..2.6),
            width: rng.gen_range(1.0..3.0),
            flicker_phase: rng.gen_range(0.0..TAU),
        })
        .collect();
    Sky {
        fog,
        rays,
        sun_radius: min_dim * 0.14,
        light: 0.0,
        time: 0.0,
    }
}
