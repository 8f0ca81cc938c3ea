use std::f32::consts::{FRAC_PI_3, TAU};

use glam::Vec2;
use rand::Rng;

use super::SceneBounds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrystalPoint {
    /// Ordered lattice slot.
    pub home: Vec2,
    /// Scattered slot at full chaos.
    pub chaos: Vec2,
    pub layer: u32,
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    pub points: Vec<CrystalPoint>,
    /// Pairs of point indices whose home positions lie within `proximity`.
    pub edges: Vec<(usize, usize)>,
    pub spacing: f32,
    pub proximity: f32,
    pub chaos_level: f32,
}

/// Hexagonal layer count for a complexity value.
pub fn layer_count(complexity: u32) -> u32 {
    2 + complexity / 20
}

pub fn build<R: Rng + ?Sized>(bounds: &SceneBounds, complexity: u32, rng: &mut R) -> Lattice {
    let layers = layer_count(complexity);
    let spacing = bounds.min_dim() * 0.36 / layers as f32;
    let scatter = bounds.min_dim() * 0.45;

    let mut points = Vec::with_capacity(1 + 3 * (layers * (layers + 1)) as usize);
    let mut push = |home: Vec2, layer: u32, rng: &mut R| {
        let chaos = Vec2::from_angle(rng.gen_range(0.0..TAU)) * scatter * rng.gen::<f32>().sqrt();
        points.push(CrystalPoint {
            home,
            chaos,
            layer,
            position: home,
        });
    };

    push(Vec2::ZERO, 0, rng);
    for layer in 1..=layers {
        // Walk the six sides of hexagonal ring `layer`.
        let corners: Vec<Vec2> = (0..6)
            .map(|k| Vec2::from_angle(k as f32 * FRAC_PI_3) * spacing * layer as f32)
            .collect();
        for side in 0..6 {
            let (a, b) = (corners[side], corners[(side + 1) % 6]);
            for step in 0..layer {
                push(a.lerp(b, step as f32 / layer as f32), layer, rng);
            }
        }
    }

    let proximity = spacing * 1.05;
    let edges = home_edges(&points, proximity);
    Lattice {
        points,
        edges,
        spacing,
        proximity,
        chaos_level: 0.0,
    }
}

/// Pairs whose home positions are closer than `proximity`. Current positions are ignored.
pub fn home_edges(points: &[CrystalPoint], proximity: f32) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            if points[i].home.distance(points[j].home) <= proximity {
                edges.push((i, j));
            }
        }
    }
    edges
}
