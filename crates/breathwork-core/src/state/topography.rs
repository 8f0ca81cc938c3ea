use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

use super::SceneBounds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    /// Angle from the north pole, in [0, pi].
    pub polar: f32,
    pub azimuth: f32,
    /// Unit-sphere position.
    pub base: Vec3,
    /// Radial displacement as a fraction of the sphere radius.
    pub displacement: f32,
    pub phase_offset: f32,
}

/// Latitude/longitude sphere. Vertices are stored row-major: `(lat_bands + 1)`
/// rows of `lon_segments` vertices each.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereMesh {
    pub vertices: Vec<MeshVertex>,
    pub lat_bands: usize,
    pub lon_segments: usize,
    pub radius: f32,
    pub rotation: f32,
    pub time: f32,
}

impl SphereMesh {
    pub fn index(&self, lat: usize, lon: usize) -> usize {
        lat * self.lon_segments + lon % self.lon_segments
    }
}

pub fn build<R: Rng + ?Sized>(bounds: &SceneBounds, complexity: u32, rng: &mut R) -> SphereMesh {
    let lat_bands = 6 + complexity as usize / 10;
    let lon_segments = lat_bands * 2;
    let mut vertices = Vec::with_capacity((lat_bands + 1) * lon_segments);
    for lat in 0..=lat_bands {
        let polar = PI * lat as f32 / lat_bands as f32;
        for lon in 0..lon_segments {
            let azimuth = TAU * lon as f32 / lon_segments as f32;
            let base = Vec3::new(
                polar.sin() * azimuth.cos(),
                polar.cos(),
                polar.sin() * azimuth.sin(),
            );
            vertices.push(MeshVertex {
                polar,
                azimuth,
                base,
                displacement: 0.0,
                phase_offset: rng.gen_range(0.0..TAU),
            });
        }
    }
    SphereMesh {
        vertices,
        lat_bands,
        lon_segments,
        radius: bounds.min_dim() * 0.28,
        rotation: 0.0,
        time: 0.0,
    }
}
