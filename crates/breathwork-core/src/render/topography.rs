use std::f32::consts::TAU;

use breathwork_platform::{Stroke, Surface};
use glam::{Mat3, Vec2, Vec3};

use super::{begin_frame, mismatch, FrameContext, ModeRenderer};
use crate::config::VisualMode;
use crate::easing::approach;
use crate::noise::terrain;
use crate::phase::BreathPhase;
use crate::state::{SphereMesh, VisualizationState};

pub struct TopographyRenderer;

/// Peak displacement as a fraction of the sphere radius.
const MAX_DISPLACEMENT: f32 = 0.25;
/// Per-second rate of the exponential approach toward target displacement.
const SETTLE_RATE: f32 = 4.0;

/// Radians per second around the vertical axis.
pub fn spin_rate(phase: BreathPhase) -> f32 {
    match phase {
        BreathPhase::Inhale | BreathPhase::Exhale => 0.5,
        BreathPhase::HoldFull | BreathPhase::HoldEmpty => 0.15,
        BreathPhase::Idle | BreathPhase::Complete => 0.08,
    }
}

/// Rotates about Y and applies a perspective divide. Returns the screen
/// position and normalized depth (0 nearest, 1 farthest).
pub fn project(point: Vec3, rotation: f32, radius: f32, center: Vec2) -> (Vec2, f32) {
    let rotated = Mat3::from_rotation_y(rotation) * point;
    let focal = radius * 3.0;
    let scale = focal / (focal + rotated.z).max(1e-3);
    let screen = center + Vec2::new(rotated.x, -rotated.y) * scale;
    let depth = ((rotated.z / radius.max(1e-3)) + 1.0) * 0.5;
    (screen, depth.clamp(0.0, 1.0))
}

fn settle(mesh: &mut SphereMesh, frame: &FrameContext<'_>) {
    mesh.time += frame.dt;
    mesh.rotation = (mesh.rotation + spin_rate(frame.phase) * frame.dt).rem_euclid(TAU);
    let amplitude = frame.eased * MAX_DISPLACEMENT;
    let time = mesh.time;
    for vertex in &mut mesh.vertices {
        let ripple = (time * 1.3 + vertex.phase_offset).sin() * 0.15;
        let target = (terrain(vertex.base * 1.8, time) * 0.85 + ripple) * amplitude;
        vertex.displacement = approach(vertex.displacement, target, SETTLE_RATE, frame.dt);
    }
}

impl ModeRenderer for TopographyRenderer {
    fn mode(&self) -> VisualMode {
        VisualMode::Topography
    }

    fn update_and_draw(
        &self,
        frame: &FrameContext<'_>,
        state: &mut VisualizationState,
        surface: &mut dyn Surface,
    ) {
        let VisualizationState::Topography(mesh) = state else {
            mismatch(self.mode(), state);
            return;
        };
        settle(mesh, frame);

        let center = frame.center();
        let projected: Vec<(Vec2, f32, f32)> = mesh
            .vertices
            .iter()
            .map(|v| {
                let point = v.base * mesh.radius * (1.0 + v.displacement);
                let (screen, depth) = project(point, mesh.rotation, mesh.radius, center);
                (screen, depth, v.displacement)
            })
            .collect();

        begin_frame(frame, surface);
        let style = frame.style;
        let width = style.line_thickness * 0.6;
        let mut segments = Vec::with_capacity(mesh.vertices.len() * 2);
        for lat in 0..=mesh.lat_bands {
            for lon in 0..mesh.lon_segments {
                let here = mesh.index(lat, lon);
                // Pole rows collapse to a point; skip their parallels.
                if lat > 0 && lat < mesh.lat_bands {
                    segments.push((here, mesh.index(lat, lon + 1)));
                }
                if lat < mesh.lat_bands {
                    segments.push((here, mesh.index(lat + 1, lon)));
                }
            }
        }

        for (a, b) in segments {
            let (pa, da, ha) = projected[a];
            let (pb, db, hb) = projected[b];
            let depth = (da + db) * 0.5;
            let height = ((ha + hb) * 0.5 / MAX_DISPLACEMENT + 1.0) * 0.5;
            let color = style
                .primary
                .lerp(style.secondary, height)
                .with_alpha((1.0 - 0.75 * depth) * (0.5 + 0.5 * frame.intensity));
            surface.stroke_line(pa, pb, &Stroke::new(color, width));
        }
    }
}
