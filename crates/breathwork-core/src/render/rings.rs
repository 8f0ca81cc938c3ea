use std::f32::consts::{PI, TAU};

use breathwork_platform::{Stroke, Surface};
use glam::Vec2;

use super::{begin_frame, mismatch, FrameContext, ModeRenderer};
use crate::config::VisualMode;
use crate::state::{RingStack, VisualizationState, RING_COUNT};

/// How the twelve rings move with the breath. Every path is a function of
/// intensity and cycle position only, so the last frame of a phase and the
/// first frame of the next one lay the rings out identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingPath {
    /// Rings separate vertically from a single ring into a column.
    Stack,
    /// Stacked, with a travelling vertical wave.
    Wave,
    /// Concentric rings growing radially.
    Expand,
    /// Stacked, twisting and orbiting around the vertical axis.
    Spiral,
}

#[derive(Debug, Clone, Copy)]
pub struct RingRenderer {
    pub path: RingPath,
}

impl RingRenderer {
    /// Positions every ring for this frame.
    pub fn layout(&self, stack: &mut RingStack, frame: &FrameContext<'_>) {
        let half = (RING_COUNT as f32 - 1.0) / 2.0;
        let reach = stack.spacing * half;
        let intensity = frame.intensity;
        let cycle_angle = TAU * frame.cycle_position;
        let envelope = if frame.style.pulse_on_hold {
            frame.hold_envelope()
        } else {
            0.0
        };

        for ring in &mut stack.rings {
            let i = ring.index as f32;
            let lane = RingStack::lane(ring.index);
            let pulse = (frame.time * 2.4 + i * 0.6).sin() * envelope;
            let stacked = lane * reach * intensity + pulse * stack.spacing * 0.25;

            match self.path {
                RingPath::Stack => {
                    ring.offset = Vec2::new(0.0, stacked);
                    ring.scale = 1.0;
                    ring.rotation = 0.0;
                }
                RingPath::Wave => {
                    let wave = (TAU * i / RING_COUNT as f32 + cycle_angle).sin();
                    ring.offset = Vec2::new(0.0, stacked + wave * stack.spacing * 1.5 * intensity);
                    ring.scale = 1.0;
                    ring.rotation = 0.0;
                }
                RingPath::Expand => {
                    let t = ring.index as f32 / (RING_COUNT as f32 - 1.0);
                    ring.offset = Vec2::ZERO;
                    ring.scale = 0.3 + intensity * (0.4 + 1.2 * t) + pulse * 0.04;
                    ring.rotation = 0.0;
                }
                RingPath::Spiral => {
                    let orbit = cycle_angle + i * TAU / RING_COUNT as f32;
                    ring.offset = Vec2::new(orbit.cos() * stack.spacing * 1.2 * intensity, stacked);
                    ring.scale = 1.0;
                    ring.rotation = cycle_angle + lane * PI * 0.5 * intensity;
                }
            }
        }
    }

    /// Draw order: most displaced (or, when expanding, largest) first.
    pub fn draw_order(&self, stack: &RingStack) -> Vec<usize> {
        let key = |i: usize| {
            let ring = &stack.rings[i];
            match self.path {
                RingPath::Expand => ring.base_radius * ring.scale,
                _ => ring.offset.length(),
            }
        };
        let mut order: Vec<usize> = (0..stack.rings.len()).collect();
        order.sort_by(|a, b| key(*b).total_cmp(&key(*a)));
        order
    }
}

impl ModeRenderer for RingRenderer {
    fn mode(&self) -> VisualMode {
        match self.path {
            RingPath::Stack => VisualMode::Rings,
            RingPath::Wave => VisualMode::RingsWave,
            RingPath::Expand => VisualMode::RingsExpand,
            RingPath::Spiral => VisualMode::RingsSpiral,
        }
    }

    fn update_and_draw(
        &self,
        frame: &FrameContext<'_>,
        state: &mut VisualizationState,
        surface: &mut dyn Surface,
    ) {
        let VisualizationState::Rings(stack) = state else {
            mismatch(self.mode(), state);
            return;
        };
        self.layout(stack, frame);

        begin_frame(frame, surface);
        let style = frame.style;
        let center = frame.center();
        for index in self.draw_order(stack) {
            let ring = &stack.rings[index];
            let t = ring.index as f32 / (RING_COUNT as f32 - 1.0);
            let lane = RingStack::lane(ring.index).abs();
            let alpha = (0.45 + 0.55 * frame.intensity) * (1.0 - 0.35 * lane * frame.intensity);
            let color = style
                .primary
                .lerp(style.secondary, t)
                .lighten(style.glow * 0.3 * frame.intensity)
                .with_alpha(alpha);

            surface.set_shadow(style.glow_shadow(color));
            let radius = ring.base_radius * ring.scale;
            surface.stroke_ellipse(
                center + ring.offset,
                Vec2::new(radius, radius * stack.tilt),
                ring.rotation,
                &Stroke::new(color, style.line_thickness),
            );
        }
        surface.set_shadow(None);
    }
}
