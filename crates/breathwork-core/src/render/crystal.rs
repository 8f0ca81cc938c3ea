use std::f32::consts::FRAC_PI_3;

use breathwork_platform::{Paint, Stroke, Surface};
use glam::Vec2;

use super::{begin_frame, mismatch, FrameContext, ModeRenderer};
use crate::config::VisualMode;
use crate::state::VisualizationState;

pub struct CrystalRenderer;

/// Below this chaos level points are drawn as hexagons.
pub const CRYSTALLIZED_BELOW: f32 = 0.35;

fn hexagon(center: Vec2, radius: f32) -> [Vec2; 6] {
    std::array::from_fn(|k| center + Vec2::from_angle(k as f32 * FRAC_PI_3 + FRAC_PI_3 / 2.0) * radius)
}

impl ModeRenderer for CrystalRenderer {
    fn mode(&self) -> VisualMode {
        VisualMode::Crystal
    }

    fn update_and_draw(
        &self,
        frame: &FrameContext<'_>,
        state: &mut VisualizationState,
        surface: &mut dyn Surface,
    ) {
        let VisualizationState::Crystal(lattice) = state else {
            mismatch(self.mode(), state);
            return;
        };

        let chaos = frame.intensity.clamp(0.0, 1.0);
        lattice.chaos_level = chaos;
        for point in &mut lattice.points {
            point.position = point.home.lerp(point.chaos, chaos);
        }

        begin_frame(frame, surface);
        let style = frame.style;
        let center = frame.center();

        let line_alpha = (1.0 - chaos) * 0.6;
        if line_alpha > 0.01 {
            let stroke = Stroke::new(style.primary.with_alpha(line_alpha), style.line_thickness * 0.5);
            for &(a, b) in &lattice.edges {
                surface.stroke_line(
                    center + lattice.points[a].position,
                    center + lattice.points[b].position,
                    &stroke,
                );
            }
        }

        let layers = lattice.points.iter().map(|p| p.layer).max().unwrap_or(0).max(1) as f32;
        let size = lattice.spacing * 0.18;
        for point in &lattice.points {
            let color = style
                .primary
                .lerp(style.secondary, point.layer as f32 / layers)
                .with_alpha(0.55 + 0.45 * (1.0 - chaos));
            surface.set_shadow(style.glow_shadow(color));
            let position = center + point.position;
            if chaos < CRYSTALLIZED_BELOW {
                surface.fill_polygon(&hexagon(position, size), &Paint::Solid(color));
            } else {
                surface.fill_circle(position, size * 0.7, &Paint::Solid(color));
            }
        }
        surface.set_shadow(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::{BreathPhase, PhaseSample};
    use crate::render::RenderStyle;
    use crate::state::initialize;
    use breathwork_platform::{DrawCommand, RecordingSurface};

    fn draw(phase: BreathPhase) -> (VisualizationState, Vec<DrawCommand>) {
        let style = RenderStyle::default();
        let mut state = initialize(VisualMode::Crystal, 40, Vec2::new(600.0, 600.0));
        let mut surface = RecordingSurface::new(600, 600);
        CrystalRenderer.update_and_draw(
            &FrameContext::new(&PhaseSample::resting(phase), 0.0, 0.016, Vec2::new(600.0, 600.0), &style),
            &mut state,
            &mut surface,
        );
        (state, surface.take_commands())
    }

    #[test]
    fn empty_lungs_draw_an_ordered_lattice() {
        let (state, commands) = draw(BreathPhase::HoldEmpty);
        let VisualizationState::Crystal(lattice) = state else {
            panic!("wrong state");
        };
        assert!(lattice.points.iter().all(|p| p.position == p.home));
        let lines = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeLine { .. }))
            .count();
        assert_eq!(lines, lattice.edges.len());
        assert!(commands.iter().any(|c| matches!(c, DrawCommand::FillPolygon { .. })));
    }

    #[test]
    fn full_lungs_scatter_points_and_drop_lines() {
        let (state, commands) = draw(BreathPhase::HoldFull);
        let VisualizationState::Crystal(lattice) = state else {
            panic!("wrong state");
        };
        assert_eq!(lattice.chaos_level, 1.0);
        assert!(lattice.points.iter().all(|p| p.position.distance(p.chaos) < 1e-3));
        assert!(!commands.iter().any(|c| matches!(c, DrawCommand::StrokeLine { .. })));
        assert!(!commands.iter().any(|c| matches!(c, DrawCommand::FillPolygon { .. })));
    }
}
