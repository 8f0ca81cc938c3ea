use breathwork_platform::{BlendMode, Paint, Surface};
use glam::Vec2;

use super::{begin_frame, mismatch, FrameContext, ModeRenderer};
use crate::config::VisualMode;
use crate::easing::lerp;
use crate::phase::BreathPhase;
use crate::state::VisualizationState;

pub struct FluidRenderer;

/// Concentric layers used to fake a soft edge.
const FALLOFF_LAYERS: usize = 5;

impl ModeRenderer for FluidRenderer {
    fn mode(&self) -> VisualMode {
        VisualMode::Fluid
    }

    fn update_and_draw(
        &self,
        frame: &FrameContext<'_>,
        state: &mut VisualizationState,
        surface: &mut dyn Surface,
    ) {
        let VisualizationState::Fluid(pool) = state else {
            mismatch(self.mode(), state);
            return;
        };

        pool.time += frame.dt;
        let boost = if frame.phase == BreathPhase::HoldFull {
            1.0 + 1.5 * frame.hold_envelope()
        } else {
            1.0
        };
        let amplitude = pool.wobble * boost * (0.5 + frame.intensity);
        let spread = 0.6 + 0.6 * frame.intensity;

        for blob in &mut pool.blobs {
            let t = pool.time * blob.wobble_frequency + blob.wobble_phase;
            let wobble = Vec2::new(t.sin(), (t * 0.8).cos()) * amplitude;
            blob.position = blob.anchor * spread + wobble;
            blob.radius = lerp(blob.base_radius, blob.max_radius, frame.intensity);
        }

        begin_frame(frame, surface);
        surface.set_blend_mode(BlendMode::Additive);
        let style = frame.style;
        let center = frame.center();
        let body = 0.5 + 0.5 * frame.intensity;
        for blob in &pool.blobs {
            let color = style.primary.lerp(style.secondary, blob.color_mix);
            for layer in 0..FALLOFF_LAYERS {
                let k = layer as f32;
                let radius = blob.radius * (1.0 - k * 0.18);
                let alpha = (0.05 + 0.035 * k) * body * (0.7 + 0.6 * style.glow);
                surface.fill_circle(center + blob.position, radius, &Paint::Solid(color.with_alpha(alpha)));
            }
        }
        surface.set_blend_mode(BlendMode::Normal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::PhaseSample;
    use crate::render::RenderStyle;
    use crate::state::{initialize, FluidPool};
    use breathwork_platform::RecordingSurface;

    fn pool_after(sample: PhaseSample) -> FluidPool {
        let style = RenderStyle::default();
        let mut state = initialize(VisualMode::Fluid, 60, Vec2::new(500.0, 500.0));
        let mut surface = RecordingSurface::new(500, 500);
        FluidRenderer.update_and_draw(
            &FrameContext::new(&sample, 0.0, 0.016, Vec2::new(500.0, 500.0), &style),
            &mut state,
            &mut surface,
        );
        assert_eq!(surface.draw_count(), 1 + state.entity_count() * FALLOFF_LAYERS);
        match state {
            VisualizationState::Fluid(pool) => pool,
            _ => unreachable!(),
        }
    }

    #[test]
    fn radius_tracks_intensity() {
        for blob in pool_after(PhaseSample::resting(BreathPhase::HoldEmpty)).blobs {
            assert_eq!(blob.radius, blob.base_radius);
        }
        for blob in pool_after(PhaseSample::resting(BreathPhase::HoldFull)).blobs {
            assert!((blob.radius - blob.max_radius).abs() < 1e-3);
        }
    }
}
