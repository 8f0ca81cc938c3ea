use breathwork_platform::{BlendMode, Paint, RadialGradient, Rgba, Stroke, Surface};
use glam::Vec2;

use super::{begin_frame, glow, mismatch, FrameContext, ModeRenderer};
use crate::config::VisualMode;
use crate::easing::{approach, lerp};
use crate::phase::BreathPhase;
use crate::state::{Sky, VisualizationState};

pub struct AtmosphereRenderer;

pub const THICK_FOG: f32 = 0.85;
pub const THIN_FOG: f32 = 0.15;
const FOG_RATE: f32 = 2.5;

/// Fog density the scene drifts toward for this frame.
pub fn fog_target(phase: BreathPhase, intensity: f32) -> f32 {
    match phase {
        BreathPhase::Inhale | BreathPhase::Exhale => lerp(THICK_FOG, THIN_FOG, intensity),
        BreathPhase::HoldFull => THIN_FOG,
        BreathPhase::HoldEmpty | BreathPhase::Idle | BreathPhase::Complete => THICK_FOG,
    }
}

/// Darkening at the frame edges while emptying the lungs.
pub fn vignette_strength(phase: BreathPhase, intensity: f32) -> f32 {
    match phase {
        BreathPhase::Exhale | BreathPhase::HoldEmpty => (1.0 - intensity) * 0.7,
        _ => 0.0,
    }
}

fn drift(sky: &mut Sky, frame: &FrameContext<'_>) {
    sky.time += frame.dt;
    sky.light = frame.eased;
    let target = fog_target(frame.phase, frame.intensity);
    for layer in &mut sky.fog {
        layer.density = approach(layer.density, target, FOG_RATE, frame.dt);
    }
}

impl ModeRenderer for AtmosphereRenderer {
    fn mode(&self) -> VisualMode {
        VisualMode::Atmosphere
    }

    fn update_and_draw(
        &self,
        frame: &FrameContext<'_>,
        state: &mut VisualizationState,
        surface: &mut dyn Surface,
    ) {
        let VisualizationState::Atmosphere(sky) = state else {
            mismatch(self.mode(), state);
            return;
        };
        drift(sky, frame);

        begin_frame(frame, surface);
        let style = frame.style;
        let center = frame.center();
        let light = sky.light;

        for layer in &sky.fog {
            let t = sky.time * layer.drift_speed + layer.drift_phase;
            let position = center + layer.position + Vec2::new(t.sin(), t.cos()) * layer.drift_radius;
            let tint = style.secondary.with_alpha(layer.density * 0.35);
            let gradient = RadialGradient::new(position, layer.radius)
                .stop(0.0, tint)
                .stop(1.0, tint.with_alpha(0.0));
            surface.fill_circle(position, layer.radius, &Paint::Radial(gradient));
        }

        surface.set_blend_mode(BlendMode::Additive);
        for ray in &sky.rays {
            let flicker = 0.75 + 0.25 * (sky.time * 2.0 + ray.flicker_phase).sin();
            let length = sky.sun_radius * (1.0 + (ray.reach - 1.0) * light * flicker);
            let direction = Vec2::from_angle(ray.angle);
            let color = style.primary.with_alpha(0.15 + 0.6 * light);
            surface.stroke_line(
                center + direction * sky.sun_radius,
                center + direction * length,
                &Stroke::new(color, ray.width * (0.5 + 0.5 * style.glow)),
            );
        }
        glow(
            surface,
            center,
            sky.sun_radius * (1.2 + 1.8 * light),
            style.primary.lighten(0.3).with_alpha(0.4 + 0.5 * light * (0.5 + 0.5 * style.glow)),
        );
        surface.set_blend_mode(BlendMode::Normal);

        let moon_offset = Vec2::new(light * sky.sun_radius * 0.25, 0.0);
        surface.fill_circle(
            center + moon_offset,
            sky.sun_radius * 0.96,
            &Paint::Solid(style.background.with_alpha(1.0)),
        );

        let strength = vignette_strength(frame.phase, frame.intensity);
        if strength > 0.01 {
            let gradient = RadialGradient::new(center, frame.size.length() * 0.5)
                .stop(0.0, Rgba::TRANSPARENT)
                .stop(0.35, Rgba::TRANSPARENT)
                .stop(1.0, Rgba::BLACK.with_alpha(strength));
            surface.fill_rect(Vec2::ZERO, frame.size, &Paint::Radial(gradient));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::PhaseSample;
    use crate::render::RenderStyle;
    use crate::state::initialize;
    use breathwork_platform::{DrawCommand, RecordingSurface};

    fn render(phase: BreathPhase, frames: usize) -> (Sky, Vec<DrawCommand>) {
        let style = RenderStyle::default();
        let mut state = initialize(VisualMode::Atmosphere, 50, Vec2::splat(480.0));
        let mut surface = RecordingSurface::new(480, 480);
        let sample = PhaseSample::resting(phase);
        for i in 0..frames {
            surface.take_commands();
            let frame = FrameContext::new(&sample, i as f32 / 60.0, 1.0 / 60.0, Vec2::splat(480.0), &style);
            AtmosphereRenderer.update_and_draw(&frame, &mut state, &mut surface);
        }
        match state {
            VisualizationState::Atmosphere(sky) => (sky, surface.take_commands()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn fog_thins_as_lungs_fill() {
        assert_eq!(fog_target(BreathPhase::HoldFull, 1.0), THIN_FOG);
        assert_eq!(fog_target(BreathPhase::HoldEmpty, 0.0), THICK_FOG);
        let mid = fog_target(BreathPhase::Inhale, 0.5);
        assert!(mid < THICK_FOG && mid > THIN_FOG);
    }

    #[test]
    fn fog_density_eases_toward_target() {
        let (one, _) = render(BreathPhase::HoldFull, 1);
        let (many, _) = render(BreathPhase::HoldFull, 300);
        for layer in &one.fog {
            assert!(layer.density < THICK_FOG && layer.density > THIN_FOG);
        }
        for layer in &many.fog {
            assert!((layer.density - THIN_FOG).abs() < 0.01);
        }
        assert_eq!(many.light, 1.0);
    }

    #[test]
    fn vignette_only_while_emptying() {
        let rects = |commands: &[DrawCommand]| {
            commands
                .iter()
                .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
                .count()
        };
        let (_, empty) = render(BreathPhase::HoldEmpty, 1);
        let (_, full) = render(BreathPhase::HoldFull, 1);
        assert_eq!(rects(&empty), 1);
        assert_eq!(rects(&full), 0);
        assert_eq!(vignette_strength(BreathPhase::Inhale, 0.0), 0.0);
    }

    #[test]
    fn draws_every_ray() {
        let (sky, commands) = render(BreathPhase::Inhale, 1);
        let lines = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeLine { .. }))
            .count();
        assert_eq!(lines, sky.rays.len());
    }
}
