use std::f32::consts::TAU;

use breathwork_platform::{BlendMode, Paint, Surface};

use super::{begin_frame, glow, mismatch, FrameContext, ModeRenderer};
use crate::config::VisualMode;
use crate::easing::ease_in_out_sine;
use crate::phase::BreathPhase;
use crate::state::{Mote, VisualizationState};

pub struct StarDustRenderer;

/// Progress of one mote after waiting out its delay.
pub fn staggered_progress(progress: f32, delay: f32) -> f32 {
    ((progress - delay) / (1.0 - delay).max(f32::EPSILON)).clamp(0.0, 1.0)
}

fn place(mote: &Mote, frame: &FrameContext<'_>) -> glam::Vec2 {
    let travel = ease_in_out_sine(staggered_progress(frame.progress, mote.delay));
    match frame.phase {
        BreathPhase::Inhale => mote.start.lerp(mote.end, travel),
        BreathPhase::HoldFull => mote.end,
        BreathPhase::Exhale => mote.end.lerp(mote.start, travel),
        BreathPhase::HoldEmpty | BreathPhase::Idle | BreathPhase::Complete => mote.start,
    }
}

impl ModeRenderer for StarDustRenderer {
    fn mode(&self) -> VisualMode {
        VisualMode::StarDust
    }

    fn update_and_draw(
        &self,
        frame: &FrameContext<'_>,
        state: &mut VisualizationState,
        surface: &mut dyn Surface,
    ) {
        let VisualizationState::StarDust(field) = state else {
            mismatch(self.mode(), state);
            return;
        };

        begin_frame(frame, surface);
        surface.set_blend_mode(BlendMode::Additive);

        let style = frame.style;
        let center = frame.center();
        let envelope = frame.hold_envelope();
        // Pulses while full, settles dimmer and smaller while empty.
        let (swell, hush) = match frame.phase {
            BreathPhase::HoldFull => (envelope, 0.0),
            BreathPhase::HoldEmpty => (0.0, envelope),
            _ => (0.0, 0.0),
        };

        for mote in &mut field.motes {
            mote.position = place(mote, frame);
            let twinkle = (frame.time * 3.0 + mote.twinkle).sin() * 0.5 + 0.5;
            let brightness = mote.brightness
                * (0.35 + 0.65 * frame.intensity)
                * (1.0 + 0.35 * twinkle * swell)
                * (1.0 - 0.45 * hush);
            let size = mote.size
                * (0.6 + 0.4 * frame.intensity)
                * (1.0 + 0.3 * twinkle * swell)
                * (1.0 - 0.35 * hush);

            let color = style
                .primary
                .lerp(style.secondary, mote.twinkle / TAU)
                .with_alpha(brightness.min(1.0));
            let position = center + mote.position;
            glow(
                surface,
                position,
                size * (2.5 + 3.0 * style.glow),
                color.fade(0.35 + 0.3 * style.glow),
            );
            surface.fill_circle(position, size, &Paint::Solid(color.lighten(0.4)));
        }
        surface.set_blend_mode(BlendMode::Normal);
    }
}
