//! Per-mode update and draw.
//!
//! Every renderer reads the same [`FrameContext`], mutates the state variant it
//! owns and issues draw calls. A renderer handed a state built for another mode
//! draws nothing for that frame.

use std::f32::consts::PI;

use breathwork_platform::{BlendMode, Paint, RadialGradient, Rgba, Shadow, Surface};
use glam::Vec2;
use tracing::debug;

use crate::config::{BreathConfig, VisualMode};
use crate::phase::{BreathPhase, PhaseSample};
use crate::state::VisualizationState;

mod atmosphere;
mod bio;
mod crystal;
mod fluid;
mod rings;
mod stardust;
mod topography;

pub use rings::{RingPath, RingRenderer};

/// Visual settings resolved from a [`BreathConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub primary: Rgba,
    pub secondary: Rgba,
    pub background: Rgba,
    /// Glow strength in [0, 1].
    pub glow: f32,
    pub line_thickness: f32,
    /// Shadow blur radius when shadows are enabled.
    pub shadow_blur: Option<f32>,
    pub trail: bool,
    pub pulse_on_hold: bool,
}

impl RenderStyle {
    pub fn from_config(config: &BreathConfig) -> Self {
        Self {
            primary: config.primary_color.rgba(),
            secondary: config.secondary_color.rgba(),
            background: config.background_color.rgba(),
            glow: (config.glow_intensity / 100.0).clamp(0.0, 1.0),
            line_thickness: config.line_thickness,
            shadow_blur: config.shadow_enabled.then_some(config.shadow_blur),
            trail: config.trail_effect,
            pulse_on_hold: config.pulse_on_hold,
        }
    }

    /// Shadow for a glowing shape of `color`, if shadows are on.
    pub fn glow_shadow(&self, color: Rgba) -> Option<Shadow> {
        self.shadow_blur.filter(|blur| *blur > 0.0).map(|blur| Shadow {
            color: color.with_alpha(0.35 + 0.65 * self.glow),
            blur: blur * (0.5 + self.glow),
        })
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::from_config(&BreathConfig::default())
    }
}

/// Everything a renderer reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub phase: BreathPhase,
    pub progress: f32,
    pub intensity: f32,
    /// `intensity` passed through a cubic ease; drives the organic modes.
    pub eased: f32,
    pub cycle_position: f32,
    /// Seconds since the engine started rendering.
    pub time: f32,
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Logical surface size.
    pub size: Vec2,
    pub style: &'a RenderStyle,
}

impl<'a> FrameContext<'a> {
    pub fn new(sample: &PhaseSample, time: f32, dt: f32, size: Vec2, style: &'a RenderStyle) -> Self {
        Self {
            phase: sample.phase,
            progress: sample.progress,
            intensity: sample.intensity,
            eased: crate::easing::ease_in_out_cubic(sample.intensity),
            cycle_position: sample.cycle_position,
            time,
            dt: dt.clamp(0.0, 0.25),
            size,
            style,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.size * 0.5
    }

    pub fn min_dim(&self) -> f32 {
        self.size.x.min(self.size.y).max(1.0)
    }

    /// Rises and falls over a hold phase, zero at both of its boundaries and
    /// zero outside holds.
    pub fn hold_envelope(&self) -> f32 {
        if self.phase.is_hold() {
            (PI * self.progress).sin().max(0.0)
        } else {
            0.0
        }
    }
}

pub trait ModeRenderer: Sync {
    fn mode(&self) -> VisualMode;

    fn update_and_draw(
        &self,
        frame: &FrameContext<'_>,
        state: &mut VisualizationState,
        surface: &mut dyn Surface,
    );
}

static RINGS: RingRenderer = RingRenderer {
    path: RingPath::Stack,
};
static RINGS_WAVE: RingRenderer = RingRenderer {
    path: RingPath::Wave,
};
static RINGS_EXPAND: RingRenderer = RingRenderer {
    path: RingPath::Expand,
};
static RINGS_SPIRAL: RingRenderer = RingRenderer {
    path: RingPath::Spiral,
};

/// The renderer for a visual mode.
pub fn renderer_for(mode: VisualMode) -> &'static dyn ModeRenderer {
    match mode {
        VisualMode::Rings => &RINGS,
        VisualMode::RingsWave => &RINGS_WAVE,
        VisualMode::RingsExpand => &RINGS_EXPAND,
        VisualMode::RingsSpiral => &RINGS_SPIRAL,
        VisualMode::StarDust => &stardust::StarDustRenderer,
        VisualMode::Fluid => &fluid::FluidRenderer,
        VisualMode::Crystal => &crystal::CrystalRenderer,
        VisualMode::Topography => &topography::TopographyRenderer,
        VisualMode::Bio => &bio::BioRenderer,
        VisualMode::Atmosphere => &atmosphere::AtmosphereRenderer,
    }
}

/// Resets compositing and paints the background, as a translucent wash when
/// trails are on.
fn begin_frame(frame: &FrameContext<'_>, surface: &mut dyn Surface) {
    surface.set_blend_mode(BlendMode::Normal);
    surface.set_shadow(None);
    if frame.style.trail {
        surface.fill_rect(
            Vec2::ZERO,
            frame.size,
            &Paint::Solid(frame.style.background.with_alpha(0.22)),
        );
    } else {
        surface.clear(frame.style.background);
    }
}

/// Soft radial glow fading from `color` at the center to transparent.
fn glow(surface: &mut dyn Surface, center: Vec2, radius: f32, color: Rgba) {
    if radius <= 0.0 || color.a <= 0.001 {
        return;
    }
    let gradient = RadialGradient::new(center, radius)
        .stop(0.0, color)
        .stop(0.4, color.fade(0.45))
        .stop(1.0, color.with_alpha(0.0));
    surface.fill_circle(center, radius, &Paint::Radial(gradient));
}

fn mismatch(mode: VisualMode, state: &VisualizationState) {
    debug!("{mode} renderer skipped frame: state holds {}", state.kind());
}
