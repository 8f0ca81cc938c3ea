use breathwork_platform::{BlendMode, Paint, Stroke, Surface};

use super::{begin_frame, glow, mismatch, FrameContext, ModeRenderer};
use crate::config::VisualMode;
use crate::easing::{approach, frame_decay};
use crate::phase::BreathPhase;
use crate::state::{Network, VisualizationState};

pub struct BioRenderer;

const GLOW_RATE: f32 = 5.0;
/// Per-frame (at 60 fps) decay of connection progress while holding empty.
const EMPTY_DECAY: f32 = 0.95;

/// Light level for something at `depth` given how far the pulse has travelled.
pub fn depth_gate(eased: f32, max_depth: u32, depth: u32) -> f32 {
    (eased * max_depth as f32 - depth as f32).clamp(0.0, 1.0)
}

fn propagate(network: &mut Network, frame: &FrameContext<'_>) {
    let max_depth = network.max_depth;
    for node in &mut network.nodes {
        let target = depth_gate(frame.eased, max_depth, node.depth);
        node.brightness = approach(node.brightness, target, GLOW_RATE, frame.dt);
    }
    let decay = frame_decay(EMPTY_DECAY, frame.dt);
    for connection in &mut network.connections {
        connection.progress = if frame.phase == BreathPhase::HoldEmpty {
            connection.progress * decay
        } else {
            let target = depth_gate(frame.eased, max_depth, connection.depth);
            approach(connection.progress, target, GLOW_RATE, frame.dt)
        };
    }
}

impl ModeRenderer for BioRenderer {
    fn mode(&self) -> VisualMode {
        VisualMode::Bio
    }

    fn update_and_draw(
        &self,
        frame: &FrameContext<'_>,
        state: &mut VisualizationState,
        surface: &mut dyn Surface,
    ) {
        let VisualizationState::Bio(network) = state else {
            mismatch(self.mode(), state);
            return;
        };
        propagate(network, frame);

        begin_frame(frame, surface);
        let style = frame.style;
        let center = frame.center();
        let max_depth = network.max_depth as f32;

        for connection in &network.connections {
            if connection.progress <= 0.01 {
                continue;
            }
            let from = center + network.nodes[connection.parent].position;
            let to = center + network.nodes[connection.child].position;
            let depth = connection.depth as f32 / max_depth;
            let color = style
                .primary
                .lerp(style.secondary, depth)
                .with_alpha(0.25 + 0.6 * connection.progress);
            let width = style.line_thickness * (1.0 - 0.5 * depth);
            let tip = from.lerp(to, connection.progress);
            surface.stroke_line(from, tip, &Stroke::new(color, width));
        }

        surface.set_blend_mode(BlendMode::Additive);
        for node in &network.nodes {
            if node.brightness <= 0.01 {
                continue;
            }
            let position = center + node.position;
            let color = style
                .primary
                .lerp(style.secondary, node.depth as f32 / max_depth)
                .with_alpha(node.brightness);
            glow(
                surface,
                position,
                node.size * (3.0 + 4.0 * node.brightness * style.glow),
                color.fade(0.6),
            );
            surface.fill_circle(
                position,
                node.size * (0.6 + 0.6 * node.brightness),
                &Paint::Solid(color.lighten(0.5)),
            );
        }
        surface.set_blend_mode(BlendMode::Normal);
    }
}
