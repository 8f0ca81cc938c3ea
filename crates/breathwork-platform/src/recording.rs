use glam::Vec2;

use crate::{BlendMode, Paint, Rgba, Shadow, Stroke, Surface};

/// One call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetScale(f32),
    SetBlendMode(BlendMode),
    SetShadow(Option<Shadow>),
    Clear(Rgba),
    FillRect { origin: Vec2, size: Vec2, paint: Paint },
    FillCircle { center: Vec2, radius: f32, paint: Paint },
    StrokeEllipse { center: Vec2, radii: Vec2, rotation: f32, stroke: Stroke },
    StrokeLine { from: Vec2, to: Vec2, stroke: Stroke },
    FillPolygon { points: Vec<Vec2>, paint: Paint },
    StrokePolygon { points: Vec<Vec2>, stroke: Stroke },
}

impl DrawCommand {
    /// Whether the command puts pixels on the surface.
    pub fn is_draw(&self) -> bool {
        !matches!(
            self,
            DrawCommand::SetScale(_) | DrawCommand::SetBlendMode(_) | DrawCommand::SetShadow(_)
        )
    }
}

/// Surface that stores every call instead of rasterizing. Used for headless
/// hosts and for inspecting what a frame would draw.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ready: bool,
    scale: f32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ready: true,
            scale: 1.0,
            commands: Vec::new(),
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn draw_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_draw()).count()
    }
}

impl Surface for RecordingSurface {
    fn physical_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_ready(&self) -> bool {
        self.ready && self.width > 0 && self.height > 0
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.commands.push(DrawCommand::SetScale(scale));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.commands.push(DrawCommand::SetBlendMode(mode));
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.commands.push(DrawCommand::SetShadow(shadow));
    }

    fn clear(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, paint: &Paint) {
        self.commands.push(DrawCommand::FillRect {
            origin,
            size,
            paint: paint.clone(),
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            paint: paint.clone(),
        });
    }

    fn stroke_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, stroke: &Stroke) {
        self.commands.push(DrawCommand::StrokeEllipse {
            center,
            radii,
            rotation,
            stroke: *stroke,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, stroke: &Stroke) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            stroke: *stroke,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint) {
        self.commands.push(DrawCommand::FillPolygon {
            points: points.to_vec(),
            paint: paint.clone(),
        });
    }

    fn stroke_polygon(&mut self, points: &[Vec2], stroke: &Stroke) {
        self.commands.push(DrawCommand::StrokePolygon {
            points: points.to_vec(),
            stroke: *stroke,
        });
    }
}
