//! Host abstraction traits so `breathwork-core` stays backend-agnostic.

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod color;
mod recording;
mod scheduler;

pub use color::Rgba;
pub use recording::{DrawCommand, RecordingSurface};
pub use scheduler::{ManualTickScheduler, TickHandle, TickScheduler};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Reference DPI that maps to a display scale factor of 1.0.
pub const BASE_DPI: u32 = 96;

/// Physical dimensions of a drawing surface plus its display scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMetrics {
    pub physical_width: u32,
    pub physical_height: u32,
    pub scale_factor: f32,
}

impl SurfaceMetrics {
    pub fn new(physical_width: u32, physical_height: u32, scale_factor: f32) -> Self {
        let scale_factor = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        Self {
            physical_width,
            physical_height,
            scale_factor,
        }
    }

    pub fn from_dpi(physical_width: u32, physical_height: u32, dpi: u32) -> Self {
        Self::new(
            physical_width,
            physical_height,
            dpi.max(1) as f32 / BASE_DPI as f32,
        )
    }

    /// Size in drawing units once the scale transform is applied.
    pub fn logical_size(&self) -> Vec2 {
        Vec2::new(
            self.physical_width as f32 / self.scale_factor,
            self.physical_height as f32 / self.scale_factor,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Source-over compositing.
    #[default]
    Normal,
    /// Channels are summed and saturated ("lighter").
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba,
}

/// Radial gradient in logical coordinates; offsets run from the center (0) to `radius` (1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialGradient {
    pub center: Vec2,
    pub radius: f32,
    pub stops: Vec<GradientStop>,
}

impl RadialGradient {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            stops: Vec::new(),
        }
    }

    pub fn stop(mut self, offset: f32, color: Rgba) -> Self {
        self.stops.push(GradientStop {
            offset: offset.clamp(0.0, 1.0),
            color,
        });
        self
    }

    /// Color at normalized distance `t` from the center.
    pub fn sample(&self, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        match self.stops.as_slice() {
            [] => Rgba::TRANSPARENT,
            [only] => only.color,
            stops => {
                if t <= stops[0].offset {
                    return stops[0].color;
                }
                for pair in stops.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    if t <= b.offset {
                        let span = (b.offset - a.offset).max(f32::EPSILON);
                        return a.color.lerp(b.color, (t - a.offset) / span);
                    }
                }
                stops[stops.len() - 1].color
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    Solid(Rgba),
    Radial(RadialGradient),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Rgba, width: f32) -> Self {
        Self { color, width }
    }
}

/// Soft halo drawn beneath subsequent shapes until cleared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: Rgba,
    pub blur: f32,
}

/// 2D raster target. All coordinates are logical units; implementations apply
/// the scale set through [`Surface::set_scale`].
pub trait Surface {
    fn physical_size(&self) -> (u32, u32);

    /// Whether drawing can happen this frame.
    fn is_ready(&self) -> bool {
        let (width, height) = self.physical_size();
        width > 0 && height > 0
    }

    fn set_scale(&mut self, scale: f32);
    fn set_blend_mode(&mut self, mode: BlendMode);
    fn set_shadow(&mut self, shadow: Option<Shadow>);

    fn clear(&mut self, color: Rgba);
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, paint: &Paint);
    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint);
    fn stroke_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, stroke: &Stroke);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, stroke: &Stroke);
    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint);
    fn stroke_polygon(&mut self, points: &[Vec2], stroke: &Stroke);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_size_divides_by_scale() {
        let metrics = SurfaceMetrics::new(1600, 1200, 2.0);
        assert_eq!(metrics.logical_size(), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn invalid_scale_falls_back_to_one() {
        assert_eq!(SurfaceMetrics::new(10, 10, 0.0).scale_factor, 1.0);
        assert_eq!(SurfaceMetrics::new(10, 10, f32::NAN).scale_factor, 1.0);
    }

    #[test]
    fn dpi_maps_to_scale() {
        assert_eq!(SurfaceMetrics::from_dpi(100, 100, 192).scale_factor, 2.0);
    }

    #[test]
    fn gradient_interpolates_between_stops() {
        let gradient = RadialGradient::new(Vec2::ZERO, 10.0)
            .stop(0.0, Rgba::WHITE)
            .stop(1.0, Rgba::TRANSPARENT);
        let mid = gradient.sample(0.5);
        assert!((mid.a - 0.5).abs() < 1e-5);
        assert_eq!(gradient.sample(2.0), Rgba::TRANSPARENT);
    }
}
