use std::path::Path;

use breathwork_platform::{BlendMode, Paint, Rgba, Shadow, Stroke, Surface};
use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use tracing::debug;

use crate::shape::Shape;

/// 8-bit straight-alpha pixel as written to image files.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Software RGBA canvas. Pixels are stored premultiplied in row-major order;
/// shapes are anti-aliased from their signed distance to each pixel center.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    /// Premultiplied color per pixel.
    pixels: Vec<Rgba>,
    scale: f32,
    blend: BlendMode,
    shadow: Option<Shadow>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; (width as usize) * (height as usize)],
            scale: 1.0,
            blend: BlendMode::Normal,
            shadow: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Reallocates the pixel buffer. Contents are cleared.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![Rgba::TRANSPARENT; (width as usize) * (height as usize)];
    }

    /// Straight-alpha color at a physical pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(unpremultiply(self.pixels[(y * self.width + x) as usize]))
    }

    pub fn to_rgba8(&self) -> Vec<Rgba8> {
        self.pixels
            .iter()
            .map(|p| {
                let [r, g, b, a] = unpremultiply(*p).to_rgba8();
                Rgba8 { r, g, b, a }
            })
            .collect()
    }

    pub fn to_image(&self) -> Option<image::RgbaImage> {
        let pixels = self.to_rgba8();
        let bytes = bytemuck::cast_slice::<Rgba8, u8>(&pixels).to_vec();
        image::RgbaImage::from_raw(self.width, self.height, bytes)
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> breathwork_platform::Result<()> {
        let path = path.as_ref();
        let image = self
            .to_image()
            .ok_or_else(|| format!("canvas {}x{} has no pixels to save", self.width, self.height))?;
        image.save_with_format(path, image::ImageFormat::Png)?;
        debug!("wrote {}x{} frame to {}", self.width, self.height, path.display());
        Ok(())
    }

    fn to_physical(&self, p: Vec2) -> Vec2 {
        p * self.scale
    }

    fn paint_at(&self, paint: &Paint, physical: Vec2) -> Rgba {
        match paint {
            Paint::Solid(color) => *color,
            Paint::Radial(gradient) => {
                let logical = physical / self.scale;
                let t = logical.distance(gradient.center) / gradient.radius.max(f32::EPSILON);
                gradient.sample(t)
            }
        }
    }

    fn blend(&mut self, index: usize, color: Rgba, coverage: f32) {
        let alpha = color.a * coverage;
        if alpha <= 0.0 {
            return;
        }
        let src = Rgba::new(color.r * alpha, color.g * alpha, color.b * alpha, alpha);
        let dst = self.pixels[index];
        self.pixels[index] = match self.blend {
            BlendMode::Normal => {
                let keep = 1.0 - alpha;
                Rgba::new(
                    src.r + dst.r * keep,
                    src.g + dst.g * keep,
                    src.b + dst.b * keep,
                    src.a + dst.a * keep,
                )
            }
            BlendMode::Additive => Rgba::new(
                (src.r + dst.r).min(1.0),
                (src.g + dst.g).min(1.0),
                (src.b + dst.b).min(1.0),
                (src.a + dst.a).min(1.0),
            ),
        };
    }

    /// Visits pixels whose centers lie within `margin` of the shape's bounds.
    fn for_each_pixel(&mut self, shape: &Shape, margin: f32, mut visit: impl FnMut(&mut Self, usize, Vec2)) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let (lo, hi) = shape.bounds();
        if !(lo.is_finite() && hi.is_finite()) {
            return;
        }
        let lo = (lo - margin - 1.0).floor().max(Vec2::ZERO);
        let hi = (hi + margin + 1.0)
            .ceil()
            .min(Vec2::new(self.width as f32, self.height as f32));
        if lo.x >= hi.x || lo.y >= hi.y {
            return;
        }
        for y in lo.y as u32..hi.y as u32 {
            for x in lo.x as u32..hi.x as u32 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                visit(self, (y * self.width + x) as usize, center);
            }
        }
    }

    fn draw(&mut self, shape: Shape, paint: &Paint) {
        if let Some(shadow) = self.shadow {
            let blur = shadow.blur * self.scale;
            if blur > 0.0 && shadow.color.a > 0.0 {
                self.for_each_pixel(&shape, blur, |canvas, index, p| {
                    let outside = shape.distance(p).max(0.0);
                    if outside < blur {
                        let falloff = 1.0 - outside / blur;
                        canvas.blend(index, shadow.color, falloff * falloff);
                    }
                });
            }
        }
        self.for_each_pixel(&shape, 0.0, |canvas, index, p| {
            let coverage = (0.5 - shape.distance(p)).clamp(0.0, 1.0);
            if coverage > 0.0 {
                let color = canvas.paint_at(paint, p);
                canvas.blend(index, color, coverage);
            }
        });
    }

    fn stroke_half_width(&self, stroke: &Stroke) -> f32 {
        (stroke.width * self.scale * 0.5).max(0.5)
    }
}

fn unpremultiply(p: Rgba) -> Rgba {
    if p.a <= f32::EPSILON {
        return Rgba::TRANSPARENT;
    }
    Rgba::new(
        (p.r / p.a).min(1.0),
        (p.g / p.a).min(1.0),
        (p.b / p.a).min(1.0),
        p.a.min(1.0),
    )
}

impl Surface for Canvas {
    fn physical_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.shadow = shadow;
    }

    fn clear(&mut self, color: Rgba) {
        let a = color.a.clamp(0.0, 1.0);
        self.pixels
            .fill(Rgba::new(color.r * a, color.g * a, color.b * a, a));
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, paint: &Paint) {
        let a = self.to_physical(origin);
        let b = self.to_physical(origin + size);
        self.draw(
            Shape::Rect {
                min: a.min(b),
                max: a.max(b),
            },
            paint,
        );
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        if radius <= 0.0 {
            return;
        }
        self.draw(
            Shape::Circle {
                center: self.to_physical(center),
                radius: radius * self.scale,
            },
            paint,
        );
    }

    fn stroke_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, stroke: &Stroke) {
        self.draw(
            Shape::EllipseOutline {
                center: self.to_physical(center),
                radii: radii.abs() * self.scale,
                rotation,
                half_width: self.stroke_half_width(stroke),
            },
            &Paint::Solid(stroke.color),
        );
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, stroke: &Stroke) {
        self.draw(
            Shape::Segment {
                from: self.to_physical(from),
                to: self.to_physical(to),
                half_width: self.stroke_half_width(stroke),
            },
            &Paint::Solid(stroke.color),
        );
    }

    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint) {
        if points.len() < 3 {
            return;
        }
        let points = points.iter().map(|p| self.to_physical(*p)).collect();
        self.draw(Shape::Polygon { points }, paint);
    }

    fn stroke_polygon(&mut self, points: &[Vec2], stroke: &Stroke) {
        if points.len() < 2 {
            return;
        }
        for (i, from) in points.iter().enumerate() {
            let to = points[(i + 1) % points.len()];
            self.stroke_line(*from, to, stroke);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breathwork_platform::RadialGradient;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.02
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut canvas = Canvas::new(4, 3);
        canvas.clear(Rgba::rgb(0.2, 0.4, 0.6));
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(canvas.pixel(x, y), Some(Rgba::rgb(0.2, 0.4, 0.6)));
            }
        }
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn circle_covers_center_not_corners() {
        let mut canvas = Canvas::new(40, 40);
        canvas.clear(Rgba::BLACK);
        canvas.fill_circle(Vec2::splat(20.0), 10.0, &Paint::Solid(Rgba::WHITE));
        assert_eq!(canvas.pixel(20, 20), Some(Rgba::WHITE));
        assert_eq!(canvas.pixel(1, 1), Some(Rgba::BLACK));
        // Edge pixels are partially covered.
        let edge = canvas.pixel(29, 20).map(|p| p.r).unwrap_or_default();
        assert!(edge > 0.0 && edge < 1.0, "edge coverage {edge}");
    }

    #[test]
    fn scale_maps_logical_to_physical() {
        let mut canvas = Canvas::new(40, 40);
        canvas.set_scale(2.0);
        canvas.fill_rect(Vec2::ZERO, Vec2::splat(10.0), &Paint::Solid(Rgba::WHITE));
        assert_eq!(canvas.pixel(19, 19).map(|p| p.a), Some(1.0));
        assert_eq!(canvas.pixel(21, 21).map(|p| p.a), Some(0.0));
    }

    #[test]
    fn normal_blend_is_source_over() {
        let mut canvas = Canvas::new(2, 2);
        canvas.clear(Rgba::BLACK);
        canvas.fill_rect(Vec2::ZERO, Vec2::splat(2.0), &Paint::Solid(Rgba::WHITE.with_alpha(0.5)));
        let p = canvas.pixel(0, 0).unwrap_or_default();
        assert!(close(p.r, 0.5) && close(p.a, 1.0));
    }

    #[test]
    fn additive_blend_saturates() {
        let mut canvas = Canvas::new(2, 2);
        canvas.clear(Rgba::rgb(0.6, 0.0, 0.0));
        canvas.set_blend_mode(BlendMode::Additive);
        canvas.fill_rect(Vec2::ZERO, Vec2::splat(2.0), &Paint::Solid(Rgba::rgb(0.7, 0.3, 0.0)));
        let p = canvas.pixel(1, 1).unwrap_or_default();
        assert!(close(p.r, 1.0) && close(p.g, 0.3));
    }

    #[test]
    fn radial_gradient_fades_outward() {
        let mut canvas = Canvas::new(50, 50);
        let gradient = RadialGradient::new(Vec2::splat(25.0), 20.0)
            .stop(0.0, Rgba::WHITE)
            .stop(1.0, Rgba::WHITE.with_alpha(0.0));
        canvas.fill_circle(Vec2::splat(25.0), 20.0, &Paint::Radial(gradient));
        let inner = canvas.pixel(25, 25).map(|p| p.a).unwrap_or_default();
        let outer = canvas.pixel(40, 25).map(|p| p.a).unwrap_or_default();
        assert!(inner > 0.9 && outer < inner);
    }

    #[test]
    fn shadow_draws_a_halo_outside_the_shape() {
        let mut canvas = Canvas::new(60, 60);
        canvas.set_shadow(Some(Shadow {
            color: Rgba::WHITE,
            blur: 10.0,
        }));
        canvas.fill_circle(Vec2::splat(30.0), 10.0, &Paint::Solid(Rgba::WHITE));
        let halo = canvas.pixel(45, 30).map(|p| p.a).unwrap_or_default();
        assert!(halo > 0.0 && halo < 1.0);
        assert_eq!(canvas.pixel(2, 2).map(|p| p.a), Some(0.0));
    }

    #[test]
    fn line_and_ellipse_leave_the_middle_empty() {
        let mut canvas = Canvas::new(60, 60);
        let stroke = Stroke::new(Rgba::WHITE, 2.0);
        canvas.stroke_ellipse(Vec2::splat(30.0), Vec2::new(20.0, 10.0), 0.0, &stroke);
        assert_eq!(canvas.pixel(30, 30).map(|p| p.a), Some(0.0));
        assert!(canvas.pixel(50, 30).map(|p| p.a).unwrap_or_default() > 0.5);

        canvas.stroke_line(Vec2::new(0.0, 55.5), Vec2::new(60.0, 55.5), &stroke);
        assert!(canvas.pixel(10, 55).map(|p| p.a).unwrap_or_default() > 0.9);
    }

    #[test]
    fn exports_straight_alpha_bytes() {
        let mut canvas = Canvas::new(3, 2);
        canvas.clear(Rgba::from_rgba8(255, 0, 0, 128));
        let bytes = canvas.to_rgba8();
        assert_eq!(bytes.len(), 6);
        assert_eq!(bytes[0], Rgba8 { r: 255, g: 0, b: 0, a: 128 });
        let image = canvas.to_image().expect("sized buffer");
        assert_eq!(image.dimensions(), (3, 2));
    }

    #[test]
    fn zero_sized_canvas_is_not_ready() {
        let mut canvas = Canvas::new(0, 10);
        assert!(!canvas.is_ready());
        canvas.fill_circle(Vec2::ZERO, 5.0, &Paint::Solid(Rgba::WHITE));
        assert!(canvas.to_rgba8().is_empty());
    }
}
