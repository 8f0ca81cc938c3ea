//! Signed-distance shapes in physical pixel space. Negative inside.

use glam::{Mat2, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    Rect { min: Vec2, max: Vec2 },
    Segment { from: Vec2, to: Vec2, half_width: f32 },
    EllipseOutline {
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        half_width: f32,
    },
    Polygon { points: Vec<Vec2> },
}

impl Shape {
    pub fn distance(&self, p: Vec2) -> f32 {
        match self {
            Shape::Circle { center, radius } => p.distance(*center) - radius,
            Shape::Rect { min, max } => {
                let center = (*min + *max) * 0.5;
                let half = (*max - *min) * 0.5;
                let q = (p - center).abs() - half;
                q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0)
            }
            Shape::Segment {
                from,
                to,
                half_width,
            } => segment_distance(p, *from, *to) - half_width,
            Shape::EllipseOutline {
                center,
                radii,
                rotation,
                half_width,
            } => {
                let local = Mat2::from_angle(-rotation) * (p - *center);
                ellipse_distance(local, *radii).abs() - half_width
            }
            Shape::Polygon { points } => polygon_distance(p, points),
        }
    }

    /// Axis-aligned bounds of the solid part.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        match self {
            Shape::Circle { center, radius } => (*center - *radius, *center + *radius),
            Shape::Rect { min, max } => (*min, *max),
            Shape::Segment {
                from,
                to,
                half_width,
            } => (from.min(*to) - *half_width, from.max(*to) + *half_width),
            Shape::EllipseOutline {
                center,
                radii,
                half_width,
                ..
            } => {
                let reach = radii.max_element() + half_width;
                (*center - reach, *center + reach)
            }
            Shape::Polygon { points } => points.iter().fold(
                (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
                |(lo, hi), p| (lo.min(*p), hi.max(*p)),
            ),
        }
    }
}

fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// First-order distance estimate to an axis-aligned ellipse outline.
fn ellipse_distance(p: Vec2, radii: Vec2) -> f32 {
    let radii = radii.max(Vec2::splat(1e-3));
    let k0 = (p / radii).length();
    if k0 <= f32::EPSILON {
        return -radii.min_element();
    }
    let k1 = (p / (radii * radii)).length();
    k0 * (k0 - 1.0) / k1
}

/// Distance to the nearest edge, negated inside (even-odd rule).
fn polygon_distance(p: Vec2, points: &[Vec2]) -> f32 {
    if points.len() < 3 {
        return f32::INFINITY;
    }
    let mut nearest = f32::INFINITY;
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        nearest = nearest.min(segment_distance(p, a, b));
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    if inside {
        -nearest
    } else {
        nearest
    }
}
