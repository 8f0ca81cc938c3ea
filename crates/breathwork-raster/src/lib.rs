//! Software raster backend for breathwork: an anti-aliased RGBA canvas
//! implementing [`breathwork_platform::Surface`] with PNG export.

mod canvas;
mod shape;

pub use canvas::{Canvas, Rgba8};
pub use shape::Shape;
