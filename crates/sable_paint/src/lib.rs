//! Sable paint types
//!
//! Value types consumed by the GPU render-data layer: geometry produced by
//! the tessellator (polylines, vertex batches, bounding boxes), fill and
//! stroke descriptors (solid colors, gradients, change flags), and decoded
//! pixel surfaces for images. This is a leaf crate with no GPU dependency.

pub mod brush;
pub mod color;
pub mod geometry;
pub mod gradient;
pub mod polyline;
pub mod surface;

pub use brush::{Brush, FillRule, UpdateFlags};
pub use color::{Color, ColorFormat};
pub use geometry::{Point, Rect, Transform2D};
pub use gradient::{Gradient, GradientStop};
pub use polyline::{GeometryData, Polyline};
pub use surface::{ClipHandle, PixelSurface};
