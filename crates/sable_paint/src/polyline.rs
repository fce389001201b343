//! Tessellated geometry inputs for the GPU mesh layer
//!
//! The path flattener hands geometry to the GPU layer in two forms: ordered
//! point sequences (`Polyline`, one per contour) for fan-filled shapes, and
//! pre-triangulated vertex batches (`GeometryData`) for strokes and textured
//! quads. Both are consumed read-only by a single mesh update.

use crate::geometry::Point;

/// An ordered 2D point sequence, possibly closed, describing one contour
#[derive(Clone, Debug, Default)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Polyline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn closed(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.closed = false;
    }

    /// Axis-aligned bounds, or `None` for an empty polyline
    pub fn bbox(&self) -> Option<(Point, Point)> {
        let first = *self.points.first()?;
        let mut pmin = first;
        let mut pmax = first;
        for p in &self.points[1..] {
            pmin = pmin.min(*p);
            pmax = pmax.max(*p);
        }
        Some((pmin, pmax))
    }
}

/// Raw vertex/texcoord/index triples for one triangle-list mesh
#[derive(Clone, Debug, Default)]
pub struct GeometryData {
    pub positions: Vec<Point>,
    pub tex_coords: Vec<Point>,
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    /// An axis-aligned textured quad covering `pmin..pmax` with unit UVs
    pub fn image_quad(pmin: Point, pmax: Point) -> Self {
        Self {
            positions: vec![
                pmin,
                Point::new(pmax.x, pmin.y),
                pmax,
                Point::new(pmin.x, pmax.y),
            ],
            tex_coords: vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Axis-aligned bounds over positions, or `None` when empty
    pub fn bbox(&self) -> Option<(Point, Point)> {
        let first = *self.positions.first()?;
        let mut pmin = first;
        let mut pmax = first;
        for p in &self.positions[1..] {
            pmin = pmin.min(*p);
            pmax = pmax.max(*p);
        }
        Some((pmin, pmax))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polyline_bbox() {
        let mut polyline = Polyline::new();
        assert!(polyline.bbox().is_none());

        polyline.push(Point::new(2.0, -1.0));
        polyline.push(Point::new(-3.0, 4.0));
        polyline.push(Point::new(1.0, 1.0));

        let (pmin, pmax) = polyline.bbox().unwrap();
        assert_eq!(pmin, Point::new(-3.0, -1.0));
        assert_eq!(pmax, Point::new(2.0, 4.0));
    }

    #[test]
    fn test_image_quad() {
        let quad = GeometryData::image_quad(Point::new(0.0, 0.0), Point::new(10.0, 20.0));
        assert_eq!(quad.positions.len(), 4);
        assert_eq!(quad.tex_coords.len(), 4);
        assert_eq!(quad.indices.len(), 6);
        assert_eq!(quad.positions[2], Point::new(10.0, 20.0));
        assert_eq!(quad.tex_coords[2], Point::new(1.0, 1.0));
    }

    #[test]
    fn test_geometry_bbox() {
        let quad = GeometryData::image_quad(Point::new(-5.0, 1.0), Point::new(5.0, 9.0));
        let (pmin, pmax) = quad.bbox().unwrap();
        assert_eq!(pmin, Point::new(-5.0, 1.0));
        assert_eq!(pmax, Point::new(5.0, 9.0));
    }
}
