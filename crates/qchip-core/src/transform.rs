use geo::{Rotate, Translate};
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Shape};

/// Places geometry built in a component's local frame onto the chip.
///
/// Shapes are rotated about the local origin first, then translated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation offset.
    pub offset: Point,
    /// Counter-clockwise rotation in degrees.
    pub rotation: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            offset: Point::new(0.0, 0.0),
            rotation: 0.0,
        }
    }
}

impl Transform {
    pub fn new(rotation: f64, offset: Point) -> Self {
        Self { offset, rotation }
    }

    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            offset: Point::new(x, y),
            ..Default::default()
        }
    }

    pub fn rotate(degrees: f64) -> Self {
        Self {
            rotation: degrees,
            ..Default::default()
        }
    }

    pub fn is_identity(&self) -> bool {
        self.rotation == 0.0 && self.offset.x == 0.0 && self.offset.y == 0.0
    }

    pub fn apply(&self, point: &Point) -> Point {
        point.rotate(self.rotation).translate(self.offset.x, self.offset.y)
    }

    /// Apply to any `geo` geometry.
    pub fn place<G>(&self, geom: &G) -> G
    where
        G: Rotate<f64> + Translate<f64>,
    {
        geom.rotate_around_point(self.rotation, geo::Point::new(0.0, 0.0))
            .translate(self.offset.x, self.offset.y)
    }

    pub fn place_shape(&self, shape: &Shape) -> Shape {
        match shape {
            Shape::Poly(p) => Shape::Poly(self.place(p)),
            Shape::Line(l) => Shape::Line(self.place(l)),
        }
    }

    /// Place a fixed group of shapes in one go, keeping their order.
    pub fn place_all<const N: usize>(&self, shapes: [Shape; N]) -> [Shape; N] {
        shapes.map(|s| self.place_shape(&s))
    }
}
