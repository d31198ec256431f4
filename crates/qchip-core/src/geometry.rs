use geo::{Area, BoundingRect, Coord, LineString, MultiPolygon};
use serde::{Deserialize, Serialize};

/// A 2D point in chip coordinates (millimetres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from the origin in direction `angle` (radians).
    pub fn polar(radius: f64, angle: f64) -> Self {
        Self::new(radius * angle.cos(), radius * angle.sin())
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Rotate counter-clockwise about the origin.
    pub fn rotate(&self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

impl From<Point> for Coord<f64> {
    fn from(p: Point) -> Self {
        Coord { x: p.x, y: p.y }
    }
}

impl From<Coord<f64>> for Point {
    fn from(c: Coord<f64>) -> Self {
        Point::new(c.x, c.y)
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }
}

impl From<geo::Rect<f64>> for BBox {
    fn from(rect: geo::Rect<f64>) -> Self {
        BBox::new(rect.min().into(), rect.max().into())
    }
}

/// A shape stored in a geometry table: filled polygons or a centreline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Poly(MultiPolygon<f64>),
    Line(LineString<f64>),
}

impl Shape {
    pub fn bbox(&self) -> Option<BBox> {
        match self {
            Shape::Poly(p) => p.bounding_rect().map(BBox::from),
            Shape::Line(l) => l.bounding_rect().map(BBox::from),
        }
    }

    pub fn as_poly(&self) -> Option<&MultiPolygon<f64>> {
        match self {
            Shape::Poly(p) => Some(p),
            Shape::Line(_) => None,
        }
    }

    pub fn as_line(&self) -> Option<&LineString<f64>> {
        match self {
            Shape::Line(l) => Some(l),
            Shape::Poly(_) => None,
        }
    }

    /// Filled area; zero for lines.
    pub fn area(&self) -> f64 {
        match self {
            Shape::Poly(p) => p.unsigned_area(),
            Shape::Line(_) => 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Shape::Poly(p) => p.0.is_empty(),
            Shape::Line(l) => l.0.len() < 2,
        }
    }

    /// All vertices in drawing order, for exact comparisons.
    pub fn coords(&self) -> Vec<Coord<f64>> {
        match self {
            Shape::Poly(p) => p
                .0
                .iter()
                .flat_map(|poly| {
                    poly.exterior()
                        .0
                        .iter()
                        .chain(poly.interiors().iter().flat_map(|ring| ring.0.iter()))
                        .copied()
                        .collect::<Vec<_>>()
                })
                .collect(),
            Shape::Line(l) => l.0.clone(),
        }
    }
}

impl From<MultiPolygon<f64>> for Shape {
    fn from(p: MultiPolygon<f64>) -> Self {
        Shape::Poly(p)
    }
}

impl From<LineString<f64>> for Shape {
    fn from(l: LineString<f64>) -> Self {
        Shape::Line(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_point_rotate() {
        let p = Point::new(1.0, 0.0).rotate(90.0);
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bbox_from_rect() {
        let rect = geo::Rect::new((4.0, 1.0), (0.0, 3.0));
        let bb = BBox::from(rect);
        assert_eq!(bb.as_array(), [0.0, 1.0, 4.0, 3.0]);
        assert_eq!(bb.center(), Point::new(2.0, 2.0));
    }

    #[test]
    fn test_shape_bbox_and_area() {
        let square = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ]]);
        let shape = Shape::from(square);
        let bb = shape.bbox().unwrap();
        assert!((bb.width() - 2.0).abs() < 1e-12);
        assert!((bb.height() - 1.0).abs() < 1e-12);
        assert!((shape.area() - 2.0).abs() < 1e-12);

        let line = Shape::from(LineString::from(vec![(0.0, 0.0), (0.0, 3.0)]));
        assert_eq!(line.area(), 0.0);
        assert!(!line.is_empty());
        assert_eq!(line.coords().len(), 2);
    }
}
