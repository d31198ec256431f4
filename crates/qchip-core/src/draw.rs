//! Shape construction and boolean helpers used by component build passes.
//!
//! Everything here returns `geo` geometry in a local frame; placement onto
//! the chip is the job of [`crate::transform::Transform`]. Boolean operations
//! and offsets are delegated to `geo`.

use std::f64::consts::TAU;

use geo::{Area, BooleanOps, Buffer, Coord, LineString, MultiPolygon, Polygon};

use crate::geometry::Point;

/// Segments used to approximate a full circle.
pub const CIRCLE_SEGMENTS: usize = 64;

/// Segment density for stroked arcs, per full turn.
pub const ARC_SEGMENTS_PER_TURN: usize = 256;

/// Fragments smaller than this (mm²) left by chained booleans are dropped.
pub const SLIVER_AREA: f64 = 1e-12;

fn single(polygon: Polygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon])
}

/// A closed polygon through `points`. The ring is closed automatically.
pub fn polygon(points: &[Point]) -> MultiPolygon<f64> {
    let ring: Vec<Coord<f64>> = points.iter().map(|&p| p.into()).collect();
    single(Polygon::new(LineString::new(ring), vec![]))
}

/// An open polyline through `points`.
pub fn line(points: &[Point]) -> LineString<f64> {
    LineString::new(points.iter().map(|&p| p.into()).collect())
}

/// A disk approximated by a regular [`CIRCLE_SEGMENTS`]-gon with a vertex on
/// the positive x axis.
pub fn circle(center: Point, radius: f64) -> MultiPolygon<f64> {
    let ring: Vec<Point> = (0..CIRCLE_SEGMENTS)
        .map(|k| {
            let angle = TAU * k as f64 / CIRCLE_SEGMENTS as f64;
            Point::polar(radius, angle).translate(center.x, center.y)
        })
        .collect();
    polygon(&ring)
}

/// An axis-aligned `width` x `height` rectangle centred on `center`.
pub fn rectangle(width: f64, height: f64, center: Point) -> MultiPolygon<f64> {
    let (hw, hh) = (width / 2.0, height / 2.0);
    polygon(&[
        Point::new(center.x - hw, center.y - hh),
        Point::new(center.x + hw, center.y - hh),
        Point::new(center.x + hw, center.y + hh),
        Point::new(center.x - hw, center.y + hh),
    ])
}

pub fn union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    a.union(b)
}

pub fn subtract(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    a.difference(b)
}

pub fn intersect(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    a.intersection(b)
}

/// Grow a shape outward by `distance` with round joins.
pub fn offset(shape: &MultiPolygon<f64>, distance: f64) -> MultiPolygon<f64> {
    if distance == 0.0 {
        return shape.clone();
    }
    shape.buffer(distance)
}

/// An angular sector with its apex at the origin, bounded by side rays at
/// `center ± span/2` (radians).
///
/// A circle about the apex meets the sector in a single arc whose ends lie on
/// the two rays, so clipping is done analytically by sampling between the ray
/// angles rather than with a polygon boolean. The sector has no far edge, so
/// the result does not depend on how far a drawn wedge would reach.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wedge {
    pub center: f64,
    pub span: f64,
}

impl Wedge {
    pub fn start(&self) -> f64 {
        self.center - self.span / 2.0
    }

    pub fn end(&self) -> f64 {
        self.center + self.span / 2.0
    }

    /// The part of the circle of radius `arc_radius` about the origin that
    /// lies between the wedge's side rays, sampled at
    /// [`ARC_SEGMENTS_PER_TURN`] density.
    pub fn clip_circle(&self, arc_radius: f64) -> LineString<f64> {
        let segments = ((self.span / TAU) * ARC_SEGMENTS_PER_TURN as f64)
            .ceil()
            .max(2.0) as usize;
        let points: Vec<Point> = (0..=segments)
            .map(|k| {
                let angle = self.start() + self.span * k as f64 / segments as f64;
                Point::polar(arc_radius, angle)
            })
            .collect();
        line(&points)
    }
}

/// Stroke a circular arc about the origin to `width` with flat caps.
///
/// Each arc vertex is pushed radially by `±width/2`, so the caps lie along
/// the radii through the arc ends.
pub fn stroke_arc(arc: &LineString<f64>, width: f64) -> MultiPolygon<f64> {
    let half = width / 2.0;
    let radial = |c: &Coord<f64>, delta: f64| {
        let p = Point::from(*c);
        let r = p.length();
        Point::new(p.x * (r + delta) / r, p.y * (r + delta) / r)
    };
    let outer = arc.0.iter().map(|c| radial(c, half));
    let inner = arc.0.iter().rev().map(|c| radial(c, -half));
    let ring: Vec<Point> = outer.chain(inner).collect();
    polygon(&ring)
}

/// Round the convex corners of `shape` with radius `radius`.
///
/// The shape is grown by the radius, the input is removed to leave a
/// band, and the band is grown again. Removing that from a `2·radius` growth
/// of the shape leaves its core, which grown back by the radius and clipped
/// to the input outline gives the rounded shape. A radius of zero returns
/// the shape unchanged; a radius of half the narrowest feature or more erodes
/// it to nothing.
pub fn fillet(shape: &MultiPolygon<f64>, radius: f64) -> MultiPolygon<f64> {
    if radius <= 0.0 {
        return shape.clone();
    }
    let band = subtract(&offset(shape, radius), shape);
    let band_grown = offset(&band, radius);
    let core = subtract(&offset(shape, 2.0 * radius), &band_grown);
    let mut rounded = intersect(shape, &offset(&core, radius));
    rounded.0.retain(|p| p.unsigned_area() > SLIVER_AREA);
    rounded
}

/// The region between a square corner and its inscribed quarter disk.
///
/// `corner` is the sharp corner; `inward` gives the signs of the directions
/// from the corner into the shape along x and y. Subtracting the result
/// rounds that corner with `radius`.
pub fn corner_cutout(corner: Point, inward: (f64, f64), radius: f64) -> MultiPolygon<f64> {
    let (sx, sy) = (inward.0.signum(), inward.1.signum());
    let square = polygon(&[
        corner,
        corner.translate(sx * radius, 0.0),
        corner.translate(sx * radius, sy * radius),
        corner.translate(0.0, sy * radius),
    ]);
    let disk = circle(corner.translate(sx * radius, sy * radius), radius);
    subtract(&square, &disk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Contains;

    fn area(shape: &MultiPolygon<f64>) -> f64 {
        shape.unsigned_area()
    }

    #[test]
    fn test_circle_area_close_to_disk() {
        let disk = circle(Point::new(1.0, 1.0), 0.125);
        let exact = std::f64::consts::PI * 0.125 * 0.125;
        let a = area(&disk);
        assert!(a < exact);
        assert!((exact - a) / exact < 0.01);
    }

    #[test]
    fn test_rectangle() {
        let r = rectangle(2.0, 4.0, Point::new(1.0, 0.0));
        assert!((area(&r) - 8.0).abs() < 1e-12);
        assert!(r.contains(&geo::Point::new(1.9, 1.9)));
        assert!(!r.contains(&geo::Point::new(2.1, 0.0)));
    }

    #[test]
    fn test_boolean_helpers() {
        let a = rectangle(2.0, 2.0, Point::new(0.0, 0.0));
        let b = rectangle(2.0, 2.0, Point::new(1.0, 0.0));
        assert!((area(&union(&a, &b)) - 6.0).abs() < 1e-6);
        assert!((area(&intersect(&a, &b)) - 2.0).abs() < 1e-6);
        assert!((area(&subtract(&a, &b)) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_offset_grows_rectangle() {
        let r = rectangle(1.0, 1.0, Point::new(0.0, 0.0));
        let grown = offset(&r, 0.1);
        // Square plus four side strips plus four quarter-disk corners.
        let expected = 1.0 + 4.0 * 0.1 + std::f64::consts::PI * 0.01;
        assert!((area(&grown) - expected).abs() < 4e-3);
        assert!(area(&subtract(&r, &grown)) < 1e-12);
    }

    #[test]
    fn test_wedge_clips_arc_between_rays() {
        let wedge = Wedge {
            center: -std::f64::consts::FRAC_PI_2,
            span: 0.4,
        };
        let arc = wedge.clip_circle(0.15);
        let first = Point::from(arc.0[0]);
        let last = Point::from(*arc.0.last().unwrap());
        assert!((first.y.atan2(first.x) - wedge.start()).abs() < 1e-12);
        assert!((last.y.atan2(last.x) - wedge.end()).abs() < 1e-12);
        for c in &arc.0 {
            let p = Point::from(*c);
            assert!((p.length() - 0.15).abs() < 1e-12);
            let angle = p.y.atan2(p.x);
            assert!(angle >= wedge.start() - 1e-12 && angle <= wedge.end() + 1e-12);
        }
        // Sampling density follows the span.
        let segments = arc.0.len() - 1;
        assert_eq!(segments, (0.4 / TAU * ARC_SEGMENTS_PER_TURN as f64).ceil() as usize);
    }

    #[test]
    fn test_stroke_arc_is_annular_sector() {
        let wedge = Wedge {
            center: 0.0,
            span: 1.0,
        };
        let band = stroke_arc(&wedge.clip_circle(1.0), 0.2);
        // Annular sector area: span/2 * (r_out^2 - r_in^2).
        let expected = 0.5 * 1.0 * (1.1f64.powi(2) - 0.9f64.powi(2));
        assert!((area(&band) - expected).abs() / expected < 1e-3);
    }

    #[test]
    fn test_fillet_rounds_corners_inside_outline() {
        let r = rectangle(1.0, 0.2, Point::new(0.0, 0.0));
        let rounded = fillet(&r, 0.02);
        assert_eq!(rounded.0.len(), 1);
        assert!(rounded.0[0].interiors().is_empty());
        assert!(area(&subtract(&rounded, &r)) < 1e-9);
        // Four corners lose (1 - π/4)·ρ² each.
        let lost = 4.0 * (1.0 - std::f64::consts::FRAC_PI_4) * 0.02 * 0.02;
        assert!((area(&r) - area(&rounded) - lost).abs() < 6e-5);
    }

    #[test]
    fn test_fillet_zero_radius_is_identity() {
        let r = rectangle(1.0, 0.2, Point::new(0.0, 0.0));
        assert_eq!(fillet(&r, 0.0), r);
    }

    #[test]
    fn test_fillet_too_large_erodes_shape() {
        let r = rectangle(1.0, 0.2, Point::new(0.0, 0.0));
        let gone = fillet(&r, 0.15);
        assert!(area(&gone) < 1e-9);
    }

    #[test]
    fn test_corner_cutout() {
        let cut = corner_cutout(Point::new(0.0, 0.0), (1.0, 1.0), 1.0);
        let expected = 1.0 - std::f64::consts::FRAC_PI_4;
        assert!((area(&cut) - expected).abs() < 5e-3);
    }
}
