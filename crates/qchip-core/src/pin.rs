use geo::LineString;
use serde::{Deserialize, Serialize};

use crate::component::ComponentId;
use crate::error::{CoreError, Result};
use crate::geometry::Point;

/// Pin gap as a fraction of the pin width, when no gap is given.
pub const DEFAULT_GAP_RATIO: f64 = 0.6;

/// A named attachment point on a component.
///
/// The anchor line runs across the conductor; `tangent` points from the first
/// anchor point to the second and `normal` is the tangent turned a quarter
/// turn counter-clockwise, pointing away from the component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub name: String,
    pub component: ComponentId,
    pub points: [Point; 2],
    pub middle: Point,
    pub tangent: Point,
    pub normal: Point,
    pub width: f64,
    pub gap: f64,
    pub chip: String,
}

impl Pin {
    /// Build a pin from a two-point anchor line.
    pub fn from_line(
        name: &str,
        component: ComponentId,
        line: &LineString<f64>,
        width: f64,
        chip: &str,
    ) -> Result<Self> {
        let [a, b] = match line.0.as_slice() {
            [a, b] => [Point::from(*a), Point::from(*b)],
            other => {
                return Err(CoreError::degenerate(
                    name,
                    format!("pin line needs 2 points, got {}", other.len()),
                ))
            }
        };
        let span = Point::new(b.x - a.x, b.y - a.y);
        let length = span.length();
        if length <= 0.0 || !length.is_finite() {
            return Err(CoreError::degenerate(name, "pin line has zero length"));
        }
        if width <= 0.0 {
            return Err(CoreError::degenerate(name, "pin width must be positive"));
        }
        let tangent = Point::new(span.x / length, span.y / length);
        Ok(Self {
            name: name.to_string(),
            component,
            points: [a, b],
            middle: Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0),
            tangent,
            normal: Point::new(-tangent.y, tangent.x),
            width,
            gap: width * DEFAULT_GAP_RATIO,
            chip: chip.to_string(),
        })
    }

    pub fn anchor_length(&self) -> f64 {
        self.points[0].distance_to(&self.points[1])
    }
}
