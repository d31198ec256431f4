//! Geometry checks over the rows of a built design.
//!
//! Enclosure is checked per component, layer and chip: metal must lie inside
//! the union of that component's cutouts. Layers without a ground plane have
//! no cutouts and are skipped. Overlap is checked across
//! components using the bounding-box R-tree from `qchip_core::spatial`, with
//! candidates confirmed by intersection area.

use std::collections::{BTreeMap, HashMap};

use geo::{Area, BooleanOps, BoundingRect, MultiPolygon};
use qchip_core::spatial::SpatialIndex;
use qchip_core::{BBox, ComponentId, Design, LayerId, LayerStack, Point, QGeometry, Shape};
use serde::{Deserialize, Serialize};

use crate::config::DrcConfig;
use crate::error::Result;
use crate::violation::{DrcViolation, Severity, ViolationType};

/// Outcome of one DRC run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrcReport {
    pub violations: Vec<DrcViolation>,
    /// Number of geometry rows inspected.
    pub rows_checked: usize,
}

impl DrcReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn count(&self, violation_type: ViolationType) -> usize {
        self.violations
            .iter()
            .filter(|v| v.violation_type == violation_type)
            .count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &DrcViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone)]
pub struct DrcEngine {
    config: DrcConfig,
}

impl DrcEngine {
    pub fn new(config: DrcConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DrcConfig {
        &self.config
    }

    /// Run every enabled check over the design's geometry tables.
    pub fn check(&self, design: &Design) -> DrcReport {
        let names: HashMap<ComponentId, String> = design
            .components()
            .map(|c| (c.id, c.name.clone()))
            .collect();
        self.check_rows(design.qgeometry().rows(), &names, design.layer_stack())
    }

    /// Run the checks over `rows`, naming components through `names`.
    /// Components missing from `names` are reported by id.
    pub fn check_rows(
        &self,
        rows: &[QGeometry],
        names: &HashMap<ComponentId, String>,
        layers: &LayerStack,
    ) -> DrcReport {
        let ctx = CheckContext {
            rows,
            names,
            layers,
            tolerance: self.config.area_tolerance,
        };
        let mut violations = Vec::new();

        if self.config.check_degenerate {
            violations.extend(ctx.degenerate());
        }
        if self.config.check_fragmented {
            violations.extend(ctx.fragmented());
        }
        if self.config.check_enclosure {
            violations.extend(ctx.enclosure());
        }
        if self.config.check_overlap {
            violations.extend(
                ctx.overlap()
                    .into_iter()
                    .map(|v| v.with_severity(self.config.overlap_severity)),
            );
        }

        for (n, violation) in violations.iter_mut().enumerate() {
            violation.id = format!("DRC-{:04}", n + 1);
            log::warn!(
                "{} [{}] {} on layer {}: {}",
                violation.id,
                violation.rule_name,
                violation.component,
                violation.layer_id,
                violation.message
            );
        }
        log::info!(
            "DRC checked {} rows: {} violations",
            rows.len(),
            violations.len()
        );

        DrcReport {
            violations,
            rows_checked: rows.len(),
        }
    }
}

struct CheckContext<'a> {
    rows: &'a [QGeometry],
    names: &'a HashMap<ComponentId, String>,
    layers: &'a LayerStack,
    tolerance: f64,
}

impl CheckContext<'_> {
    fn component_name(&self, id: &ComponentId) -> String {
        self.names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    fn row_label(&self, row: &QGeometry) -> String {
        format!("{}.{}", self.component_name(&row.component), row.name)
    }

    fn violation(&self, violation_type: ViolationType, row: &QGeometry, message: String) -> DrcViolation {
        DrcViolation::new(
            violation_type,
            row.layer,
            &self.component_name(&row.component),
            message,
        )
        .with_geometry(self.row_label(row))
        .with_bbox(row.bbox().map(|b| b.as_array()).unwrap_or([0.0; 4]))
    }

    fn degenerate(&self) -> Vec<DrcViolation> {
        let mut found = Vec::new();
        for row in self.rows {
            let problem = match &row.shape {
                Shape::Poly(p) if p.unsigned_area() <= self.tolerance => {
                    Some(format!("'{}' has no area", row.name))
                }
                Shape::Line(l) => match l.0.as_slice() {
                    [a, .., b] if Point::from(*a).distance_to(&Point::from(*b)) > 0.0 => None,
                    _ => Some(format!("'{}' has zero length", row.name)),
                },
                Shape::Poly(_) => None,
            };
            if let Some(message) = problem {
                found.push(self.violation(ViolationType::Degenerate, row, message));
            }
        }
        log::debug!("degenerate check: {} findings", found.len());
        found
    }

    fn fragmented(&self) -> Vec<DrcViolation> {
        let mut found = Vec::new();
        for row in self.rows.iter().filter(|r| r.is_metal()) {
            let Some(poly) = row.shape.as_poly() else {
                continue;
            };
            let pieces = poly
                .0
                .iter()
                .filter(|p| p.unsigned_area() > self.tolerance)
                .count();
            let holes: usize = poly.0.iter().map(|p| p.interiors().len()).sum();
            if pieces > 1 || holes > 0 {
                let message = format!("'{}' has {} pieces and {} holes", row.name, pieces, holes);
                found.push(self.violation(ViolationType::Fragmented, row, message));
            }
        }
        log::debug!("fragmented check: {} findings", found.len());
        found
    }

    fn enclosure(&self) -> Vec<DrcViolation> {
        type Group<'r> = (Vec<&'r QGeometry>, MultiPolygon<f64>);
        let mut groups: BTreeMap<(ComponentId, LayerId, &str), Group<'_>> = BTreeMap::new();
        let grounded = |layer: LayerId| {
            self.layers
                .get_layer(layer)
                .map_or(true, |l| l.ground_plane)
        };
        for row in self.rows.iter().filter(|r| grounded(r.layer)) {
            let Some(poly) = row.shape.as_poly() else {
                continue;
            };
            let entry = groups
                .entry((row.component, row.layer, row.chip.as_str()))
                .or_insert_with(|| (Vec::new(), MultiPolygon::new(Vec::new())));
            if row.is_metal() {
                entry.0.push(row);
            } else if row.is_cutout() {
                entry.1 = entry.1.union(poly);
            }
        }

        let mut found = Vec::new();
        for ((_, layer, chip), (metal, cutouts)) in &groups {
            for row in metal {
                let Some(poly) = row.shape.as_poly() else {
                    continue;
                };
                let uncovered = poly.difference(cutouts);
                let area = uncovered.unsigned_area();
                if area <= self.tolerance {
                    continue;
                }
                let message = format!(
                    "'{}' extends {:.3e} mm² past its cutouts on chip '{}'",
                    row.name, area, chip
                );
                let bbox = uncovered
                    .bounding_rect()
                    .map(|r| BBox::from(r).as_array())
                    .unwrap_or([0.0; 4]);
                let mut violation = self.violation(ViolationType::Enclosure, row, message);
                violation.layer_id = *layer;
                found.push(violation.with_bbox(bbox));
            }
        }
        log::debug!("enclosure check: {} findings", found.len());
        found
    }

    fn overlap(&self) -> Vec<DrcViolation> {
        let index = SpatialIndex::from_rows(self.rows, QGeometry::is_metal);
        let mut found = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            if !row.is_metal() {
                continue;
            }
            let (Some(poly), Some(bbox)) = (row.shape.as_poly(), row.bbox()) else {
                continue;
            };
            for hit in index.query_bbox(&bbox) {
                if hit.row_index <= i {
                    continue;
                }
                let other = &self.rows[hit.row_index];
                if other.component == row.component
                    || other.layer != row.layer
                    || other.chip != row.chip
                {
                    continue;
                }
                let Some(other_poly) = other.shape.as_poly() else {
                    continue;
                };
                let shared = poly.intersection(other_poly);
                let area = shared.unsigned_area();
                if area <= self.tolerance {
                    continue;
                }
                let message = format!(
                    "'{}' overlaps '{}' by {:.3e} mm²",
                    self.row_label(row),
                    self.row_label(other),
                    area
                );
                let bbox = shared
                    .bounding_rect()
                    .map(|r| BBox::from(r).as_array())
                    .unwrap_or([0.0; 4]);
                found.push(
                    self.violation(ViolationType::Overlap, row, message)
                        .with_geometry(self.row_label(other))
                        .with_bbox(bbox),
                );
            }
        }
        log::debug!("overlap check: {} findings", found.len());
        found
    }
}
