use qchip_core::LayerId;
use serde::{Deserialize, Serialize};

/// Type of DRC violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// Metal not covered by its component's ground-plane cutouts.
    Enclosure,
    /// A metal row made of several pieces or with holes.
    Fragmented,
    /// A row with no area or a collapsed junction line.
    Degenerate,
    /// Metal of two components touching on the same layer.
    Overlap,
}

impl ViolationType {
    pub fn rule_name(&self) -> &'static str {
        match self {
            ViolationType::Enclosure => "metal_enclosed_by_cutout",
            ViolationType::Fragmented => "metal_single_contour",
            ViolationType::Degenerate => "non_degenerate_shape",
            ViolationType::Overlap => "no_cross_component_overlap",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            ViolationType::Fragmented => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Severity level of a DRC violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single DRC violation with location and description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrcViolation {
    pub id: String,
    pub violation_type: ViolationType,
    pub severity: Severity,
    pub rule_name: String,
    pub message: String,
    pub layer_id: LayerId,
    /// Name of the component that owns the first geometry involved.
    pub component: String,
    /// Names of the geometry rows involved, as `component.row`.
    pub geometry_names: Vec<String>,
    /// Bounding box of the violation region: [min_x, min_y, max_x, max_y]
    pub bbox: [f64; 4],
}

impl DrcViolation {
    pub fn new(
        violation_type: ViolationType,
        layer_id: LayerId,
        component: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            violation_type,
            severity: violation_type.default_severity(),
            rule_name: violation_type.rule_name().to_string(),
            message: message.into(),
            layer_id,
            component: component.to_string(),
            geometry_names: Vec::new(),
            bbox: [0.0; 4],
        }
    }

    pub fn with_geometry(mut self, name: impl Into<String>) -> Self {
        self.geometry_names.push(name.into());
        self
    }

    pub fn with_bbox(mut self, bbox: [f64; 4]) -> Self {
        self.bbox = bbox;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}
