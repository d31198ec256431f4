use serde::{Deserialize, Serialize};

use crate::error::{DrcError, Result};
use crate::violation::Severity;

/// Which checks run and how small an area counts as zero.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// let config = qchip_drc::DrcConfig::from_json(r#"{ "check_overlap": false }"#).unwrap();
/// assert!(config.check_enclosure);
/// assert!(!config.check_overlap);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrcConfig {
    /// Areas at or below this (mm²) are treated as empty.
    pub area_tolerance: f64,
    pub check_enclosure: bool,
    pub check_fragmented: bool,
    pub check_degenerate: bool,
    pub check_overlap: bool,
    /// Overrides the severity of overlap violations.
    pub overlap_severity: Severity,
}

impl Default for DrcConfig {
    fn default() -> Self {
        Self {
            area_tolerance: 1e-9,
            check_enclosure: true,
            check_fragmented: true,
            check_degenerate: true,
            check_overlap: true,
            overlap_severity: Severity::Error,
        }
    }
}

impl DrcConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.area_tolerance.is_finite() || self.area_tolerance < 0.0 {
            return Err(DrcError::InvalidConfig {
                field: "area_tolerance".to_string(),
                reason: format!("must be a non-negative number, got {}", self.area_tolerance),
            });
        }
        Ok(())
    }
}
