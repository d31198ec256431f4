//! Geometry tables: the rows every component build pass registers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::ComponentId;
use crate::geometry::{BBox, Shape};
use crate::layer::LayerId;

/// Which table a geometry row lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    /// Filled polygons, additive metal or subtractive ground-plane cutouts.
    Poly,
    /// Josephson junction placeholders: a centreline with a width.
    Junction,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Poly => "poly",
            TableKind::Junction => "junction",
        }
    }

    /// Whether `shape` has the geometry type this table stores.
    pub fn accepts(&self, shape: &Shape) -> bool {
        matches!(
            (self, shape),
            (TableKind::Poly, Shape::Poly(_)) | (TableKind::Junction, Shape::Line(_))
        )
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named shape registered by a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QGeometry {
    pub component: ComponentId,
    pub name: String,
    pub kind: TableKind,
    pub shape: Shape,
    pub layer: LayerId,
    /// Cut from the ground plane instead of added as metal.
    pub subtract: bool,
    /// Junction width; zero for polygons.
    pub width: f64,
    pub chip: String,
}

impl QGeometry {
    pub fn bbox(&self) -> Option<BBox> {
        self.shape.bbox()
    }

    pub fn is_metal(&self) -> bool {
        self.kind == TableKind::Poly && !self.subtract
    }

    pub fn is_cutout(&self) -> bool {
        self.kind == TableKind::Poly && self.subtract
    }
}

/// All geometry rows of a design.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QGeometryTables {
    rows: Vec<QGeometry>,
}

impl QGeometryTables {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = QGeometry>) {
        self.rows.extend(rows);
    }

    /// Drop every row owned by `component`, returning how many were removed.
    pub fn remove_component(&mut self, component: &ComponentId) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| &r.component != component);
        before - self.rows.len()
    }

    /// Swap in a fresh set of rows for `component`.
    pub fn replace_component(&mut self, component: &ComponentId, rows: Vec<QGeometry>) {
        self.remove_component(component);
        self.rows.extend(rows);
    }

    pub fn rows(&self) -> &[QGeometry] {
        &self.rows
    }

    pub fn table(&self, kind: TableKind) -> impl Iterator<Item = &QGeometry> {
        self.rows.iter().filter(move |r| r.kind == kind)
    }

    pub fn for_component<'a>(
        &'a self,
        component: &'a ComponentId,
    ) -> impl Iterator<Item = &'a QGeometry> + 'a {
        self.rows.iter().filter(move |r| &r.component == component)
    }

    pub fn find(&self, component: &ComponentId, name: &str) -> Option<&QGeometry> {
        self.rows
            .iter()
            .find(|r| &r.component == component && r.name == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
